//! Survey assets
//!
//! An [`Asset`] bundles the survey rows, choice lists, translation names and
//! analysis configuration of one schema version.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisField, SupplementalIndex};
use crate::error::SchemaError;
use crate::flat_paths::{FlatPathOptions, FlatPaths};
use crate::row::{ChoiceRow, SchemaRow};

/// Survey content of an asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetContent {
    /// Ordered survey rows
    #[serde(default)]
    pub survey: Vec<SchemaRow>,

    /// Choice list entries, any order
    #[serde(default)]
    pub choices: Vec<ChoiceRow>,

    /// Translation names, one per label slot
    #[serde(default)]
    pub translations: Vec<Option<String>>,
}

/// Analysis configuration of an asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisForm {
    /// Declared transcript, translation and qualitative fields
    #[serde(default)]
    pub additional_fields: Vec<AnalysisField>,
}

/// One schema version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Survey definition
    #[serde(default)]
    pub content: AssetContent,

    /// Analysis configuration
    #[serde(default)]
    pub analysis_form_json: AnalysisForm,
}

impl Asset {
    /// Create from survey rows and choices
    #[inline]
    #[must_use]
    pub fn new(survey: Vec<SchemaRow>, choices: Vec<ChoiceRow>) -> Self {
        Self {
            content: AssetContent {
                survey,
                choices,
                translations: Vec::new(),
            },
            analysis_form_json: AnalysisForm::default(),
        }
    }

    /// Attach analysis fields
    #[inline]
    #[must_use]
    pub fn with_analysis_fields(mut self, fields: Vec<AnalysisField>) -> Self {
        self.analysis_form_json.additional_fields = fields;
        self
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the survey has no rows
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let asset: Self = serde_json::from_str(json)?;
        if asset.content.survey.is_empty() {
            return Err(SchemaError::EmptySurvey);
        }
        Ok(asset)
    }

    /// Survey rows
    #[inline]
    #[must_use]
    pub fn survey(&self) -> &[SchemaRow] {
        &self.content.survey
    }

    /// Choice list entries
    #[inline]
    #[must_use]
    pub fn choices(&self) -> &[ChoiceRow] {
        &self.content.choices
    }

    /// Declared analysis fields
    #[inline]
    #[must_use]
    pub fn analysis_fields(&self) -> &[AnalysisField] {
        &self.analysis_form_json.additional_fields
    }

    /// Flat paths of every question and group
    #[inline]
    #[must_use]
    pub fn flat_paths(&self) -> FlatPaths {
        FlatPaths::resolve(self.survey(), FlatPathOptions::with_groups())
    }

    /// Supplemental index built from the analysis fields
    #[inline]
    #[must_use]
    pub fn supplemental_index(&self) -> SupplementalIndex {
        SupplementalIndex::from_fields(self.analysis_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ASSET: &str = r#"{
        "content": {
            "survey": [
                {"type": "begin_group", "name": "g", "label": ["Group", "Groupe"]},
                {"type": "text", "name": "q", "label": ["Question", null]},
                {"type": "end_group"}
            ],
            "choices": [{"list_name": "yn", "name": "yes", "label": ["Yes", "Oui"]}],
            "translations": ["English", "French"]
        },
        "analysis_form_json": {
            "additional_fields": [
                {"type": "transcript", "source": "g/q", "dtpath": "g/q/transcript_en", "label": "q - transcript"}
            ]
        }
    }"#;

    #[test]
    fn asset_from_json() {
        let asset = Asset::from_json(ASSET).unwrap();
        assert_eq!(asset.survey().len(), 3);
        assert_eq!(asset.choices()[0].display_label(1), "Oui");
        assert_eq!(asset.content.translations.len(), 2);
        assert_eq!(asset.flat_paths().get("q"), Some("g/q"));
        assert_eq!(
            asset.supplemental_index().entries_for("g/q"),
            &[crate::analysis::SupplementalEntry {
                path: "_supplementalDetails/g/q/transcript_en".to_string(),
                label: Some("q - transcript".to_string()),
            }]
        );
    }

    #[test]
    fn asset_rejects_empty_survey() {
        let result = Asset::from_json(r#"{"content": {"survey": []}}"#);
        assert!(matches!(result, Err(SchemaError::EmptySurvey)));
    }

    #[test]
    fn asset_rejects_invalid_json() {
        let result = Asset::from_json(r#"{"content": "#);
        assert!(matches!(result, Err(SchemaError::InvalidJson(_))));
    }
}
