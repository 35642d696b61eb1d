//! Analysis fields and supplemental addressing
//!
//! An asset's analysis configuration declares transcript, translation and
//! qualitative-coding fields attached to source questions. This module turns
//! that declaration into a [`SupplementalIndex`] and parses the synthetic
//! [`SupplementalPath`]s that address supplemental content.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved submission key holding supplemental details
pub const SUPPLEMENTAL_DETAILS_KEY: &str = "_supplementalDetails";

const TRANSCRIPT_PREFIX: &str = "transcript_";
const TRANSLATION_PREFIX: &str = "translation_";

/// Kind of a declared analysis field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFieldKind {
    Transcript,
    Translation,
    QualText,
    QualInteger,
    QualTags,
    QualSelectOne,
    QualSelectMultiple,
    /// Annotation only, never carries a response
    QualNote,
    QualAutoKeywordCount,
    #[serde(other)]
    Other,
}

impl AnalysisFieldKind {
    /// Whether fields of this kind can hold content
    #[inline]
    #[must_use]
    pub fn carries_content(self) -> bool {
        !matches!(self, Self::QualNote)
    }
}

/// One declared analysis field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisField {
    /// Field kind
    #[serde(rename = "type")]
    pub kind: AnalysisFieldKind,

    /// Flat path of the source question
    pub source: String,

    /// Path below `_supplementalDetails`, e.g. `q1/translation_fr`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtpath: Option<String>,

    /// Column label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Language of a transcript or translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Qualitative question uuid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl AnalysisField {
    /// Synthetic path addressing this field's content
    ///
    /// Uses the declared `dtpath` when present; otherwise derives it from the
    /// kind and language/uuid.
    #[must_use]
    pub fn supplemental_path(&self) -> Option<String> {
        let below = match (&self.dtpath, self.kind) {
            (Some(dtpath), _) => dtpath.clone(),
            (None, AnalysisFieldKind::Transcript) => {
                format!("{}/{TRANSCRIPT_PREFIX}{}", self.source, self.language.as_deref()?)
            }
            (None, AnalysisFieldKind::Translation) => {
                format!("{}/{TRANSLATION_PREFIX}{}", self.source, self.language.as_deref()?)
            }
            (None, _) => format!("{}/{}", self.source, self.uuid.as_deref()?),
        };
        Some(format!("{SUPPLEMENTAL_DETAILS_KEY}/{below}"))
    }
}

/// One supplemental column attributed to a source question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalEntry {
    /// Synthetic path (`_supplementalDetails/...`)
    pub path: String,

    /// Column label, if declared
    pub label: Option<String>,
}

/// Source question flat path → supplemental entries, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplementalIndex {
    entries: IndexMap<String, Vec<SupplementalEntry>>,
}

impl SupplementalIndex {
    /// Empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the declared analysis fields
    ///
    /// Note fields are excluded; a field whose path cannot be derived is
    /// skipped.
    #[must_use]
    pub fn from_fields(fields: &[AnalysisField]) -> Self {
        let mut entries: IndexMap<String, Vec<SupplementalEntry>> = IndexMap::new();
        for field in fields.iter().filter(|f| f.kind.carries_content()) {
            let Some(path) = field.supplemental_path() else {
                continue;
            };
            entries
                .entry(field.source.clone())
                .or_default()
                .push(SupplementalEntry {
                    path,
                    label: field.label.clone(),
                });
        }
        Self { entries }
    }

    /// Entries for a source question
    #[inline]
    #[must_use]
    pub fn entries_for(&self, flat_path: &str) -> &[SupplementalEntry] {
        self.entries.get(flat_path).map_or(&[], Vec::as_slice)
    }

    /// Number of source questions with entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no question has entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a supplemental path points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SupplementalTarget {
    /// Transcript in a language
    Transcript { language: String },
    /// Translation into a language
    Translation { language: String },
    /// Qualitative analysis response
    Qual { uuid: String },
}

/// Parsed synthetic supplemental path
///
/// Grammar: `_supplementalDetails/{source question path}/{leaf}` where `leaf`
/// is `transcript_{lang}`, `translation_{lang}` or a qualitative question
/// uuid. The source path may span several segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupplementalPath {
    source: String,
    target: SupplementalTarget,
}

impl SupplementalPath {
    /// Create from parts
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, target: SupplementalTarget) -> Self {
        Self {
            source: source.into(),
            target,
        }
    }

    /// Flat path of the source question
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Addressed content
    #[inline]
    #[must_use]
    pub fn target(&self) -> &SupplementalTarget {
        &self.target
    }
}

impl Display for SupplementalPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{SUPPLEMENTAL_DETAILS_KEY}/{}/", self.source)?;
        match &self.target {
            SupplementalTarget::Transcript { language } => write!(f, "{TRANSCRIPT_PREFIX}{language}"),
            SupplementalTarget::Translation { language } => {
                write!(f, "{TRANSLATION_PREFIX}{language}")
            }
            SupplementalTarget::Qual { uuid } => f.write_str(uuid),
        }
    }
}

impl FromStr for SupplementalPath {
    type Err = SupplementalPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(SUPPLEMENTAL_DETAILS_KEY)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or(SupplementalPathError::MissingPrefix)?;
        let (source, leaf) = rest
            .rsplit_once('/')
            .ok_or(SupplementalPathError::MissingSource)?;
        if source.is_empty() || source.split('/').any(str::is_empty) {
            return Err(SupplementalPathError::MissingSource);
        }
        if leaf.is_empty() {
            return Err(SupplementalPathError::EmptyLeaf);
        }

        let target = if let Some(language) = leaf.strip_prefix(TRANSCRIPT_PREFIX) {
            SupplementalTarget::Transcript {
                language: non_empty(language)?,
            }
        } else if let Some(language) = leaf.strip_prefix(TRANSLATION_PREFIX) {
            SupplementalTarget::Translation {
                language: non_empty(language)?,
            }
        } else {
            SupplementalTarget::Qual {
                uuid: leaf.to_string(),
            }
        };

        Ok(Self::new(source, target))
    }
}

fn non_empty(language: &str) -> Result<String, SupplementalPathError> {
    if language.is_empty() {
        Err(SupplementalPathError::EmptyLeaf)
    } else {
        Ok(language.to_string())
    }
}

/// Errors related to supplemental paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupplementalPathError {
    /// Path does not start with `_supplementalDetails/`
    #[error("supplemental path must start with _supplementalDetails/")]
    MissingPrefix,

    /// No source question path before the leaf
    #[error("supplemental path has no source question")]
    MissingSource,

    /// Leaf segment (or its language) is empty
    #[error("supplemental path has an empty leaf")]
    EmptyLeaf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(kind: &str, source: &str, dtpath: &str) -> AnalysisField {
        serde_json::from_value(json!({
            "type": kind,
            "source": source,
            "dtpath": dtpath,
            "label": format!("{source} {kind}"),
        }))
        .unwrap()
    }

    #[test]
    fn index_groups_by_source_in_order() {
        let fields = vec![
            field("transcript", "grp/sounds", "grp/sounds/transcript_en"),
            field("qual_note", "grp/sounds", "grp/sounds/note-uuid"),
            field("translation", "grp/sounds", "grp/sounds/translation_fr"),
            field("qual_text", "other", "other/abc-123"),
        ];
        let index = SupplementalIndex::from_fields(&fields);

        let paths: Vec<_> = index
            .entries_for("grp/sounds")
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "_supplementalDetails/grp/sounds/transcript_en",
                "_supplementalDetails/grp/sounds/translation_fr",
            ]
        );
        assert_eq!(index.entries_for("other").len(), 1);
        assert!(index.entries_for("missing").is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn unknown_kind_loads_as_other() {
        let parsed: AnalysisField =
            serde_json::from_value(json!({"type": "qual_hologram", "source": "q"})).unwrap();
        assert_eq!(parsed.kind, AnalysisFieldKind::Other);
    }

    #[test]
    fn path_derived_without_dtpath() {
        let parsed: AnalysisField = serde_json::from_value(json!({
            "type": "translation",
            "source": "q",
            "language": "es"
        }))
        .unwrap();
        assert_eq!(
            parsed.supplemental_path().as_deref(),
            Some("_supplementalDetails/q/translation_es")
        );

        let no_uuid: AnalysisField =
            serde_json::from_value(json!({"type": "qual_text", "source": "q"})).unwrap();
        assert_eq!(no_uuid.supplemental_path(), None);
    }

    #[test]
    fn parse_nested_translation_path() {
        let path: SupplementalPath = "_supplementalDetails/level_a/level_b/level_c/sounds/translation_fr"
            .parse()
            .unwrap();
        assert_eq!(path.source(), "level_a/level_b/level_c/sounds");
        assert_eq!(
            path.target(),
            &SupplementalTarget::Translation {
                language: "fr".into()
            }
        );
        assert_eq!(
            path.to_string(),
            "_supplementalDetails/level_a/level_b/level_c/sounds/translation_fr"
        );
    }

    #[test]
    fn parse_transcript_and_qual() {
        let transcript: SupplementalPath = "_supplementalDetails/q/transcript_en".parse().unwrap();
        assert_eq!(
            transcript.target(),
            &SupplementalTarget::Transcript {
                language: "en".into()
            }
        );

        let qual: SupplementalPath = "_supplementalDetails/q/1a2b-3c".parse().unwrap();
        assert_eq!(
            qual.target(),
            &SupplementalTarget::Qual {
                uuid: "1a2b-3c".into()
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "q/transcript_en".parse::<SupplementalPath>(),
            Err(SupplementalPathError::MissingPrefix)
        );
        assert_eq!(
            "_supplementalDetails/transcript_en".parse::<SupplementalPath>(),
            Err(SupplementalPathError::MissingSource)
        );
        assert_eq!(
            "_supplementalDetails/q/translation_".parse::<SupplementalPath>(),
            Err(SupplementalPathError::EmptyLeaf)
        );
        assert_eq!(
            "_supplementalDetails/q/".parse::<SupplementalPath>(),
            Err(SupplementalPathError::EmptyLeaf)
        );
    }
}
