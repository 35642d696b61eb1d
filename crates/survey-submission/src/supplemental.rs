//! Supplemental details
//!
//! NLP-derived content (transcripts, translations, qualitative coding) is
//! stored per source question under `_supplementalDetails`. This module reads
//! that record through typed views and resolves [`SupplementalPath`]s into
//! display text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use survey_schema::{AnalysisFieldKind, SupplementalPath, SupplementalTarget};

use crate::submission::Submission;

/// Key of a choice label in the default language
pub const DEFAULT_LABEL_KEY: &str = "_default";

/// Separator joining tags and multiple choices
const LIST_SEPARATOR: &str = ", ";

/// Supplemental details keyed by source question path
///
/// Kept as raw JSON so that cleaning can walk it generically; typed views are
/// deserialized on demand without copying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplementalDetails(Map<String, Value>);

impl SupplementalDetails {
    /// Create from the raw record
    #[inline]
    #[must_use]
    pub fn new(details: Map<String, Value>) -> Self {
        Self(details)
    }

    /// Raw record
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether there are no entries at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw entry of a source question
    #[inline]
    #[must_use]
    pub fn question(&self, source: &str) -> Option<&Value> {
        self.0.get(source)
    }

    /// Stored transcript of a source question
    #[must_use]
    pub fn transcript(&self, source: &str) -> Option<Transcript> {
        view(self.question(source)?.get("transcript")?)
    }

    /// Stored translation of a source question into `language`
    #[must_use]
    pub fn translation(&self, source: &str, language: &str) -> Option<Translation> {
        view(self.question(source)?.get("translation")?.get(language)?)
    }

    /// Qualitative responses of a source question
    ///
    /// Entries that do not look like a response are skipped.
    #[must_use]
    pub fn qual_responses(&self, source: &str) -> Vec<QualResponse> {
        self.question(source)
            .and_then(|question| question.get("qual"))
            .and_then(Value::as_array)
            .map(|responses| responses.iter().filter_map(view).collect())
            .unwrap_or_default()
    }
}

fn view<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

/// The single stored transcript of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcript text
    pub value: String,

    /// Language the transcript was made in
    #[serde(rename = "languageCode")]
    pub language_code: String,
}

/// One stored translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text
    pub value: String,
}

/// One qualitative analysis response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualResponse {
    /// Qualitative question uuid
    pub uuid: String,

    /// Response kind
    #[serde(rename = "type")]
    pub kind: AnalysisFieldKind,

    /// Raw response value
    #[serde(default)]
    pub val: Value,

    /// Question labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Map<String, Value>>,

    /// Whether the response was deleted
    #[serde(default, alias = "_deleted")]
    pub deleted: bool,
}

impl QualResponse {
    /// Response rendered as display text
    ///
    /// Returns `None` when the value is empty or does not fit the kind.
    #[must_use]
    pub fn display_text(&self) -> Option<String> {
        let text = match (self.kind, &self.val) {
            (AnalysisFieldKind::QualTags, Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            (AnalysisFieldKind::QualInteger | AnalysisFieldKind::QualAutoKeywordCount, Value::Number(n)) => {
                n.to_string()
            }
            (AnalysisFieldKind::QualSelectOne, choice @ Value::Object(_)) => {
                choice_label(choice)?.to_string()
            }
            (AnalysisFieldKind::QualSelectMultiple, Value::Array(choices)) => choices
                .iter()
                .filter_map(choice_label)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            (_, Value::String(text)) => text.clone(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Default-language label of a choice value `{uuid, labels: {_default}}`
fn choice_label(choice: &Value) -> Option<&str> {
    choice.get("labels")?.get(DEFAULT_LABEL_KEY)?.as_str()
}

/// Resolve the content a synthetic supplemental path addresses
///
/// `None` means "intentionally empty": the path did not parse, or nothing is
/// stored there.
///
/// - transcript: returned only when its language matches the requested one
/// - translation: the `value` stored under the requested language
/// - qual: the response with the requested uuid, shaped by its kind
#[must_use]
pub fn resolve_supplemental_content(submission: &Submission, synthetic_path: &str) -> Option<String> {
    let path: SupplementalPath = synthetic_path.parse().ok()?;
    resolve_path(submission.supplemental(), &path)
}

/// Resolve an already parsed path against supplemental details
#[must_use]
pub fn resolve_path(details: &SupplementalDetails, path: &SupplementalPath) -> Option<String> {
    let source = path.source();
    match path.target() {
        SupplementalTarget::Transcript { language } => details
            .transcript(source)
            .filter(|transcript| transcript.language_code == *language)
            .map(|transcript| transcript.value),
        SupplementalTarget::Translation { language } => details
            .translation(source, language)
            .map(|translation| translation.value),
        SupplementalTarget::Qual { uuid } => details
            .qual_responses(source)
            .into_iter()
            .find(|response| response.uuid == *uuid && !response.deleted)
            .and_then(|response| response.display_text()),
    }
}
