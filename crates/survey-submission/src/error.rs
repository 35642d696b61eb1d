//! Error types for submission loading

/// Submission loading error
///
/// Raised only while parsing a record. Lookups over a loaded submission
/// report misses as values, never as errors.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// Submission JSON could not be parsed
    #[error("invalid submission JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level value is not an object
    #[error("submission must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// `_attachments` is malformed
    #[error("invalid _attachments: {0}")]
    InvalidAttachments(serde_json::Error),

    /// `_supplementalDetails` is not an object
    #[error("_supplementalDetails must be a JSON object, got {0}")]
    InvalidSupplementalDetails(&'static str),
}

/// JSON type name, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
