//! Error types for schema loading

use crate::analysis::SupplementalPathError;
use crate::xpath::XpathError;

/// Schema loading error
///
/// Only the parsing boundary can fail; resolving paths and classifying rows
/// over a loaded schema never does.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Asset JSON could not be parsed
    #[error("invalid asset JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Survey has no rows
    #[error("survey has no rows")]
    EmptySurvey,

    /// Malformed xpath
    #[error("xpath error: {0}")]
    Xpath(#[from] XpathError),

    /// Malformed supplemental path
    #[error("supplemental path error: {0}")]
    SupplementalPath(#[from] SupplementalPathError),
}
