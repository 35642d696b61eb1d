//! Submission records
//!
//! A [`Submission`] is the flat answer map of one response, with the reserved
//! `_attachments` and `_supplementalDetails` keys lifted out into typed
//! fields.

use std::sync::Arc;

use serde_json::{Map, Value};
use survey_schema::SUPPLEMENTAL_DETAILS_KEY;

use crate::attachment::Attachment;
use crate::error::{json_type_name, SubmissionError};
use crate::supplemental::SupplementalDetails;

/// Reserved submission key holding the attachment list
pub const ATTACHMENTS_KEY: &str = "_attachments";

/// One submitted survey response
///
/// Cloning is cheap: answers and supplemental details sit behind [`Arc`] and
/// the attachment list is a persistent vector, so derived submissions share
/// every branch they do not change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Submission {
    /// Answers keyed by full path, reserved keys removed
    answers: Arc<Map<String, Value>>,

    /// Uploaded media
    attachments: im::Vector<Attachment>,

    /// NLP-derived content keyed by source question path
    supplemental: Arc<SupplementalDetails>,
}

impl Submission {
    /// Create from parts
    #[must_use]
    pub fn new(
        answers: Map<String, Value>,
        attachments: Vec<Attachment>,
        supplemental: SupplementalDetails,
    ) -> Self {
        Self {
            answers: Arc::new(answers),
            attachments: attachments.into_iter().collect(),
            supplemental: Arc::new(supplemental),
        }
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or reserved keys are malformed
    pub fn from_json(json: &str) -> Result<Self, SubmissionError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Create from a JSON value
    ///
    /// # Errors
    /// Returns error if the value is not an object or reserved keys are
    /// malformed
    pub fn from_value(value: Value) -> Result<Self, SubmissionError> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(SubmissionError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Answers keyed by full path
    #[inline]
    #[must_use]
    pub fn answers(&self) -> &Map<String, Value> {
        &self.answers
    }

    /// Answer stored under an exact key
    #[inline]
    #[must_use]
    pub fn answer(&self, key: &str) -> Option<&Value> {
        self.answers.get(key)
    }

    /// Uploaded media
    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &im::Vector<Attachment> {
        &self.attachments
    }

    /// Supplemental details
    #[inline]
    #[must_use]
    pub fn supplemental(&self) -> &SupplementalDetails {
        &self.supplemental
    }

    /// Copy with one attachment marked deleted
    ///
    /// The copy shares its answers, supplemental details and every other
    /// attachment with `self`. Returns an unchanged copy when no attachment
    /// has the given `uid`.
    #[must_use]
    pub fn with_attachment_deleted(&self, uid: &str) -> Self {
        let Some(position) = self.attachments.iter().position(|a| a.uid == uid) else {
            tracing::debug!(uid, "no attachment to mark deleted");
            return self.clone();
        };
        let updated = self.attachments[position].deleted();
        Self {
            answers: Arc::clone(&self.answers),
            attachments: self.attachments.update(position, updated),
            supplemental: Arc::clone(&self.supplemental),
        }
    }

    /// Reassemble the flat record, reserved keys included
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = (*self.answers).clone();
        map.insert(
            ATTACHMENTS_KEY.to_string(),
            Value::Array(
                self.attachments
                    .iter()
                    .filter_map(|a| serde_json::to_value(a).ok())
                    .collect(),
            ),
        );
        map.insert(
            SUPPLEMENTAL_DETAILS_KEY.to_string(),
            Value::Object(self.supplemental.as_map().clone()),
        );
        Value::Object(map)
    }
}

impl TryFrom<Map<String, Value>> for Submission {
    type Error = SubmissionError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let attachments: Vec<Attachment> = match map.remove(ATTACHMENTS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => {
                serde_json::from_value(value).map_err(SubmissionError::InvalidAttachments)?
            }
        };

        let supplemental = match map.remove(SUPPLEMENTAL_DETAILS_KEY) {
            None | Some(Value::Null) => SupplementalDetails::default(),
            Some(Value::Object(details)) => SupplementalDetails::new(details),
            Some(other) => {
                return Err(SubmissionError::InvalidSupplementalDetails(json_type_name(
                    &other,
                )))
            }
        };

        Ok(Self::new(map, attachments, supplemental))
    }
}
