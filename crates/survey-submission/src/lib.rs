//! Survey Submission
//!
//! Typed access to one submitted survey response: answers, attachments and
//! NLP-derived supplemental details.
//!
//! # Core Concepts
//!
//! - [`Submission`]: flat answer map with reserved keys lifted out, cheap to clone
//! - [`match_attachment`]: binds a media answer to its exact question instance
//! - [`RepeatAnswerExtractor`]: every answer to one question across nested repeats
//! - [`resolve_supplemental_content`]: text behind a synthetic supplemental path
//! - [`prune_supplemental`]: supplemental details without empty or deleted content
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use survey_submission::{extract_repeat_answers, Submission};
//!
//! let submission = Submission::from_value(json!({
//!     "household": [
//!         {"household/member": "Ana"},
//!         {"household/member": "Ben"}
//!     ]
//! }))
//! .unwrap();
//!
//! let names: Vec<_> = extract_repeat_answers(&submission, "household/member")
//!     .into_iter()
//!     .map(|value| value.into_value())
//!     .collect();
//! assert_eq!(names, vec![json!("Ana"), json!("Ben")]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod attachment;
mod error;
mod prune;
mod repeat;
mod submission;
mod supplemental;

// Re-exports
pub use attachment::{
    match_attachment, Attachment, AttachmentLookup, SUPPORTED_AUDIO_SUBTYPES, TRANSCODED_MIMETYPE,
    TRANSCODE_QUERY,
};
pub use error::SubmissionError;
pub use prune::{has_supplemental_content, prune_supplemental};
pub use repeat::{extract_repeat_answers, DisplayValue, RepeatAnswerExtractor};
pub use submission::{Submission, ATTACHMENTS_KEY};
pub use supplemental::{
    resolve_path, resolve_supplemental_content, QualResponse, SupplementalDetails, Transcript,
    Translation, DEFAULT_LABEL_KEY,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn deleting_an_attachment_changes_extracted_marker() {
        let original = Submission::from_value(json!({
            "rep": [{"rep/clip": "a.ogg"}],
            "_attachments": [{"uid": "u1", "filename": "a.ogg", "question_xpath": "rep[1]/clip"}]
        }))
        .unwrap();
        let updated = original.with_attachment_deleted("u1");

        assert!(matches!(
            extract_repeat_answers(&original, "rep/clip")[0],
            DisplayValue::Answer { .. }
        ));
        assert!(matches!(
            extract_repeat_answers(&updated, "rep/clip")[0],
            DisplayValue::DeletedAttachment { .. }
        ));
    }

    proptest! {
        #[test]
        fn extraction_preserves_instance_order(
            instances in prop::collection::vec(prop::option::of(0i64..1000), 0..20)
        ) {
            let repeat: Vec<Value> = instances
                .iter()
                .map(|answer| match answer {
                    Some(n) => json!({"rep/q": n}),
                    None => json!({}),
                })
                .collect();
            let submission = Submission::from_value(json!({ "rep": repeat })).unwrap();

            let extracted: Vec<Value> = extract_repeat_answers(&submission, "rep/q")
                .into_iter()
                .map(DisplayValue::into_value)
                .collect();
            let expected: Vec<Value> = instances.iter().flatten().map(|n| json!(n)).collect();
            prop_assert_eq!(extracted, expected);
        }
    }
}
