//! Attachment records and matching
//!
//! Provides [`match_attachment`], which binds a media answer to the attachment
//! record produced by exactly one question instance.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::submission::Submission;

/// Audio subtypes players handle natively
pub const SUPPORTED_AUDIO_SUBTYPES: [&str; 4] = ["mp3", "mpeg", "wav", "ogg"];

/// Query parameter asking the server to transcode audio
pub const TRANSCODE_QUERY: &str = "format=mp3";

/// Mime type of transcoded audio
pub const TRANSCODED_MIMETYPE: &str = "audio/mp3";

/// Media file uploaded with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment identifier
    #[serde(default)]
    pub uid: String,

    /// Stored file name
    pub filename: String,

    /// Exact xpath of the question instance that produced the file
    #[serde(default)]
    pub question_xpath: String,

    /// Mime type
    #[serde(default)]
    pub mimetype: String,

    /// Original download URL
    #[serde(default)]
    pub download_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_large_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_medium_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_small_url: Option<String>,

    /// Whether the file was deleted after submission
    #[serde(default)]
    pub is_deleted: bool,
}

impl Attachment {
    /// Create a record with the fields matching needs
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        question_xpath: impl Into<String>,
        mimetype: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            uid: String::new(),
            filename: filename.into(),
            question_xpath: question_xpath.into(),
            mimetype: mimetype.into(),
            download_url: download_url.into(),
            download_large_url: None,
            download_medium_url: None,
            download_small_url: None,
            is_deleted: false,
        }
    }

    /// Set the identifier
    #[inline]
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Copy marked as deleted
    #[inline]
    #[must_use]
    pub fn deleted(&self) -> Self {
        Self {
            is_deleted: true,
            ..self.clone()
        }
    }

    /// Whether this is audio in an encoding players cannot handle
    #[must_use]
    pub fn needs_transcoding(&self) -> bool {
        self.mimetype.strip_prefix("audio/").is_some_and(|subtype| {
            let subtype = subtype.split(';').next().unwrap_or_default().trim();
            let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
            !SUPPORTED_AUDIO_SUBTYPES.contains(&subtype)
        })
    }

    /// Copy whose URLs request transcoded mp3 audio
    #[must_use]
    pub fn transcoded(&self) -> Self {
        Self {
            mimetype: TRANSCODED_MIMETYPE.to_string(),
            download_url: with_transcode_query(&self.download_url),
            download_large_url: self.download_large_url.as_deref().map(with_transcode_query),
            download_medium_url: self.download_medium_url.as_deref().map(with_transcode_query),
            download_small_url: self.download_small_url.as_deref().map(with_transcode_query),
            ..self.clone()
        }
    }
}

fn with_transcode_query(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{TRANSCODE_QUERY}")
}

/// Result of an attachment lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentLookup<'a> {
    /// Record of the requested question instance
    ///
    /// Borrowed from the submission, or an owned derived copy when the
    /// audio had to be transcoded.
    Found(Cow<'a, Attachment>),

    /// No record for the requested question instance
    NotFound { filename: String },
}

impl AttachmentLookup<'_> {
    /// Found record, if any
    #[inline]
    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Found(attachment) => Some(attachment),
            Self::NotFound { .. } => None,
        }
    }

    /// Whether a record was found
    #[inline]
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Whether the found record was deleted
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.attachment().is_some_and(|a| a.is_deleted)
    }
}

impl Display for AttachmentLookup<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(attachment) => f.write_str(&attachment.download_url),
            Self::NotFound { filename } => write!(f, "Could not find {filename}"),
        }
    }
}

/// Find the attachment produced by one question instance
///
/// Records are matched on exact `question_xpath` equality only, never on the
/// filename. The first match wins. Audio outside
/// [`SUPPORTED_AUDIO_SUBTYPES`] comes back as a transcoded copy.
#[must_use]
pub fn match_attachment<'a>(
    submission: &'a Submission,
    filename: &str,
    question_xpath: &str,
) -> AttachmentLookup<'a> {
    match submission
        .attachments()
        .iter()
        .find(|attachment| attachment.question_xpath == question_xpath)
    {
        Some(attachment) if attachment.needs_transcoding() => {
            AttachmentLookup::Found(Cow::Owned(attachment.transcoded()))
        }
        Some(attachment) => AttachmentLookup::Found(Cow::Borrowed(attachment)),
        None => {
            tracing::debug!(filename, question_xpath, "no attachment for question instance");
            AttachmentLookup::NotFound {
                filename: filename.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission_with(attachments: serde_json::Value) -> Submission {
        Submission::from_value(json!({ "_attachments": attachments })).unwrap()
    }

    #[test]
    fn matches_exact_xpath_not_filename() {
        let submission = submission_with(json!([
            {"filename": "a/photo.jpg", "question_xpath": "rep[1]/photo", "mimetype": "image/jpeg", "download_url": "https://x/1"},
            {"filename": "a/photo.jpg", "question_xpath": "rep[2]/photo", "mimetype": "image/jpeg", "download_url": "https://x/2"}
        ]));

        let lookup = match_attachment(&submission, "photo.jpg", "rep[2]/photo");
        assert_eq!(lookup.attachment().unwrap().download_url, "https://x/2");
        assert!(matches!(lookup, AttachmentLookup::Found(Cow::Borrowed(_))));

        let missing = match_attachment(&submission, "photo.jpg", "rep/photo");
        assert_eq!(
            missing,
            AttachmentLookup::NotFound {
                filename: "photo.jpg".into()
            }
        );
        assert_eq!(missing.to_string(), "Could not find photo.jpg");
    }

    #[test]
    fn first_match_wins() {
        let submission = submission_with(json!([
            {"filename": "first.jpg", "question_xpath": "q", "download_url": "https://x/first"},
            {"filename": "second.jpg", "question_xpath": "q", "download_url": "https://x/second"}
        ]));
        let lookup = match_attachment(&submission, "second.jpg", "q");
        assert_eq!(lookup.attachment().unwrap().filename, "first.jpg");
    }

    #[test]
    fn unsupported_audio_is_transcoded_copy() {
        let submission = submission_with(json!([{
            "filename": "rec.m4a",
            "question_xpath": "voice",
            "mimetype": "audio/x-m4a",
            "download_url": "https://x/rec",
            "download_small_url": "https://x/rec?size=s"
        }]));

        let lookup = match_attachment(&submission, "rec.m4a", "voice");
        let found = lookup.attachment().unwrap();
        assert_eq!(found.mimetype, "audio/mp3");
        assert_eq!(found.download_url, "https://x/rec?format=mp3");
        assert_eq!(
            found.download_small_url.as_deref(),
            Some("https://x/rec?size=s&format=mp3")
        );
        assert!(matches!(lookup, AttachmentLookup::Found(Cow::Owned(_))));

        // original untouched
        assert_eq!(submission.attachments()[0].mimetype, "audio/x-m4a");
        assert_eq!(submission.attachments()[0].download_url, "https://x/rec");
    }

    #[test]
    fn supported_audio_is_untouched() {
        for mimetype in ["audio/mp3", "audio/mpeg", "audio/x-wav", "audio/ogg"] {
            let attachment = Attachment::new("f", "q", mimetype, "https://x/f");
            assert!(!attachment.needs_transcoding(), "{mimetype}");
        }
        assert!(!Attachment::new("f", "q", "image/png", "u").needs_transcoding());
        assert!(Attachment::new("f", "q", "audio/amr", "u").needs_transcoding());
    }

    #[test]
    fn subtypes_compared_exactly() {
        assert!(Attachment::new("f", "q", "audio/x-mpegurl", "u").needs_transcoding());
        assert!(Attachment::new("f", "q", "audio/webm", "u").needs_transcoding());
        assert!(!Attachment::new("f", "q", "audio/ogg; codecs=opus", "u").needs_transcoding());
    }
}
