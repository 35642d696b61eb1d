//! Repeat answer extraction
//!
//! Collects every answer to one question across all (possibly nested) repeat
//! instances of a submission.

use serde::Serialize;
use serde_json::{Map, Value};
use survey_schema::{XpathContext, XpathSegment};

use crate::attachment::match_attachment;
use crate::submission::Submission;

/// One extracted answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayValue {
    /// Stored answer
    Answer { value: Value },
    /// Media answer whose attachment was deleted
    DeletedAttachment { filename: String },
}

impl DisplayValue {
    /// Stored answer, if any
    #[inline]
    #[must_use]
    pub fn answer(&self) -> Option<&Value> {
        match self {
            Self::Answer { value } => Some(value),
            Self::DeletedAttachment { .. } => None,
        }
    }

    /// Raw stored value, the filename for deleted attachments
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Answer { value } => value,
            Self::DeletedAttachment { filename } => Value::String(filename),
        }
    }
}

/// Every answer to `full_path` in the submission
///
/// Never fails; an empty result means nothing was found. See
/// [`RepeatAnswerExtractor::extract`].
#[inline]
#[must_use]
pub fn extract_repeat_answers(submission: &Submission, full_path: &str) -> Vec<DisplayValue> {
    RepeatAnswerExtractor::new(submission).extract(full_path)
}

/// Walks nested repeat data one path segment at a time
#[derive(Debug, Clone, Copy)]
pub struct RepeatAnswerExtractor<'s> {
    submission: &'s Submission,
}

impl<'s> RepeatAnswerExtractor<'s> {
    /// Create for a submission
    #[inline]
    #[must_use]
    pub fn new(submission: &'s Submission) -> Self {
        Self { submission }
    }

    /// Every answer to `full_path`, starting at the submission root
    ///
    /// - an intermediate segment holding a sequence fans out over every
    ///   repeat instance, in order
    /// - an intermediate segment holding anything else is a flattened group;
    ///   the walk continues against the same mapping
    /// - at the final segment a direct value is emitted, unless it names an
    ///   attachment of this exact instance that was deleted
    /// - a sequence at the final segment is a key collision left by schema
    ///   changes, and yields nothing
    ///
    /// Instances with no answer are omitted rather than represented by
    /// placeholders.
    #[must_use]
    pub fn extract(&self, full_path: &str) -> Vec<DisplayValue> {
        self.extract_in(self.submission.answers(), &XpathContext::root(), full_path)
    }

    /// Every answer to `full_path` inside `scope`
    ///
    /// `base` is the xpath context `scope` lives in (e.g. the repeat
    /// instance it was taken from); its segments replace the leading path
    /// segments when instance xpaths are built for attachment checks.
    #[must_use]
    pub fn extract_in(
        &self,
        scope: &Map<String, Value>,
        base: &XpathContext,
        full_path: &str,
    ) -> Vec<DisplayValue> {
        let segments: Vec<&str> = full_path.split('/').collect();
        let mut answers = Vec::new();
        self.walk(scope, &segments, 0, base, &XpathContext::root(), &mut answers);
        answers
    }

    fn walk(
        &self,
        data: &Map<String, Value>,
        segments: &[&str],
        level: usize,
        base: &XpathContext,
        instance: &XpathContext,
        answers: &mut Vec<DisplayValue>,
    ) {
        let level_key = segments[..=level].join("/");
        let segment = segments[level];

        if level + 1 == segments.len() {
            match data.get(&level_key) {
                None | Some(Value::Null | Value::Array(_)) => {}
                Some(value) => answers.push(self.display_value(value, &instance.leaf(segment))),
            }
            return;
        }

        let inherited = base.segments().get(level).cloned();
        match data.get(&level_key) {
            Some(Value::Array(items)) => {
                for (position, item) in items.iter().enumerate() {
                    let Value::Object(item) = item else {
                        continue;
                    };
                    let segment = inherited
                        .clone()
                        .unwrap_or_else(|| XpathSegment::instance(segment, position));
                    let instance = instance.child(segment);
                    self.walk(item, segments, level + 1, base, &instance, answers);
                }
            }
            _ => {
                let segment = inherited.unwrap_or_else(|| XpathSegment::group(segment));
                let instance = instance.child(segment);
                self.walk(data, segments, level + 1, base, &instance, answers);
            }
        }
    }

    fn display_value(&self, value: &Value, xpath: &str) -> DisplayValue {
        if let Value::String(filename) = value {
            if match_attachment(self.submission, filename, xpath).is_deleted() {
                return DisplayValue::DeletedAttachment {
                    filename: filename.clone(),
                };
            }
        }
        DisplayValue::Answer {
            value: value.clone(),
        }
    }
}
