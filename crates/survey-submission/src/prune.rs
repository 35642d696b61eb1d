//! Empty-content pruning
//!
//! Deep-cleans supplemental details so callers can ask whether a submission
//! has any usable NLP content at all.

use serde_json::{Map, Value};

use crate::submission::Submission;
use crate::supplemental::SupplementalDetails;

const QUAL_KEY: &str = "qual";

/// Copy of `details` without empty or deleted content
///
/// Qualitative responses whose `val` is `null`, `""` or `[]`, or which are
/// flagged deleted, are dropped first. Then every mapping or sequence left
/// empty is removed, bottom-up. The input is not modified.
#[must_use]
pub fn prune_supplemental(details: &SupplementalDetails) -> SupplementalDetails {
    let pruned = details
        .as_map()
        .iter()
        .filter_map(|(source, question)| {
            prune_empty(&without_empty_qual(question)).map(|q| (source.clone(), q))
        })
        .collect();
    SupplementalDetails::new(pruned)
}

/// Whether the submission has any supplemental content left after pruning
#[inline]
#[must_use]
pub fn has_supplemental_content(submission: &Submission) -> bool {
    !prune_supplemental(submission.supplemental()).is_empty()
}

fn without_empty_qual(question: &Value) -> Value {
    let Value::Object(fields) = question else {
        return question.clone();
    };
    let fields: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| match (key.as_str(), value) {
            (QUAL_KEY, Value::Array(responses)) => (
                key.clone(),
                Value::Array(responses.iter().filter(|r| !is_empty_response(r)).cloned().collect()),
            ),
            _ => (key.clone(), value.clone()),
        })
        .collect();
    Value::Object(fields)
}

fn is_empty_response(response: &Value) -> bool {
    let deleted = ["deleted", "_deleted"]
        .iter()
        .any(|flag| response.get(flag).and_then(Value::as_bool) == Some(true));
    let empty = match response.get("val") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(_) => false,
    };
    deleted || empty
}

/// Drop empty mappings and sequences, bottom-up
fn prune_empty(value: &Value) -> Option<Value> {
    match value {
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .iter()
                .filter_map(|(key, child)| prune_empty(child).map(|c| (key.clone(), c)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(prune_empty).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        scalar => Some(scalar.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn details(value: Value) -> SupplementalDetails {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_qual_branch_removed_populated_field_untouched() {
        let input = details(json!({
            "q_empty": {"qual": []},
            "q_full": {"transcript": {"value": "hi", "languageCode": "en"}}
        }));

        let pruned = prune_supplemental(&input);

        assert_eq!(
            serde_json::to_value(&pruned).unwrap(),
            json!({"q_full": {"transcript": {"value": "hi", "languageCode": "en"}}})
        );
        // input untouched
        assert!(input.question("q_empty").is_some());
    }

    #[test]
    fn empty_and_deleted_responses_removed() {
        let input = details(json!({
            "q": {"qual": [
                {"uuid": "a", "type": "qual_text", "val": ""},
                {"uuid": "b", "type": "qual_tags", "val": []},
                {"uuid": "c", "type": "qual_integer", "val": null},
                {"uuid": "d", "type": "qual_text", "val": "kept"},
                {"uuid": "e", "type": "qual_text", "val": "gone", "deleted": true}
            ]}
        }));

        let pruned = prune_supplemental(&input);
        assert_eq!(
            serde_json::to_value(&pruned).unwrap(),
            json!({"q": {"qual": [{"uuid": "d", "type": "qual_text", "val": "kept"}]}})
        );
    }

    #[test]
    fn nested_empty_mappings_collapse() {
        let input = details(json!({
            "q": {"translation": {"fr": {}}, "qual": [{"uuid": "x", "type": "qual_text", "val": ""}]}
        }));
        assert!(prune_supplemental(&input).is_empty());
    }

    #[test]
    fn cleared_choice_response_removed() {
        let submission = Submission::from_value(json!({
            "_supplementalDetails": {"q": {"qual": [
                {"uuid": "s", "type": "qual_select_one", "val": {}}
            ]}}
        }))
        .unwrap();
        assert!(prune_supplemental(submission.supplemental()).is_empty());
        assert!(!has_supplemental_content(&submission));
    }

    #[test]
    fn scalars_are_kept() {
        let input = details(json!({"q": {"transcript": {"value": "", "languageCode": "en"}}}));
        assert!(!prune_supplemental(&input).is_empty());
    }

    #[test]
    fn has_content_gate() {
        let empty = Submission::from_value(json!({"_supplementalDetails": {"q": {"qual": []}}})).unwrap();
        assert!(!has_supplemental_content(&empty));

        let full = Submission::from_value(json!({
            "_supplementalDetails": {"q": {"translation": {"en": {"value": "x"}}}}
        }))
        .unwrap();
        assert!(has_supplemental_content(&full));
    }
}
