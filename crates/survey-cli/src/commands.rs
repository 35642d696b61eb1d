//! Subcommand implementations
//!
//! Each command takes already-read file contents and returns the text to
//! print, so that file handling stays in `main`.

use anyhow::{Context, Result};
use survey_display::{DisplayConfig, DisplayTreeBuilder};
use survey_schema::Asset;
use survey_submission::{
    extract_repeat_answers, has_supplemental_content, resolve_supplemental_content, Submission,
};

/// Parse a TOML display configuration
pub(crate) fn parse_config(toml_text: &str) -> Result<DisplayConfig> {
    toml::from_str(toml_text).context("invalid display configuration")
}

/// Display tree of a submission, as JSON
pub(crate) fn render(
    asset_json: &str,
    submission_json: &str,
    config: DisplayConfig,
    compact: bool,
) -> Result<String> {
    let asset = Asset::from_json(asset_json).context("invalid asset")?;
    let submission = Submission::from_json(submission_json).context("invalid submission")?;

    let tree = DisplayTreeBuilder::for_asset(&asset)
        .with_config(config)
        .build(&submission);
    tracing::info!(
        nodes = tree.children.len(),
        translation = config.translation_index,
        "display tree built"
    );
    to_json(&tree, compact)
}

/// `true`/`false` for usable supplemental content, or the content at `path`
pub(crate) fn supplemental(submission_json: &str, path: Option<&str>) -> Result<String> {
    let submission = Submission::from_json(submission_json).context("invalid submission")?;
    Ok(match path {
        Some(path) => resolve_supplemental_content(&submission, path).unwrap_or_default(),
        None => has_supplemental_content(&submission).to_string(),
    })
}

/// Every answer to `path` across repeat instances, as JSON
pub(crate) fn repeat_answers(submission_json: &str, path: &str, compact: bool) -> Result<String> {
    let submission = Submission::from_json(submission_json).context("invalid submission")?;
    let answers = extract_repeat_answers(&submission, path);
    tracing::debug!(path, answers = answers.len(), "repeat answers extracted");
    to_json(&answers, compact)
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    text.context("failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn pointer(json: &str, pointer: &str) -> Option<Value> {
        serde_json::from_str::<Value>(json).ok()?.pointer(pointer).cloned()
    }

    const ASSET: &str = r#"{
        "content": {
            "survey": [
                {"type": "begin_group", "name": "grp", "label": ["Group", "Groupe"]},
                {"type": "text", "name": "q", "label": ["Question", "Question FR"]},
                {"type": "end_group"}
            ],
            "choices": []
        }
    }"#;

    const SUBMISSION: &str = r#"{
        "grp/q": "hello",
        "_supplementalDetails": {"grp/q": {"qual": []}}
    }"#;

    #[test]
    fn render_uses_translation() {
        let config = DisplayConfig::new().with_translation_index(1);
        let out = render(ASSET, SUBMISSION, config, true).unwrap();
        assert_eq!(pointer(&out, "/children/0/label"), Some(json!("Groupe")));
        assert_eq!(pointer(&out, "/children/0/children/0/data"), Some(json!("hello")));
    }

    #[test]
    fn render_rejects_bad_input() {
        assert!(render("{", SUBMISSION, DisplayConfig::new(), true).is_err());
        assert!(render(ASSET, "[]", DisplayConfig::new(), true).is_err());
    }

    #[test]
    fn supplemental_gate_and_lookup() {
        assert_eq!(supplemental(SUBMISSION, None).unwrap(), "false");

        let with_translation = r#"{"_supplementalDetails": {"q": {"translation": {"fr": {"value": "salut"}}}}}"#;
        assert_eq!(supplemental(with_translation, None).unwrap(), "true");
        assert_eq!(
            supplemental(with_translation, Some("_supplementalDetails/q/translation_fr")).unwrap(),
            "salut"
        );
    }

    #[test]
    fn repeat_answers_as_json() {
        let submission = r#"{"rep": [{"rep/q": 1}, {}, {"rep/q": 3}]}"#;
        let out = repeat_answers(submission, "rep/q", true).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            json!([
                {"kind": "answer", "value": 1},
                {"kind": "answer", "value": 3}
            ])
        );
    }

    #[test]
    fn config_from_toml() {
        let config = parse_config("translation_index = 2\ninclude_supplemental = false\n").unwrap();
        assert_eq!(
            config,
            DisplayConfig::new().with_translation_index(2).with_supplemental(false)
        );
        assert!(parse_config("translation_index = \"x\"").is_err());
    }
}
