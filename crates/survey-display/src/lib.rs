//! Survey Display
//!
//! Renders one submission against its survey schema into a display tree:
//! groups, repeat instances, matrix grids and supplemental NLP content, each
//! response carrying the exact xpath of the question instance it came from.
//!
//! # Core Concepts
//!
//! - [`DisplayTreeBuilder`]: resolves flat paths once, then builds a tree per submission
//! - [`DisplayGroup`] / [`DisplayResponse`]: owned tree nodes, no back-references
//! - [`MatrixPopulator`]: one `MatrixRow` group per choice paired with a grid
//! - [`DisplayConfig`]: translation index and supplemental toggle
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use survey_display::{DisplayTreeBuilder, GroupKind};
//! use survey_schema::SchemaRow;
//! use survey_submission::Submission;
//!
//! let survey = vec![
//!     SchemaRow::new("begin_repeat", "household"),
//!     SchemaRow::new("text", "member"),
//!     SchemaRow::unnamed("end_repeat"),
//! ];
//! let submission = Submission::from_value(json!({
//!     "household": [{"household/member": "Ana"}, {"household/member": "Ben"}]
//! }))
//! .unwrap();
//!
//! let tree = DisplayTreeBuilder::new(&survey, &[]).build(&submission);
//! let instances: Vec<_> = tree.groups().collect();
//! assert_eq!(instances.len(), 2);
//! assert_eq!(instances[1].kind, GroupKind::Repeat);
//!
//! let member = instances[1].responses().next().unwrap();
//! assert_eq!(member.xpath.as_deref(), Some("household[2]/member"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod builder;
mod config;
mod matrix;
mod tree;

// Re-exports
pub use builder::{build_display_tree, DisplayTreeBuilder};
pub use config::DisplayConfig;
pub use matrix::MatrixPopulator;
pub use tree::{DisplayGroup, DisplayNode, DisplayResponse, GroupKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;
    use survey_schema::{AnalysisField, AnalysisFieldKind, Asset, ChoiceRow, Label, SchemaRow};
    use survey_submission::Submission;

    #[test]
    fn asset_builder_adds_supplemental_siblings() {
        let asset = Asset::new(vec![SchemaRow::new("audio", "clip")], Vec::new())
            .with_analysis_fields(vec![AnalysisField {
                kind: AnalysisFieldKind::Transcript,
                source: "clip".into(),
                dtpath: Some("clip/transcript_en".into()),
                label: Some("clip - transcript".into()),
                language: Some("en".into()),
                uuid: None,
            }]);
        let submission = Submission::from_value(json!({
            "clip": "a.mp3",
            "_supplementalDetails": {"clip": {"transcript": {"value": "hi", "languageCode": "en"}}}
        }))
        .unwrap();

        let tree = DisplayTreeBuilder::for_asset(&asset).build(&submission);
        let responses: Vec<_> = tree.responses().collect();
        assert_eq!(responses.len(), 2);
        assert!(responses[1].is_supplemental());
        assert_eq!(responses[1].label, "clip - transcript");
        assert_eq!(responses[1].data, Some(json!("hi")));

        let without = DisplayTreeBuilder::for_asset(&asset)
            .with_config(DisplayConfig::new().with_supplemental(false))
            .build(&submission);
        assert_eq!(without.responses().count(), 1);
    }

    #[test]
    fn matrix_group_inside_tree() {
        let survey = vec![
            SchemaRow::new("begin_kobomatrix", "grid").with_matrix_list("rows"),
            SchemaRow::new("text", "col"),
            SchemaRow::unnamed("end_kobomatrix"),
        ];
        let choices = vec![
            ChoiceRow::new("rows", "r1", Label::single("Row 1")),
            ChoiceRow::new("rows", "r2", Label::single("Row 2")),
        ];
        let submission = Submission::from_value(json!({"grid_r2/grid_r2_col": "v"})).unwrap();

        let tree = DisplayTreeBuilder::new(&survey, &choices).build(&submission);
        assert_eq!(tree.children.len(), 1);
        let grid = tree.groups().next().unwrap();
        assert_eq!(grid.kind, GroupKind::Matrix);
        assert_eq!(grid.children.len(), 2);
        let r2 = grid.groups().nth(1).unwrap();
        assert_eq!(r2.responses().next().unwrap().data, Some(json!("v")));
    }
}
