//! Survey Schema
//!
//! Read-only model of a survey definition and the pure analyses computed
//! from it.
//!
//! # Core Concepts
//!
//! - [`SchemaRow`] / [`ChoiceRow`]: rows of the ordered survey and its choice lists
//! - [`RowRole`]: structural role of a row (question, begin/end block, note, meta)
//! - [`FlatPaths`]: row name → canonical slash-delimited path, computed once per schema
//! - [`XpathContext`]: instance-aware path of the groups enclosing a display node
//! - [`SupplementalIndex`]: source question → synthetic supplemental paths
//!
//! # Example
//!
//! ```rust
//! use survey_schema::{FlatPathOptions, FlatPaths, SchemaRow};
//!
//! let survey = vec![
//!     SchemaRow::new("begin_repeat", "household"),
//!     SchemaRow::new("text", "member"),
//!     SchemaRow::unnamed("end_repeat"),
//! ];
//! let paths = FlatPaths::resolve(&survey, FlatPathOptions::with_groups());
//! assert_eq!(paths.get("member"), Some("household/member"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod analysis;
mod asset;
mod classify;
mod error;
mod flat_paths;
mod row;
mod xpath;

// Re-exports
pub use analysis::{
    AnalysisField, AnalysisFieldKind, SupplementalEntry, SupplementalIndex, SupplementalPath,
    SupplementalPathError, SupplementalTarget, SUPPLEMENTAL_DETAILS_KEY,
};
pub use asset::{AnalysisForm, Asset, AssetContent};
pub use classify::{
    classify, is_block_label_holder, list_reference, BlockKind, ListSource, RowRole,
    LIST_REFERENCE_ORDER,
};
pub use error::SchemaError;
pub use flat_paths::{FlatPathOptions, FlatPaths};
pub use row::{ChoiceRow, Label, MetaType, QuestionType, RowType, SchemaRow};
pub use xpath::{XpathContext, XpathError, XpathSegment};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn matrix_rows_resolve_under_matrix() {
        let survey = vec![
            SchemaRow::new("begin_group", "outer"),
            SchemaRow::new("begin_kobomatrix", "grid").with_matrix_list("grid_rows"),
            SchemaRow::new("select_one", "col_a").with_list("yn"),
            SchemaRow::new("text", "col_b"),
            SchemaRow::unnamed("end_kobomatrix"),
            SchemaRow::unnamed("end_group"),
        ];
        let paths = FlatPaths::resolve(&survey, FlatPathOptions::with_groups());
        let nested: Vec<_> = paths.nested_under("outer/grid").collect();
        assert_eq!(nested, vec![("col_a", "outer/grid/col_a"), ("col_b", "outer/grid/col_b")]);
        assert_eq!(list_reference(&survey[1]), Some("grid_rows"));
        assert_eq!(classify(&survey[1]), RowRole::Begin(BlockKind::Matrix));
    }

    #[test]
    fn xpath_leaf_matches_flat_path_without_repeats() {
        let ctx = XpathContext::root()
            .child(XpathSegment::group("outer"))
            .child(XpathSegment::group("grid"));
        assert_eq!(ctx.flat(), "outer/grid");
        assert_eq!(ctx.leaf("col_a"), "outer/grid/col_a");
    }
}
