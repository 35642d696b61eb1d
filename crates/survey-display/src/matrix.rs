//! Matrix population
//!
//! A matrix is a grid: its rows come from a choice list and its columns are
//! the questions nested in the matrix block. Answers are stored under a
//! composite key rather than by ordinary nesting:
//!
//! ```text
//! {matrixPath}_{choice}/{matrixName}_{choice}_{question}
//! ```
//!
//! Matrices are exactly one level deep, so population never recurses.

use serde_json::{Map, Value};
use survey_schema::{
    classify, list_reference, ChoiceRow, FlatPaths, ListSource, RowRole, SchemaRow, XpathContext,
    XpathSegment,
};
use survey_submission::Submission;

use crate::tree::{DisplayGroup, DisplayNode, DisplayResponse, GroupKind};

/// Builds the rows of matrix groups for one schema
#[derive(Debug, Clone, Copy)]
pub struct MatrixPopulator<'a> {
    survey: &'a [SchemaRow],
    choices: &'a [ChoiceRow],
    flat_paths: &'a FlatPaths,
    translation_index: usize,
}

impl<'a> MatrixPopulator<'a> {
    /// Create for a schema
    #[inline]
    #[must_use]
    pub fn new(
        survey: &'a [SchemaRow],
        choices: &'a [ChoiceRow],
        flat_paths: &'a FlatPaths,
        translation_index: usize,
    ) -> Self {
        Self {
            survey,
            choices,
            flat_paths,
            translation_index,
        }
    }

    /// One `MatrixRow` group per choice paired with `matrix`
    ///
    /// `matrix_context` is the matrix group's own context. Each row holds one
    /// response per question nested in the matrix, answered or not. Answers
    /// are looked up at the submission root first, then in `parent_data`
    /// (a matrix inside a repeat stores its answers in the instance).
    #[must_use]
    pub fn populate(
        &self,
        submission: &Submission,
        matrix: &SchemaRow,
        matrix_context: &XpathContext,
        parent_data: Option<&Map<String, Value>>,
    ) -> Vec<DisplayGroup> {
        let Some(matrix_name) = matrix.row_name() else {
            return Vec::new();
        };
        let Some(list_name) = ListSource::MatrixList.read(matrix) else {
            tracing::debug!(matrix = matrix_name, "matrix has no paired choice list");
            return Vec::new();
        };
        let Some(matrix_path) = self.flat_paths.get(matrix_name) else {
            return Vec::new();
        };
        let questions = self.nested_questions(matrix_path);
        let outer_context = XpathContext::new(
            matrix_context
                .segments()
                .split_last()
                .map(|(_, outer)| outer.to_vec())
                .unwrap_or_default(),
        );

        self.choices
            .iter()
            .filter(|choice| choice.list_name == list_name)
            .map(|choice| {
                let row_segment = format!("{matrix_name}_{}", choice.name);
                let row_context = outer_context.child(XpathSegment::group(&row_segment));
                let children = questions
                    .iter()
                    .map(|(question_name, row)| {
                        let data_key = format!(
                            "{matrix_path}_{}/{matrix_name}_{}_{question_name}",
                            choice.name, choice.name
                        );
                        let data = submission
                            .answer(&data_key)
                            .filter(|value| !value.is_null())
                            .or_else(|| parent_data.and_then(|scope| scope.get(&data_key)))
                            .filter(|value| !value.is_null())
                            .cloned();
                        DisplayNode::Response(DisplayResponse {
                            question_type: Some(row.row_type.clone()),
                            label: row
                                .display_label(self.translation_index)
                                .unwrap_or(question_name)
                                .to_string(),
                            name: (*question_name).to_string(),
                            xpath: Some(
                                row_context
                                    .leaf(&format!("{row_segment}_{question_name}")),
                            ),
                            list_name: list_reference(row).map(str::to_string),
                            data,
                        })
                    })
                    .collect();

                DisplayGroup::new(
                    GroupKind::MatrixRow,
                    choice.display_label(self.translation_index),
                    &choice.name,
                    row_context,
                )
                .with_children(children)
            })
            .collect()
    }

    /// Question rows nested in the matrix at `matrix_path`, in schema order
    fn nested_questions(&self, matrix_path: &str) -> Vec<(&'a str, &'a SchemaRow)> {
        self.flat_paths
            .nested_under(matrix_path)
            .filter_map(|(name, _)| {
                self.survey
                    .iter()
                    .find(|row| row.row_name() == Some(name))
                    .filter(|row| matches!(classify(row), RowRole::Question(_)))
            })
            .filter_map(|row| row.row_name().map(|name| (name, row)))
            .collect()
    }
}
