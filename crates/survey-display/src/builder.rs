//! Display tree construction
//!
//! The survey is a flat list of rows whose nesting is only implied by
//! begin/end markers. The builder re-derives it: for every group it makes
//! one left-to-right pass over all rows, keeps the rows whose flat path puts
//! them directly inside that group, and resolves each row's data against the
//! data slice of the group.
//!
//! End rows are never inspected. A malformed begin/end pairing only makes
//! misplaced rows drop out of the tree.

use std::borrow::Cow;

use serde_json::{Map, Value};
use survey_schema::{
    classify, is_block_label_holder, list_reference, Asset, BlockKind, ChoiceRow, FlatPathOptions,
    FlatPaths, RowRole, SchemaRow, SupplementalIndex, XpathContext, XpathSegment,
};
use survey_submission::{
    resolve_supplemental_content, DisplayValue, RepeatAnswerExtractor, Submission,
};

use crate::config::DisplayConfig;
use crate::matrix::MatrixPopulator;
use crate::tree::{DisplayGroup, DisplayNode, DisplayResponse, GroupKind};

/// Build the display tree of one submission
///
/// Convenience for [`DisplayTreeBuilder`] with a translation index and a
/// prebuilt supplemental index. Out-of-range translation indexes fall back
/// to row names.
#[must_use]
pub fn build_display_tree(
    survey: &[SchemaRow],
    choices: &[ChoiceRow],
    translation_index: usize,
    submission: &Submission,
    supplemental_index: &SupplementalIndex,
) -> DisplayGroup {
    DisplayTreeBuilder::new(survey, choices)
        .with_supplemental_index(supplemental_index)
        .with_translation_index(translation_index)
        .build(submission)
}

/// Builds display trees for one schema
///
/// Flat paths are resolved once on creation; [`build`](Self::build) may then
/// be called for any number of submissions.
#[derive(Debug, Clone)]
pub struct DisplayTreeBuilder<'a> {
    survey: &'a [SchemaRow],
    choices: &'a [ChoiceRow],
    flat_paths: FlatPaths,
    supplemental_index: Cow<'a, SupplementalIndex>,
    config: DisplayConfig,
}

impl<'a> DisplayTreeBuilder<'a> {
    /// Create for survey rows and choices, with no supplemental entries
    #[must_use]
    pub fn new(survey: &'a [SchemaRow], choices: &'a [ChoiceRow]) -> Self {
        Self {
            survey,
            choices,
            flat_paths: FlatPaths::resolve(survey, FlatPathOptions::with_groups()),
            supplemental_index: Cow::Owned(SupplementalIndex::new()),
            config: DisplayConfig::default(),
        }
    }

    /// Create for an asset, supplemental index included
    #[must_use]
    pub fn for_asset(asset: &'a Asset) -> Self {
        Self {
            supplemental_index: Cow::Owned(asset.supplemental_index()),
            ..Self::new(asset.survey(), asset.choices())
        }
    }

    /// With supplemental index
    #[inline]
    #[must_use]
    pub fn with_supplemental_index(mut self, index: &'a SupplementalIndex) -> Self {
        self.supplemental_index = Cow::Borrowed(index);
        self
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: DisplayConfig) -> Self {
        self.config = config;
        self
    }

    /// With translation index
    #[inline]
    #[must_use]
    pub fn with_translation_index(mut self, index: usize) -> Self {
        self.config.translation_index = index;
        self
    }

    /// Resolved flat paths
    #[inline]
    #[must_use]
    pub fn flat_paths(&self) -> &FlatPaths {
        &self.flat_paths
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Build the tree of one submission
    ///
    /// Deterministic and side-effect free: the same submission always yields
    /// an identical tree, sharing nothing with the input.
    #[must_use]
    pub fn build(&self, submission: &Submission) -> DisplayGroup {
        let traversal = Traversal {
            survey: self.survey,
            flat_paths: &self.flat_paths,
            supplemental_index: &self.supplemental_index,
            config: self.config,
            submission,
            matrix: MatrixPopulator::new(
                self.survey,
                self.choices,
                &self.flat_paths,
                self.config.translation_index,
            ),
        };
        let children = traversal.children(&Scope::root(), Some(submission.answers()), None);
        DisplayGroup::root().with_children(children)
    }
}

/// Group whose children are being collected
#[derive(Debug, Clone)]
struct Scope<'t> {
    /// Begin row of the group (`None` at the root)
    row: Option<&'t SchemaRow>,
    name: Option<&'t str>,
    context: XpathContext,
}

impl<'t> Scope<'t> {
    fn root() -> Self {
        Self {
            row: None,
            name: None,
            context: XpathContext::root(),
        }
    }

    fn of(row: &'t SchemaRow, name: &'t str, context: XpathContext) -> Self {
        Self {
            row: Some(row),
            name: Some(name),
            context,
        }
    }
}

/// State of one `build` call
struct Traversal<'t> {
    survey: &'t [SchemaRow],
    flat_paths: &'t FlatPaths,
    supplemental_index: &'t SupplementalIndex,
    config: DisplayConfig,
    submission: &'t Submission,
    matrix: MatrixPopulator<'t>,
}

impl<'t> Traversal<'t> {
    /// Display nodes of the rows directly inside `parent`
    ///
    /// `data` is the parent's data slice; `repeat_index` is the 0-based
    /// position of the innermost enclosing repeat instance.
    fn children(
        &self,
        parent: &Scope<'t>,
        data: Option<&Map<String, Value>>,
        repeat_index: Option<usize>,
    ) -> Vec<DisplayNode> {
        let mut nodes = Vec::new();

        for (index, row) in self.survey.iter().enumerate() {
            let Some(name) = row.row_name() else {
                continue;
            };
            let role = classify(row);
            if role.is_end() || !self.flat_paths.is_immediate_child(name, parent.name) {
                tracing::trace!(row = name, group = parent.name, "row outside group");
                continue;
            }
            if role == RowRole::NoValue || is_block_label_holder(self.survey, index) {
                continue;
            }
            let Some(path) = self.flat_paths.get(name) else {
                continue;
            };

            match role {
                RowRole::Begin(BlockKind::Repeat) => {
                    let row_data = self.row_data(name, path, data, &parent.context);
                    nodes.extend(
                        self.repeat_instances(index, row, name, parent, row_data.as_deref())
                            .into_iter()
                            .map(DisplayNode::Group),
                    );
                }
                RowRole::Begin(BlockKind::Matrix) => {
                    let context = parent.context.child(XpathSegment::group(name));
                    let rows = self
                        .matrix
                        .populate(self.submission, row, &context, data)
                        .into_iter()
                        .map(DisplayNode::Group)
                        .collect();
                    nodes.push(
                        DisplayGroup::new(
                            GroupKind::Matrix,
                            self.label(index, row, name),
                            name,
                            context,
                        )
                        .with_children(rows)
                        .into(),
                    );
                }
                RowRole::Begin(BlockKind::Group | BlockKind::Score | BlockKind::Rank) => {
                    let row_data = self.row_data(name, path, data, &parent.context);
                    let context = parent.context.child(XpathSegment::group(name));
                    let scope = Scope::of(row, name, context.clone());
                    // a non-mapping slice was stored under an older shape of
                    // the group; children resolve against the parent data
                    let group_data = match row_data.as_deref() {
                        Some(Value::Object(slice)) => Some(slice),
                        Some(_) => {
                            tracing::debug!(row = name, path, "group data has unexpected shape");
                            data
                        }
                        None => None,
                    };
                    let children = self.children(&scope, group_data, repeat_index);
                    nodes.push(
                        DisplayGroup::new(
                            GroupKind::Regular,
                            self.label(index, row, name),
                            name,
                            context,
                        )
                        .with_children(children)
                        .into(),
                    );
                }
                RowRole::Question(_) | RowRole::ScoreRankLeaf => {
                    let row_data = self.row_data(name, path, data, &parent.context);
                    nodes.push(
                        self.response(index, row, name, parent, row_data, repeat_index)
                            .into(),
                    );
                    if self.config.include_supplemental {
                        nodes.extend(
                            self.supplemental_responses(path)
                                .into_iter()
                                .map(DisplayNode::from),
                        );
                    }
                }
                RowRole::End(_) | RowRole::NoValue | RowRole::Meta | RowRole::Unknown => {}
            }
        }

        nodes
    }

    /// One `Repeat` group per stored instance
    fn repeat_instances(
        &self,
        index: usize,
        row: &'t SchemaRow,
        name: &'t str,
        parent: &Scope<'t>,
        data: Option<&Value>,
    ) -> Vec<DisplayGroup> {
        let label = self.label(index, row, name);
        match data {
            Some(Value::Array(instances)) => instances
                .iter()
                .enumerate()
                .map(|(position, instance)| {
                    let context = parent.context.child(XpathSegment::instance(name, position));
                    let scope = Scope::of(row, name, context.clone());
                    let children = self.children(&scope, instance.as_object(), Some(position));
                    DisplayGroup::new(GroupKind::Repeat, label.clone(), name, context)
                        .with_children(children)
                })
                .collect(),
            // legacy storage: one instance flattened into a mapping
            Some(Value::Object(instance)) => {
                let context = parent.context.child(XpathSegment::unindexed_repeat(name));
                let scope = Scope::of(row, name, context.clone());
                let children = self.children(&scope, Some(instance), None);
                vec![DisplayGroup::new(GroupKind::Repeat, label, name, context).with_children(children)]
            }
            _ => Vec::new(),
        }
    }

    /// Response of a question or score/rank leaf
    ///
    /// Leaves take their choice list from the enclosing block. Inside a
    /// repeat, a sequence of answers is narrowed to the current instance.
    fn response(
        &self,
        index: usize,
        row: &SchemaRow,
        name: &str,
        parent: &Scope<'t>,
        data: Option<Cow<'_, Value>>,
        repeat_index: Option<usize>,
    ) -> DisplayResponse {
        let list_name = match classify(row) {
            RowRole::ScoreRankLeaf => parent.row.and_then(list_reference),
            _ => list_reference(row),
        };
        let data = match (data.map(Cow::into_owned), repeat_index) {
            (Some(Value::Array(answers)), Some(position)) => answers.into_iter().nth(position),
            (data, _) => data,
        };

        DisplayResponse {
            question_type: Some(row.row_type.clone()),
            label: self.label(index, row, name),
            name: name.to_string(),
            xpath: Some(parent.context.leaf(name)),
            list_name: list_name.map(str::to_string),
            data,
        }
    }

    /// Supplemental entries of the question at `path`
    fn supplemental_responses(&self, path: &str) -> Vec<DisplayResponse> {
        self.supplemental_index
            .entries_for(path)
            .iter()
            .map(|entry| DisplayResponse {
                question_type: None,
                label: entry.label.clone().unwrap_or_else(|| entry.path.clone()),
                name: entry.path.clone(),
                xpath: None,
                list_name: None,
                data: resolve_supplemental_content(self.submission, &entry.path).map(Value::String),
            })
            .collect()
    }

    /// Translated label, else the row name
    ///
    /// Score and rank blocks without a label of their own take the label of
    /// the row before them.
    fn label(&self, index: usize, row: &SchemaRow, name: &str) -> String {
        let translation = self.config.translation_index;
        let inherited = || {
            if !classify(row).is_score_or_rank_begin() {
                return None;
            }
            let holder = index.checked_sub(1)?;
            if !is_block_label_holder(self.survey, holder) {
                return None;
            }
            self.survey.get(holder)?.label.get(translation)
        };
        row.label
            .get(translation)
            .or_else(inherited)
            .unwrap_or(name)
            .to_string()
    }

    /// Data of one row inside the parent data slice
    ///
    /// Tried in order: the full flat path key, the bare name key, then
    /// [`guess_row_data`](Self::guess_row_data). `null` counts as absent.
    fn row_data<'d>(
        &self,
        name: &str,
        path: &str,
        scope: Option<&'d Map<String, Value>>,
        context: &XpathContext,
    ) -> Option<Cow<'d, Value>> {
        let scope = scope?;
        let present = |key: &str| scope.get(key).filter(|value| !value.is_null());
        present(path)
            .or_else(|| present(name))
            .map(Cow::Borrowed)
            .or_else(|| self.guess_row_data(name, path, scope, context).map(Cow::Owned))
    }

    /// Data of a row whose key is not stored as-is
    ///
    /// Whether a path segment was a repeat or a plain group when the data was
    /// collected cannot be recovered from the current schema, since forms
    /// change between versions. The path is first read as a question inside
    /// repeat instances, then as a group whose answers were stored flat under
    /// its path prefix. The first non-empty reading wins. This is a guess,
    /// not a guarantee.
    fn guess_row_data(
        &self,
        name: &str,
        path: &str,
        scope: &Map<String, Value>,
        context: &XpathContext,
    ) -> Option<Value> {
        let repeated = RepeatAnswerExtractor::new(self.submission).extract_in(scope, context, path);
        if !repeated.is_empty() {
            tracing::debug!(
                row = name,
                path,
                answers = repeated.len(),
                "row data read from repeat instances"
            );
            return Some(Value::Array(
                repeated.into_iter().map(DisplayValue::into_value).collect(),
            ));
        }

        let prefix = format!("{path}/");
        let grouped: Map<String, Value> = scope
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if grouped.is_empty() {
            return None;
        }
        tracing::debug!(
            row = name,
            path,
            keys = grouped.len(),
            "row data read from flattened group keys"
        );
        Some(Value::Object(grouped))
    }
}
