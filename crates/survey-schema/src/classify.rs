//! Row classification
//!
//! Decides which structural role a [`SchemaRow`] plays and which choice list,
//! if any, it refers to.

use crate::row::{QuestionType, RowType, SchemaRow};

/// Kind of block opened by a begin row and closed by an end row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Non-repeating group
    Group,
    /// Repeat group, answered zero or more times
    Repeat,
    /// Grid whose rows come from a choice list
    Matrix,
    /// Score pseudo-group
    Score,
    /// Rank pseudo-group
    Rank,
}

/// Structural role of a schema row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowRole {
    /// Terminal question carrying an answer
    Question(QuestionType),
    /// `score__row` / `rank__level` leaf of a score or rank block
    ScoreRankLeaf,
    /// Opens a block
    Begin(BlockKind),
    /// Closes a block
    End(BlockKind),
    /// Note or hidden row, never displayed
    NoValue,
    /// Automatically collected metadata
    Meta,
    /// Type this crate does not know
    Unknown,
}

impl RowRole {
    /// Classify a row type
    #[must_use]
    pub fn of(row_type: &RowType) -> Self {
        match row_type {
            RowType::BeginGroup => Self::Begin(BlockKind::Group),
            RowType::BeginRepeat => Self::Begin(BlockKind::Repeat),
            RowType::BeginMatrix => Self::Begin(BlockKind::Matrix),
            RowType::BeginScore => Self::Begin(BlockKind::Score),
            RowType::BeginRank => Self::Begin(BlockKind::Rank),
            RowType::EndGroup => Self::End(BlockKind::Group),
            RowType::EndRepeat => Self::End(BlockKind::Repeat),
            RowType::EndMatrix => Self::End(BlockKind::Matrix),
            RowType::EndScore => Self::End(BlockKind::Score),
            RowType::EndRank => Self::End(BlockKind::Rank),
            RowType::ScoreRow | RowType::RankLevel => Self::ScoreRankLeaf,
            RowType::Note | RowType::Hidden => Self::NoValue,
            RowType::Meta(_) => Self::Meta,
            RowType::Question(question) => Self::Question(*question),
            RowType::Other(_) => Self::Unknown,
        }
    }

    /// Whether this role opens a block
    #[inline]
    #[must_use]
    pub fn is_begin(self) -> bool {
        matches!(self, Self::Begin(_))
    }

    /// Whether this role closes a block
    #[inline]
    #[must_use]
    pub fn is_end(self) -> bool {
        matches!(self, Self::End(_))
    }

    /// Whether this role opens a score or rank block
    #[inline]
    #[must_use]
    pub fn is_score_or_rank_begin(self) -> bool {
        matches!(self, Self::Begin(BlockKind::Score | BlockKind::Rank))
    }
}

/// Convenience for `RowRole::of(&row.row_type)`
#[inline]
#[must_use]
pub fn classify(row: &SchemaRow) -> RowRole {
    RowRole::of(&row.row_type)
}

/// Property a row may carry its choice-list reference in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSource {
    /// `select_from_list_name`
    SelectFromListName,
    /// `kobo--matrix_list`
    MatrixList,
    /// `kobo--rank-items`
    RankItems,
    /// `kobo--score-choices`
    ScoreChoices,
}

/// Order in which list-reference properties are consulted
pub const LIST_REFERENCE_ORDER: [ListSource; 4] = [
    ListSource::SelectFromListName,
    ListSource::MatrixList,
    ListSource::RankItems,
    ListSource::ScoreChoices,
];

impl ListSource {
    /// Property key in the schema JSON
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SelectFromListName => "select_from_list_name",
            Self::MatrixList => "kobo--matrix_list",
            Self::RankItems => "kobo--rank-items",
            Self::ScoreChoices => "kobo--score-choices",
        }
    }

    /// Read this property from a row
    #[must_use]
    pub fn read(self, row: &SchemaRow) -> Option<&str> {
        let value = match self {
            Self::SelectFromListName => &row.select_from_list_name,
            Self::MatrixList => &row.matrix_list,
            Self::RankItems => &row.rank_items,
            Self::ScoreChoices => &row.score_choices,
        };
        value.as_deref().filter(|name| !name.is_empty())
    }
}

/// First list reference found on the row, in [`LIST_REFERENCE_ORDER`]
#[must_use]
pub fn list_reference(row: &SchemaRow) -> Option<&str> {
    LIST_REFERENCE_ORDER
        .iter()
        .find_map(|source| source.read(row))
}

/// Whether the row directly precedes a score or rank block
///
/// Such a row only holds the block's label and is never displayed itself.
/// Begin and end rows are structure, never label holders.
#[must_use]
pub fn is_block_label_holder(survey: &[SchemaRow], index: usize) -> bool {
    let Some(row) = survey.get(index) else {
        return false;
    };
    let role = classify(row);
    !role.is_begin()
        && !role.is_end()
        && survey
            .get(index + 1)
            .is_some_and(|next| classify(next).is_score_or_rank_begin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::MetaType;

    #[test]
    fn classify_blocks() {
        assert_eq!(RowRole::of(&RowType::BeginRepeat), RowRole::Begin(BlockKind::Repeat));
        assert_eq!(RowRole::of(&RowType::EndMatrix), RowRole::End(BlockKind::Matrix));
        assert!(RowRole::of(&RowType::BeginRank).is_score_or_rank_begin());
        assert!(!RowRole::of(&RowType::BeginGroup).is_score_or_rank_begin());
    }

    #[test]
    fn classify_leaves() {
        assert_eq!(
            RowRole::of(&RowType::Question(QuestionType::Text)),
            RowRole::Question(QuestionType::Text)
        );
        assert_eq!(RowRole::of(&RowType::RankLevel), RowRole::ScoreRankLeaf);
        assert_eq!(RowRole::of(&RowType::Hidden), RowRole::NoValue);
        assert_eq!(RowRole::of(&RowType::Meta(MetaType::Start)), RowRole::Meta);
        assert_eq!(RowRole::of(&RowType::Other("x".into())), RowRole::Unknown);
    }

    #[test]
    fn list_reference_order() {
        let mut row = SchemaRow::new("select_one", "q").with_matrix_list("matrix_rows");
        assert_eq!(list_reference(&row), Some("matrix_rows"));

        row.select_from_list_name = Some("colors".into());
        assert_eq!(list_reference(&row), Some("colors"));

        row.select_from_list_name = Some(String::new());
        assert_eq!(list_reference(&row), Some("matrix_rows"));
    }

    #[test]
    fn list_reference_score_and_rank() {
        let mut score = SchemaRow::new("begin_score", "s");
        score.score_choices = Some("agree".into());
        assert_eq!(list_reference(&score), Some("agree"));

        let mut rank = SchemaRow::new("begin_rank", "r");
        rank.rank_items = Some("fruits".into());
        assert_eq!(list_reference(&rank), Some("fruits"));

        assert_eq!(list_reference(&SchemaRow::new("text", "t")), None);
    }

    #[test]
    fn label_holder_detected_by_adjacency() {
        let survey = vec![
            SchemaRow::new("note", "score_label"),
            SchemaRow::new("begin_score", "score_block"),
            SchemaRow::new("score__row", "row_1"),
            SchemaRow::unnamed("end_score"),
        ];
        assert!(is_block_label_holder(&survey, 0));
        assert!(!is_block_label_holder(&survey, 1));
        assert!(!is_block_label_holder(&survey, 3));
    }

    #[test]
    fn wrapping_group_is_not_a_label_holder() {
        let survey = vec![
            SchemaRow::new("begin_group", "g"),
            SchemaRow::new("begin_rank", "rk"),
            SchemaRow::new("rank__level", "first"),
            SchemaRow::unnamed("end_rank"),
            SchemaRow::unnamed("end_group"),
            SchemaRow::new("begin_score", "sc"),
        ];
        assert!(!is_block_label_holder(&survey, 0));
        assert!(!is_block_label_holder(&survey, 4));
        assert!(!is_block_label_holder(&survey, 9));
    }
}
