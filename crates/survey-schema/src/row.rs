//! Schema and choice rows
//!
//! Provides [`SchemaRow`] and [`ChoiceRow`], the two record shapes of a survey
//! definition, together with the [`RowType`] vocabulary and translated
//! [`Label`]s.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Question types that carry a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    Text,
    Integer,
    Decimal,
    Range,
    SelectOne,
    SelectMultiple,
    SelectOneFromFile,
    SelectMultipleFromFile,
    Rank,
    Score,
    Matrix,
    Date,
    Time,
    DateTime,
    Geopoint,
    Geotrace,
    Geoshape,
    Image,
    Audio,
    Video,
    File,
    Barcode,
    Acknowledge,
    Calculate,
    XmlExternal,
}

impl QuestionType {
    /// Every question type, in declaration order
    pub const ALL: [Self; 25] = [
        Self::Text,
        Self::Integer,
        Self::Decimal,
        Self::Range,
        Self::SelectOne,
        Self::SelectMultiple,
        Self::SelectOneFromFile,
        Self::SelectMultipleFromFile,
        Self::Rank,
        Self::Score,
        Self::Matrix,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Geopoint,
        Self::Geotrace,
        Self::Geoshape,
        Self::Image,
        Self::Audio,
        Self::Video,
        Self::File,
        Self::Barcode,
        Self::Acknowledge,
        Self::Calculate,
        Self::XmlExternal,
    ];

    /// Row-type string used in the schema
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Range => "range",
            Self::SelectOne => "select_one",
            Self::SelectMultiple => "select_multiple",
            Self::SelectOneFromFile => "select_one_from_file",
            Self::SelectMultipleFromFile => "select_multiple_from_file",
            Self::Rank => "rank",
            Self::Score => "score",
            Self::Matrix => "kobomatrix",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Geopoint => "geopoint",
            Self::Geotrace => "geotrace",
            Self::Geoshape => "geoshape",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
            Self::Barcode => "barcode",
            Self::Acknowledge => "acknowledge",
            Self::Calculate => "calculate",
            Self::XmlExternal => "xml-external",
        }
    }

    /// Look up a question type by its schema string
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Whether answers of this type name a media file
    #[inline]
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Audio | Self::Video | Self::File)
    }
}

/// Metadata fields collected automatically by the data-collection client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    Start,
    End,
    Today,
    Username,
    SimSerial,
    SubscriberId,
    DeviceId,
    PhoneNumber,
    Audit,
    BackgroundAudio,
    StartGeopoint,
}

impl MetaType {
    /// Every metadata type
    pub const ALL: [Self; 11] = [
        Self::Start,
        Self::End,
        Self::Today,
        Self::Username,
        Self::SimSerial,
        Self::SubscriberId,
        Self::DeviceId,
        Self::PhoneNumber,
        Self::Audit,
        Self::BackgroundAudio,
        Self::StartGeopoint,
    ];

    /// Row-type string used in the schema
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Today => "today",
            Self::Username => "username",
            Self::SimSerial => "simserial",
            Self::SubscriberId => "subscriberid",
            Self::DeviceId => "deviceid",
            Self::PhoneNumber => "phonenumber",
            Self::Audit => "audit",
            Self::BackgroundAudio => "background-audio",
            Self::StartGeopoint => "start-geopoint",
        }
    }

    /// Look up a metadata type by its schema string
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

/// Type of one schema row
///
/// Parsed from the row's `type` string. Unknown strings are kept verbatim in
/// [`RowType::Other`] so a schema from a newer authoring tool still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowType {
    BeginGroup,
    EndGroup,
    BeginRepeat,
    EndRepeat,
    BeginMatrix,
    EndMatrix,
    BeginScore,
    EndScore,
    BeginRank,
    EndRank,
    /// One scored row inside a score block
    ScoreRow,
    /// One ranked level inside a rank block
    RankLevel,
    Note,
    Hidden,
    Meta(MetaType),
    Question(QuestionType),
    Other(String),
}

impl RowType {
    /// Row-type string used in the schema
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BeginGroup => "begin_group",
            Self::EndGroup => "end_group",
            Self::BeginRepeat => "begin_repeat",
            Self::EndRepeat => "end_repeat",
            Self::BeginMatrix => "begin_kobomatrix",
            Self::EndMatrix => "end_kobomatrix",
            Self::BeginScore => "begin_score",
            Self::EndScore => "end_score",
            Self::BeginRank => "begin_rank",
            Self::EndRank => "end_rank",
            Self::ScoreRow => "score__row",
            Self::RankLevel => "rank__level",
            Self::Note => "note",
            Self::Hidden => "hidden",
            Self::Meta(meta) => meta.as_str(),
            Self::Question(question) => question.as_str(),
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for RowType {
    fn from(raw: &str) -> Self {
        match raw {
            "begin_group" => Self::BeginGroup,
            "end_group" => Self::EndGroup,
            "begin_repeat" => Self::BeginRepeat,
            "end_repeat" => Self::EndRepeat,
            "begin_kobomatrix" => Self::BeginMatrix,
            "end_kobomatrix" => Self::EndMatrix,
            "begin_score" => Self::BeginScore,
            "end_score" => Self::EndScore,
            "begin_rank" => Self::BeginRank,
            "end_rank" => Self::EndRank,
            "score__row" => Self::ScoreRow,
            "rank__level" => Self::RankLevel,
            "note" => Self::Note,
            "hidden" => Self::Hidden,
            other => MetaType::from_name(other)
                .map(Self::Meta)
                .or_else(|| QuestionType::from_name(other).map(Self::Question))
                .unwrap_or_else(|| Self::Other(other.to_string())),
        }
    }
}

impl From<String> for RowType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<RowType> for String {
    fn from(row_type: RowType) -> Self {
        row_type.as_str().to_string()
    }
}

impl Display for RowType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translated label, one slot per translation
///
/// Slots may be empty when a translation was never filled in. A schema with
/// no translations may store a bare string, which loads as a single slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LabelRepr")]
pub struct Label(Vec<Option<String>>);

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Single(String),
    Translated(Vec<Option<String>>),
}

impl From<LabelRepr> for Label {
    fn from(repr: LabelRepr) -> Self {
        match repr {
            LabelRepr::Single(text) => Self(vec![Some(text)]),
            LabelRepr::Translated(slots) => Self(slots),
        }
    }
}

impl Label {
    /// Create from translation slots
    #[inline]
    #[must_use]
    pub fn new(slots: Vec<Option<String>>) -> Self {
        Self(slots)
    }

    /// Untranslated label
    #[inline]
    #[must_use]
    pub fn single(text: impl Into<String>) -> Self {
        Self(vec![Some(text.into())])
    }

    /// Label in the given translation, if that slot is filled
    #[inline]
    #[must_use]
    pub fn get(&self, translation_index: usize) -> Option<&str> {
        self.0.get(translation_index).and_then(Option::as_deref)
    }

    /// Whether no translation slot is filled
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Translation slots
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Option<String>] {
        &self.0
    }
}

/// One element of the ordered survey definition
///
/// Rows are immutable after load. Nesting is never explicit: it is encoded by
/// the order of begin/end rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRow {
    /// Row type
    #[serde(rename = "type")]
    pub row_type: RowType,

    /// Stable, author-chosen name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name generated by the authoring tool when `name` is absent
    #[serde(rename = "$autoname", default, skip_serializing_if = "Option::is_none")]
    pub autoname: Option<String>,

    /// Row identifier, last-resort name
    #[serde(rename = "$kuid", default, skip_serializing_if = "Option::is_none")]
    pub kuid: Option<String>,

    /// Translated label
    #[serde(default, skip_serializing_if = "Label::is_empty")]
    pub label: Label,

    /// Choice list of select questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_from_list_name: Option<String>,

    /// Choice list supplying the rows of a matrix
    #[serde(rename = "kobo--matrix_list", default, skip_serializing_if = "Option::is_none")]
    pub matrix_list: Option<String>,

    /// Choice list ranked by a rank block
    #[serde(rename = "kobo--rank-items", default, skip_serializing_if = "Option::is_none")]
    pub rank_items: Option<String>,

    /// Choice list scored by a score block
    #[serde(rename = "kobo--score-choices", default, skip_serializing_if = "Option::is_none")]
    pub score_choices: Option<String>,
}

impl SchemaRow {
    /// Create a row with only a type and a name
    #[must_use]
    pub fn new(row_type: impl Into<RowType>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed(row_type)
        }
    }

    /// Create a row with no name (end rows usually carry none)
    #[must_use]
    pub fn unnamed(row_type: impl Into<RowType>) -> Self {
        Self {
            row_type: row_type.into(),
            name: None,
            autoname: None,
            kuid: None,
            label: Label::default(),
            select_from_list_name: None,
            matrix_list: None,
            rank_items: None,
            score_choices: None,
        }
    }

    /// Set the label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.label = label;
        self
    }

    /// Set the select list
    #[inline]
    #[must_use]
    pub fn with_list(mut self, list_name: impl Into<String>) -> Self {
        self.select_from_list_name = Some(list_name.into());
        self
    }

    /// Set the matrix list
    #[inline]
    #[must_use]
    pub fn with_matrix_list(mut self, list_name: impl Into<String>) -> Self {
        self.matrix_list = Some(list_name.into());
        self
    }

    /// Effective name: `name`, else `$autoname`, else `$kuid`
    #[inline]
    #[must_use]
    pub fn row_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.autoname.as_deref())
            .or(self.kuid.as_deref())
    }

    /// Label in the given translation, falling back to the effective name
    #[must_use]
    pub fn display_label(&self, translation_index: usize) -> Option<&str> {
        self.label.get(translation_index).or_else(|| self.row_name())
    }
}

/// One entry of a choice list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRow {
    /// List this choice belongs to
    pub list_name: String,

    /// Choice name (the stored value)
    pub name: String,

    /// Translated label
    #[serde(default, skip_serializing_if = "Label::is_empty")]
    pub label: Label,
}

impl ChoiceRow {
    /// Create a choice
    #[must_use]
    pub fn new(list_name: impl Into<String>, name: impl Into<String>, label: Label) -> Self {
        Self {
            list_name: list_name.into(),
            name: name.into(),
            label,
        }
    }

    /// Label in the given translation, falling back to the choice name
    #[must_use]
    pub fn display_label(&self, translation_index: usize) -> &str {
        self.label.get(translation_index).unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_type_known_strings() {
        assert_eq!(RowType::from("begin_repeat"), RowType::BeginRepeat);
        assert_eq!(RowType::from("begin_kobomatrix"), RowType::BeginMatrix);
        assert_eq!(RowType::from("score__row"), RowType::ScoreRow);
        assert_eq!(
            RowType::from("select_one"),
            RowType::Question(QuestionType::SelectOne)
        );
        assert_eq!(RowType::from("deviceid"), RowType::Meta(MetaType::DeviceId));
    }

    #[test]
    fn row_type_unknown_is_kept() {
        let row_type = RowType::from("hologram");
        assert_eq!(row_type, RowType::Other("hologram".into()));
        assert_eq!(row_type.as_str(), "hologram");
    }

    #[test]
    fn row_type_string_roundtrip() {
        for question in QuestionType::ALL {
            assert_eq!(RowType::from(question.as_str()), RowType::Question(question));
        }
        for meta in MetaType::ALL {
            assert_eq!(RowType::from(meta.as_str()), RowType::Meta(meta));
        }
    }

    #[test]
    fn label_accepts_string_or_slots() {
        let single: Label = serde_json::from_value(json!("Hello")).unwrap();
        assert_eq!(single.get(0), Some("Hello"));

        let slots: Label = serde_json::from_value(json!(["Hello", null, "Bonjour"])).unwrap();
        assert_eq!(slots.get(0), Some("Hello"));
        assert_eq!(slots.get(1), None);
        assert_eq!(slots.get(2), Some("Bonjour"));
        assert_eq!(slots.get(9), None);
    }

    #[test]
    fn row_name_fallback_chain() {
        let row: SchemaRow = serde_json::from_value(json!({
            "type": "text",
            "$autoname": "auto",
            "$kuid": "k1"
        }))
        .unwrap();
        assert_eq!(row.row_name(), Some("auto"));

        let row: SchemaRow = serde_json::from_value(json!({"type": "end_group", "$kuid": "k2"})).unwrap();
        assert_eq!(row.row_name(), Some("k2"));

        let row = SchemaRow::unnamed(RowType::EndGroup);
        assert_eq!(row.row_name(), None);
    }

    #[test]
    fn display_label_falls_back_to_name() {
        let row = SchemaRow::new(RowType::from("text"), "q1")
            .with_label(Label::new(vec![Some("Question".into()), None]));
        assert_eq!(row.display_label(0), Some("Question"));
        assert_eq!(row.display_label(1), Some("q1"));
        assert_eq!(row.display_label(7), Some("q1"));
    }

    #[test]
    fn schema_row_reads_list_properties() {
        let row: SchemaRow = serde_json::from_value(json!({
            "type": "begin_kobomatrix",
            "name": "m",
            "kobo--matrix_list": "rows"
        }))
        .unwrap();
        assert_eq!(row.matrix_list.as_deref(), Some("rows"));
        assert!(row.select_from_list_name.is_none());
    }
}
