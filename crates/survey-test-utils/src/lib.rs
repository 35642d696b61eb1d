//! Testing utilities for the survey display workspace
//!
//! Shared schema and submission fixtures.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};
use survey_schema::{AnalysisField, AnalysisFieldKind, Asset, ChoiceRow, Label, SchemaRow};
use survey_submission::Submission;

/// Path of the audio question at the bottom of [`nested_repeat_asset`]
pub const NESTED_SOUNDS_PATH: &str = "level_a/level_b/level_c/sounds";

pub fn text(name: &str) -> SchemaRow {
    SchemaRow::new("text", name).with_label(Label::single(name.to_uppercase()))
}

pub fn begin(kind: &str, name: &str) -> SchemaRow {
    SchemaRow::new(format!("begin_{kind}"), name).with_label(Label::single(name.to_uppercase()))
}

pub fn end(kind: &str) -> SchemaRow {
    SchemaRow::unnamed(format!("end_{kind}"))
}

pub fn submission(value: Value) -> Submission {
    Submission::from_value(value).unwrap()
}

/// One group holding one text question
pub fn simple_group_asset() -> Asset {
    Asset::new(vec![begin("group", "grp"), text("name"), end("group")], Vec::new())
}

/// Three nested repeats with an audio question at the bottom
///
/// The audio question has an English transcript and a French translation
/// declared in the analysis form.
pub fn nested_repeat_asset() -> Asset {
    let survey = vec![
        begin("repeat", "level_a"),
        text("a_text"),
        begin("repeat", "level_b"),
        begin("repeat", "level_c"),
        SchemaRow::new("audio", "sounds").with_label(Label::single("Sounds")),
        end("repeat"),
        end("repeat"),
        end("repeat"),
    ];
    Asset::new(survey, Vec::new()).with_analysis_fields(vec![
        analysis_field(AnalysisFieldKind::Transcript, "transcript_en", "en"),
        analysis_field(AnalysisFieldKind::Translation, "translation_fr", "fr"),
    ])
}

fn analysis_field(kind: AnalysisFieldKind, leaf: &str, language: &str) -> AnalysisField {
    AnalysisField {
        kind,
        source: NESTED_SOUNDS_PATH.to_string(),
        dtpath: Some(format!("{NESTED_SOUNDS_PATH}/{leaf}")),
        label: Some(format!("sounds - {leaf}")),
        language: Some(language.to_string()),
        uuid: None,
    }
}

/// Submission for [`nested_repeat_asset`]
///
/// `level_a` has two instances; the second holds two `level_b` instances,
/// the last of which holds one recording.
pub fn nested_repeat_submission() -> Submission {
    submission(json!({
        "level_a": [
            {"level_a/a_text": "first"},
            {
                "level_a/a_text": "second",
                "level_a/level_b": [
                    {"level_a/level_b/level_c": []},
                    {"level_a/level_b/level_c": [
                        {"level_a/level_b/level_c/sounds": "clip.ogg"}
                    ]}
                ]
            }
        ],
        "_attachments": [{
            "uid": "att_clip",
            "filename": "user/attachments/clip.ogg",
            "question_xpath": "level_a[2]/level_b[2]/level_c[1]/sounds",
            "mimetype": "audio/ogg",
            "download_url": "https://files.example.org/clip.ogg"
        }],
        "_supplementalDetails": {
            NESTED_SOUNDS_PATH: {
                "transcript": {"value": "good morning", "languageCode": "en"},
                "translation": {"fr": {"value": "bonjour"}}
            }
        }
    }))
}

/// Matrix `grid` over `rows` choices with two column questions
pub fn matrix_asset(rows: usize) -> Asset {
    let survey = vec![
        begin("kobomatrix", "grid").with_matrix_list("grid_rows"),
        SchemaRow::new("select_one", "grown").with_list("yes_no"),
        SchemaRow::new("integer", "acres"),
        end("kobomatrix"),
    ];
    let mut choices: Vec<ChoiceRow> = (0..rows)
        .map(|i| ChoiceRow::new("grid_rows", format!("row{i}"), Label::single(format!("Row {i}"))))
        .collect();
    choices.push(ChoiceRow::new("yes_no", "yes", Label::single("Yes")));
    choices.push(ChoiceRow::new("yes_no", "no", Label::single("No")));
    Asset::new(survey, choices)
}

/// Score block preceded by its label-holder row, then a rank block
pub fn score_rank_asset() -> Asset {
    let mut score = SchemaRow::new("begin_score", "satisfaction");
    score.score_choices = Some("agree_scale".to_string());
    let mut rank = SchemaRow::new("begin_rank", "priorities")
        .with_label(Label::single("Rank your priorities"));
    rank.rank_items = Some("priority_items".to_string());

    let survey = vec![
        SchemaRow::new("note", "satisfaction_label").with_label(Label::single("How satisfied?")),
        score,
        SchemaRow::new("score__row", "service"),
        SchemaRow::new("score__row", "price"),
        end("score"),
        rank,
        SchemaRow::new("rank__level", "first_choice"),
        SchemaRow::new("rank__level", "second_choice"),
        end("rank"),
    ];
    let choices = vec![
        ChoiceRow::new("agree_scale", "agree", Label::single("Agree")),
        ChoiceRow::new("agree_scale", "disagree", Label::single("Disagree")),
        ChoiceRow::new("priority_items", "health", Label::single("Health")),
        ChoiceRow::new("priority_items", "school", Label::single("School")),
    ];
    Asset::new(survey, choices)
}

/// Root repeat `rep` holding text question `q`
pub fn single_repeat_asset() -> Asset {
    Asset::new(vec![begin("repeat", "rep"), text("q"), end("repeat")], Vec::new())
}

/// Submission for [`single_repeat_asset`], one instance per entry
///
/// `None` leaves the instance unanswered.
pub fn repeat_submission(answers: &[Option<&str>]) -> Submission {
    let instances: Vec<Value> = answers
        .iter()
        .map(|answer| match answer {
            Some(text) => json!({ "rep/q": text }),
            None => json!({}),
        })
        .collect();
    submission(json!({ "rep": instances }))
}

/// Repeat with `questions` text questions, a nested group and a matrix
pub fn wide_repeat_asset(questions: usize) -> Asset {
    let mut survey = vec![begin("repeat", "wide")];
    survey.extend((0..questions).map(|i| text(&format!("q{i}"))));
    survey.push(begin("group", "details"));
    survey.push(text("note_text"));
    survey.push(end("group"));
    survey.push(begin("kobomatrix", "grid").with_matrix_list("grid_rows"));
    survey.push(SchemaRow::new("integer", "count"));
    survey.push(end("kobomatrix"));
    survey.push(end("repeat"));

    let choices = (0..4)
        .map(|i| ChoiceRow::new("grid_rows", format!("row{i}"), Label::single(format!("Row {i}"))))
        .collect();
    Asset::new(survey, choices)
}

/// Submission for [`wide_repeat_asset`] with every question answered
pub fn wide_repeat_submission(questions: usize, instances: usize) -> Submission {
    let items: Vec<Value> = (0..instances)
        .map(|n| {
            let mut item: Map<String, Value> = (0..questions)
                .map(|i| (format!("wide/q{i}"), json!(format!("answer {n}.{i}"))))
                .collect();
            item.insert("wide/details/note_text".into(), json!("details"));
            item.insert("wide/grid_row0/grid_row0_count".into(), json!(n));
            Value::Object(item)
        })
        .collect();
    submission(json!({ "wide": items }))
}
