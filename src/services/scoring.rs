//! Answer-key types and automatic scoring.
//!
//! True/false statement activities are scored against the chapter's key;
//! everything else is graded by the teacher against a rubric.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One true/false statement in a chapter's answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub statement: String,
    pub answer: bool,
    #[serde(default)]
    pub points: f64,
    /// Extra points a teacher may award for the written evidence.
    #[serde(default)]
    pub evidence_points: f64,
}

/// One rubric criterion for teacher-graded activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricItem {
    pub criterion: String,
    pub max_score: f64,
}

/// Points earned out of points possible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub earned: f64,
    pub possible: f64,
}

/// Score submitted true/false answers against the key.
///
/// `answers["statements"]` holds one boolean per statement, index-aligned.
/// Missing or non-boolean entries earn nothing.
#[must_use]
pub fn statement_score(statements: &[Statement], answers: &Value) -> Score {
    let submitted = answers.get("statements").and_then(Value::as_array);
    statements
        .iter()
        .enumerate()
        .fold(Score::default(), |mut score, (i, s)| {
            score.possible += s.points;
            let given = submitted.and_then(|arr| arr.get(i)).and_then(Value::as_bool);
            if given == Some(s.answer) {
                score.earned += s.points;
            }
            score
        })
}

/// Highest total a rubric allows.
#[must_use]
pub fn rubric_max(rubric: &[RubricItem]) -> f64 {
    rubric.iter().map(|r| r.max_score).sum()
}

/// Remove the answer key from every statement in an activity section.
pub fn strip_answer_key(section: &mut Value) {
    if let Some(statements) = section.get_mut("statements").and_then(Value::as_array_mut) {
        for statement in statements.iter_mut().filter_map(Value::as_object_mut) {
            statement.remove("answer");
        }
    }
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
