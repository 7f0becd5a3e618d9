//! Submission service — student answers, progress, grading and recap.
//!
//! DESIGN
//! ======
//! One document per (group, chapter, activity), keyed
//! `{studentId}_{chapterId}_{activity}`. Students save partial answers as
//! they move through a form; each save merge-writes the answers and stamps
//! `lastSubmitted`. Statement activities get `autoScore` recomputed against
//! the chapter's current key on every save. Teachers write `scores`
//! (criterion -> number) separately; the two never overwrite each other.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Value, json};
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use super::chapter::{self, Activity, ChapterError};
use super::document::{self, CHAPTERS, Document, DocumentError, GROUPS, SUBMISSIONS};
use super::group::{self, Group};
use super::scoring::{RubricItem, Score, rubric_max, statement_score};
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission not found: {0}")]
    NotFound(String),
    #[error("chapter not found: {0}")]
    ChapterNotFound(String),
    #[error("invalid submission data: {0}")]
    Invalid(String),
    #[error("submission belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Chapter(ChapterError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl From<ChapterError> for SubmissionError {
    fn from(err: ChapterError) -> Self {
        match err {
            ChapterError::NotFound(id) => Self::ChapterNotFound(id),
            other => Self::Chapter(other),
        }
    }
}

impl ErrorCode for SubmissionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_SUBMISSION_NOT_FOUND",
            Self::ChapterNotFound(_) => "E_CHAPTER_NOT_FOUND",
            Self::Invalid(_) => "E_VALIDATION",
            Self::Forbidden => "E_FORBIDDEN",
            Self::Chapter(e) => e.error_code(),
            Self::Document(e) => e.error_code(),
        }
    }
}

/// Per-activity progress of one group in one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgress {
    pub activity: Activity,
    pub label: &'static str,
    pub submitted: bool,
    pub last_submitted: Option<String>,
}

/// A submission as listed for teachers, with the group's names attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRow {
    pub id: String,
    pub student_id: String,
    pub class_name: Option<String>,
    pub group_name: Option<String>,
    pub members: Vec<String>,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub scores: BTreeMap<String, f64>,
    pub total: f64,
    /// Rubric maximum; only set for rubric-graded activities.
    pub possible: Option<f64>,
}

/// One group's line in the chapter recap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapRow {
    pub group_id: String,
    pub class_name: String,
    pub group_name: String,
    /// Activity wire name -> score; `None` when nothing is scored yet.
    pub activities: BTreeMap<&'static str, Option<f64>>,
    pub total: f64,
}

#[must_use]
pub fn submission_id(student_id: &str, chapter_id: &str, activity: Activity) -> String {
    format!("{student_id}_{chapter_id}_{activity}")
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

// =============================================================================
// STUDENT OPERATIONS
// =============================================================================

/// Merge-write a student's answers. Returns the stored submission.
///
/// # Errors
///
/// Returns `Invalid` for non-object answers, `ChapterNotFound` when the
/// chapter does not exist, or a storage error.
pub async fn save_answers(
    pool: &PgPool,
    student_id: &str,
    chapter_id: &str,
    activity: Activity,
    answers: Value,
) -> Result<Value, SubmissionError> {
    if !answers.is_object() {
        return Err(SubmissionError::Invalid("Jawaban harus berupa objek.".into()));
    }
    let key = chapter::answer_key(pool, chapter_id, activity).await?;
    let id = submission_id(student_id, chapter_id, activity);

    let mut patch = json!({
        "studentId": student_id,
        "chapterId": chapter_id,
        "activity": activity,
        "answers": answers,
        "lastSubmitted": now_rfc3339(),
    });

    if activity.has_statements() {
        let mut merged = document::get(pool, SUBMISSIONS, &id)
            .await?
            .and_then(|doc| doc.get("answers").cloned())
            .unwrap_or_else(|| json!({}));
        document::deep_merge(&mut merged, &patch["answers"]);
        patch["autoScore"] = json!(statement_score(&key, &merged));
    }

    let stored = document::merge(pool, SUBMISSIONS, &id, &patch).await?;
    info!(submission_id = %id, "submission: answers saved");
    Ok(stored)
}

/// # Errors
///
/// Returns `NotFound` when the student has not saved this activity yet.
pub async fn get_own(
    pool: &PgPool,
    student_id: &str,
    chapter_id: &str,
    activity: Activity,
) -> Result<Value, SubmissionError> {
    let id = submission_id(student_id, chapter_id, activity);
    document::get(pool, SUBMISSIONS, &id)
        .await?
        .ok_or(SubmissionError::NotFound(id))
}

/// Every submission of one student.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub async fn list_own(pool: &PgPool, student_id: &str) -> Result<Vec<Document>, SubmissionError> {
    Ok(document::find_eq(pool, SUBMISSIONS, "studentId", student_id).await?)
}

/// Which activities of a chapter the student has saved, and when.
///
/// # Errors
///
/// Returns `ChapterNotFound` when the chapter does not exist.
pub async fn progress(pool: &PgPool, student_id: &str, chapter_id: &str) -> Result<Vec<ActivityProgress>, SubmissionError> {
    if document::get(pool, CHAPTERS, chapter_id).await?.is_none() {
        return Err(SubmissionError::ChapterNotFound(chapter_id.to_owned()));
    }
    let filter = json!({ "studentId": student_id, "chapterId": chapter_id });
    let docs = document::find_matching(pool, SUBMISSIONS, &filter).await?;
    Ok(build_progress(docs.iter().map(|d| &d.data)))
}

pub(crate) fn build_progress<'a>(submissions: impl Iterator<Item = &'a Value>) -> Vec<ActivityProgress> {
    let mut saved: HashMap<&str, Option<String>> = HashMap::new();
    for data in submissions {
        if let Some(activity) = data.get("activity").and_then(Value::as_str) {
            let last = data
                .get("lastSubmitted")
                .and_then(Value::as_str)
                .map(str::to_owned);
            saved.insert(activity, last);
        }
    }
    Activity::ALL
        .into_iter()
        .map(|activity| {
            let entry = saved.get(activity.as_str());
            ActivityProgress {
                activity,
                label: activity.label(),
                submitted: entry.is_some(),
                last_submitted: entry.cloned().flatten(),
            }
        })
        .collect()
}

/// Check that a submission exists and belongs to `student_id`.
///
/// # Errors
///
/// Returns `NotFound` for an unknown submission and `Forbidden` when it
/// belongs to someone else.
pub async fn ensure_owner(pool: &PgPool, student_id: &str, submission_id: &str) -> Result<(), SubmissionError> {
    let current = document::get(pool, SUBMISSIONS, submission_id)
        .await?
        .ok_or_else(|| SubmissionError::NotFound(submission_id.to_owned()))?;
    if current.get("studentId").and_then(Value::as_str) != Some(student_id) {
        return Err(SubmissionError::Forbidden);
    }
    Ok(())
}

/// Store AI feedback on a submission.
///
/// # Errors
///
/// Returns a storage error if the write fails.
pub async fn attach_feedback(pool: &PgPool, submission_id: &str, feedback: &str) -> Result<(), SubmissionError> {
    document::merge(pool, SUBMISSIONS, submission_id, &json!({ "feedback": feedback })).await?;
    info!(submission_id = %submission_id, "submission: feedback stored");
    Ok(())
}

// =============================================================================
// TEACHER OPERATIONS
// =============================================================================

/// All submissions for one activity, joined with group names.
///
/// # Errors
///
/// Returns a storage error if a query fails.
pub async fn list_for_activity(
    pool: &PgPool,
    chapter_id: &str,
    activity: Activity,
) -> Result<Vec<SubmissionRow>, SubmissionError> {
    let filter = json!({ "chapterId": chapter_id, "activity": activity });
    let submissions = document::find_matching(pool, SUBMISSIONS, &filter).await?;
    let groups = load_groups(pool).await?;

    let mut rows: Vec<SubmissionRow> = submissions
        .into_iter()
        .map(|doc| {
            let student_id = doc
                .data
                .get("studentId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let group = groups.get(&student_id);
            SubmissionRow {
                id: doc.id,
                class_name: group.map(|g| g.class_name.clone()),
                group_name: group.map(|g| g.group_name.clone()),
                members: group.map(|g| g.members.clone()).unwrap_or_default(),
                student_id,
                data: doc.data,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.group_name.cmp(&b.group_name))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(rows)
}

/// Write teacher scores onto a submission. Returns the stored scores, their
/// total and, for the presentation activity, the rubric maximum.
///
/// # Errors
///
/// Returns `Invalid` for negative or non-finite scores and for scores above
/// the rubric maximum of a presentation criterion, `NotFound` for an
/// unknown submission.
pub async fn grade(
    pool: &PgPool,
    submission_id: &str,
    scores: BTreeMap<String, f64>,
) -> Result<GradeResult, SubmissionError> {
    validate_scores(&scores)?;
    let current = document::get(pool, SUBMISSIONS, submission_id)
        .await?
        .ok_or_else(|| SubmissionError::NotFound(submission_id.to_owned()))?;

    let activity = current
        .get("activity")
        .and_then(Value::as_str)
        .and_then(Activity::parse);
    let chapter_id = current.get("chapterId").and_then(Value::as_str);
    let mut possible = None;
    if let (Some(Activity::Mempresentasikan), Some(chapter_id)) = (activity, chapter_id) {
        let rubric = chapter::rubric(pool, chapter_id, Activity::Mempresentasikan).await?;
        check_against_rubric(&scores, &rubric)?;
        possible = (!rubric.is_empty()).then(|| rubric_max(&rubric));
    }

    let stored = document::merge(pool, SUBMISSIONS, submission_id, &json!({ "scores": scores })).await?;
    let scores = read_scores(&stored);
    let total: f64 = scores.values().sum();
    info!(submission_id = %submission_id, total, "submission: graded");
    Ok(GradeResult { scores, total, possible })
}

pub(crate) fn validate_scores(scores: &BTreeMap<String, f64>) -> Result<(), SubmissionError> {
    if scores.keys().any(|k| k.trim().is_empty()) {
        return Err(SubmissionError::Invalid("Kriteria nilai tidak boleh kosong.".into()));
    }
    if scores.values().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(SubmissionError::Invalid("Nilai harus berupa angka dan tidak boleh negatif.".into()));
    }
    Ok(())
}

pub(crate) fn check_against_rubric(
    scores: &BTreeMap<String, f64>,
    rubric: &[RubricItem],
) -> Result<(), SubmissionError> {
    for (criterion, value) in scores {
        if let Some(item) = rubric.iter().find(|r| &r.criterion == criterion) {
            if *value > item.max_score {
                return Err(SubmissionError::Invalid(format!(
                    "Nilai {criterion} melebihi skor maksimal {}.",
                    item.max_score
                )));
            }
        }
    }
    Ok(())
}

fn read_scores(data: &Value) -> BTreeMap<String, f64> {
    data.get("scores")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

/// Score shown for one submission: teacher total when graded, else the
/// automatic score, else nothing.
#[must_use]
pub fn effective_score(data: &Value) -> Option<f64> {
    let scores = read_scores(data);
    if !scores.is_empty() {
        return Some(scores.values().sum());
    }
    data.get("autoScore")
        .and_then(|s| serde_json::from_value::<Score>(s.clone()).ok())
        .map(|s| s.earned)
}

/// Per-group score table for a chapter.
///
/// # Errors
///
/// Returns `ChapterNotFound` when the chapter does not exist.
pub async fn recap(pool: &PgPool, chapter_id: &str) -> Result<Vec<RecapRow>, SubmissionError> {
    if document::get(pool, CHAPTERS, chapter_id).await?.is_none() {
        return Err(SubmissionError::ChapterNotFound(chapter_id.to_owned()));
    }
    let mut groups: Vec<Group> = load_groups(pool).await?.into_values().collect();
    group::sort_groups(&mut groups);
    let submissions = document::find_eq(pool, SUBMISSIONS, "chapterId", chapter_id).await?;
    Ok(build_recap(&groups, submissions.iter().map(|d| &d.data)))
}

pub(crate) fn build_recap<'a>(groups: &[Group], submissions: impl Iterator<Item = &'a Value>) -> Vec<RecapRow> {
    let mut by_group: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
    for data in submissions {
        let student = data.get("studentId").and_then(Value::as_str);
        let activity = data.get("activity").and_then(Value::as_str);
        if let (Some(student), Some(activity), Some(score)) = (student, activity, effective_score(data)) {
            by_group
                .entry(student)
                .or_default()
                .insert(activity, score);
        }
    }

    groups
        .iter()
        .map(|group| {
            let scored = by_group.get(group.id.as_str());
            let activities: BTreeMap<&'static str, Option<f64>> = Activity::ALL
                .into_iter()
                .map(|a| (a.as_str(), scored.and_then(|s| s.get(a.as_str()).copied())))
                .collect();
            let total: f64 = activities.values().flatten().sum();
            RecapRow {
                group_id: group.id.clone(),
                class_name: group.class_name.clone(),
                group_name: group.group_name.clone(),
                activities,
                total,
            }
        })
        .collect()
}

async fn load_groups(pool: &PgPool) -> Result<HashMap<String, Group>, SubmissionError> {
    let docs = document::list(pool, GROUPS).await?;
    Ok(docs
        .into_iter()
        .map(|doc| {
            let group = Group::from_document(doc);
            (group.id.clone(), group)
        })
        .collect())
}

#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;
