//! Submission routes — student answers and teacher grading.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::routes::auth::{StudentUser, TeacherUser};
use crate::routes::chapters::parse_activity;
use crate::services::document::Document;
use crate::services::submission::{self, GradeResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GradeBody {
    pub scores: BTreeMap<String, f64>,
}

/// `GET /api/submissions` — every submission of the calling group.
pub async fn list_own(
    State(state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(submission::list_own(&state.pool, &student.id).await?))
}

/// `GET /api/submissions/{chapterId}/{activity}`
pub async fn get_own(
    State(state): State<AppState>,
    StudentUser(student): StudentUser,
    Path((chapter_id, activity)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let activity = parse_activity(&activity)?;
    Ok(Json(submission::get_own(&state.pool, &student.id, &chapter_id, activity).await?))
}

/// `PUT /api/submissions/{chapterId}/{activity}` — merge-save answers.
pub async fn save_own(
    State(state): State<AppState>,
    StudentUser(student): StudentUser,
    Path((chapter_id, activity)): Path<(String, String)>,
    Json(answers): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let activity = parse_activity(&activity)?;
    Ok(Json(submission::save_answers(&state.pool, &student.id, &chapter_id, activity, answers).await?))
}

/// `PUT /api/submissions/{submissionId}/scores`
pub async fn grade(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(submission_id): Path<String>,
    Json(body): Json<GradeBody>,
) -> Result<Json<GradeResult>, ApiError> {
    Ok(Json(submission::grade(&state.pool, &submission_id, body.scores).await?))
}
