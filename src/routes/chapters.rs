//! Chapter routes — authoring for teachers, reading for everyone signed in.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::routes::auth::{AuthUser, StudentUser, TeacherUser};
use crate::services::chapter::{self, Activity, ChapterPatch, ChapterSummary, NewChapter};
use crate::services::document::Document;
use crate::services::submission::{self, ActivityProgress, RecapRow, SubmissionRow};
use crate::state::AppState;

/// Unknown activity names are treated as missing resources.
pub(crate) fn parse_activity(raw: &str) -> Result<Activity, ApiError> {
    Activity::parse(raw).ok_or_else(ApiError::not_found)
}

/// `GET /api/chapters`
pub async fn list_chapters(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<Vec<ChapterSummary>>, ApiError> {
    Ok(Json(chapter::list_chapters(&state.pool).await?))
}

/// `POST /api/chapters`
pub async fn create_chapter(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Json(body): Json<NewChapter>,
) -> Result<(StatusCode, Json<ChapterSummary>), ApiError> {
    let created = chapter::create_chapter(&state.pool, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/chapters/{id}` — students receive the chapter without answer keys.
pub async fn get_chapter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(chapter::get_chapter(&state.pool, &id, auth.user.role).await?))
}

/// `PATCH /api/chapters/{id}`
pub async fn update_chapter(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(id): Path<String>,
    Json(body): Json<ChapterPatch>,
) -> Result<Json<ChapterSummary>, ApiError> {
    Ok(Json(chapter::update_chapter_meta(&state.pool, &id, body).await?))
}

/// `DELETE /api/chapters/{id}`
pub async fn delete_chapter(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    chapter::delete_chapter(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/chapters/{id}/activities/{activity}`
pub async fn get_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, activity)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let activity = parse_activity(&activity)?;
    Ok(Json(chapter::get_activity(&state.pool, &id, activity, auth.user.role).await?))
}

/// `PUT /api/chapters/{id}/activities/{activity}`
pub async fn save_activity(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path((id, activity)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let activity = parse_activity(&activity)?;
    Ok(Json(chapter::save_activity(&state.pool, &id, activity, body).await?))
}

/// `GET /api/chapters/{id}/activities/{activity}/submissions`
pub async fn activity_submissions(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path((id, activity)): Path<(String, String)>,
) -> Result<Json<Vec<SubmissionRow>>, ApiError> {
    let activity = parse_activity(&activity)?;
    Ok(Json(submission::list_for_activity(&state.pool, &id, activity).await?))
}

/// `GET /api/chapters/{id}/recap`
pub async fn recap(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<RecapRow>>, ApiError> {
    Ok(Json(submission::recap(&state.pool, &id).await?))
}

/// `GET /api/chapters/{id}/progress` — the calling group's progress.
pub async fn progress(
    State(state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ActivityProgress>>, ApiError> {
    Ok(Json(submission::progress(&state.pool, &student.id, &id).await?))
}
