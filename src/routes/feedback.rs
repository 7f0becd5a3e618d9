//! AI feedback route.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::feedback::{self, FeedbackRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

/// `POST /api/feedback` — 503 when no LLM provider is configured.
pub async fn post_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let llm = state.llm.clone().ok_or_else(ApiError::not_configured)?;
    let feedback = feedback::generate_feedback(&state, llm.as_ref(), &auth.user.id, &body).await?;
    Ok(Json(FeedbackResponse { feedback }))
}
