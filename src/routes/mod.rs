//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under a single Axum router. Role checks
//! live in the extractors from [`auth`]; handlers translate between HTTP
//! and the services.

pub mod auth;
pub mod chapters;
pub mod feedback;
pub mod groups;
pub mod submissions;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/chapters", get(chapters::list_chapters).post(chapters::create_chapter))
        .route(
            "/api/chapters/{id}",
            get(chapters::get_chapter)
                .patch(chapters::update_chapter)
                .delete(chapters::delete_chapter),
        )
        .route(
            "/api/chapters/{id}/activities/{activity}",
            get(chapters::get_activity).put(chapters::save_activity),
        )
        .route(
            "/api/chapters/{id}/activities/{activity}/submissions",
            get(chapters::activity_submissions),
        )
        .route("/api/chapters/{id}/recap", get(chapters::recap))
        .route("/api/chapters/{id}/progress", get(chapters::progress))
        .route("/api/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/api/groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/api/submissions", get(submissions::list_own))
        .route("/api/submissions/{id}/scores", put(submissions::grade))
        .route(
            "/api/submissions/{id}/{activity}",
            get(submissions::get_own).put(submissions::save_own),
        )
        .route("/api/feedback", post(feedback::post_feedback))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
