//! Error codes and the HTTP error response.
//!
//! DESIGN
//! ======
//! Services return their own `thiserror` enums. Each implements
//! [`ErrorCode`] for a grepable `E_*` code. The route layer converts them to
//! [`ApiError`], which renders `{ "code", "message", "retryable" }` where
//! `message` is the Indonesian toast text shown to the user and `retryable`
//! tells the client whether sending the same request again may succeed. Only a handful of provider
//! errors get a dedicated message; everything else falls back to the
//! generic failure text.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::llm::types::LlmError;
use crate::rate_limit::RateLimitError;
use crate::services::auth::AuthError;
use crate::services::chapter::ChapterError;
use crate::services::document::DocumentError;
use crate::services::feedback::FeedbackError;
use crate::services::group::GroupError;
use crate::services::identity::IdentityError;
use crate::services::submission::SubmissionError;

/// Grepable error code attached to service errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

pub const MSG_EMAIL_EXISTS: &str = "Email sudah terdaftar.";
pub const MSG_WEAK_PASSWORD: &str = "Kata sandi terlalu lemah (minimal 6 karakter).";
pub const MSG_INVALID_EMAIL: &str = "Format email tidak valid.";
pub const MSG_INVALID_CREDENTIALS: &str = "Email atau kata sandi salah.";
pub const MSG_TOO_MANY_ATTEMPTS: &str = "Terlalu banyak percobaan. Coba lagi nanti.";
pub const MSG_NOT_FOUND: &str = "Data tidak ditemukan.";
pub const MSG_FORBIDDEN: &str = "Anda tidak memiliki akses.";
pub const MSG_UNAUTHENTICATED: &str = "Silakan masuk terlebih dahulu.";
pub const MSG_NOT_CONFIGURED: &str = "Layanan belum dikonfigurasi.";
pub const MSG_RATE_LIMITED: &str = "Terlalu banyak permintaan. Coba lagi sebentar lagi.";
pub const MSG_FEEDBACK_FAILED: &str = "Gagal mendapatkan umpan balik. Silakan coba lagi.";
pub const MSG_CHAPTER_EXISTS: &str = "Bab dengan ID tersebut sudah ada.";
pub const MSG_GENERIC: &str = "Terjadi kesalahan. Silakan coba lagi.";
const MSG_INVALID_DATA: &str = "Data tidak valid.";

// =============================================================================
// API ERROR
// =============================================================================

/// HTTP-facing error: status, code, localized message, retry hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: Cow<'static, str>,
    pub retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, code, message: message.into(), retryable: false }
    }

    #[must_use]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHENTICATED", MSG_UNAUTHENTICATED)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "E_FORBIDDEN", MSG_FORBIDDEN)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "E_NOT_FOUND", MSG_NOT_FOUND)
    }

    #[must_use]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "E_VALIDATION", message)
    }

    #[must_use]
    pub fn not_configured() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "E_NOT_CONFIGURED", MSG_NOT_CONFIGURED)
    }

    /// Log `err` and return the generic failure.
    #[must_use]
    pub fn internal(err: &(impl ErrorCode + ?Sized)) -> Self {
        error!(code = err.error_code(), error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.error_code(), MSG_GENERIC).with_retryable(err.retryable())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "code": self.code, "message": self.message, "retryable": self.retryable });
        (self.status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation(validation_message(&errors))
    }
}

/// First human-readable message in a validation report, in field order.
#[must_use]
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| MSG_INVALID_DATA.to_owned())
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(&DocumentError::Database(err))
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotAnObject => Self::validation(MSG_INVALID_DATA),
            DocumentError::Database(_) => Self::internal(&err),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        let code = err.error_code();
        let retryable = err.retryable();
        let api = match err {
            IdentityError::EmailExists => Self::new(StatusCode::CONFLICT, code, MSG_EMAIL_EXISTS),
            IdentityError::WeakPassword => Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, MSG_WEAK_PASSWORD),
            IdentityError::InvalidEmail => Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, MSG_INVALID_EMAIL),
            IdentityError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, code, MSG_INVALID_CREDENTIALS),
            IdentityError::TooManyAttempts => Self::new(StatusCode::TOO_MANY_REQUESTS, code, MSG_TOO_MANY_ATTEMPTS),
            IdentityError::Provider(_) | IdentityError::Request(_) => Self::internal(&err),
        };
        api.with_retryable(retryable)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Identity(e) => e.into(),
            AuthError::UnknownAccount(_) => {
                Self::new(StatusCode::UNAUTHORIZED, err.error_code(), MSG_INVALID_CREDENTIALS)
            }
            AuthError::Database(_) => Self::internal(&err),
        }
    }
}

impl From<ChapterError> for ApiError {
    fn from(err: ChapterError) -> Self {
        match err {
            ChapterError::NotFound(_) => Self::not_found(),
            ChapterError::AlreadyExists(_) => Self::new(StatusCode::CONFLICT, err.error_code(), MSG_CHAPTER_EXISTS),
            ChapterError::Invalid(message) => Self::validation(message),
            ChapterError::Document(e) => e.into(),
        }
    }
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::NotFound(_) => Self::not_found(),
            GroupError::Invalid(message) => Self::validation(message),
            GroupError::Identity(e) => e.into(),
            GroupError::Document(e) => e.into(),
            GroupError::Database(_) => Self::internal(&err),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::NotFound(_) | SubmissionError::ChapterNotFound(_) => Self::not_found(),
            SubmissionError::Invalid(message) => Self::validation(message),
            SubmissionError::Forbidden => Self::forbidden(),
            SubmissionError::Chapter(e) => e.into(),
            SubmissionError::Document(e) => e.into(),
        }
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        tracing::warn!(error = %err, "rate limited");
        Self::new(StatusCode::TOO_MANY_REQUESTS, err.error_code(), MSG_RATE_LIMITED).with_retryable(err.retryable())
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        error!(code = err.error_code(), error = %err, "llm call failed");
        Self::new(StatusCode::BAD_GATEWAY, err.error_code(), MSG_FEEDBACK_FAILED).with_retryable(err.retryable())
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::Invalid(message) => Self::validation(message),
            FeedbackError::RateLimited(e) => e.into(),
            FeedbackError::Llm(e) => e.into(),
            FeedbackError::EmptyResponse => {
                Self::new(StatusCode::BAD_GATEWAY, err.error_code(), MSG_FEEDBACK_FAILED)
                    .with_retryable(err.retryable())
            }
            FeedbackError::Submission(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
