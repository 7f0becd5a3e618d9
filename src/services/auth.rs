//! Registration and sign-in on top of the identity provider.
//!
//! Teachers self-register with a Gmail address; student logins are created
//! by teachers through the group service. Both paths end in a session.

use std::borrow::Cow;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use validator::{Validate, ValidationError};

use super::account::{self, Role, UserRow};
use super::identity::{IdentityError, IdentityProvider};
use super::session;
use crate::error::ErrorCode;

const GMAIL_DOMAIN: &str = "@gmail.com";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("no portal account for identity {0}")]
    UnknownAccount(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Identity(e) => e.error_code(),
            Self::UnknownAccount(_) => "E_UNKNOWN_ACCOUNT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Teacher registration form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        email(message = "Format email tidak valid."),
        custom(function = "validate_gmail")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Kata sandi minimal 6 karakter."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Konfirmasi kata sandi tidak cocok."))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Format email tidak valid."))]
    pub email: String,
    #[validate(length(min = 1, message = "Kata sandi wajib diisi."))]
    pub password: String,
}

/// Registration is limited to Gmail addresses.
pub(crate) fn validate_gmail(email: &str) -> Result<(), ValidationError> {
    if email.trim().to_ascii_lowercase().ends_with(GMAIL_DOMAIN) {
        Ok(())
    } else {
        Err(ValidationError::new("gmail").with_message(Cow::Borrowed("Gunakan alamat email @gmail.com.")))
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// =============================================================================
// FLOWS
// =============================================================================

/// Create a teacher account and open a session. The request must already
/// be validated.
///
/// # Errors
///
/// Returns identity errors (`EmailExists`, `WeakPassword`, ...) or a
/// database error.
pub async fn register_teacher(
    pool: &PgPool,
    identity: &dyn IdentityProvider,
    req: &RegisterRequest,
    ttl_days: i32,
) -> Result<(UserRow, String), AuthError> {
    let email = normalize_email(&req.email);
    let created = identity.sign_up(&email, &req.password).await?;
    let user = account::insert_user(pool, &created.uid, &created.email, Role::Guru).await?;
    let token = session::create_session(pool, &user.id, ttl_days).await?;
    info!(user_id = %user.id, "auth: teacher registered");
    Ok((user, token))
}

/// Verify credentials and open a session.
///
/// # Errors
///
/// Returns `InvalidCredentials` from the provider, `UnknownAccount` when the
/// identity has no portal row, or a database error.
pub async fn sign_in(
    pool: &PgPool,
    identity: &dyn IdentityProvider,
    req: &LoginRequest,
    ttl_days: i32,
) -> Result<(UserRow, String), AuthError> {
    let email = normalize_email(&req.email);
    let verified = identity.sign_in(&email, &req.password).await?;
    let user = account::find_user(pool, &verified.uid)
        .await?
        .ok_or_else(|| AuthError::UnknownAccount(verified.uid.clone()))?;
    let token = session::create_session(pool, &user.id, ttl_days).await?;
    info!(user_id = %user.id, role = user.role.as_str(), "auth: signed in");
    Ok((user, token))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
