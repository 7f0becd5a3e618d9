//! Identity provider — managed email/password accounts.
//!
//! DESIGN
//! ======
//! Password storage and verification are delegated to a hosted identity
//! service (Identity Toolkit REST API). This module only forwards sign-up
//! and sign-in calls and turns the provider's error strings into
//! [`IdentityError`] variants the route layer can localize.
//!
//! The [`IdentityProvider`] trait is the seam for tests: route and service
//! tests plug in a mock instead of talking to the network.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("email already exists")]
    EmailExists,
    #[error("weak password")]
    WeakPassword,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("too many attempts")]
    TooManyAttempts,
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("identity request failed: {0}")]
    Request(String),
}

impl crate::error::ErrorCode for IdentityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmailExists => "E_EMAIL_EXISTS",
            Self::WeakPassword => "E_WEAK_PASSWORD",
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::TooManyAttempts => "E_TOO_MANY_ATTEMPTS",
            Self::Provider(_) => "E_IDENTITY_PROVIDER",
            Self::Request(_) => "E_IDENTITY_REQUEST",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::TooManyAttempts | Self::Request(_))
    }
}

/// Account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAccount {
    /// Provider-assigned user id; also the key of the user's documents.
    pub uid: String,
    pub email: String,
}

/// Identity provider configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_key: String,
    pub base_url: String,
}

impl IdentityConfig {
    /// Load from `IDENTITY_API_KEY` and optional `IDENTITY_BASE_URL`.
    /// Returns `None` if the key is missing (auth will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("IDENTITY_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = std::env::var("IDENTITY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Some(Self { api_key, base_url })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Provider-neutral account operations. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new email/password account.
    ///
    /// # Errors
    ///
    /// Returns `EmailExists`, `WeakPassword`, `InvalidEmail` or a provider error.
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityAccount, IdentityError>;

    /// Verify an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials`, `TooManyAttempts` or a provider error.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityAccount, IdentityError>;
}

// =============================================================================
// IDENTITY TOOLKIT CLIENT
// =============================================================================

pub struct ToolkitIdentity {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl ToolkitIdentity {
    /// # Errors
    ///
    /// Returns a request error if the HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> Result<IdentityAccount, IdentityError> {
        let url = format!("{}/accounts:{method}", self.config.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error_body(&body));
        }
        parse_account(&body)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ToolkitIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityAccount, IdentityError> {
        self.call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityAccount, IdentityError> {
        self.call("signInWithPassword", email, password).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_account(body: &str) -> Result<IdentityAccount, IdentityError> {
    let parsed: AccountResponse =
        serde_json::from_str(body).map_err(|_| IdentityError::Provider(format!("unexpected response: {body}")))?;
    Ok(IdentityAccount { uid: parsed.local_id, email: parsed.email })
}

fn parse_error_body(body: &str) -> IdentityError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => map_provider_message(&envelope.error.message),
        Err(_) => IdentityError::Provider(body.to_owned()),
    }
}

/// Map a provider error string (e.g. `"WEAK_PASSWORD : Password should be at
/// least 6 characters"`) to an [`IdentityError`].
pub(crate) fn map_provider_message(message: &str) -> IdentityError {
    let code = message.split(" : ").next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "INVALID_EMAIL" | "MISSING_EMAIL" => IdentityError::InvalidEmail,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" | "MISSING_PASSWORD" => {
            IdentityError::InvalidCredentials
        }
        c if c.starts_with("WEAK_PASSWORD") => IdentityError::WeakPassword,
        c if c.starts_with("TOO_MANY_ATTEMPTS_TRY_LATER") => IdentityError::TooManyAttempts,
        _ => IdentityError::Provider(message.to_owned()),
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
