//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the process config, and the optional
//! external providers. A provider is `None` when its env vars are missing;
//! routes that need it answer 503 instead of failing at startup.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;
use crate::services::identity::IdentityProvider;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    /// Identity provider. `None` if `IDENTITY_API_KEY` is not configured.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// In-memory rate limiter for AI feedback requests.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        identity: Option<Arc<dyn IdentityProvider>>,
        llm: Option<Arc<dyn LlmChat>>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self { pool, config: Arc::new(config), identity, llm, rate_limiter }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
