mod config;
mod db;
mod error;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::services::identity::{IdentityConfig, IdentityProvider, ToolkitIdentity};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    // Without an identity key, registration and login answer 503.
    let identity: Option<Arc<dyn IdentityProvider>> = match IdentityConfig::from_env() {
        Some(identity_config) => {
            let client = ToolkitIdentity::new(identity_config)?;
            tracing::info!("identity provider initialized");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("IDENTITY_API_KEY not set; sign-in disabled");
            None
        }
    };

    // Initialize LLM client (non-fatal: AI feedback disabled if config missing).
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; AI feedback disabled");
            None
        }
    };

    let rate_limiter = rate_limit::RateLimiter::new(rate_limit::RateLimitConfig::from_env());
    let port = config.port;
    let state = state::AppState::new(pool, config, identity, llm, rate_limiter);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "bahasa-portal listening");
    axum::serve(listener, app).await?;
    Ok(())
}
