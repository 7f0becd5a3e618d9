//! Auth routes — registration, login, session cookie, role extractors.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use time::Duration;
use tracing::warn;
use validator::Validate;

use crate::error::ApiError;
use crate::services::account::{Role, UserRow};
use crate::services::auth::{self as auth_svc, LoginRequest, RegisterRequest};
use crate::services::session::{self, SessionUser};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError::unauthenticated());
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

/// Signed-in teacher. Other roles get 403.
pub struct TeacherUser(pub SessionUser);

impl<S> FromRequestParts<S> for TeacherUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        require_role(auth.user, Role::Guru).map(Self)
    }
}

/// Signed-in student group. Other roles get 403.
pub struct StudentUser(pub SessionUser);

impl<S> FromRequestParts<S> for StudentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        require_role(auth.user, Role::Siswa).map(Self)
    }
}

pub(crate) fn require_role(user: SessionUser, role: Role) -> Result<SessionUser, ApiError> {
    if user.role == role {
        Ok(user)
    } else {
        warn!(user_id = %user.id, role = user.role.as_str(), required = role.as_str(), "auth: role rejected");
        Err(ApiError::forbidden())
    }
}

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(token: String, secure: bool, ttl_days: i32) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(i64::from(ttl_days)))
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Signed-in user as the portal sees it, with the role's landing page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub home: &'static str,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self { home: row.role.home_path(), id: row.id, email: row.email, display_name: row.display_name, role: row.role }
    }
}

impl From<SessionUser> for UserResponse {
    fn from(user: SessionUser) -> Self {
        Self { home: user.home(), id: user.id, email: user.email, display_name: user.display_name, role: user.role }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/register` — create a teacher account and sign in.
pub async fn register(
    State(state): State<AppState>,
    Json(mut req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.email = auth_svc::normalize_email(&req.email);
    req.validate()?;
    let identity = state.identity.as_deref().ok_or_else(ApiError::not_configured)?;

    let ttl = state.config.session_ttl_days;
    let (user, token) = auth_svc::register_teacher(&state.pool, identity, &req, ttl).await?;
    let jar = CookieJar::new().add(session_cookie(token, state.config.cookie_secure, ttl));
    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}

/// `POST /api/auth/login` — verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(mut req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.email = auth_svc::normalize_email(&req.email);
    req.validate()?;
    let identity = state.identity.as_deref().ok_or_else(ApiError::not_configured)?;

    let ttl = state.config.session_ttl_days;
    let (user, token) = auth_svc::sign_in(&state.pool, identity, &req, ttl).await?;
    let jar = CookieJar::new().add(session_cookie(token, state.config.cookie_secure, ttl));
    Ok((jar, Json(UserResponse::from(user))))
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(auth.user.into())
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        warn!(error = %e, user_id = %auth.user.id, "auth: session delete failed");
    }

    let jar = CookieJar::new().add(cleared_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
