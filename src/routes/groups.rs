//! Group routes — teacher management of student group logins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::auth::{AuthUser, TeacherUser};
use crate::services::account::Role;
use crate::services::group::{self, Group, GroupPatch, NewGroup};
use crate::services::session::SessionUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsQuery {
    pub class_name: Option<String>,
}

/// Teachers see every group; a student group only sees itself.
pub(crate) fn can_view_group(user: &SessionUser, group_id: &str) -> bool {
    match user.role {
        Role::Guru => true,
        Role::Siswa => user.id == group_id,
    }
}

/// `GET /api/groups?className=`
pub async fn list_groups(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let class_name = query.class_name.as_deref().map(str::trim).filter(|c| !c.is_empty());
    Ok(Json(group::list_groups(&state.pool, class_name).await?))
}

/// `POST /api/groups` — creates the login and the group document.
pub async fn create_group(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Json(body): Json<NewGroup>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let identity = state.identity.as_deref().ok_or_else(ApiError::not_configured)?;
    let created = group::create_group(&state.pool, identity, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/groups/{id}`
pub async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    if !can_view_group(&auth.user, &id) {
        return Err(ApiError::forbidden());
    }
    Ok(Json(group::get_group(&state.pool, &id).await?))
}

/// `PATCH /api/groups/{id}`
pub async fn update_group(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(id): Path<String>,
    Json(body): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(group::update_group(&state.pool, &id, body).await?))
}

/// `DELETE /api/groups/{id}`
pub async fn delete_group(
    State(state): State<AppState>,
    _teacher: TeacherUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    group::delete_group(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role) -> SessionUser {
        SessionUser { id: id.into(), email: format!("{id}@gmail.com"), display_name: role.as_str().into(), role }
    }

    #[test]
    fn teacher_views_any_group() {
        assert!(can_view_group(&user("guru", Role::Guru), "uid-7"));
    }

    #[test]
    fn student_views_only_itself() {
        assert!(can_view_group(&user("uid-7", Role::Siswa), "uid-7"));
        assert!(!can_view_group(&user("uid-7", Role::Siswa), "uid-8"));
    }
}
