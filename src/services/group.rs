//! Group service — shared student logins managed by teachers.
//!
//! DESIGN
//! ======
//! A group is one identity-provider account shared by a team of students.
//! Creating one registers the account, inserts a `Siswa` row in `users`,
//! and writes the group document under the new uid. The uid therefore ties
//! the login, the group document and the group's submissions together.
//!
//! Deleting a group removes the document and the portal account (sessions
//! cascade). The provider account stays; without a portal row it can no
//! longer sign in to the portal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use super::account::{self, Role};
use super::document::{self, Document, DocumentError, GROUPS};
use super::identity::{IdentityError, IdentityProvider};
use crate::error::{ErrorCode, validation_message};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("group not found: {0}")]
    NotFound(String),
    #[error("invalid group data: {0}")]
    Invalid(String),
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for GroupError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_GROUP_NOT_FOUND",
            Self::Invalid(_) => "E_VALIDATION",
            Self::Identity(e) => e.error_code(),
            Self::Document(e) => e.error_code(),
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// A group as returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    pub class_name: String,
    pub group_name: String,
    pub email: String,
    pub members: Vec<String>,
}

impl Group {
    pub(crate) fn from_document(doc: Document) -> Self {
        let mut group: Self = serde_json::from_value(doc.data).unwrap_or_default();
        group.id = doc.id;
        group
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    #[validate(length(min = 1, message = "Nama kelas wajib diisi."))]
    pub class_name: String,
    #[validate(length(min = 1, message = "Nama kelompok wajib diisi."))]
    pub group_name: String,
    #[validate(email(message = "Format email tidak valid."))]
    pub email: String,
    #[validate(length(min = 6, message = "Kata sandi minimal 6 karakter."))]
    pub password: String,
    #[validate(custom(function = "validate_members"))]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[validate(length(min = 1, message = "Nama kelas wajib diisi."))]
    pub class_name: Option<String>,
    #[validate(length(min = 1, message = "Nama kelompok wajib diisi."))]
    pub group_name: Option<String>,
    #[validate(custom(function = "validate_members"))]
    pub members: Option<Vec<String>>,
}

fn validate_members(members: &[String]) -> Result<(), ValidationError> {
    if members.is_empty() {
        return Err(ValidationError::new("members").with_message("Anggota kelompok wajib diisi.".into()));
    }
    if members.iter().any(String::is_empty) {
        return Err(ValidationError::new("members").with_message("Nama anggota tidak boleh kosong.".into()));
    }
    Ok(())
}

/// Trim names and drop repeated members, keeping the first occurrence.
#[must_use]
pub fn normalize_members(members: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(members.len());
    for name in members.iter().map(|m| m.trim()) {
        if !out.iter().any(|existing| existing == name) {
            out.push(name.to_owned());
        }
    }
    out
}

impl NewGroup {
    fn normalized(self) -> Self {
        Self {
            class_name: self.class_name.trim().to_owned(),
            group_name: self.group_name.trim().to_owned(),
            email: self.email.trim().to_ascii_lowercase(),
            password: self.password,
            members: normalize_members(&self.members),
        }
    }
}

impl GroupPatch {
    fn normalized(self) -> Self {
        Self {
            class_name: self.class_name.map(|v| v.trim().to_owned()),
            group_name: self.group_name.map(|v| v.trim().to_owned()),
            members: self.members.as_deref().map(normalize_members),
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Register a group login and store its document.
///
/// # Errors
///
/// Returns `Invalid` before any provider call when the form is malformed,
/// then identity errors (`EmailExists`, ...) or a storage error.
pub async fn create_group(pool: &PgPool, identity: &dyn IdentityProvider, req: NewGroup) -> Result<Group, GroupError> {
    let req = req.normalized();
    req.validate()
        .map_err(|e| GroupError::Invalid(validation_message(&e)))?;

    let created = identity.sign_up(&req.email, &req.password).await?;
    account::insert_user(pool, &created.uid, &created.email, Role::Siswa)
        .await
        .map_err(|e| orphaned(&created.uid, e))?;

    let body = json!({
        "className": req.class_name,
        "groupName": req.group_name,
        "email": created.email,
        "members": req.members,
    });
    document::set(pool, GROUPS, &created.uid, &body)
        .await
        .map_err(|e| orphaned(&created.uid, e))?;
    info!(group_id = %created.uid, class_name = %req.class_name, "group: created");

    Ok(Group {
        id: created.uid,
        class_name: req.class_name,
        group_name: req.group_name,
        email: created.email,
        members: req.members,
    })
}

/// The provider account exists but the portal side failed; the email stays
/// taken until an operator removes `uid` from the provider.
fn orphaned<E: std::fmt::Display>(uid: &str, err: E) -> E {
    error!(uid, error = %err, "group: provider account left without portal data");
    err
}

/// All groups, optionally restricted to one class, ordered by class then
/// group name.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub async fn list_groups(pool: &PgPool, class_name: Option<&str>) -> Result<Vec<Group>, GroupError> {
    let docs = match class_name.map(str::trim).filter(|c| !c.is_empty()) {
        Some(class) => document::find_eq(pool, GROUPS, "className", class).await?,
        None => document::list(pool, GROUPS).await?,
    };
    let mut groups: Vec<Group> = docs.into_iter().map(Group::from_document).collect();
    sort_groups(&mut groups);
    Ok(groups)
}

pub(crate) fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.group_name.cmp(&b.group_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// # Errors
///
/// Returns `NotFound` when no group has this id.
pub async fn get_group(pool: &PgPool, id: &str) -> Result<Group, GroupError> {
    let data = document::get(pool, GROUPS, id)
        .await?
        .ok_or_else(|| GroupError::NotFound(id.to_owned()))?;
    Ok(Group::from_document(Document { id: id.to_owned(), data }))
}

/// Merge new class, group or member names. Email and password are fixed.
///
/// # Errors
///
/// Returns `Invalid` for malformed fields, `NotFound` for an unknown group.
pub async fn update_group(pool: &PgPool, id: &str, patch: GroupPatch) -> Result<Group, GroupError> {
    let patch = patch.normalized();
    patch
        .validate()
        .map_err(|e| GroupError::Invalid(validation_message(&e)))?;
    get_group(pool, id).await?;

    let mut body = Map::new();
    if let Some(class_name) = patch.class_name {
        body.insert("className".into(), Value::String(class_name));
    }
    if let Some(group_name) = patch.group_name {
        body.insert("groupName".into(), Value::String(group_name));
    }
    if let Some(members) = patch.members {
        body.insert("members".into(), Value::from(members));
    }

    let data = document::merge(pool, GROUPS, id, &Value::Object(body)).await?;
    info!(group_id = %id, "group: updated");
    Ok(Group::from_document(Document { id: id.to_owned(), data }))
}

/// Remove the group document and its student account.
///
/// # Errors
///
/// Returns `NotFound` when no group document has this id; nothing is
/// deleted in that case.
pub async fn delete_group(pool: &PgPool, id: &str) -> Result<(), GroupError> {
    if !document::delete(pool, GROUPS, id).await? {
        return Err(GroupError::NotFound(id.to_owned()));
    }
    let had_account = account::delete_student(pool, id).await?;
    info!(group_id = %id, had_account, "group: deleted");
    Ok(())
}

#[cfg(test)]
#[path = "group_test.rs"]
mod tests;
