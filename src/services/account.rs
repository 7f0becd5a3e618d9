//! Portal accounts — roles and the `users` table.
//!
//! DESIGN
//! ======
//! The identity provider owns credentials; this table owns the role. A row
//! exists for every teacher (self-registered) and every student group
//! (created by a teacher). `display_name` carries the role string the
//! portal navigation branches on.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Guru,
    Siswa,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guru => "Guru",
            Self::Siswa => "Siswa",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Guru" => Some(Self::Guru),
            "Siswa" => Some(Self::Siswa),
            _ => None,
        }
    }

    /// Landing page for the role.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Guru => "/guru",
            Self::Siswa => "/siswa",
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// Insert a user row for a freshly created identity account.
///
/// # Errors
///
/// Returns a database error if the insert fails (e.g. duplicate email).
pub async fn insert_user(pool: &PgPool, id: &str, email: &str, role: Role) -> Result<UserRow, sqlx::Error> {
    sqlx::query(
        r"INSERT INTO users (id, email, display_name, role)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, display_name = EXCLUDED.display_name, role = EXCLUDED.role",
    )
    .bind(id)
    .bind(email)
    .bind(role.as_str())
    .bind(role.as_str())
    .execute(pool)
    .await?;

    Ok(UserRow { id: id.to_owned(), email: email.to_owned(), display_name: role.as_str().to_owned(), role })
}

/// Look up a user by id. Rows with an unknown role are treated as absent.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_user(pool: &PgPool, id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String, String, String)>(
        "SELECT id, email, display_name, role FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|(id, email, display_name, role)| {
        Role::parse(&role).map(|role| UserRow { id, email, display_name, role })
    }))
}

/// Delete a student group's user row. Teacher rows are never touched.
/// Sessions cascade.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_student(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'Siswa'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Guru, Role::Siswa] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn role_parse_is_exact() {
        assert_eq!(Role::parse("guru"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_home_paths() {
        assert_eq!(Role::Guru.home_path(), "/guru");
        assert_eq!(Role::Siswa.home_path(), "/siswa");
    }

    #[test]
    fn role_serializes_as_display_string() {
        assert_eq!(serde_json::to_string(&Role::Guru).unwrap(), "\"Guru\"");
        assert_eq!(serde_json::to_string(&Role::Siswa).unwrap(), "\"Siswa\"");
    }
}
