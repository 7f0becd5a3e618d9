//! Document service — keyed JSON documents with merge-writes.
//!
//! DESIGN
//! ======
//! Chapters, groups and submissions are loosely-typed JSON bodies addressed
//! by `(collection, id)`. There is no schema and no referential integrity:
//! a submission may point at a chapter that no longer exists.
//!
//! Merge-writes follow document-database semantics: nested objects merge
//! key by key, every other value (arrays included) replaces what was there.
//! A single merge is read-modify-write under `FOR UPDATE`; concurrent
//! writers are last-write-wins at document granularity.

use serde_json::{Map, Value};
use sqlx::PgPool;

pub const CHAPTERS: &str = "chapters";
pub const GROUPS: &str = "groups";
pub const SUBMISSIONS: &str = "submissions";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document body must be a JSON object")]
    NotAnObject,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for DocumentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "E_DOCUMENT_NOT_OBJECT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// A stored document with its key.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

// =============================================================================
// MERGE
// =============================================================================

/// Merge `patch` into `target`. Objects recurse; anything else replaces.
/// A non-object `target` is replaced wholesale by an object patch.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                let nested = value.is_object() && dst.get(key).is_some_and(Value::is_object);
                if !nested {
                    dst.insert(key.clone(), value.clone());
                } else if let Some(existing) = dst.get_mut(key) {
                    deep_merge(existing, value);
                }
            }
        }
        (dst, src) => *dst = src.clone(),
    }
}

/// Build `{ field: value }` for equality filters.
#[must_use]
pub fn eq_filter(field: &str, value: impl Into<Value>) -> Value {
    let mut map = Map::new();
    map.insert(field.to_owned(), value.into());
    Value::Object(map)
}

// =============================================================================
// CRUD
// =============================================================================

/// Fetch one document by key.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get(pool: &PgPool, collection: &str, id: &str) -> Result<Option<Value>, DocumentError> {
    let data = sqlx::query_scalar::<_, Value>("SELECT data FROM documents WHERE collection = $1 AND id = $2")
        .bind(collection)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(data)
}

/// Create or fully replace a document.
///
/// # Errors
///
/// Returns `NotAnObject` for non-object bodies, or a database error.
pub async fn set(pool: &PgPool, collection: &str, id: &str, data: &Value) -> Result<(), DocumentError> {
    if !data.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    sqlx::query(
        r"INSERT INTO documents (collection, id, data)
          VALUES ($1, $2, $3)
          ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
    )
    .bind(collection)
    .bind(id)
    .bind(data)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a document only if the key is free. Returns `false` when taken.
///
/// # Errors
///
/// Returns `NotAnObject` for non-object bodies, or a database error.
pub async fn create(pool: &PgPool, collection: &str, id: &str, data: &Value) -> Result<bool, DocumentError> {
    if !data.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    let result = sqlx::query(
        r"INSERT INTO documents (collection, id, data)
          VALUES ($1, $2, $3)
          ON CONFLICT (collection, id) DO NOTHING",
    )
    .bind(collection)
    .bind(id)
    .bind(data)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Merge-write `patch` into a document, creating it if absent.
/// Returns the stored body after the merge.
///
/// # Errors
///
/// Returns `NotAnObject` for non-object patches, or a database error.
pub async fn merge(pool: &PgPool, collection: &str, id: &str, patch: &Value) -> Result<Value, DocumentError> {
    if !patch.is_object() {
        return Err(DocumentError::NotAnObject);
    }

    let mut tx = pool.begin().await?;
    let current = sqlx::query_scalar::<_, Value>(
        "SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
    )
    .bind(collection)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let mut data = current.unwrap_or_else(|| Value::Object(Map::new()));
    deep_merge(&mut data, patch);

    sqlx::query(
        r"INSERT INTO documents (collection, id, data)
          VALUES ($1, $2, $3)
          ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
    )
    .bind(collection)
    .bind(id)
    .bind(&data)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(data)
}

/// Delete a document. Returns whether one existed.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete(pool: &PgPool, collection: &str, id: &str) -> Result<bool, DocumentError> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
        .bind(collection)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List every document in a collection, ordered by key.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list(pool: &PgPool, collection: &str) -> Result<Vec<Document>, DocumentError> {
    let rows = sqlx::query_as::<_, (String, Value)>(
        "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id ASC",
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id, data)| Document { id, data }).collect())
}

/// List documents whose body contains every top-level field of `filter`.
///
/// # Errors
///
/// Returns `NotAnObject` for non-object filters, or a database error.
pub async fn find_matching(pool: &PgPool, collection: &str, filter: &Value) -> Result<Vec<Document>, DocumentError> {
    if !filter.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    let rows = sqlx::query_as::<_, (String, Value)>(
        "SELECT id, data FROM documents WHERE collection = $1 AND data @> $2 ORDER BY id ASC",
    )
    .bind(collection)
    .bind(filter)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id, data)| Document { id, data }).collect())
}

/// Equality filter on a single field (`studentId == X`).
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_eq(
    pool: &PgPool,
    collection: &str,
    field: &str,
    value: impl Into<Value>,
) -> Result<Vec<Document>, DocumentError> {
    find_matching(pool, collection, &eq_filter(field, value)).await
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
