//! Chapter service — teacher authoring and student reading of chapters.
//!
//! DESIGN
//! ======
//! A chapter is one document in `chapters`: metadata (`title`,
//! `description`, `order`) plus one free-form section per [`Activity`].
//! Sections are merge-written so a teacher can save one form step at a
//! time. Only the well-known keys are validated:
//!
//! - `videoUrl`: must be a YouTube link; `embedUrl` is derived from it
//! - `statements`: true/false answer key
//! - `rubric`: criteria with a positive `maxScore`
//! - `prompts` / `questions`: non-empty strings
//!
//! Students never see the answer key; `answer` is stripped on read.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::account::Role;
use super::document::{self, CHAPTERS, Document, DocumentError};
use super::scoring::{RubricItem, Statement, strip_answer_key};
use super::youtube::youtube_embed_url;
use crate::error::{ErrorCode, validation_message};

// =============================================================================
// ACTIVITY
// =============================================================================

/// The seven activities of a chapter, in the order students meet them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activity {
    Menyimak,
    Membaca,
    Menulis,
    Mempresentasikan,
    Asesmen,
    Refleksi,
    JurnalMembaca,
}

impl Activity {
    pub const ALL: [Self; 7] = [
        Self::Menyimak,
        Self::Membaca,
        Self::Menulis,
        Self::Mempresentasikan,
        Self::Asesmen,
        Self::Refleksi,
        Self::JurnalMembaca,
    ];

    /// Wire name; also the section key in the chapter document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Menyimak => "menyimak",
            Self::Membaca => "membaca",
            Self::Menulis => "menulis",
            Self::Mempresentasikan => "mempresentasikan",
            Self::Asesmen => "asesmen",
            Self::Refleksi => "refleksi",
            Self::JurnalMembaca => "jurnal-membaca",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == raw)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Menyimak => "Menyimak",
            Self::Membaca => "Membaca",
            Self::Menulis => "Menulis",
            Self::Mempresentasikan => "Mempresentasikan",
            Self::Asesmen => "Asesmen",
            Self::Refleksi => "Refleksi",
            Self::JurnalMembaca => "Jurnal Membaca",
        }
    }

    /// Activities scored automatically against a true/false key.
    #[must_use]
    pub fn has_statements(self) -> bool {
        matches!(self, Self::Menyimak | Self::Membaca | Self::Asesmen)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    #[error("chapter not found: {0}")]
    NotFound(String),
    #[error("chapter already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid chapter data: {0}")]
    Invalid(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ErrorCode for ChapterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CHAPTER_NOT_FOUND",
            Self::AlreadyExists(_) => "E_CHAPTER_EXISTS",
            Self::Invalid(_) => "E_VALIDATION",
            Self::Document(e) => e.error_code(),
        }
    }
}

/// Chapter metadata as listed on the dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub order: Option<i64>,
}

impl ChapterSummary {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc
                .data
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            description: doc
                .data
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_owned),
            order: doc.data.get("order").and_then(Value::as_i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewChapter {
    #[validate(custom(function = "validate_slug"))]
    pub id: Option<String>,
    #[validate(length(min = 1, message = "Judul bab wajib diisi."))]
    pub title: String,
    pub description: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ChapterPatch {
    #[validate(length(min = 1, message = "Judul bab wajib diisi."))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i64>,
}

fn validate_slug(id: &str) -> Result<(), ValidationError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("ID bab hanya boleh berisi huruf kecil, angka, dan tanda hubung.".into()))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// All chapters ordered by `order` (unset last), then id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_chapters(pool: &PgPool) -> Result<Vec<ChapterSummary>, ChapterError> {
    let docs = document::list(pool, CHAPTERS).await?;
    let mut chapters: Vec<ChapterSummary> = docs.iter().map(ChapterSummary::from_document).collect();
    sort_chapters(&mut chapters);
    Ok(chapters)
}

pub(crate) fn sort_chapters(chapters: &mut [ChapterSummary]) {
    chapters.sort_by(|a, b| {
        a.order
            .unwrap_or(i64::MAX)
            .cmp(&b.order.unwrap_or(i64::MAX))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Full chapter document. Students get it without the answer key.
///
/// # Errors
///
/// Returns `NotFound` when the chapter does not exist.
pub async fn get_chapter(pool: &PgPool, id: &str, role: Role) -> Result<Document, ChapterError> {
    let mut data = load(pool, id).await?;
    if role == Role::Siswa {
        for activity in Activity::ALL {
            if let Some(section) = data.get_mut(activity.as_str()) {
                strip_answer_key(section);
            }
        }
    }
    Ok(Document { id: id.to_owned(), data })
}

/// Create a chapter under a caller-supplied slug or a generated UUID.
///
/// # Errors
///
/// Returns `Invalid` for a blank title or a malformed slug, `AlreadyExists`
/// when the id is taken.
pub async fn create_chapter(pool: &PgPool, req: NewChapter) -> Result<ChapterSummary, ChapterError> {
    let req = NewChapter {
        id: trimmed(req.id).filter(|id| !id.is_empty()),
        title: req.title.trim().to_owned(),
        description: trimmed(req.description),
        order: req.order,
    };
    req.validate()
        .map_err(|e| ChapterError::Invalid(validation_message(&e)))?;

    let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut body = Map::new();
    body.insert("title".into(), Value::String(req.title.clone()));
    if let Some(description) = &req.description {
        body.insert("description".into(), Value::String(description.clone()));
    }
    if let Some(order) = req.order {
        body.insert("order".into(), Value::from(order));
    }

    if !document::create(pool, CHAPTERS, &id, &Value::Object(body)).await? {
        return Err(ChapterError::AlreadyExists(id));
    }
    info!(chapter_id = %id, "chapter: created");
    Ok(ChapterSummary { id, title: req.title, description: req.description, order: req.order })
}

/// Merge new metadata into a chapter.
///
/// # Errors
///
/// Returns `Invalid` for a blank title, `NotFound` when the chapter does
/// not exist.
pub async fn update_chapter_meta(pool: &PgPool, id: &str, patch: ChapterPatch) -> Result<ChapterSummary, ChapterError> {
    let patch = ChapterPatch {
        title: trimmed(patch.title),
        description: trimmed(patch.description),
        order: patch.order,
    };
    patch
        .validate()
        .map_err(|e| ChapterError::Invalid(validation_message(&e)))?;
    load(pool, id).await?;

    let mut body = Map::new();
    if let Some(title) = patch.title {
        body.insert("title".into(), Value::String(title));
    }
    if let Some(description) = patch.description {
        body.insert("description".into(), Value::String(description));
    }
    if let Some(order) = patch.order {
        body.insert("order".into(), Value::from(order));
    }

    let data = document::merge(pool, CHAPTERS, id, &Value::Object(body)).await?;
    Ok(ChapterSummary::from_document(&Document { id: id.to_owned(), data }))
}

/// One activity section; `{}` when the teacher has not authored it yet.
///
/// # Errors
///
/// Returns `NotFound` when the chapter does not exist.
pub async fn get_activity(pool: &PgPool, id: &str, activity: Activity, role: Role) -> Result<Value, ChapterError> {
    let data = load(pool, id).await?;
    let mut section = data
        .get(activity.as_str())
        .cloned()
        .unwrap_or_else(|| json!({}));
    if role == Role::Siswa {
        strip_answer_key(&mut section);
    }
    Ok(section)
}

/// Validate and merge-write one activity section. Returns the stored
/// section.
///
/// # Errors
///
/// Returns `Invalid` when a well-known key is malformed, `NotFound` when
/// the chapter does not exist.
pub async fn save_activity(pool: &PgPool, id: &str, activity: Activity, section: Value) -> Result<Value, ChapterError> {
    let section = normalize_section(section)?;
    load(pool, id).await?;

    let patch = json!({ activity.as_str(): section });
    let data = document::merge(pool, CHAPTERS, id, &patch).await?;
    info!(chapter_id = %id, activity = %activity, "chapter: activity saved");
    Ok(data
        .get(activity.as_str())
        .cloned()
        .unwrap_or_else(|| json!({})))
}

/// Delete a chapter. Submissions that reference it are left alone.
///
/// # Errors
///
/// Returns `NotFound` when the chapter does not exist.
pub async fn delete_chapter(pool: &PgPool, id: &str) -> Result<(), ChapterError> {
    if !document::delete(pool, CHAPTERS, id).await? {
        return Err(ChapterError::NotFound(id.to_owned()));
    }
    info!(chapter_id = %id, "chapter: deleted");
    Ok(())
}

/// Answer key of a statement activity; empty when none is authored.
///
/// # Errors
///
/// Returns `NotFound` when the chapter does not exist.
pub async fn answer_key(pool: &PgPool, id: &str, activity: Activity) -> Result<Vec<Statement>, ChapterError> {
    let data = load(pool, id).await?;
    Ok(parse_list(&data, activity, "statements"))
}

/// Rubric of a teacher-graded activity; empty when none is authored.
///
/// # Errors
///
/// Returns `NotFound` when the chapter does not exist.
pub async fn rubric(pool: &PgPool, id: &str, activity: Activity) -> Result<Vec<RubricItem>, ChapterError> {
    let data = load(pool, id).await?;
    Ok(parse_list(&data, activity, "rubric"))
}

async fn load(pool: &PgPool, id: &str) -> Result<Value, ChapterError> {
    document::get(pool, CHAPTERS, id)
        .await?
        .ok_or_else(|| ChapterError::NotFound(id.to_owned()))
}

/// Elements of `data[activity][key]` that parse as `T`; others are skipped.
fn parse_list<T: serde::de::DeserializeOwned>(data: &Value, activity: Activity, key: &str) -> Vec<T> {
    data.get(activity.as_str())
        .and_then(|section| section.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// SECTION VALIDATION
// =============================================================================

/// Check the well-known keys of an activity section and fill in derived
/// values. Unknown keys pass through untouched.
///
/// # Errors
///
/// Returns `Invalid` with the toast text for the first problem found.
pub fn normalize_section(section: Value) -> Result<Value, ChapterError> {
    let Value::Object(mut map) = section else {
        return Err(invalid("Data aktivitas harus berupa objek."));
    };

    if let Some(raw) = map.get("videoUrl") {
        let url = raw
            .as_str()
            .ok_or_else(|| invalid("URL video YouTube tidak valid."))?
            .trim()
            .to_owned();
        let embed = if url.is_empty() {
            String::new()
        } else {
            youtube_embed_url(&url).ok_or_else(|| invalid("URL video YouTube tidak valid."))?
        };
        map.insert("videoUrl".into(), Value::String(url));
        map.insert("embedUrl".into(), Value::String(embed));
    }

    if let Some(raw) = map.get("statements") {
        let statements = parse_statements(raw)?;
        map.insert("statements".into(), serialize(&statements)?);
    }

    if let Some(raw) = map.get("rubric") {
        let rubric = parse_rubric(raw)?;
        map.insert("rubric".into(), serialize(&rubric)?);
    }

    for key in ["prompts", "questions"] {
        if let Some(raw) = map.get(key) {
            let items = parse_text_list(raw)?;
            map.insert(key.into(), Value::from(items));
        }
    }

    Ok(Value::Object(map))
}

fn parse_statements(raw: &Value) -> Result<Vec<Statement>, ChapterError> {
    let items = raw
        .as_array()
        .ok_or_else(|| invalid("Daftar pernyataan tidak valid."))?;
    items
        .iter()
        .map(|item| {
            let mut s: Statement =
                serde_json::from_value(item.clone()).map_err(|_| invalid("Daftar pernyataan tidak valid."))?;
            s.statement = s.statement.trim().to_owned();
            if s.statement.is_empty() {
                return Err(invalid("Pernyataan tidak boleh kosong."));
            }
            if !is_non_negative(s.points) || !is_non_negative(s.evidence_points) {
                return Err(invalid("Poin pernyataan tidak boleh negatif."));
            }
            Ok(s)
        })
        .collect()
}

fn parse_rubric(raw: &Value) -> Result<Vec<RubricItem>, ChapterError> {
    let items = raw
        .as_array()
        .ok_or_else(|| invalid("Rubrik penilaian tidak valid."))?;
    items
        .iter()
        .map(|item| {
            let mut r: RubricItem =
                serde_json::from_value(item.clone()).map_err(|_| invalid("Rubrik penilaian tidak valid."))?;
            r.criterion = r.criterion.trim().to_owned();
            if r.criterion.is_empty() {
                return Err(invalid("Kriteria rubrik tidak boleh kosong."));
            }
            if !(r.max_score.is_finite() && r.max_score > 0.0) {
                return Err(invalid("Skor maksimal rubrik harus lebih dari 0."));
            }
            Ok(r)
        })
        .collect()
}

fn parse_text_list(raw: &Value) -> Result<Vec<String>, ChapterError> {
    let items = raw
        .as_array()
        .ok_or_else(|| invalid("Daftar pertanyaan tidak valid."))?;
    items
        .iter()
        .map(|item| match item.as_str().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_owned()),
            _ => Err(invalid("Pertanyaan tidak boleh kosong.")),
        })
        .collect()
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn serialize<T: Serialize>(value: &T) -> Result<Value, ChapterError> {
    serde_json::to_value(value).map_err(|e| ChapterError::Invalid(e.to_string()))
}

fn invalid(message: &str) -> ChapterError {
    ChapterError::Invalid(message.to_owned())
}

#[cfg(test)]
#[path = "chapter_test.rs"]
mod tests;
