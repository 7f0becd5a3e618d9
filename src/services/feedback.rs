//! Feedback service — AI comments on open-ended answers.
//!
//! DESIGN
//! ======
//! One LLM call per request with a fixed Indonesian prompt: the system
//! prompt casts the model as a Bahasa Indonesia teacher, the user message
//! carries the question and the student's answer. No conversation history
//! and no tools. Requests are rate-limited per user and globally before
//! the provider is contacted.
//!
//! When the request names a submission the caller owns, the feedback text
//! is also stored on that submission.

use serde::Deserialize;
use tracing::{info, warn};

use super::submission::{self, SubmissionError};
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

pub const MAX_ANSWER_CHARS: usize = 5000;

const SYSTEM_PROMPT: &str = "Anda adalah guru Bahasa Indonesia yang ramah dan suportif untuk siswa SMP. \
Berikan umpan balik singkat (paling banyak empat kalimat) yang membangun atas jawaban siswa. \
Sebutkan kelebihan jawaban, satu hal yang perlu diperbaiki, dan saran yang konkret. \
Gunakan bahasa Indonesia yang baku tetapi mudah dipahami. \
Jangan menuliskan jawaban lengkap untuk siswa.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("invalid feedback request: {0}")]
    Invalid(String),
    #[error("rate limited: {0}")]
    RateLimited(#[from] RateLimitError),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("LLM returned no text")]
    EmptyResponse,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl ErrorCode for FeedbackError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::RateLimited(e) => e.error_code(),
            Self::Llm(e) => e.error_code(),
            Self::EmptyResponse => "E_EMPTY_FEEDBACK",
            Self::Submission(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::EmptyResponse => true,
            Self::Llm(e) => e.retryable(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub submission_id: Option<String>,
}

// =============================================================================
// PROMPT
// =============================================================================

#[must_use]
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// User message for one question/answer pair.
#[must_use]
pub fn build_feedback_prompt(question: &str, answer: &str) -> String {
    format!(
        "Pertanyaan:\n{question}\n\nJawaban siswa:\n{answer}\n\nBerikan umpan balik untuk jawaban siswa di atas."
    )
}

/// Trimmed question and answer, or the toast for the first problem.
pub(crate) fn validate_request(req: &FeedbackRequest) -> Result<(String, String), FeedbackError> {
    let question = req.question.trim();
    let answer = req.answer.trim();
    if question.is_empty() {
        return Err(FeedbackError::Invalid("Pertanyaan wajib diisi.".into()));
    }
    if answer.is_empty() {
        return Err(FeedbackError::Invalid("Jawaban wajib diisi.".into()));
    }
    if answer.chars().count() > MAX_ANSWER_CHARS {
        return Err(FeedbackError::Invalid(format!("Jawaban maksimal {MAX_ANSWER_CHARS} karakter.")));
    }
    Ok((question.to_owned(), answer.to_owned()))
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Ask the LLM for feedback on one answer.
///
/// # Errors
///
/// Returns `Invalid` for empty or oversized input, `RateLimited` when a
/// window is full, `Llm`/`EmptyResponse` when the provider fails, and
/// submission errors when the named submission is unknown or not the
/// caller's.
pub async fn generate_feedback(
    state: &AppState,
    llm: &dyn LlmChat,
    user_id: &str,
    req: &FeedbackRequest,
) -> Result<String, FeedbackError> {
    let (question, answer) = validate_request(req)?;
    let submission_id = req
        .submission_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if let Some(id) = submission_id {
        submission::ensure_owner(&state.pool, user_id, id).await?;
    }

    state.rate_limiter.check_and_record(user_id)?;

    let messages = [Message::user(build_feedback_prompt(&question, &answer))];
    let response = llm
        .chat(state.config.feedback_max_tokens, SYSTEM_PROMPT, &messages)
        .await?;
    info!(
        user_id,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "feedback: LLM response"
    );

    let feedback = response.text.trim().to_owned();
    if feedback.is_empty() {
        warn!(user_id, "feedback: empty LLM response");
        return Err(FeedbackError::EmptyResponse);
    }

    if let Some(id) = submission_id {
        submission::attach_feedback(&state.pool, id, &feedback).await?;
    }
    Ok(feedback)
}

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;
