use super::*;
use validator::Validate;

#[derive(Validate)]
struct Form {
    #[validate(length(min = 1, message = "Nama kelas wajib diisi."))]
    class_name: String,
    #[validate(length(min = 1))]
    group_name: String,
}

#[test]
fn validation_message_prefers_custom_message() {
    let form = Form { class_name: String::new(), group_name: "Kelompok 1".into() };
    let errors = form.validate().unwrap_err();
    assert_eq!(validation_message(&errors), "Nama kelas wajib diisi.");
}

#[test]
fn validation_message_falls_back_when_no_message() {
    let form = Form { class_name: "X".into(), group_name: String::new() };
    let errors = form.validate().unwrap_err();
    assert_eq!(validation_message(&errors), "Data tidak valid.");
}

#[test]
fn validation_errors_become_422() {
    let form = Form { class_name: String::new(), group_name: String::new() };
    let api: ApiError = form.validate().unwrap_err().into();
    assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(api.code, "E_VALIDATION");
}

#[test]
fn identity_errors_map_to_fixed_toasts() {
    let cases = [
        (IdentityError::EmailExists, StatusCode::CONFLICT, MSG_EMAIL_EXISTS),
        (IdentityError::WeakPassword, StatusCode::UNPROCESSABLE_ENTITY, MSG_WEAK_PASSWORD),
        (IdentityError::InvalidCredentials, StatusCode::UNAUTHORIZED, MSG_INVALID_CREDENTIALS),
        (IdentityError::TooManyAttempts, StatusCode::TOO_MANY_REQUESTS, MSG_TOO_MANY_ATTEMPTS),
    ];
    for (err, status, message) in cases {
        let api = ApiError::from(err);
        assert_eq!(api.status, status);
        assert_eq!(api.message, message);
    }
}

#[test]
fn unknown_provider_error_falls_back_to_generic() {
    let api = ApiError::from(IdentityError::Provider("OPERATION_NOT_ALLOWED".into()));
    assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api.message, MSG_GENERIC);
    assert_eq!(api.code, "E_IDENTITY_PROVIDER");
}

#[test]
fn unknown_account_reads_as_bad_credentials() {
    let api = ApiError::from(AuthError::UnknownAccount("uid".into()));
    assert_eq!(api.status, StatusCode::UNAUTHORIZED);
    assert_eq!(api.message, MSG_INVALID_CREDENTIALS);
}

#[test]
fn chapter_errors_map_to_statuses() {
    assert_eq!(ApiError::from(ChapterError::NotFound("bab-9".into())).status, StatusCode::NOT_FOUND);
    assert_eq!(ApiError::from(ChapterError::AlreadyExists("bab-1".into())).status, StatusCode::CONFLICT);
    let invalid = ApiError::from(ChapterError::Invalid("Judul wajib diisi.".into()));
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid.message, "Judul wajib diisi.");
}

#[test]
fn submission_forbidden_maps_to_403() {
    assert_eq!(ApiError::from(SubmissionError::Forbidden).status, StatusCode::FORBIDDEN);
}

#[test]
fn llm_failure_is_bad_gateway() {
    let api = ApiError::from(LlmError::ApiResponse { status: 500, body: "boom".into() });
    assert_eq!(api.status, StatusCode::BAD_GATEWAY);
    assert_eq!(api.message, MSG_FEEDBACK_FAILED);
}

#[tokio::test]
async fn into_response_renders_code_and_message() {
    let response = ApiError::forbidden().into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "E_FORBIDDEN");
    assert_eq!(body["message"], MSG_FORBIDDEN);
}

#[test]
fn retry_hint_follows_the_source_error() {
    let limited = ApiError::from(RateLimitError::PerUserExceeded { limit: 10, window_secs: 60 });
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.retryable);

    assert!(ApiError::from(IdentityError::TooManyAttempts).retryable);
    assert!(!ApiError::from(IdentityError::EmailExists).retryable);
    assert!(ApiError::from(LlmError::ApiResponse { status: 503, body: String::new() }).retryable);
    assert!(!ApiError::from(LlmError::ApiResponse { status: 400, body: String::new() }).retryable);
    assert!(ApiError::from(FeedbackError::EmptyResponse).retryable);
    assert!(!ApiError::not_found().retryable);
}

#[tokio::test]
async fn into_response_renders_retry_hint() {
    let response = ApiError::from(RateLimitError::GlobalExceeded { limit: 60, window_secs: 60 }).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "E_RATE_LIMITED");
    assert_eq!(body["retryable"], true);

    let response = ApiError::forbidden().into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["retryable"], false);
}
