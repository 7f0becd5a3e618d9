use super::*;
use crate::error::ErrorCode;
use crate::state::test_helpers::{self, MockIdentity};

fn register(email: &str, password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest { email: email.into(), password: password.into(), confirm_password: confirm.into() }
}

// =============================================================================
// RegisterRequest validation
// =============================================================================

#[test]
fn register_accepts_gmail() {
    assert!(register("guru.bahasa@gmail.com", "rahasia1", "rahasia1").validate().is_ok());
}

#[test]
fn register_gmail_check_is_case_insensitive() {
    assert!(register("Guru@GMAIL.com", "rahasia1", "rahasia1").validate().is_ok());
}

#[test]
fn register_rejects_non_gmail_address() {
    let errors = register("guru@sekolah.sch.id", "rahasia1", "rahasia1")
        .validate()
        .unwrap_err();
    assert!(errors.field_errors().contains_key("email"));
    assert_eq!(crate::error::validation_message(&errors), "Gunakan alamat email @gmail.com.");
}

#[test]
fn register_rejects_short_password() {
    let errors = register("guru@gmail.com", "123", "123").validate().unwrap_err();
    assert!(errors.field_errors().contains_key("password"));
}

#[test]
fn register_rejects_mismatched_confirmation() {
    let errors = register("guru@gmail.com", "rahasia1", "rahasia2")
        .validate()
        .unwrap_err();
    assert_eq!(crate::error::validation_message(&errors), "Konfirmasi kata sandi tidak cocok.");
}

#[test]
fn register_request_reads_camel_case() {
    let req: RegisterRequest =
        serde_json::from_str(r#"{"email":"a@gmail.com","password":"abcdef","confirmPassword":"abcdef"}"#).unwrap();
    assert_eq!(req.confirm_password, "abcdef");
}

#[test]
fn validate_gmail_direct() {
    assert!(validate_gmail("x@gmail.com").is_ok());
    assert!(validate_gmail("x@gmail.com.evil.org").is_err());
    assert!(validate_gmail("x@yahoo.com").is_err());
}

#[test]
fn login_requires_password() {
    let req = LoginRequest { email: "kelompok@gmail.com".into(), password: String::new() };
    assert!(req.validate().is_err());
}

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  Guru@Gmail.COM "), "guru@gmail.com");
}

// =============================================================================
// flows — provider failures short-circuit before any database access
// =============================================================================

#[tokio::test]
async fn register_surfaces_email_exists() {
    let state = test_helpers::test_app_state();
    let identity = MockIdentity::failing_sign_up(IdentityError::EmailExists);
    let req = register("guru@gmail.com", "rahasia1", "rahasia1");

    let err = register_teacher(&state.pool, &identity, &req, 30).await.unwrap_err();
    assert!(matches!(err, AuthError::Identity(IdentityError::EmailExists)));
    assert_eq!(err.error_code(), "E_EMAIL_EXISTS");
    assert_eq!(identity.sign_up_calls(), 1);
}

#[tokio::test]
async fn register_sends_normalized_email() {
    let state = test_helpers::test_app_state();
    let identity = MockIdentity::failing_sign_up(IdentityError::WeakPassword);
    let req = register("  GURU@gmail.com", "rahasia1", "rahasia1");

    let _ = register_teacher(&state.pool, &identity, &req, 30).await;
    assert_eq!(identity.last_email().as_deref(), Some("guru@gmail.com"));
}

#[tokio::test]
async fn sign_in_surfaces_invalid_credentials() {
    let state = test_helpers::test_app_state();
    let identity = MockIdentity::failing_sign_in(IdentityError::InvalidCredentials);
    let req = LoginRequest { email: "guru@gmail.com".into(), password: "salah".into() };

    let err = sign_in(&state.pool, &identity, &req, 30).await.unwrap_err();
    assert!(matches!(err, AuthError::Identity(IdentityError::InvalidCredentials)));
}
