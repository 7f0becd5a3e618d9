use super::*;

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_CFG_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_CFG_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_case_insensitive_and_trimmed() {
    let key = "__TEST_CFG_CI_311__";
    unsafe { std::env::set_var(key, "  On ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_CFG_INVALID_312__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_CFG_SURELY_UNSET_313__"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u32 = env_parse("__TEST_CFG_NONEXISTENT_314__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_CFG_VALID_315__", " 99 ") };
    let val: u32 = env_parse("__TEST_CFG_VALID_315__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_CFG_VALID_315__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_CFG_INVALID_316__", "lots") };
    let val: u32 = env_parse("__TEST_CFG_INVALID_316__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_CFG_INVALID_316__") };
}

// =============================================================================
// AppConfig
// =============================================================================

#[test]
fn default_config_values() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.session_ttl_days, 30);
    assert_eq!(cfg.feedback_max_tokens, 1024);
    assert!(!cfg.cookie_secure);
}

#[test]
fn config_error_display_names_variable() {
    let err = ConfigError::Invalid { var: "PORT", value: "abc".into() };
    let msg = err.to_string();
    assert!(msg.contains("PORT"));
    assert!(msg.contains("abc"));
    assert!(ConfigError::Missing("DATABASE_URL").to_string().contains("DATABASE_URL"));
}
