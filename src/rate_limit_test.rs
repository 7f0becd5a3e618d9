use super::*;

fn limiter(per_user: usize, global: usize) -> RateLimiter {
    RateLimiter::new(RateLimitConfig {
        per_user_limit: per_user,
        per_user_window: Duration::from_secs(60),
        global_limit: global,
        global_window: Duration::from_secs(60),
    })
}

#[test]
fn per_user_allows_up_to_limit() {
    let rl = limiter(3, 100);
    let now = Instant::now();

    for i in 0..3 {
        assert!(rl.check_and_record_at("kelompok-1", now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at("kelompok-1", now),
        Err(RateLimitError::PerUserExceeded { limit: 3, window_secs: 60 })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = limiter(100, 4);
    let now = Instant::now();

    for i in 0..4 {
        assert!(rl.check_and_record_at(&format!("user-{i}"), now).is_ok());
    }
    assert!(matches!(
        rl.check_and_record_at("user-late", now),
        Err(RateLimitError::GlobalExceeded { limit: 4, .. })
    ));
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = limiter(2, 100);
    let start = Instant::now();

    rl.check_and_record_at("u", start).unwrap();
    rl.check_and_record_at("u", start).unwrap();
    assert!(rl.check_and_record_at("u", start).is_err());

    let after_window = start + Duration::from_secs(60) + Duration::from_millis(1);
    assert!(rl.check_and_record_at("u", after_window).is_ok());
}

#[test]
fn distinct_users_do_not_interfere() {
    let rl = limiter(1, 100);
    let now = Instant::now();

    rl.check_and_record_at("a", now).unwrap();
    assert!(rl.check_and_record_at("a", now).is_err());
    assert!(rl.check_and_record_at("b", now).is_ok());
}

#[test]
fn rejected_request_is_not_recorded() {
    let rl = limiter(1, 2);
    let now = Instant::now();

    rl.check_and_record_at("a", now).unwrap();
    assert!(rl.check_and_record_at("a", now).is_err());
    // Global still has room for one more because the rejection was not counted.
    assert!(rl.check_and_record_at("b", now).is_ok());
}

#[test]
fn clones_share_state() {
    let rl = limiter(1, 100);
    let clone = rl.clone();
    let now = Instant::now();

    rl.check_and_record_at("a", now).unwrap();
    assert!(clone.check_and_record_at("a", now).is_err());
}

#[test]
fn default_config_values() {
    let cfg = RateLimitConfig::default();
    assert_eq!(cfg.per_user_limit, 10);
    assert_eq!(cfg.global_limit, 60);
    assert_eq!(cfg.per_user_window, Duration::from_secs(60));
}

#[test]
fn idle_users_are_forgotten() {
    let rl = limiter(5, 100);
    let start = Instant::now();

    rl.check_and_record_at("a", start).unwrap();
    rl.check_and_record_at("b", start).unwrap();
    assert_eq!(rl.tracked_users(), 2);

    let later = start + Duration::from_secs(61);
    rl.check_and_record_at("c", later).unwrap();
    assert_eq!(rl.tracked_users(), 1);
}
