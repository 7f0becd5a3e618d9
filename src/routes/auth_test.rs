use super::*;

fn user(role: Role) -> SessionUser {
    SessionUser {
        id: "uid-1".into(),
        email: "guru@gmail.com".into(),
        display_name: role.as_str().into(),
        role,
    }
}

#[test]
fn matching_role_passes() {
    let user = require_role(user(Role::Guru), Role::Guru).unwrap();
    assert_eq!(user.id, "uid-1");
}

#[test]
fn other_role_is_forbidden() {
    let err = require_role(user(Role::Siswa), Role::Guru).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
    let err = require_role(user(Role::Guru), Role::Siswa).unwrap_err();
    assert_eq!(err.code, "E_FORBIDDEN");
}

#[test]
fn session_cookie_is_http_only_lax() {
    let cookie = session_cookie("tok".into(), true, 7);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::days(7)));
}

#[test]
fn cleared_cookie_expires_now() {
    let cookie = cleared_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(false));
}

#[test]
fn user_response_carries_home() {
    let body = serde_json::to_value(UserResponse::from(user(Role::Siswa))).unwrap();
    assert_eq!(body["displayName"], "Siswa");
    assert_eq!(body["role"], "Siswa");
    assert_eq!(body["home"], "/siswa");

    let row = UserRow { id: "uid-2".into(), email: "g@gmail.com".into(), display_name: "Guru".into(), role: Role::Guru };
    let body = serde_json::to_value(UserResponse::from(row)).unwrap();
    assert_eq!(body["home"], "/guru");
    assert_eq!(body["id"], "uid-2");
}
