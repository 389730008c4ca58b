//! Session lifecycle over a real data directory

use hr_desk::auth::SessionStore;
use hr_desk::db::{FileStore, KvStore, keys};
use shared::error::ErrorCode;
use shared::models::{Credentials, Role, SignupRequest};
use std::sync::Arc;

fn open(dir: &std::path::Path) -> SessionStore {
    let store: Arc<dyn KvStore> = Arc::new(FileStore::open(dir).unwrap());
    SessionStore::open(store).unwrap()
}

fn signup(session: &SessionStore, email: &str, role: Role) {
    session
        .signup(SignupRequest {
            name: "Dana Lee".into(),
            email: email.into(),
            password: "hunter22".into(),
            role,
        })
        .unwrap();
}

#[test]
fn test_signup_login_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let session = open(dir.path());
        signup(&session, "Dana@Example.com", Role::Hr);
        // signup alone does not sign in
        assert!(!session.is_authenticated());

        let info = session
            .login(&Credentials::new(" dana@example.com ", "hunter22"), Role::Hr)
            .unwrap();
        assert_eq!(info.email, "dana@example.com");
    }

    let session = open(dir.path());
    let current = session.current().expect("session restored");
    assert_eq!(current.role, Role::Hr);
    assert_eq!(current.email, "dana@example.com");

    session.logout().unwrap();
    assert!(open(dir.path()).current().is_none());
}

#[test]
fn test_wrong_role_is_rejected_like_a_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(dir.path());
    signup(&session, "dana@example.com", Role::Employee);

    let wrong_role = session
        .login(&Credentials::new("dana@example.com", "hunter22"), Role::Admin)
        .unwrap_err();
    let wrong_password = session
        .login(&Credentials::new("dana@example.com", "hunter23"), Role::Employee)
        .unwrap_err();

    assert_eq!(wrong_role.code, ErrorCode::InvalidCredentials);
    assert_eq!(wrong_password.code, ErrorCode::InvalidCredentials);
    assert!(!session.is_authenticated());
}

#[test]
fn test_reset_password_then_login() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(dir.path());
    signup(&session, "dana@example.com", Role::Manager);

    session.reset_password("DANA@example.com", "brand-new").unwrap();

    let old = session.login(&Credentials::new("dana@example.com", "hunter22"), Role::Manager);
    assert!(old.is_err());
    session
        .login(&Credentials::new("dana@example.com", "brand-new"), Role::Manager)
        .unwrap();

    let err = session.reset_password("ghost@example.com", "whatever").unwrap_err();
    assert_eq!(err.code, ErrorCode::EmailNotFound);
}

#[test]
fn test_passwords_are_not_stored_in_clear() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(dir.path());
    signup(&session, "dana@example.com", Role::Employee);

    let path = dir.path().join(format!("{}.json", keys::IDENTITIES));
    let raw = std::fs::read_to_string(path).unwrap();
    assert!(!raw.contains("hunter22"));
    assert!(raw.contains("$argon2"));
}

#[test]
fn test_dangling_session_pointer_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KvStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    store
        .set(keys::CURRENT_SESSION, r#"{"identity_id":42,"logged_in_at":0}"#)
        .unwrap();

    let session = SessionStore::open(store).unwrap();
    assert!(session.current().is_none());
    assert_eq!(
        session.require_identity().unwrap_err().code,
        ErrorCode::NotAuthenticated
    );
}
