//! SessionStore - 当前登录身份
//!
//! Holds the signed-in identity for the whole application. The pointer to
//! the current identity is persisted under `session.current`, so reopening
//! the same store restores the login. There is no token and no expiry;
//! the session lasts until `logout`.

use super::authenticator::{Authenticator, IdentityDirectory, LocalAuthenticator};
use crate::db::{KvStore, keys};
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{Credentials, IdentityInfo, Role, SignupRequest};
use shared::util::now_millis;
use std::sync::Arc;

/// Persisted session pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurrentSession {
    identity_id: i64,
    logged_in_at: i64,
}

pub struct SessionStore {
    store: Arc<dyn KvStore>,
    directory: IdentityDirectory,
    authenticator: Arc<dyn Authenticator>,
    current: RwLock<Option<IdentityInfo>>,
}

impl SessionStore {
    /// Open the identity collection and restore the persisted session
    pub fn open(store: Arc<dyn KvStore>) -> AppResult<Self> {
        let directory = IdentityDirectory::open(store.clone())?;
        let current = Self::restore(store.as_ref(), &directory);
        let authenticator = Arc::new(LocalAuthenticator::new(directory.clone()));

        Ok(Self {
            store,
            directory,
            authenticator,
            current: RwLock::new(current),
        })
    }

    /// Replace the credential check (e.g. a remote identity provider)
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    fn restore(store: &dyn KvStore, directory: &IdentityDirectory) -> Option<IdentityInfo> {
        let raw = match store.get(keys::CURRENT_SESSION) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session pointer");
                return None;
            }
        };

        let pointer: CurrentSession = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt session pointer, starting logged out");
                return None;
            }
        };

        match directory.get(pointer.identity_id) {
            Some(identity) if identity.is_active() => {
                tracing::info!(identity_id = identity.id, "Session restored");
                Some(IdentityInfo::from(&identity))
            }
            Some(_) => {
                security_log!(
                    WARN,
                    "session_restore_rejected",
                    identity_id = pointer.identity_id,
                    reason = "inactive"
                );
                None
            }
            None => {
                tracing::warn!(
                    identity_id = pointer.identity_id,
                    "Session points at unknown identity"
                );
                None
            }
        }
    }

    /// Sign in with email + password, claiming a role
    ///
    /// A role mismatch is reported exactly like a wrong password.
    pub fn login(&self, credentials: &Credentials, claimed_role: Role) -> AppResult<IdentityInfo> {
        let identity = match self
            .authenticator
            .authenticate(&credentials.email, &credentials.password)
        {
            Ok(identity) => identity,
            Err(e) => {
                security_log!(WARN, "login_failed", email = %credentials.email, code = %e.code);
                return Err(e);
            }
        };

        if identity.role != claimed_role {
            security_log!(
                WARN,
                "login_failed",
                email = %credentials.email,
                claimed_role = %claimed_role
            );
            return Err(AppError::invalid_credentials());
        }

        let pointer = CurrentSession {
            identity_id: identity.id,
            logged_in_at: now_millis(),
        };
        let json = serde_json::to_string(&pointer)
            .map_err(|e| AppError::internal(format!("Failed to encode session: {e}")))?;
        self.store.set(keys::CURRENT_SESSION, &json)?;

        let info = IdentityInfo::from(&identity);
        *self.current.write() = Some(info.clone());

        security_log!(INFO, "login_success", identity_id = info.id, role = %info.role);
        Ok(info)
    }

    /// Register a new identity; the caller stays logged out
    pub fn signup(&self, request: SignupRequest) -> AppResult<IdentityInfo> {
        validate_required_text(&request.name, "name", MAX_NAME_LEN)?;
        validate_email(&request.email, "email")?;
        validate_password(&request.password)?;

        let identity = self.directory.register(
            &request.name,
            &request.email,
            &request.password,
            request.role,
        )?;

        tracing::info!(identity_id = identity.id, role = %identity.role, "Identity registered");
        Ok(IdentityInfo::from(&identity))
    }

    /// Overwrite the password of the identity registered under `email`
    pub fn reset_password(&self, email: &str, new_password: &str) -> AppResult<()> {
        validate_password(new_password)?;
        let identity = self.directory.set_password(email, new_password)?;
        security_log!(INFO, "password_reset", identity_id = identity.id);
        Ok(())
    }

    /// Clear the current session; the identity record is kept
    pub fn logout(&self) -> AppResult<()> {
        let previous = self.current.write().take();
        self.store.remove(keys::CURRENT_SESSION)?;
        if let Some(info) = previous {
            security_log!(INFO, "logout", identity_id = info.id);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<IdentityInfo> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn require_identity(&self) -> AppResult<IdentityInfo> {
        self.current().ok_or_else(AppError::not_authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use shared::error::ErrorCode;
    use shared::models::{Identity, IdentityStatus};

    fn signup_request(email: &str, password: &str, role: Role) -> SignupRequest {
        SignupRequest {
            name: "Test User".into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    fn open() -> (Arc<dyn KvStore>, SessionStore) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let session = SessionStore::open(store.clone()).unwrap();
        (store, session)
    }

    #[test]
    fn test_signup_then_login() {
        let (_, session) = open();
        let created = session
            .signup(signup_request("hr@example.com", "secret1", Role::Hr))
            .unwrap();
        assert!(session.current().is_none());

        let info = session
            .login(&Credentials::new("HR@example.com", "secret1"), Role::Hr)
            .unwrap();
        assert_eq!(info.id, created.id);
        assert_eq!(session.require_identity().unwrap().role, Role::Hr);
    }

    #[test]
    fn test_login_requires_matching_role() {
        let (_, session) = open();
        session
            .signup(signup_request("hr@example.com", "secret1", Role::Hr))
            .unwrap();

        let err = session
            .login(&Credentials::new("hr@example.com", "secret1"), Role::Admin)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_signup_validation() {
        let (_, session) = open();
        let err = session
            .signup(signup_request("hr@example.com", "12345", Role::Hr))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PasswordTooShort);

        let err = session
            .signup(signup_request("not-an-email", "secret1", Role::Hr))
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "email");

        session
            .signup(signup_request("hr@example.com", "secret1", Role::Hr))
            .unwrap();
        let err = session
            .signup(signup_request(" HR@example.com", "secret2", Role::Employee))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[test]
    fn test_reset_password() {
        let (_, session) = open();
        session
            .signup(signup_request("emp@example.com", "oldpass", Role::Employee))
            .unwrap();

        session.reset_password("emp@example.com", "newpass").unwrap();

        assert!(session
            .login(&Credentials::new("emp@example.com", "oldpass"), Role::Employee)
            .is_err());
        assert!(session
            .login(&Credentials::new("emp@example.com", "newpass"), Role::Employee)
            .is_ok());

        let err = session.reset_password("ghost@example.com", "newpass").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailNotFound);
    }

    #[test]
    fn test_session_survives_reopen_and_logout_clears_it() {
        let (store, session) = open();
        session
            .signup(signup_request("mgr@example.com", "secret1", Role::Manager))
            .unwrap();
        let info = session
            .login(&Credentials::new("mgr@example.com", "secret1"), Role::Manager)
            .unwrap();

        let reopened = SessionStore::open(store.clone()).unwrap();
        assert_eq!(reopened.current(), Some(info));

        reopened.logout().unwrap();
        assert!(reopened.current().is_none());
        assert!(store.get(keys::CURRENT_SESSION).unwrap().is_none());

        let again = SessionStore::open(store).unwrap();
        assert!(again.current().is_none());
        assert_eq!(again.directory().len(), 1);
    }

    #[test]
    fn test_inactive_identity_not_restored() {
        let (store, session) = open();
        let created = session
            .signup(signup_request("emp@example.com", "secret1", Role::Employee))
            .unwrap();
        session
            .login(&Credentials::new("emp@example.com", "secret1"), Role::Employee)
            .unwrap();
        session
            .directory()
            .set_status(created.id, IdentityStatus::Inactive)
            .unwrap();

        let reopened = SessionStore::open(store).unwrap();
        assert!(reopened.current().is_none());
    }

    #[test]
    fn test_require_identity_when_logged_out() {
        let (_, session) = open();
        assert_eq!(
            session.require_identity().unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }

    struct FixedAuthenticator(Identity);

    impl Authenticator for FixedAuthenticator {
        fn authenticate(&self, email: &str, _password: &str) -> AppResult<Identity> {
            if email == self.0.email {
                Ok(self.0.clone())
            } else {
                Err(AppError::invalid_credentials())
            }
        }
    }

    #[test]
    fn test_custom_authenticator() {
        let (_, session) = open();
        let identity = Identity {
            id: 42,
            name: "Remote".into(),
            email: "remote@example.com".into(),
            role: Role::Admin,
            status: IdentityStatus::Active,
            password_hash: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        let session = session.with_authenticator(Arc::new(FixedAuthenticator(identity)));

        let info = session
            .login(&Credentials::new("remote@example.com", "anything"), Role::Admin)
            .unwrap();
        assert_eq!(info.id, 42);
    }
}
