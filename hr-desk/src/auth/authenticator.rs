//! Identity directory and the authentication seam

use super::password::{hash_password, verify_password};
use crate::db::keys;
use crate::db::{Collection, KvStore, Record, SnapshotHealth, StoreResult};
use parking_lot::Mutex;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Identity, IdentityInfo, IdentityStatus, Role};
use shared::util::{normalize_email, now_millis, snowflake_id};
use std::sync::Arc;

impl Record for Identity {
    const STORAGE_KEY: &'static str = keys::IDENTITIES;
    const RESOURCE: &'static str = "Identity";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

/// External identity collaborator
///
/// Returns the identity whose email and password match, or
/// `InvalidCredentials`. Role is checked by the caller.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> AppResult<Identity>;
}

/// Persisted identity collection, shared between the session and the
/// local authenticator
#[derive(Clone)]
pub struct IdentityDirectory {
    identities: Arc<Mutex<Collection<Identity>>>,
}

impl IdentityDirectory {
    pub fn open(store: Arc<dyn KvStore>) -> StoreResult<Self> {
        Ok(Self {
            identities: Arc::new(Mutex::new(Collection::open(store)?)),
        })
    }

    pub fn health(&self) -> SnapshotHealth {
        self.identities.lock().health()
    }

    pub fn len(&self) -> usize {
        self.identities.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.lock().is_empty()
    }

    pub fn get(&self, id: i64) -> Option<Identity> {
        self.identities.lock().get(id).cloned()
    }

    /// Case-insensitive email lookup
    pub fn find_by_email(&self, email: &str) -> Option<Identity> {
        let email = normalize_email(email);
        self.identities
            .lock()
            .find(|i| i.email == email)
            .cloned()
    }

    pub fn list(&self) -> Vec<IdentityInfo> {
        self.identities
            .lock()
            .records()
            .iter()
            .map(IdentityInfo::from)
            .collect()
    }

    /// Create a new identity; the email must be unused
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> AppResult<Identity> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;

        let mut identities = self.identities.lock();
        if identities.find(|i| i.email == email).is_some() {
            return Err(AppError::already_exists("Identity").with_detail("field", "email"));
        }

        let now = now_millis();
        let identity = Identity {
            id: snowflake_id(),
            name: name.trim().to_string(),
            email,
            role,
            status: IdentityStatus::Active,
            password_hash,
            created_at: now,
            updated_at: now,
        };
        Ok(identities.create(identity)?)
    }

    /// Overwrite the password hash of the identity with `email`
    pub fn set_password(&self, email: &str, password: &str) -> AppResult<Identity> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;

        let mut identities = self.identities.lock();
        let id = identities
            .find(|i| i.email == email)
            .map(|i| i.id)
            .ok_or_else(|| AppError::new(ErrorCode::EmailNotFound).with_detail("field", "email"))?;

        Ok(identities.update(id, |identity| {
            identity.password_hash = password_hash;
            identity.updated_at = now_millis();
        })?)
    }

    pub fn set_status(&self, id: i64, status: IdentityStatus) -> AppResult<Identity> {
        Ok(self.identities.lock().update(id, |identity| {
            identity.status = status;
            identity.updated_at = now_millis();
        })?)
    }
}

/// Checks credentials against the local identity collection
pub struct LocalAuthenticator {
    directory: IdentityDirectory,
}

impl LocalAuthenticator {
    pub fn new(directory: IdentityDirectory) -> Self {
        Self { directory }
    }
}

impl Authenticator for LocalAuthenticator {
    fn authenticate(&self, email: &str, password: &str) -> AppResult<Identity> {
        let identity = self
            .directory
            .find_by_email(email)
            .ok_or_else(AppError::invalid_credentials)?;

        if !verify_password(password, &identity.password_hash) {
            return Err(AppError::invalid_credentials());
        }

        // 密码正确后才暴露账号状态
        if !identity.is_active() {
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }

        Ok(identity)
    }
}
