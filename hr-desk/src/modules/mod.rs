//! Feature modules
//!
//! Every dashboard module is a [`FeatureModule<T>`]: the shared session, one
//! persisted [`Collection<T>`], a [`Notifier`] and a static [`ModulePolicy`]
//! saying which capability each action needs. Per-entity behaviour
//! (validation, patch merge, domain transitions) lives next to the entity.
//!
//! Access is evaluated against the capability table in
//! [`crate::auth::permissions`]. `OwnerOr(c)` additionally admits the
//! identity a record belongs to ([`Record::subject_id`]).

pub mod attendance;
pub mod employees;
pub mod freelancers;
pub mod leave;
pub mod payroll;
pub mod tasks;
pub mod vendors;

use crate::auth::{Capability, SessionStore};
use crate::db::{Collection, KvStore, Record, SnapshotHealth};
use crate::services::{Notice, NoticeKind, Notifier};
use parking_lot::Mutex;
use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::models::{IdentityInfo, Role};
use shared::util::{now_millis, snowflake_id};
use std::sync::Arc;
use std::time::Duration;

/// Who may perform an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in identity
    Anyone,
    /// Roles holding the capability
    Capability(Capability),
    /// Roles holding the capability, or the identity the record belongs to
    OwnerOr(Capability),
}

impl Access {
    /// Whether the role passes without looking at ownership
    pub fn grants_role(&self, role: Role) -> bool {
        match self {
            Self::Anyone => true,
            Self::Capability(c) | Self::OwnerOr(c) => c.granted_to(role),
        }
    }

    /// Whether the action is available to the identity for at least some
    /// records
    pub fn available_to(&self, identity: &IdentityInfo) -> bool {
        match self {
            Self::OwnerOr(_) => true,
            other => other.grants_role(identity.role),
        }
    }

    /// Whether the identity may act on a record with the given subject
    pub fn permits(&self, identity: &IdentityInfo, subject: Option<i64>) -> bool {
        match self {
            Self::Anyone => true,
            Self::Capability(c) => c.granted_to(identity.role),
            Self::OwnerOr(c) => c.granted_to(identity.role) || subject == Some(identity.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Static access policy of one module
#[derive(Debug, Clone, Copy)]
pub struct ModulePolicy {
    pub name: &'static str,
    pub view: Access,
    pub create: Access,
    pub edit: Access,
    pub delete: Access,
}

impl ModulePolicy {
    pub fn access(&self, action: Action) -> Access {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
        }
    }

    /// Flags for an identity, all false when nobody is signed in
    pub fn flags(&self, identity: Option<&IdentityInfo>) -> AccessFlags {
        let Some(identity) = identity else {
            return AccessFlags::default();
        };
        AccessFlags {
            can_view: self.view.available_to(identity),
            can_create: self.create.available_to(identity),
            can_edit: self.edit.available_to(identity),
            can_delete: self.delete.available_to(identity),
        }
    }
}

/// What the current identity may do in a module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessFlags {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Result of entering a module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleView<T> {
    pub records: Vec<T>,
    pub flags: AccessFlags,
}

impl<T> ModuleView<T> {
    /// Neutral state: nothing visible, nothing allowed
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            flags: AccessFlags::default(),
        }
    }
}

/// A record type managed by a feature module
pub trait Governed: Record {
    type Create;
    type Update;

    const POLICY: ModulePolicy;

    /// Validate the input and build a new record
    fn build(id: i64, now: i64, input: Self::Create) -> AppResult<Self>;

    /// Merge a patch into the record, validating the merged state
    fn apply(&mut self, patch: Self::Update, now: i64) -> AppResult<()>;
}

pub struct FeatureModule<T: Governed> {
    session: Arc<SessionStore>,
    collection: Mutex<Collection<T>>,
    notifier: Notifier,
}

impl<T: Governed> FeatureModule<T> {
    pub fn open(
        session: Arc<SessionStore>,
        store: Arc<dyn KvStore>,
        notice_duration: Duration,
    ) -> AppResult<Self> {
        let collection = Collection::open(store)?;
        tracing::debug!(
            module = T::POLICY.name,
            records = collection.len(),
            health = ?collection.health(),
            "Module opened"
        );
        Ok(Self {
            session,
            collection: Mutex::new(collection),
            notifier: Notifier::new(notice_duration),
        })
    }

    pub fn name(&self) -> &'static str {
        T::POLICY.name
    }

    pub fn policy(&self) -> ModulePolicy {
        T::POLICY
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Access flags for the current identity
    pub fn flags(&self) -> AccessFlags {
        T::POLICY.flags(self.session.current().as_ref())
    }

    /// Records plus flags; the neutral view when nobody is signed in
    pub fn enter(&self) -> ModuleView<T> {
        let Some(identity) = self.session.current() else {
            return ModuleView::empty();
        };
        let flags = T::POLICY.flags(Some(&identity));
        let records = if flags.can_view {
            self.visible_to(&identity)
        } else {
            Vec::new()
        };
        ModuleView { records, flags }
    }

    pub fn list(&self) -> AppResult<Vec<T>> {
        let identity = self.session.require_identity()?;
        self.gate(&identity, Action::View)?;
        Ok(self.visible_to(&identity))
    }

    /// Fetch one record; records outside the caller's view are not found
    pub fn get(&self, id: i64) -> AppResult<T> {
        let identity = self.session.require_identity()?;
        self.gate(&identity, Action::View)?;
        self.collection
            .lock()
            .get(id)
            .filter(|r| T::POLICY.view.permits(&identity, r.subject_id()))
            .cloned()
            .ok_or_else(|| AppError::not_found(T::RESOURCE).with_detail("id", id))
    }

    pub fn create(&self, input: T::Create) -> AppResult<T> {
        let result = self.try_create(input);
        self.report(Action::Create, result)
    }

    pub fn update(&self, id: i64, patch: T::Update) -> AppResult<T> {
        let result = self.try_mutate(id, T::POLICY.edit, Action::Edit, |record, _| {
            record.apply(patch, now_millis())
        });
        self.report(Action::Edit, result)
    }

    pub fn remove(&self, id: i64) -> AppResult<()> {
        let result = self.try_remove(id);
        self.report(Action::Delete, result)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notifier.current()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn health(&self) -> SnapshotHealth {
        self.collection.lock().health()
    }

    pub fn len(&self) -> usize {
        self.collection.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.lock().is_empty()
    }

    /// Re-read the snapshot from the store
    pub fn reload(&self) -> AppResult<SnapshotHealth> {
        Ok(self.collection.lock().reload()?)
    }

    /// Snapshot of every record, ignoring access (export, seeding)
    pub(crate) fn all_records(&self) -> Vec<T> {
        self.collection.lock().records().to_vec()
    }

    /// Replace the whole snapshot, ignoring access (seeding)
    pub(crate) fn seed(&self, records: Vec<T>) -> AppResult<()> {
        Ok(self.collection.lock().save_all(records)?)
    }

    // ── internals ───────────────────────────────────────────────────

    fn visible_to(&self, identity: &IdentityInfo) -> Vec<T> {
        self.collection
            .lock()
            .records()
            .iter()
            .filter(|r| T::POLICY.view.permits(identity, r.subject_id()))
            .cloned()
            .collect()
    }

    /// Role-level check, before any record is looked at
    fn gate(&self, identity: &IdentityInfo, action: Action) -> AppResult<()> {
        if T::POLICY.access(action).available_to(identity) {
            Ok(())
        } else {
            Err(self.denied(identity, action))
        }
    }

    fn denied(&self, identity: &IdentityInfo, action: Action) -> AppError {
        security_log!(
            WARN,
            "permission_denied",
            module = T::POLICY.name,
            action = action.as_str(),
            identity_id = identity.id,
            role = %identity.role
        );
        AppError::permission_denied(format!(
            "{} may not {} {}",
            identity.role,
            action.as_str(),
            T::POLICY.name
        ))
        .with_detail("module", T::POLICY.name)
        .with_detail("action", action.as_str())
    }

    fn try_create(&self, input: T::Create) -> AppResult<T> {
        let identity = self.session.require_identity()?;
        self.gate(&identity, Action::Create)?;

        let now = now_millis();
        let record = T::build(snowflake_id(), now, input)?;
        if !T::POLICY.create.permits(&identity, record.subject_id()) {
            return Err(self.denied(&identity, Action::Create));
        }

        Ok(self.collection.lock().create(record)?)
    }

    /// Load, check, modify, re-check and replace one record
    ///
    /// The access check runs on both the stored and the modified record, so
    /// an owner cannot hand a record over to someone else.
    pub(crate) fn try_mutate(
        &self,
        id: i64,
        access: Access,
        action: Action,
        modify: impl FnOnce(&mut T, &IdentityInfo) -> AppResult<()>,
    ) -> AppResult<T> {
        let identity = self.session.require_identity()?;
        if !access.available_to(&identity) {
            return Err(self.denied(&identity, action));
        }

        let mut collection = self.collection.lock();
        let existing = collection
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(T::RESOURCE).with_detail("id", id))?;
        if !access.permits(&identity, existing.subject_id()) {
            return Err(self.denied(&identity, action));
        }

        let mut updated = existing;
        modify(&mut updated, &identity)?;
        if !access.permits(&identity, updated.subject_id()) {
            return Err(self.denied(&identity, action));
        }

        Ok(collection.replace(updated)?)
    }

    fn try_remove(&self, id: i64) -> AppResult<()> {
        let identity = self.session.require_identity()?;
        self.gate(&identity, Action::Delete)?;

        let mut collection = self.collection.lock();
        let subject = collection
            .get(id)
            .map(|r| r.subject_id())
            .ok_or_else(|| AppError::not_found(T::RESOURCE).with_detail("id", id))?;
        if !T::POLICY.delete.permits(&identity, subject) {
            return Err(self.denied(&identity, Action::Delete));
        }

        collection.remove(id)?;
        Ok(())
    }

    /// Surface the outcome of an action as a notice
    pub(crate) fn report<R>(&self, action: Action, result: AppResult<R>) -> AppResult<R> {
        match &result {
            Ok(_) => {
                let verb = match action {
                    Action::View => "loaded",
                    Action::Create => "created",
                    Action::Edit => "updated",
                    Action::Delete => "deleted",
                };
                self.notifier
                    .show(format!("{} {verb}", T::RESOURCE), NoticeKind::Success);
            }
            Err(e) => self.notifier.show(e.message.clone(), NoticeKind::Error),
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Session fixtures shared by the module tests

    use super::*;
    use crate::db::MemoryStore;
    use shared::models::{Credentials, SignupRequest};

    pub const PASSWORD: &str = "secret1";

    pub struct Fixture {
        pub store: Arc<dyn KvStore>,
        pub session: Arc<SessionStore>,
        pub admin: IdentityInfo,
        pub manager: IdentityInfo,
        pub hr: IdentityInfo,
        pub employee: IdentityInfo,
        pub other_employee: IdentityInfo,
    }

    impl Fixture {
        pub fn new() -> Self {
            let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
            let session = Arc::new(SessionStore::open(store.clone()).unwrap());
            let signup = |name: &str, role: Role| {
                session
                    .signup(SignupRequest {
                        name: name.into(),
                        email: format!("{name}@example.com"),
                        password: PASSWORD.into(),
                        role,
                    })
                    .unwrap()
            };
            let admin = signup("admin", Role::Admin);
            let manager = signup("manager", Role::Manager);
            let hr = signup("hr", Role::Hr);
            let employee = signup("employee", Role::Employee);
            let other_employee = signup("other", Role::Employee);
            Self {
                store,
                session,
                admin,
                manager,
                hr,
                employee,
                other_employee,
            }
        }

        pub fn module<T: Governed>(&self) -> FeatureModule<T> {
            FeatureModule::open(
                self.session.clone(),
                self.store.clone(),
                Duration::from_secs(60),
            )
            .unwrap()
        }

        pub fn login(&self, who: &IdentityInfo) {
            self.session
                .login(&Credentials::new(who.email.clone(), PASSWORD), who.role)
                .unwrap();
        }

        pub fn logout(&self) {
            self.session.logout().unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use shared::error::ErrorCode;
    use shared::models::IdentityStatus;

    fn identity(id: i64, role: Role) -> IdentityInfo {
        IdentityInfo {
            id,
            name: "x".into(),
            email: "x@example.com".into(),
            role,
            status: IdentityStatus::Active,
        }
    }

    #[test]
    fn test_access_permits() {
        let employee = identity(7, Role::Employee);
        let hr = identity(8, Role::Hr);

        let owner_or = Access::OwnerOr(Capability::ViewWorkforce);
        assert!(owner_or.permits(&employee, Some(7)));
        assert!(!owner_or.permits(&employee, Some(8)));
        assert!(!owner_or.permits(&employee, None));
        assert!(owner_or.permits(&hr, Some(7)));

        let cap = Access::Capability(Capability::ManageVendors);
        assert!(!cap.permits(&employee, Some(7)));
        assert!(cap.permits(&hr, None));

        assert!(Access::Anyone.permits(&employee, None));
    }

    #[test]
    fn test_policy_flags() {
        let policy = ModulePolicy {
            name: "vendors",
            view: Access::Capability(Capability::ViewWorkforce),
            create: Access::Capability(Capability::ManageVendors),
            edit: Access::Capability(Capability::ManageVendors),
            delete: Access::Capability(Capability::ManageVendors),
        };
        assert_eq!(policy.flags(None), AccessFlags::default());
        assert_eq!(
            policy.flags(Some(&identity(1, Role::Employee))),
            AccessFlags::default()
        );
        let manager = policy.flags(Some(&identity(1, Role::Manager)));
        assert!(manager.can_view);
        assert!(!manager.can_create);
        let hr = policy.flags(Some(&identity(1, Role::Hr)));
        assert!(hr.can_view && hr.can_create && hr.can_edit && hr.can_delete);
    }

    #[test]
    fn test_unauthenticated_entry_is_neutral() {
        let fx = Fixture::new();
        let vendors = fx.module::<shared::models::Vendor>();
        let view = vendors.enter();
        assert!(view.records.is_empty());
        assert_eq!(view.flags, AccessFlags::default());
        assert_eq!(vendors.list().unwrap_err().code, ErrorCode::NotAuthenticated);
    }
}
