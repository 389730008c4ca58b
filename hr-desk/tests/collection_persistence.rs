//! Feature modules persisted through the file and redb backends

use hr_desk::db::{SnapshotHealth, StorageBackend, keys};
use hr_desk::{AppState, Config};
use rust_decimal::Decimal;
use shared::models::{Credentials, Role, SignupRequest, VendorCreate, VendorUpdate};
use std::path::Path;

fn config(dir: &Path, storage: StorageBackend) -> Config {
    let mut config = Config::with_overrides(dir, storage);
    config.seed_demo = false;
    config
}

fn sign_in_hr(state: &AppState) {
    let session = state.session();
    if session.directory().find_by_email("hr@example.com").is_none() {
        session
            .signup(SignupRequest {
                name: "Harper".into(),
                email: "hr@example.com".into(),
                password: "secret1".into(),
                role: Role::Hr,
            })
            .unwrap();
    }
    session
        .login(&Credentials::new("hr@example.com", "secret1"), Role::Hr)
        .unwrap();
}

fn vendor(name: &str) -> VendorCreate {
    VendorCreate {
        name: name.into(),
        contact_email: "ops@vendor.example".into(),
        phone: None,
        service: "Catering".into(),
        contract_value: Decimal::new(120_000, 2),
    }
}

fn round_trip(storage: StorageBackend) {
    let dir = tempfile::tempdir().unwrap();

    let (kept, dropped) = {
        let state = AppState::initialize(config(dir.path(), storage)).unwrap();
        sign_in_hr(&state);
        let vendors = &state.modules().vendors;
        assert_eq!(vendors.health(), SnapshotHealth::Absent);

        let kept = vendors.create(vendor("Acme Catering")).unwrap();
        let dropped = vendors.create(vendor("Short Lived")).unwrap();
        vendors
            .update(
                kept.id,
                VendorUpdate {
                    phone: Some("+1 555 0199".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        vendors.remove(dropped.id).unwrap();
        (kept, dropped)
    };

    let state = AppState::initialize(config(dir.path(), storage)).unwrap();
    let vendors = &state.modules().vendors;
    assert_eq!(vendors.health(), SnapshotHealth::Healthy);
    // the session pointer is persisted too
    assert!(state.session().is_authenticated());

    let records = vendors.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, kept.id);
    assert_eq!(records[0].phone.as_deref(), Some("+1 555 0199"));
    assert!(vendors.get(dropped.id).is_err());
}

#[test]
fn test_file_backend_round_trip() {
    round_trip(StorageBackend::File);
}

#[test]
fn test_redb_backend_round_trip() {
    round_trip(StorageBackend::Redb);
}

#[test]
fn test_corrupt_snapshot_is_flagged_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    let tasks_file = dir.path().join(format!("{}.json", keys::TASKS));
    std::fs::write(&tasks_file, "{ not json").unwrap();

    let mut cfg = config(dir.path(), StorageBackend::File);
    cfg.seed_demo = true;
    let state = AppState::initialize(cfg).unwrap();

    assert_eq!(state.modules().tasks.health(), SnapshotHealth::Corrupt);
    assert!(state.modules().tasks.is_empty());
    // demo seeding fills the other collections but leaves the damaged one alone
    let report = state.seed_report().unwrap();
    assert!(!report.collections.contains(&"tasks"));
    assert!(report.collections.contains(&"vendors"));
    assert_eq!(std::fs::read_to_string(&tasks_file).unwrap(), "{ not json");
}

#[test]
fn test_non_utf8_snapshot_is_flagged_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let vendors_file = dir.path().join(format!("{}.json", keys::VENDORS));
    let garbage = [0xff, 0xfe, 0x00, 0x5b];
    std::fs::write(&vendors_file, garbage).unwrap();

    let state = AppState::initialize(config(dir.path(), StorageBackend::File)).unwrap();
    let vendors = &state.modules().vendors;
    assert_eq!(vendors.health(), SnapshotHealth::Corrupt);
    assert!(vendors.is_empty());
    // the other collections open normally
    assert_eq!(state.modules().tasks.health(), SnapshotHealth::Absent);
    assert_eq!(std::fs::read(&vendors_file).unwrap(), garbage);
}

#[test]
fn test_seeding_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), StorageBackend::File);
    cfg.seed_demo = true;

    let first = AppState::initialize(cfg.clone()).unwrap();
    let report = first.seed_report().unwrap().clone();
    assert_eq!(report.identities, 4);
    assert_eq!(report.collections.len(), 10);
    let vendor_count = first.modules().vendors.len();
    drop(first);

    let second = AppState::initialize(cfg).unwrap();
    assert!(second.seed_report().unwrap().is_empty());
    assert_eq!(second.modules().vendors.len(), vendor_count);
    assert_eq!(second.session().directory().len(), 4);
}
