//! Application state
//!
//! Opens the configured store once and wires the session and every feature
//! module on top of it.

use super::Config;
use crate::auth::SessionStore;
use crate::db::{KvStore, SnapshotHealth, open_store};
use crate::modules::FeatureModule;
use crate::seed::{SeedReport, seed_demo};
use shared::error::AppResult;
use shared::models::{
    DailyStatus, EmployeeRecord, Freelancer, FreelancerContract, LeavePolicy, LeaveRequest,
    PayrollRecord, Task, TimeEntry, Vendor,
};
use std::sync::Arc;
use std::time::Duration;

/// Every feature module, all sharing one session
pub struct Modules {
    pub tasks: FeatureModule<Task>,
    pub vendors: FeatureModule<Vendor>,
    pub freelancers: FeatureModule<Freelancer>,
    pub freelancer_contracts: FeatureModule<FreelancerContract>,
    pub payroll: FeatureModule<PayrollRecord>,
    pub time_entries: FeatureModule<TimeEntry>,
    pub daily_status: FeatureModule<DailyStatus>,
    pub employees: FeatureModule<EmployeeRecord>,
    pub leave_policies: FeatureModule<LeavePolicy>,
    pub leave_requests: FeatureModule<LeaveRequest>,
}

impl Modules {
    /// Module names, in dashboard order
    pub const NAMES: [&'static str; 10] = [
        "tasks",
        "vendors",
        "freelancers",
        "freelancer_contracts",
        "payroll",
        "time_entries",
        "daily_status",
        "employees",
        "leave_policies",
        "leave_requests",
    ];

    fn open(
        session: &Arc<SessionStore>,
        store: &Arc<dyn KvStore>,
        notice: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            tasks: FeatureModule::open(session.clone(), store.clone(), notice)?,
            vendors: FeatureModule::open(session.clone(), store.clone(), notice)?,
            freelancers: FeatureModule::open(session.clone(), store.clone(), notice)?,
            freelancer_contracts: FeatureModule::open(session.clone(), store.clone(), notice)?,
            payroll: FeatureModule::open(session.clone(), store.clone(), notice)?,
            time_entries: FeatureModule::open(session.clone(), store.clone(), notice)?,
            daily_status: FeatureModule::open(session.clone(), store.clone(), notice)?,
            employees: FeatureModule::open(session.clone(), store.clone(), notice)?,
            leave_policies: FeatureModule::open(session.clone(), store.clone(), notice)?,
            leave_requests: FeatureModule::open(session.clone(), store.clone(), notice)?,
        })
    }

    /// Snapshot health of every module, in [`Self::NAMES`] order
    pub fn health(&self) -> Vec<(&'static str, SnapshotHealth)> {
        vec![
            (self.tasks.name(), self.tasks.health()),
            (self.vendors.name(), self.vendors.health()),
            (self.freelancers.name(), self.freelancers.health()),
            (self.freelancer_contracts.name(), self.freelancer_contracts.health()),
            (self.payroll.name(), self.payroll.health()),
            (self.time_entries.name(), self.time_entries.health()),
            (self.daily_status.name(), self.daily_status.health()),
            (self.employees.name(), self.employees.health()),
            (self.leave_policies.name(), self.leave_policies.health()),
            (self.leave_requests.name(), self.leave_requests.health()),
        ]
    }
}

pub struct AppState {
    config: Config,
    store: Arc<dyn KvStore>,
    session: Arc<SessionStore>,
    modules: Modules,
    seed_report: Option<SeedReport>,
}

impl AppState {
    /// Open the configured backend and build the state on top of it
    pub fn initialize(config: Config) -> AppResult<Self> {
        let store = open_store(config.storage, &config.data_dir)?;
        Self::with_store(config, store)
    }

    /// Build the state over an already opened store
    pub fn with_store(config: Config, store: Arc<dyn KvStore>) -> AppResult<Self> {
        let session = Arc::new(SessionStore::open(store.clone())?);
        let modules = Modules::open(&session, &store, config.notice_duration())?;

        let mut state = Self {
            config,
            store,
            session,
            modules,
            seed_report: None,
        };

        if state.config.seed_demo {
            state.seed_report = Some(seed_demo(&state)?);
        }

        for (name, health) in state.modules.health() {
            if health == SnapshotHealth::Corrupt {
                tracing::warn!(module = name, "Module started with a corrupt snapshot");
            }
        }

        Ok(state)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    /// What demo seeding wrote at startup, if it ran
    pub fn seed_report(&self) -> Option<&SeedReport> {
        self.seed_report.as_ref()
    }
}
