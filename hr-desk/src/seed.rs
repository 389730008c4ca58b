//! Demo data
//!
//! Fills collections that have never been written with a small, coherent
//! data set: one account per role plus sample records for each module.
//! Existing or corrupt snapshots are left alone.

use crate::core::AppState;
use crate::db::SnapshotHealth;
use crate::modules::{FeatureModule, Governed};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use shared::error::AppResult;
use shared::models::{
    DailyStatusCreate, EmployeeRecordCreate, FreelancerContractCreate, FreelancerCreate,
    LeavePolicyCreate, LeaveRequestCreate, LeaveType, PayrollCreate, Role, TaskCreate,
    TaskPriority, TimeEntryCreate, VendorCreate,
};
use shared::util::{now_millis, snowflake_id};
use std::collections::HashSet;

/// Password of every demo account
pub const DEMO_PASSWORD: &str = "hrdesk123";

/// (name, email, role) of the demo accounts
pub const DEMO_ACCOUNTS: [(&str, &str, Role); 4] = [
    ("Alex Admin", "admin@hrdesk.local", Role::Admin),
    ("Morgan Manager", "manager@hrdesk.local", Role::Manager),
    ("Harper Hr", "hr@hrdesk.local", Role::Hr),
    ("Emery Employee", "employee@hrdesk.local", Role::Employee),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Demo accounts created
    pub identities: usize,
    /// Collections that received sample records
    pub collections: Vec<&'static str>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.identities == 0 && self.collections.is_empty()
    }
}

/// Seed every absent collection
pub fn seed_demo(state: &AppState) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();
    let directory = state.session().directory();

    if directory.health() == SnapshotHealth::Absent {
        for (name, email, role) in DEMO_ACCOUNTS {
            directory.register(name, email, DEMO_PASSWORD, role)?;
            report.identities += 1;
        }
    }

    let employee_id = directory.find_by_email("employee@hrdesk.local").map(|i| i.id);

    let today = Utc::now().date_naive();
    let period = format!("{:04}-{:02}", today.year(), today.month());
    let modules = state.modules();

    seed_module(&modules.vendors, &mut report, || {
        vec![
            VendorCreate {
                name: "Brightline Facilities".into(),
                contact_email: "contracts@brightline.example".into(),
                phone: Some("+1 555 0100".into()),
                service: "Office cleaning".into(),
                contract_value: Decimal::new(1_800_000, 2),
            },
            VendorCreate {
                name: "Northwind IT".into(),
                contact_email: "support@northwind.example".into(),
                phone: None,
                service: "Managed IT".into(),
                contract_value: Decimal::new(4_250_000, 2),
            },
        ]
    })?;

    seed_module(&modules.freelancers, &mut report, || {
        vec![FreelancerCreate {
            name: "Rio Tanaka".into(),
            email: "rio@studio.example".into(),
            skill: "UX research".into(),
            hourly_rate: Decimal::new(6500, 2),
        }]
    })?;

    let freelancer_id = modules.freelancers.all_records().first().map(|f| f.id);
    seed_module(&modules.freelancer_contracts, &mut report, || {
        freelancer_id
            .map(|freelancer_id| FreelancerContractCreate {
                freelancer_id,
                title: "Onboarding flow study".into(),
                start_date: today,
                end_date: Some(today + Duration::days(60)),
                rate: Decimal::new(6500, 2),
            })
            .into_iter()
            .collect()
    })?;

    seed_module(&modules.leave_policies, &mut report, || {
        vec![
            LeavePolicyCreate {
                leave_type: LeaveType::Annual,
                annual_days: 22,
                carry_over_days: 5,
                requires_approval: true,
            },
            LeavePolicyCreate {
                leave_type: LeaveType::Sick,
                annual_days: 10,
                carry_over_days: 0,
                requires_approval: false,
            },
        ]
    })?;

    // Owner-scoped samples need the demo employee
    let Some(employee_id) = employee_id else {
        tracing::info!(?report, "Demo seed done (no demo employee, owner-scoped samples skipped)");
        return Ok(report);
    };

    seed_module(&modules.employees, &mut report, || {
        vec![EmployeeRecordCreate {
            identity_id: Some(employee_id),
            full_name: "Emery Employee".into(),
            email: "employee@hrdesk.local".into(),
            department: "Operations".into(),
            position: "Coordinator".into(),
            hire_date: today - Duration::days(14),
            salary: Decimal::new(48_000, 0),
        }]
    })?;

    seed_module(&modules.tasks, &mut report, || {
        vec![
            TaskCreate {
                title: "Complete benefits enrollment".into(),
                description: Some("Pick a health plan before the end of the month".into()),
                assignee_id: employee_id,
                priority: Some(TaskPriority::High),
                due_date: Some(today + Duration::days(7)),
            },
            TaskCreate {
                title: "Read the handbook".into(),
                description: None,
                assignee_id: employee_id,
                priority: None,
                due_date: None,
            },
        ]
    })?;

    seed_module(&modules.payroll, &mut report, || {
        vec![PayrollCreate {
            employee_id,
            period: period.clone(),
            base_salary: Decimal::new(400_000, 2),
            bonus: Decimal::ZERO,
            deductions: Decimal::new(62_000, 2),
        }]
    })?;

    seed_module(&modules.time_entries, &mut report, || {
        vec![TimeEntryCreate {
            employee_id,
            date: today,
            clock_in: clock(9, 0),
            clock_out: Some(clock(17, 30)),
            note: None,
        }]
    })?;

    seed_module(&modules.daily_status, &mut report, || {
        vec![DailyStatusCreate {
            employee_id,
            date: today,
            summary: "Set up laptop and accounts".into(),
            blockers: Some("Waiting on badge from HR".into()),
        }]
    })?;

    seed_module(&modules.leave_requests, &mut report, || {
        let start: NaiveDate = today + Duration::days(30);
        vec![LeaveRequestCreate {
            employee_id,
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: start + Duration::days(2),
            reason: Some("Long weekend".into()),
        }]
    })?;

    if !report.is_empty() {
        tracing::info!(
            identities = report.identities,
            collections = ?report.collections,
            "Demo data seeded"
        );
    }
    Ok(report)
}

/// Write `inputs` into the module when its snapshot has never been saved
fn seed_module<T: Governed>(
    module: &FeatureModule<T>,
    report: &mut SeedReport,
    inputs: impl FnOnce() -> Vec<T::Create>,
) -> AppResult<()> {
    if module.health() != SnapshotHealth::Absent {
        return Ok(());
    }
    let inputs = inputs();
    if inputs.is_empty() {
        return Ok(());
    }

    let now = now_millis();
    let mut used = HashSet::new();
    let records = inputs
        .into_iter()
        .map(|input| {
            // ids minted in the same millisecond only differ in 12 random bits
            let mut id = snowflake_id();
            while !used.insert(id) {
                id = snowflake_id();
            }
            T::build(id, now, input)
        })
        .collect::<AppResult<Vec<T>>>()?;
    module.seed(records)?;
    report.collections.push(module.name());
    Ok(())
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
