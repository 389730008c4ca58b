//! Storage keys, one per persisted collection

pub const IDENTITIES: &str = "identities";
pub const CURRENT_SESSION: &str = "session.current";

pub const TASKS: &str = "tasks";
pub const VENDORS: &str = "vendors";
pub const FREELANCERS: &str = "freelancers";
pub const FREELANCER_CONTRACTS: &str = "freelancer_contracts";
pub const PAYROLL: &str = "payroll";
pub const TIME_ENTRIES: &str = "time_entries";
pub const DAILY_STATUS: &str = "daily_status";
pub const EMPLOYEES: &str = "employees";
pub const LEAVE_POLICIES: &str = "leave_policies";
pub const LEAVE_REQUESTS: &str = "leave_requests";
