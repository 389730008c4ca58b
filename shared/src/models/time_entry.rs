//! Time Entry Model (attendance)

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Time entry entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    /// Identity id of the employee
    pub employee_id: i64,
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    pub clock_out: Option<NaiveTime>,
    /// Derived from clock_in/clock_out, two decimals
    pub hours: Option<Decimal>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create time entry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryCreate {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    pub clock_out: Option<NaiveTime>,
    pub note: Option<String>,
}

/// Update time entry payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeEntryUpdate {
    pub date: Option<NaiveDate>,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub note: Option<String>,
}
