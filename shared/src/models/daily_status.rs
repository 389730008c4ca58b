//! Daily Status Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily stand-up style status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatus {
    pub id: i64,
    /// Identity id of the reporting employee
    pub employee_id: i64,
    pub date: NaiveDate,
    pub summary: String,
    pub blockers: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatusCreate {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub summary: String,
    pub blockers: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyStatusUpdate {
    pub summary: Option<String>,
    pub blockers: Option<String>,
}
