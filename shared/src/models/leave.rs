//! Leave Policy and Leave Request Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Unpaid,
}

/// Leave policy (one row per leave type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePolicy {
    pub id: i64,
    pub leave_type: LeaveType,
    pub annual_days: u32,
    pub carry_over_days: u32,
    pub requires_approval: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePolicyCreate {
    pub leave_type: LeaveType,
    pub annual_days: u32,
    #[serde(default)]
    pub carry_over_days: u32,
    #[serde(default = "default_true")]
    pub requires_approval: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeavePolicyUpdate {
    pub annual_days: Option<u32>,
    pub carry_over_days: Option<u32>,
    pub requires_approval: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Leave request entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: i64,
    /// Identity id of the requester
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    /// Identity id of the approver / rejecter
    pub decided_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LeaveRequest {
    /// Calendar days covered, inclusive
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestCreate {
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Owner-editable fields; status is decided separately
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveRequestUpdate {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}
