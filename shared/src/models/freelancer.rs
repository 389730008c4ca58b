//! Freelancer and Freelancer Contract Models

use super::EngagementStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Freelancer entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freelancer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub skill: String,
    pub hourly_rate: Decimal,
    pub status: EngagementStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create freelancer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreelancerCreate {
    pub name: String,
    pub email: String,
    pub skill: String,
    pub hourly_rate: Decimal,
}

/// Update freelancer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreelancerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skill: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub status: Option<EngagementStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Terminated,
}

/// Freelancer contract entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerContract {
    pub id: i64,
    /// Freelancer reference (not validated)
    pub freelancer_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub rate: Decimal,
    pub status: ContractStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create contract payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreelancerContractCreate {
    pub freelancer_id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub rate: Decimal,
}

/// Update contract payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreelancerContractUpdate {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rate: Option<Decimal>,
    pub status: Option<ContractStatus>,
}
