//! Employee Record Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Onboarding pipeline: Offer -> Documents -> Orientation -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStage {
    #[default]
    Offer,
    Documents,
    Orientation,
    Completed,
}

impl OnboardingStage {
    /// Next stage, `None` once onboarding is completed
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Offer => Some(Self::Documents),
            Self::Documents => Some(Self::Orientation),
            Self::Orientation => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

/// Employee HR record (员工档案)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    /// Linked login identity, if the employee has one
    pub identity_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Decimal,
    pub onboarding_stage: OnboardingStage,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecordCreate {
    pub identity_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeRecordUpdate {
    pub identity_id: Option<i64>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
}
