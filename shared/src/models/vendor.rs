//! Vendor Model

use super::EngagementStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vendor entity (外部供应商)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    /// What the vendor supplies (payroll software, cleaning, ...)
    pub service: String,
    pub contract_value: Decimal,
    pub status: EngagementStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create vendor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorCreate {
    pub name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub service: String,
    pub contract_value: Decimal,
}

/// Update vendor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorUpdate {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub contract_value: Option<Decimal>,
    pub status: Option<EngagementStatus>,
}
