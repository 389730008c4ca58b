//! Payroll Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payroll lifecycle: Draft -> Processed -> Paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    #[default]
    Draft,
    Processed,
    Paid,
}

/// Payroll record (one employee, one period)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: i64,
    /// Identity id of the paid employee
    pub employee_id: i64,
    /// Pay period, `YYYY-MM`
    pub period: String,
    pub base_salary: Decimal,
    pub bonus: Decimal,
    pub deductions: Decimal,
    /// base_salary + bonus - deductions
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PayrollRecord {
    /// `None` when the arithmetic overflows
    pub fn compute_net(
        base_salary: Decimal,
        bonus: Decimal,
        deductions: Decimal,
    ) -> Option<Decimal> {
        base_salary.checked_add(bonus)?.checked_sub(deductions)
    }
}

/// Create payroll payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollCreate {
    pub employee_id: i64,
    pub period: String,
    pub base_salary: Decimal,
    #[serde(default)]
    pub bonus: Decimal,
    #[serde(default)]
    pub deductions: Decimal,
}

/// Update payroll payload (status goes through process/mark_paid)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollUpdate {
    pub period: Option<String>,
    pub base_salary: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub deductions: Option<Decimal>,
}
