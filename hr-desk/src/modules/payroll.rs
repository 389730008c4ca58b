//! Payroll
//!
//! Records move Draft → Processed → Paid. Amounts are only editable while
//! the record is a draft; `net_salary` is recomputed on every change.

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{validate_amount, validate_id, validate_period};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{PayrollCreate, PayrollRecord, PayrollStatus, PayrollUpdate};
use shared::util::now_millis;

impl Record for PayrollRecord {
    const STORAGE_KEY: &'static str = keys::PAYROLL;
    const RESOURCE: &'static str = "Payroll record";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.employee_id)
    }
}

trait PayrollRules {
    fn recompute(&mut self) -> AppResult<()>;
    fn transition(&mut self, from: PayrollStatus, to: PayrollStatus) -> AppResult<()>;
}

impl PayrollRules for PayrollRecord {
    fn recompute(&mut self) -> AppResult<()> {
        validate_id(self.employee_id, "employee_id")?;
        validate_period(&self.period, "period")?;
        validate_amount(self.base_salary, "base_salary")?;
        validate_amount(self.bonus, "bonus")?;
        validate_amount(self.deductions, "deductions")?;

        let net = PayrollRecord::compute_net(self.base_salary, self.bonus, self.deductions)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ValueOutOfRange, "net salary out of range")
                    .with_detail("field", "net_salary")
            })?;
        if net < Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "deductions exceed gross pay",
            )
            .with_detail("field", "deductions"));
        }
        self.net_salary = net;
        Ok(())
    }

    fn transition(&mut self, from: PayrollStatus, to: PayrollStatus) -> AppResult<()> {
        if self.status != from {
            return Err(AppError::business_rule(format!(
                "Payroll record is {:?}, expected {:?}",
                self.status, from
            ))
            .with_detail("status", format!("{:?}", self.status)));
        }
        self.status = to;
        self.updated_at = now_millis();
        Ok(())
    }
}

impl Governed for PayrollRecord {
    type Create = PayrollCreate;
    type Update = PayrollUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "payroll",
        view: Access::OwnerOr(Capability::ProcessPayroll),
        create: Access::Capability(Capability::ProcessPayroll),
        edit: Access::Capability(Capability::ProcessPayroll),
        delete: Access::Capability(Capability::ProcessPayroll),
    };

    fn build(id: i64, now: i64, input: PayrollCreate) -> AppResult<Self> {
        let mut record = PayrollRecord {
            id,
            employee_id: input.employee_id,
            period: input.period.trim().to_string(),
            base_salary: input.base_salary,
            bonus: input.bonus,
            deductions: input.deductions,
            net_salary: Decimal::ZERO,
            status: PayrollStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        record.recompute()?;
        Ok(record)
    }

    fn apply(&mut self, patch: PayrollUpdate, now: i64) -> AppResult<()> {
        if self.status != PayrollStatus::Draft {
            return Err(AppError::business_rule("Only draft payroll records can be edited")
                .with_detail("status", format!("{:?}", self.status)));
        }
        let mut next = self.clone();
        if let Some(period) = patch.period {
            next.period = period.trim().to_string();
        }
        if let Some(base) = patch.base_salary {
            next.base_salary = base;
        }
        if let Some(bonus) = patch.bonus {
            next.bonus = bonus;
        }
        if let Some(deductions) = patch.deductions {
            next.deductions = deductions;
        }
        next.recompute()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<PayrollRecord> {
    /// Draft → Processed
    pub fn process_payroll(&self, id: i64) -> AppResult<PayrollRecord> {
        let result = self.try_mutate(
            id,
            Access::Capability(Capability::ProcessPayroll),
            Action::Edit,
            |record, _| record.transition(PayrollStatus::Draft, PayrollStatus::Processed),
        );
        self.report(Action::Edit, result)
    }

    /// Processed → Paid
    pub fn mark_paid(&self, id: i64) -> AppResult<PayrollRecord> {
        let result = self.try_mutate(
            id,
            Access::Capability(Capability::ProcessPayroll),
            Action::Edit,
            |record, _| record.transition(PayrollStatus::Processed, PayrollStatus::Paid),
        );
        self.report(Action::Edit, result)
    }

    /// Sum of net pay for a period, over the visible records
    pub fn period_total(&self, period: &str) -> AppResult<Decimal> {
        self.list()?
            .iter()
            .filter(|r| r.period == period)
            .try_fold(Decimal::ZERO, |total, r| total.checked_add(r.net_salary))
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ValueOutOfRange, "period total out of range")
                    .with_detail("period", period)
            })
    }
}
