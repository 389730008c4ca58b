//! Employee records and onboarding

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_email, validate_required_text,
};
use shared::error::{AppError, AppResult};
use shared::models::{EmployeeRecord, EmployeeRecordCreate, EmployeeRecordUpdate, OnboardingStage};
use shared::util::{normalize_email, now_millis};

impl Record for EmployeeRecord {
    const STORAGE_KEY: &'static str = keys::EMPLOYEES;
    const RESOURCE: &'static str = "Employee";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        self.identity_id
    }
}

trait EmployeeRules {
    fn validate(&self) -> AppResult<()>;
}

impl EmployeeRules for EmployeeRecord {
    fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.full_name, "full_name", MAX_NAME_LEN)?;
        validate_email(&self.email, "email")?;
        validate_required_text(&self.department, "department", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&self.position, "position", MAX_SHORT_TEXT_LEN)?;
        validate_amount(self.salary, "salary")
    }
}

impl Governed for EmployeeRecord {
    type Create = EmployeeRecordCreate;
    type Update = EmployeeRecordUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "employees",
        view: Access::Capability(Capability::ViewWorkforce),
        create: Access::Capability(Capability::ManageEmployees),
        edit: Access::Capability(Capability::ManageEmployees),
        delete: Access::Capability(Capability::ManageEmployees),
    };

    fn build(id: i64, now: i64, input: EmployeeRecordCreate) -> AppResult<Self> {
        let record = EmployeeRecord {
            id,
            identity_id: input.identity_id,
            full_name: input.full_name.trim().to_string(),
            email: normalize_email(&input.email),
            department: input.department.trim().to_string(),
            position: input.position.trim().to_string(),
            hire_date: input.hire_date,
            salary: input.salary,
            onboarding_stage: OnboardingStage::Offer,
            created_at: now,
            updated_at: now,
        };
        record.validate()?;
        Ok(record)
    }

    fn apply(&mut self, patch: EmployeeRecordUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if patch.identity_id.is_some() {
            next.identity_id = patch.identity_id;
        }
        if let Some(name) = patch.full_name {
            next.full_name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = normalize_email(&email);
        }
        if let Some(department) = patch.department {
            next.department = department.trim().to_string();
        }
        if let Some(position) = patch.position {
            next.position = position.trim().to_string();
        }
        if let Some(hire_date) = patch.hire_date {
            next.hire_date = hire_date;
        }
        if let Some(salary) = patch.salary {
            next.salary = salary;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<EmployeeRecord> {
    /// Offer → Documents → Orientation → Completed
    pub fn advance_onboarding(&self, id: i64) -> AppResult<EmployeeRecord> {
        let result = self.try_mutate(
            id,
            Access::Capability(Capability::ManageEmployees),
            Action::Edit,
            |record, _| {
                let next = record.onboarding_stage.next().ok_or_else(|| {
                    AppError::business_rule("Onboarding is already completed")
                        .with_detail("field", "onboarding_stage")
                })?;
                record.onboarding_stage = next;
                record.updated_at = now_millis();
                Ok(())
            },
        );
        self.report(Action::Edit, result)
    }

    /// Employees still going through onboarding
    pub fn onboarding_pipeline(&self) -> AppResult<Vec<EmployeeRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.onboarding_stage != OnboardingStage::Completed)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::Fixture;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;

    fn input() -> EmployeeRecordCreate {
        EmployeeRecordCreate {
            identity_id: None,
            full_name: "Marta Vidal".into(),
            email: "marta@hrdesk.test".into(),
            department: "Finance".into(),
            position: "Analyst".into(),
            hire_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            salary: Decimal::new(42000, 0),
        }
    }

    #[test]
    fn test_onboarding_steps_through_stages() {
        let fx = Fixture::new();
        let employees = fx.module::<EmployeeRecord>();
        fx.login(&fx.hr);

        let record = employees.create(input()).unwrap();
        assert_eq!(record.onboarding_stage, OnboardingStage::Offer);
        assert_eq!(employees.onboarding_pipeline().unwrap().len(), 1);

        for expected in [
            OnboardingStage::Documents,
            OnboardingStage::Orientation,
            OnboardingStage::Completed,
        ] {
            let advanced = employees.advance_onboarding(record.id).unwrap();
            assert_eq!(advanced.onboarding_stage, expected);
        }

        let err = employees.advance_onboarding(record.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert!(employees.onboarding_pipeline().unwrap().is_empty());
    }

    #[test]
    fn test_manager_views_but_cannot_manage() {
        let fx = Fixture::new();
        let employees = fx.module::<EmployeeRecord>();
        fx.login(&fx.admin);
        let record = employees.create(input()).unwrap();

        fx.login(&fx.manager);
        assert_eq!(employees.list().unwrap().len(), 1);
        assert_eq!(
            employees.advance_onboarding(record.id).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            employees.remove(record.id).unwrap_err().code,
            ErrorCode::PermissionDenied
        );

        fx.login(&fx.employee);
        assert!(!employees.flags().can_view);
    }

    #[test]
    fn test_missing_record() {
        let fx = Fixture::new();
        let employees = fx.module::<EmployeeRecord>();
        fx.login(&fx.hr);
        assert_eq!(
            employees.advance_onboarding(12345).unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(employees.remove(12345).unwrap_err().code, ErrorCode::NotFound);
    }
}
