//! Freelancers and their contracts

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_date_range, validate_email,
    validate_id, validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ContractStatus, EngagementStatus, Freelancer, FreelancerContract, FreelancerContractCreate,
    FreelancerContractUpdate, FreelancerCreate, FreelancerUpdate,
};
use shared::util::{normalize_email, now_millis};

// ========== Freelancer ==========

impl Record for Freelancer {
    const STORAGE_KEY: &'static str = keys::FREELANCERS;
    const RESOURCE: &'static str = "Freelancer";

    fn id(&self) -> i64 {
        self.id
    }
}

trait FreelancerRules {
    fn validate(&self) -> AppResult<()>;
}

impl FreelancerRules for Freelancer {
    fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.name, "name", MAX_NAME_LEN)?;
        validate_email(&self.email, "email")?;
        validate_required_text(&self.skill, "skill", MAX_SHORT_TEXT_LEN)?;
        validate_amount(self.hourly_rate, "hourly_rate")
    }
}

impl Governed for Freelancer {
    type Create = FreelancerCreate;
    type Update = FreelancerUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "freelancers",
        view: Access::Capability(Capability::ViewWorkforce),
        create: Access::Capability(Capability::ManageFreelancers),
        edit: Access::Capability(Capability::ManageFreelancers),
        delete: Access::Capability(Capability::ManageFreelancers),
    };

    fn build(id: i64, now: i64, input: FreelancerCreate) -> AppResult<Self> {
        let freelancer = Freelancer {
            id,
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            skill: input.skill.trim().to_string(),
            hourly_rate: input.hourly_rate,
            status: EngagementStatus::Active,
            created_at: now,
            updated_at: now,
        };
        freelancer.validate()?;
        Ok(freelancer)
    }

    fn apply(&mut self, patch: FreelancerUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = normalize_email(&email);
        }
        if let Some(skill) = patch.skill {
            next.skill = skill.trim().to_string();
        }
        if let Some(rate) = patch.hourly_rate {
            next.hourly_rate = rate;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

// ========== Contract ==========

impl Record for FreelancerContract {
    const STORAGE_KEY: &'static str = keys::FREELANCER_CONTRACTS;
    const RESOURCE: &'static str = "Contract";

    fn id(&self) -> i64 {
        self.id
    }
}

trait ContractRules {
    fn validate(&self) -> AppResult<()>;
    fn can_move_to(&self, next: ContractStatus) -> bool;
}

impl ContractRules for FreelancerContract {
    fn validate(&self) -> AppResult<()> {
        validate_id(self.freelancer_id, "freelancer_id")?;
        validate_required_text(&self.title, "title", MAX_NAME_LEN)?;
        if let Some(end) = self.end_date {
            validate_date_range(self.start_date, end, "end_date")?;
        }
        validate_amount(self.rate, "rate")
    }

    /// Draft → Active → Completed | Terminated; a draft may also be dropped
    /// straight to Terminated
    fn can_move_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self.status, next),
            (Draft, Active) | (Draft, Terminated) | (Active, Completed) | (Active, Terminated)
        ) || self.status == next
    }
}

impl Governed for FreelancerContract {
    type Create = FreelancerContractCreate;
    type Update = FreelancerContractUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "freelancer_contracts",
        view: Access::Capability(Capability::ViewWorkforce),
        create: Access::Capability(Capability::ManageFreelancerContracts),
        edit: Access::Capability(Capability::ManageFreelancerContracts),
        delete: Access::Capability(Capability::ManageFreelancerContracts),
    };

    fn build(id: i64, now: i64, input: FreelancerContractCreate) -> AppResult<Self> {
        let contract = FreelancerContract {
            id,
            freelancer_id: input.freelancer_id,
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            rate: input.rate,
            status: ContractStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        contract.validate()?;
        Ok(contract)
    }

    fn apply(&mut self, patch: FreelancerContractUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if patch.end_date.is_some() {
            next.end_date = patch.end_date;
        }
        if let Some(rate) = patch.rate {
            next.rate = rate;
        }
        if let Some(status) = patch.status {
            if !self.can_move_to(status) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusTransition,
                    format!("Contract cannot move from {:?} to {:?}", self.status, status),
                )
                .with_detail("field", "status"));
            }
            next.status = status;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<FreelancerContract> {
    /// Contracts of one freelancer
    pub fn contracts_for(&self, freelancer_id: i64) -> AppResult<Vec<FreelancerContract>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.freelancer_id == freelancer_id)
            .collect())
    }

    /// Move a contract to a new status
    pub fn set_contract_status(
        &self,
        id: i64,
        status: ContractStatus,
    ) -> AppResult<FreelancerContract> {
        let access = FreelancerContract::POLICY.edit;
        let result = self.try_mutate(id, access, Action::Edit, |contract, _| {
            contract.apply(
                FreelancerContractUpdate {
                    status: Some(status),
                    ..Default::default()
                },
                now_millis(),
            )
        });
        self.report(Action::Edit, result)
    }
}
