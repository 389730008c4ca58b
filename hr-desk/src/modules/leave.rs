//! Leave policies and leave requests

use super::{Access, Action, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NOTE_LEN, validate_date_range, validate_id, validate_optional_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    LeavePolicy, LeavePolicyCreate, LeavePolicyUpdate, LeaveRequest, LeaveRequestCreate,
    LeaveRequestUpdate, LeaveStatus, LeaveType,
};
use shared::util::now_millis;

/// Upper bound for yearly allowance
const MAX_ANNUAL_DAYS: u32 = 366;

// ========== Policies ==========

impl Record for LeavePolicy {
    const STORAGE_KEY: &'static str = keys::LEAVE_POLICIES;
    const RESOURCE: &'static str = "Leave policy";

    fn id(&self) -> i64 {
        self.id
    }
}

trait LeavePolicyRules {
    fn validate(&self) -> AppResult<()>;
}

impl LeavePolicyRules for LeavePolicy {
    fn validate(&self) -> AppResult<()> {
        if self.annual_days > MAX_ANNUAL_DAYS {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("annual_days must be at most {MAX_ANNUAL_DAYS}"),
            )
            .with_detail("field", "annual_days"));
        }
        if self.carry_over_days > self.annual_days {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "carry_over_days must not exceed annual_days",
            )
            .with_detail("field", "carry_over_days"));
        }
        Ok(())
    }
}

impl Governed for LeavePolicy {
    type Create = LeavePolicyCreate;
    type Update = LeavePolicyUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "leave_policies",
        view: Access::Anyone,
        create: Access::Capability(Capability::ManageLeavePolicy),
        edit: Access::Capability(Capability::ManageLeavePolicy),
        delete: Access::Capability(Capability::ManageLeavePolicy),
    };

    fn build(id: i64, now: i64, input: LeavePolicyCreate) -> AppResult<Self> {
        let policy = LeavePolicy {
            id,
            leave_type: input.leave_type,
            annual_days: input.annual_days,
            carry_over_days: input.carry_over_days,
            requires_approval: input.requires_approval,
            created_at: now,
            updated_at: now,
        };
        policy.validate()?;
        Ok(policy)
    }

    fn apply(&mut self, patch: LeavePolicyUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(days) = patch.annual_days {
            next.annual_days = days;
        }
        if let Some(days) = patch.carry_over_days {
            next.carry_over_days = days;
        }
        if let Some(required) = patch.requires_approval {
            next.requires_approval = required;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<LeavePolicy> {
    pub fn policy_for(&self, leave_type: LeaveType) -> AppResult<Option<LeavePolicy>> {
        Ok(self.list()?.into_iter().find(|p| p.leave_type == leave_type))
    }
}

// ========== Requests ==========

impl Record for LeaveRequest {
    const STORAGE_KEY: &'static str = keys::LEAVE_REQUESTS;
    const RESOURCE: &'static str = "Leave request";

    fn id(&self) -> i64 {
        self.id
    }

    fn subject_id(&self) -> Option<i64> {
        Some(self.employee_id)
    }
}

trait LeaveRequestRules {
    fn validate(&self) -> AppResult<()>;
    fn ensure_pending(&self) -> AppResult<()>;
}

impl LeaveRequestRules for LeaveRequest {
    fn validate(&self) -> AppResult<()> {
        validate_id(self.employee_id, "employee_id")?;
        validate_date_range(self.start_date, self.end_date, "end_date")?;
        validate_optional_text(&self.reason, "reason", MAX_NOTE_LEN)
    }

    fn ensure_pending(&self) -> AppResult<()> {
        if self.status != LeaveStatus::Pending {
            return Err(AppError::business_rule(format!(
                "Leave request is already {:?}",
                self.status
            ))
            .with_detail("status", format!("{:?}", self.status)));
        }
        Ok(())
    }
}

impl Governed for LeaveRequest {
    type Create = LeaveRequestCreate;
    type Update = LeaveRequestUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "leave_requests",
        view: Access::OwnerOr(Capability::ApproveLeave),
        create: Access::OwnerOr(Capability::ApproveLeave),
        edit: Access::OwnerOr(Capability::ApproveLeave),
        delete: Access::OwnerOr(Capability::ApproveLeave),
    };

    fn build(id: i64, now: i64, input: LeaveRequestCreate) -> AppResult<Self> {
        let request = LeaveRequest {
            id,
            employee_id: input.employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason,
            status: LeaveStatus::Pending,
            decided_by: None,
            created_at: now,
            updated_at: now,
        };
        request.validate()?;
        Ok(request)
    }

    /// Only pending requests can be edited; status moves through
    /// `decide_leave` alone
    fn apply(&mut self, patch: LeaveRequestUpdate, now: i64) -> AppResult<()> {
        self.ensure_pending()?;
        let mut next = self.clone();
        if let Some(leave_type) = patch.leave_type {
            next.leave_type = leave_type;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if patch.reason.is_some() {
            next.reason = patch.reason;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<LeaveRequest> {
    /// Pending → Approved | Rejected
    ///
    /// Approvers cannot decide their own request.
    pub fn decide_leave(&self, id: i64, approve: bool) -> AppResult<LeaveRequest> {
        let result = self.try_mutate(
            id,
            Access::Capability(Capability::ApproveLeave),
            Action::Edit,
            |request, approver| {
                if request.employee_id == approver.id {
                    return Err(AppError::new(ErrorCode::SelfApprovalForbidden));
                }
                request.ensure_pending()?;
                request.status = if approve {
                    LeaveStatus::Approved
                } else {
                    LeaveStatus::Rejected
                };
                request.decided_by = Some(approver.id);
                request.updated_at = now_millis();
                Ok(())
            },
        );
        if let Ok(request) = &result {
            security_log!(
                INFO,
                "leave_decided",
                request_id = request.id,
                decided_by = request.decided_by.unwrap_or_default(),
                approved = approve
            );
        }
        self.report(Action::Edit, result)
    }

    /// Visible requests waiting for a decision
    pub fn pending(&self) -> AppResult<Vec<LeaveRequest>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.status == LeaveStatus::Pending)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::Fixture;
    use chrono::NaiveDate;

    fn request(employee_id: i64) -> LeaveRequestCreate {
        LeaveRequestCreate {
            employee_id,
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 8).unwrap(),
            reason: Some("Family trip".into()),
        }
    }

    #[test]
    fn test_request_and_approve() {
        let fx = Fixture::new();
        let requests = fx.module::<LeaveRequest>();

        fx.login(&fx.employee);
        let created = requests.create(request(fx.employee.id)).unwrap();
        assert_eq!(created.status, LeaveStatus::Pending);
        assert_eq!(created.days(), 5);
        assert_eq!(
            requests.decide_leave(created.id, true).unwrap_err().code,
            ErrorCode::PermissionDenied
        );

        fx.login(&fx.manager);
        assert_eq!(requests.pending().unwrap().len(), 1);
        let decided = requests.decide_leave(created.id, true).unwrap();
        assert_eq!(decided.status, LeaveStatus::Approved);
        assert_eq!(decided.decided_by, Some(fx.manager.id));

        let err = requests.decide_leave(created.id, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
    }

    #[test]
    fn test_self_approval_forbidden() {
        let fx = Fixture::new();
        let requests = fx.module::<LeaveRequest>();
        fx.login(&fx.hr);
        let own = requests.create(request(fx.hr.id)).unwrap();

        let err = requests.decide_leave(own.id, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::SelfApprovalForbidden);
        assert_eq!(requests.get(own.id).unwrap().status, LeaveStatus::Pending);

        fx.login(&fx.admin);
        let rejected = requests.decide_leave(own.id, false).unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
    }

    #[test]
    fn test_decided_request_is_frozen_for_owner() {
        let fx = Fixture::new();
        let requests = fx.module::<LeaveRequest>();
        fx.login(&fx.employee);
        let created = requests.create(request(fx.employee.id)).unwrap();
        fx.login(&fx.manager);
        requests.decide_leave(created.id, false).unwrap();

        fx.login(&fx.employee);
        let err = requests
            .update(created.id, LeaveRequestUpdate {
                reason: Some("Please reconsider".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
    }

    #[test]
    fn test_colleagues_do_not_see_each_other() {
        let fx = Fixture::new();
        let requests = fx.module::<LeaveRequest>();
        fx.login(&fx.employee);
        requests.create(request(fx.employee.id)).unwrap();

        fx.login(&fx.other_employee);
        assert!(requests.enter().records.is_empty());
        assert_eq!(
            requests.create(request(fx.employee.id)).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
    }

    #[test]
    fn test_policies_visible_to_everyone() {
        let fx = Fixture::new();
        let policies = fx.module::<LeavePolicy>();
        fx.login(&fx.hr);
        policies
            .create(LeavePolicyCreate {
                leave_type: LeaveType::Annual,
                annual_days: 22,
                carry_over_days: 5,
                requires_approval: true,
            })
            .unwrap();

        let err = policies
            .create(LeavePolicyCreate {
                leave_type: LeaveType::Sick,
                annual_days: 10,
                carry_over_days: 11,
                requires_approval: false,
            })
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "carry_over_days");

        fx.login(&fx.employee);
        let view = policies.enter();
        assert_eq!(view.records.len(), 1);
        assert!(view.flags.can_view);
        assert!(!view.flags.can_edit);
        assert_eq!(
            policies.policy_for(LeaveType::Annual).unwrap().unwrap().annual_days,
            22
        );
        assert!(policies.policy_for(LeaveType::Unpaid).unwrap().is_none());
    }
}
