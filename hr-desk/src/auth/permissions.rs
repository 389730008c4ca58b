//! Permission Definitions
//!
//! 扁平 RBAC：每个能力 (capability) 对应一个角色白名单，角色之间没有继承。
//!
//! ## 设计原则
//! - 表是唯一来源：所有模块的访问检查都查这张表
//! - manager 不等于 admin，只拥有表里列出的能力
//! - 每个能力都是对 `Role` 的穷举 match，新增角色时编译器会报错

use shared::models::Role;
use std::fmt;
use std::str::FromStr;

/// A named permission, granted to a fixed set of roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageVendors,
    ManageFreelancers,
    ManageFreelancerContracts,
    ViewWorkforce,
    ProcessPayroll,
    ManageTasks,
    AdminSetup,
    ManageEmployees,
    ManageLeavePolicy,
    ApproveLeave,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::ManageVendors,
        Capability::ManageFreelancers,
        Capability::ManageFreelancerContracts,
        Capability::ViewWorkforce,
        Capability::ProcessPayroll,
        Capability::ManageTasks,
        Capability::AdminSetup,
        Capability::ManageEmployees,
        Capability::ManageLeavePolicy,
        Capability::ApproveLeave,
    ];

    /// Stable string name (`module:action`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageVendors => "vendors:manage",
            Self::ManageFreelancers => "freelancers:manage",
            Self::ManageFreelancerContracts => "freelancer_contracts:manage",
            Self::ViewWorkforce => "workforce:view",
            Self::ProcessPayroll => "payroll:process",
            Self::ManageTasks => "tasks:manage",
            Self::AdminSetup => "admin:setup",
            Self::ManageEmployees => "employees:manage",
            Self::ManageLeavePolicy => "leave_policies:manage",
            Self::ApproveLeave => "leave:approve",
        }
    }

    /// Whether `role` holds this capability
    pub fn granted_to(&self, role: Role) -> bool {
        use Role::*;
        match self {
            Self::ManageVendors => match role {
                Admin | Hr => true,
                Manager | Employee => false,
            },
            Self::ManageFreelancers => match role {
                Admin | Manager | Hr => true,
                Employee => false,
            },
            Self::ManageFreelancerContracts => match role {
                Admin | Hr => true,
                Manager | Employee => false,
            },
            Self::ViewWorkforce => match role {
                Admin | Manager | Hr => true,
                Employee => false,
            },
            Self::ProcessPayroll => match role {
                Admin | Hr => true,
                Manager | Employee => false,
            },
            Self::ManageTasks => match role {
                Admin | Manager => true,
                Hr | Employee => false,
            },
            Self::AdminSetup => match role {
                Admin => true,
                Manager | Hr | Employee => false,
            },
            Self::ManageEmployees => match role {
                Admin | Hr => true,
                Manager | Employee => false,
            },
            Self::ManageLeavePolicy => match role {
                Admin | Hr => true,
                Manager | Employee => false,
            },
            Self::ApproveLeave => match role {
                Admin | Manager | Hr => true,
                Employee => false,
            },
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Check a capability for a role
pub fn has_capability(role: Role, capability: Capability) -> bool {
    capability.granted_to(role)
}

/// All capabilities held by a role, in table order
pub fn capabilities_for(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|c| c.granted_to(role))
        .collect()
}

// ── Named predicates ────────────────────────────────────────────────

pub fn can_manage_vendors(role: Role) -> bool {
    has_capability(role, Capability::ManageVendors)
}

pub fn can_manage_freelancers(role: Role) -> bool {
    has_capability(role, Capability::ManageFreelancers)
}

pub fn can_manage_freelancer_contracts(role: Role) -> bool {
    has_capability(role, Capability::ManageFreelancerContracts)
}

pub fn can_view_workforce(role: Role) -> bool {
    has_capability(role, Capability::ViewWorkforce)
}

pub fn can_process_payroll(role: Role) -> bool {
    has_capability(role, Capability::ProcessPayroll)
}

pub fn can_manage_tasks(role: Role) -> bool {
    has_capability(role, Capability::ManageTasks)
}

pub fn can_access_admin_setup(role: Role) -> bool {
    has_capability(role, Capability::AdminSetup)
}

pub fn can_manage_employees(role: Role) -> bool {
    has_capability(role, Capability::ManageEmployees)
}

pub fn can_manage_leave_policy(role: Role) -> bool {
    has_capability(role, Capability::ManageLeavePolicy)
}

pub fn can_approve_leave(role: Role) -> bool {
    has_capability(role, Capability::ApproveLeave)
}
