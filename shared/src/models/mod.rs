//! Data models
//!
//! Persisted as JSON arrays, one storage key per collection.
//! All IDs are `i64` snowflakes, timestamps are Unix milliseconds.
//! Each entity comes with `XxxCreate` / `XxxUpdate` payloads.

pub mod daily_status;
pub mod employee;
pub mod freelancer;
pub mod identity;
pub mod leave;
pub mod payroll;
pub mod role;
pub mod task;
pub mod time_entry;
pub mod vendor;

// Re-exports
pub use daily_status::*;
pub use employee::*;
pub use freelancer::*;
pub use identity::*;
pub use leave::*;
pub use payroll::*;
pub use role::*;
pub use task::*;
pub use time_entry::*;
pub use vendor::*;

use serde::{Deserialize, Serialize};

/// Engagement status shared by vendors and freelancers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    #[default]
    Active,
    Inactive,
}
