//! Shared types for HR Desk
//!
//! Domain models, error codes and small utilities used by the
//! application crate and any future front end.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::Role;
pub use serde::{Deserialize, Serialize};
