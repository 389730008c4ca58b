//! Authentication & Authorization
//!
//! - [`SessionStore`] - 当前登录身份 (login / signup / reset / logout)
//! - [`Authenticator`] - 凭证校验接口，默认 [`LocalAuthenticator`]
//! - [`permissions`] - role → capability 表

pub mod authenticator;
pub mod password;
pub mod permissions;
pub mod session;

pub use authenticator::{Authenticator, IdentityDirectory, LocalAuthenticator};
pub use permissions::{Capability, capabilities_for, has_capability};
pub use session::SessionStore;
