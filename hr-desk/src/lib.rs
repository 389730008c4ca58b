//! HR Desk - 人力资源工作台
//!
//! # 架构概述
//!
//! A single-user HR dashboard core: who is signed in, what their role lets
//! them do, and the persisted records behind every dashboard module.
//!
//! - **认证** (`auth`): login / signup / password reset, Argon2 hashes
//! - **权限** (`auth::permissions`): role → capability 表
//! - **存储** (`db`): key-value snapshots over memory / JSON files / redb
//! - **模块** (`modules`): tasks, vendors, freelancers, payroll, attendance,
//!   employees, leave; each one a guarded [`modules::FeatureModule`]
//! - **通知** (`services::notifier`): one transient notice per module
//!
//! # 模块结构
//!
//! ```text
//! hr-desk/src/
//! ├── core/          # 配置、状态
//! ├── auth/          # 会话、凭证、权限
//! ├── db/            # 存储后端与集合
//! ├── modules/       # 业务模块
//! ├── services/      # 通知
//! ├── utils/         # 日志、校验
//! ├── export.rs      # CSV 导出
//! └── seed.rs        # 演示数据
//! ```

// Security logging macro - 支持 tracing 格式说明符 (`%x`, `?x`)
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr, $($fields:tt)*) => {
        tracing::event!(target: "security", tracing::Level::$level, event = $event, $($fields)*)
    };
    ($level:ident, $event:expr) => {
        tracing::event!(target: "security", tracing::Level::$level, event = $event)
    };
}

pub mod auth;
pub mod core;
pub mod db;
pub mod export;
pub mod modules;
pub mod seed;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{Capability, SessionStore};
pub use core::{AppState, Config, Modules, setup_environment};
pub use db::{KvStore, StorageBackend, open_store};
pub use modules::{Access, AccessFlags, Action, FeatureModule, ModuleView};
pub use services::{Notice, NoticeKind, Notifier};

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

pub fn print_banner() {
    println!(
        r#"
    __  ______     ____            __
   / / / / __ \   / __ \___  _____/ /__
  / /_/ / /_/ /  / / / / _ \/ ___/ //_/
 / __  / _, _/  / /_/ /  __(__  ) ,<
/_/ /_/_/ |_|  /_____/\___/____/_/|_|
    "#
    );
}
