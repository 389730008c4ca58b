//! Services

pub mod notifier;

pub use notifier::{DEFAULT_NOTICE_DURATION, Notice, NoticeKind, Notifier};
