//! Transient notification
//!
//! One message slot per module. A message is visible until its deadline;
//! showing another one replaces it and restarts the clock. Expiry is
//! evaluated lazily on read, so no background task is needed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Default lifetime of a notice
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

#[derive(Debug)]
struct ActiveNotice {
    notice: Notice,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct Notifier {
    default_duration: Duration,
    slot: Mutex<Option<ActiveNotice>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION)
    }
}

impl Notifier {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            slot: Mutex::new(None),
        }
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Show with the default duration
    pub fn show(&self, message: impl Into<String>, kind: NoticeKind) {
        self.show_for(message, kind, self.default_duration);
    }

    pub fn show_for(&self, message: impl Into<String>, kind: NoticeKind, duration: Duration) {
        let notice = Notice {
            message: message.into(),
            kind,
        };
        *self.slot.lock() = Some(ActiveNotice {
            notice,
            expires_at: Instant::now() + duration,
        });
    }

    /// The visible notice, if its deadline has not passed
    pub fn current(&self) -> Option<Notice> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(active) if Instant::now() < active.expires_at => Some(active.notice.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub fn dismiss(&self) {
        *self.slot.lock() = None;
    }
}
