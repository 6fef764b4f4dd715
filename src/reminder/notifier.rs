use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use super::Notification;
use crate::error::{Result, TrackerError};

/// Whether reminders may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Default => write!(f, "default"),
            Permission::Granted => write!(f, "granted"),
            Permission::Denied => write!(f, "denied"),
        }
    }
}

/// Something that can show a reminder to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask for permission to notify. Called once when reminders start.
    async fn request_permission(&self) -> Permission;

    /// Current permission state, without asking.
    fn permission(&self) -> Permission;

    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Prints reminders to stdout.
#[derive(Debug)]
pub struct ConsoleNotifier {
    enabled: bool,
    requested: AtomicBool,
}

impl ConsoleNotifier {
    /// A disabled notifier answers `Denied` when asked.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            requested: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn request_permission(&self) -> Permission {
        self.requested.store(true, Ordering::SeqCst);
        self.permission()
    }

    fn permission(&self) -> Permission {
        match (self.requested.load(Ordering::SeqCst), self.enabled) {
            (false, _) => Permission::Default,
            (true, true) => Permission::Granted,
            (true, false) => Permission::Denied,
        }
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(title = %notification.title, body = %notification.body, "Showing reminder");
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}: {}", notification.title, notification.body)
            .and_then(|_| stdout.flush())
            .map_err(|e| TrackerError::Notify(e.to_string()))
    }
}

/// Keeps every notification it is given. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    grant: bool,
    requested: AtomicBool,
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn granting() -> Self {
        Self {
            grant: true,
            ..Self::default()
        }
    }

    pub fn denying() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn request_permission(&self) -> Permission {
        self.requested.store(true, Ordering::SeqCst);
        self.permission()
    }

    fn permission(&self) -> Permission {
        match (self.requested.load(Ordering::SeqCst), self.grant) {
            (false, _) => Permission::Default,
            (true, true) => Permission::Granted,
            (true, false) => Permission::Denied,
        }
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_permission_follows_setting() {
        let enabled = ConsoleNotifier::new(true);
        assert_eq!(enabled.permission(), Permission::Default);
        assert_eq!(enabled.request_permission().await, Permission::Granted);
        assert_eq!(enabled.permission(), Permission::Granted);

        let disabled = ConsoleNotifier::new(false);
        assert_eq!(disabled.request_permission().await, Permission::Denied);
    }

    #[tokio::test]
    async fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::granting();
        notifier
            .notify(&Notification::new("Title", "Body"))
            .await
            .unwrap();
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].body, "Body");
    }
}
