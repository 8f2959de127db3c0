//! Imperative navigation handle given to the strip's parent.
//!
//! The parent keeps a [`DateStripHandle`] and calls
//! [`go_to_today`](DateStripHandle::go_to_today) from anywhere (a header
//! button, a notification). The controller picks the command up on its next
//! [`tick`](crate::controller::DateStripController::tick).

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::trace;

/// A navigation command queued by a [`DateStripHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripCommand {
    /// Scroll to today, growing the window if needed.
    GoToToday,
    /// Scroll to the given date, growing the window if needed.
    GoToDate(NaiveDate),
}

/// Cloneable, thread-safe handle that queues navigation for one strip.
///
/// Commands are fire-and-forget. Only the newest one is kept, so issuing a
/// second jump before the first is picked up retargets it.
#[derive(Clone, Default)]
pub struct DateStripHandle {
    pending: Arc<Mutex<Option<StripCommand>>>,
}

impl DateStripHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Requests a scroll to today.
    pub fn go_to_today(&self) {
        self.push(StripCommand::GoToToday);
    }

    /// Requests a scroll to `date`.
    pub fn go_to_date(&self, date: NaiveDate) {
        self.push(StripCommand::GoToDate(date));
    }

    /// Whether a command is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    fn push(&self, command: StripCommand) {
        if let Some(previous) = self.pending.lock().replace(command) {
            trace!(?previous, ?command, "navigation retargeted before it ran");
        }
    }

    pub(crate) fn take(&self) -> Option<StripCommand> {
        self.pending.lock().take()
    }
}

impl PartialEq for DateStripHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pending, &other.pending)
    }
}

impl Eq for DateStripHandle {}

impl std::fmt::Debug for DateStripHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateStripHandle")
            .field("pending", &*self.pending.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_command_wins() {
        let handle = DateStripHandle::new();
        assert!(!handle.is_pending());
        handle.go_to_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        handle.go_to_today();
        assert!(handle.is_pending());
        assert_eq!(handle.take(), Some(StripCommand::GoToToday));
        assert_eq!(handle.take(), None);
    }

    #[test]
    fn clones_share_the_queue() {
        let handle = DateStripHandle::new();
        let remote = handle.clone();
        assert_eq!(handle, remote);
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        std::thread::spawn(move || remote.go_to_date(date))
            .join()
            .unwrap();
        assert_eq!(handle.take(), Some(StripCommand::GoToDate(date)));
        assert_ne!(handle, DateStripHandle::new());
    }
}
