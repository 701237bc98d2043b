//! Single-slot debounce timer.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs an action once a quiet period has elapsed since the last `schedule`.
///
/// Scheduling again before the delay expires supersedes the earlier action;
/// nothing is queued. The timer is owned by whoever holds the `Debouncer`:
/// dropping it aborts the pending action.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            handle: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the quiet period; `action` runs when it expires.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Abort the pending action. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        self.handle.take().is_some_and(|handle| {
            let waiting = !handle.is_finished();
            handle.abort();
            waiting
        })
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
