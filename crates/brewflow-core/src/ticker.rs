//! Cooperative tick source for the session driver.
//!
//! One scheduler instance belongs to exactly one driver. Starting while a
//! loop is already live is a no-op; every cancellation point aborts the
//! loop before a new one may start, and the abort lands within one tick
//! interval.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::SessionIntent;

pub struct TickScheduler {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Start the repeating tick loop, sending [`SessionIntent::Tick`] into
    /// the driver's queue. No-op when a loop is already running. Returns
    /// whether a loop is live after the call.
    pub fn start(&mut self, tx: mpsc::UnboundedSender<SessionIntent>) -> bool {
        if self.is_running() {
            return true;
        }
        let interval = self.interval;
        debug!(interval_ms = interval.as_millis() as u64, "starting tick loop");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                // Receiver gone means the session is torn down.
                if tx.send(SessionIntent::Tick).is_err() {
                    break;
                }
            }
        }));
        self.is_running()
    }

    /// Abort the current loop, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("cancelling tick loop");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
