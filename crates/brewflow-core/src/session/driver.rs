//! Single-writer session driver.
//!
//! The driver owns the [`SessionEngine`] outright. Ticks from the scheduler
//! and user intents arrive on one queue and are applied strictly in arrival
//! order, so the engine is never touched from two execution contexts and no
//! lock is needed. Events stream out on an unbounded channel; the latest
//! display projection is published on a watch channel.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::display::DisplayState;
use super::engine::{SessionEngine, SessionPhase};
use crate::events::SessionEvent;
use crate::ticker::TickScheduler;

/// Everything the engine can be asked to do, including scheduler ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIntent {
    Start,
    ConfirmPour,
    Next,
    Pause,
    Resume,
    Restart,
    Tick,
    /// Tear the driver down and hand the engine back.
    Shutdown,
}

/// Caller-side handle to a spawned driver.
pub struct SessionHandle {
    intents: mpsc::UnboundedSender<SessionIntent>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub display: watch::Receiver<DisplayState>,
    /// Resolves to the engine once the driver shuts down.
    pub task: JoinHandle<SessionEngine>,
}

impl SessionHandle {
    /// Enqueue an intent. Silently dropped if the driver is gone.
    pub fn send(&self, intent: SessionIntent) {
        let _ = self.intents.send(intent);
    }

    pub fn shutdown(&self) {
        let _ = self.intents.send(SessionIntent::Shutdown);
    }
}

pub struct SessionDriver {
    engine: SessionEngine,
    intents_rx: mpsc::UnboundedReceiver<SessionIntent>,
    /// Cloned into the tick scheduler so ticks join the same queue.
    intents_tx: mpsc::UnboundedSender<SessionIntent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    display_tx: watch::Sender<DisplayState>,
    ticker: TickScheduler,
}

impl SessionDriver {
    /// Spawn the driver task. Must be called from within a tokio runtime.
    pub fn spawn(engine: SessionEngine, tick_interval: Duration) -> SessionHandle {
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (display_tx, display_rx) = watch::channel(DisplayState::project(&engine));
        let driver = Self {
            engine,
            intents_rx,
            intents_tx: intents_tx.clone(),
            events_tx,
            display_tx,
            ticker: TickScheduler::new(tick_interval),
        };
        let task = tokio::spawn(driver.run());
        SessionHandle {
            intents: intents_tx,
            events: events_rx,
            display: display_rx,
            task,
        }
    }

    async fn run(mut self) -> SessionEngine {
        while let Some(intent) = self.intents_rx.recv().await {
            if intent == SessionIntent::Shutdown {
                debug!("session driver shutting down");
                break;
            }
            self.apply(intent);
        }
        self.ticker.cancel();
        self.engine
    }

    fn apply(&mut self, intent: SessionIntent) {
        let event = match intent {
            SessionIntent::Start => {
                let event = self.engine.start();
                self.sync_ticker();
                event
            }
            SessionIntent::ConfirmPour => {
                let event = self.engine.confirm_pour();
                self.sync_ticker();
                event
            }
            SessionIntent::Next => {
                // Cancellation point: the old step's loop must die before a
                // new one starts for the next step.
                self.ticker.cancel();
                let event = self.engine.next();
                self.sync_ticker();
                event
            }
            SessionIntent::Pause => {
                self.ticker.cancel();
                self.engine.pause();
                None
            }
            SessionIntent::Resume => {
                self.engine.resume();
                self.sync_ticker();
                None
            }
            SessionIntent::Restart => {
                self.ticker.cancel();
                let event = self.engine.restart();
                self.sync_ticker();
                event
            }
            SessionIntent::Tick => self.engine.tick(),
            // Handled by the run loop.
            SessionIntent::Shutdown => None,
        };

        if self.engine.is_completed() {
            self.ticker.cancel();
        }
        if let Some(event) = event {
            let _ = self.events_tx.send(event);
        }
        self.display_tx.send_replace(DisplayState::project(&self.engine));
    }

    /// Reconcile the tick loop with what the engine needs: ticks run while
    /// a countdown is live or the session clock is visible, and stop once
    /// the session completes.
    fn sync_ticker(&mut self) {
        let wants_ticks = !self.engine.is_completed()
            && self.engine.phase() != SessionPhase::NotStarted
            && (self.engine.session_clock_running() || self.engine.remaining_ms().is_some());
        if wants_ticks {
            if !self.ticker.start(self.intents_tx.clone()) {
                // Tick source refused to start: fail safe instead of
                // leaving the countdown stuck.
                if let Some(event) = self.engine.force_step_ready() {
                    let _ = self.events_tx.send(event);
                }
            }
        } else {
            self.ticker.cancel();
        }
    }
}
