//! Session state machine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads -- the caller (normally the session driver) invokes `tick()`
//! periodically and all intents are applied from a single owner.
//!
//! ## Phases
//!
//! ```text
//! NotStarted -> (AwaitingPour | Active | StepReady) -> ... -> Completed
//! ```
//!
//! Step entry is keyed by step kind: preparation/agitate are ready
//! immediately, bloom waits for a pour confirmation before its countdown,
//! pour runs against a milestone on the session clock, wait counts down.
//!
//! Countdowns decrement by wall-clock deltas between ticks. The session
//! elapsed clock is never accumulated: it is recomputed from
//! `now - session_started` on every read, which makes it immune to
//! suspend/resume drift.
//!
//! Any intent that is not valid for the current phase is a logged no-op,
//! never an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::clock::Clock;
use crate::events::SessionEvent;
use crate::plan::{BrewPlan, ScaledStep};
use crate::recipe::StepKind;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    /// Bloom step entered; countdown deferred until the pour is confirmed.
    AwaitingPour,
    Active,
    StepReady,
    Completed,
}

/// Core session state machine. Owns the frozen plan for the session's
/// lifetime; restart resets the cursor against the same plan.
pub struct SessionEngine {
    plan: BrewPlan,
    clock: Arc<dyn Clock>,
    phase: SessionPhase,
    step_index: usize,
    /// Remaining countdown in milliseconds. `Some` iff the current step is
    /// actively counting down.
    remaining_ms: Option<u64>,
    /// Epoch ms of the first timed action. Set exactly once per session;
    /// cleared only by restart.
    session_started_epoch_ms: Option<u64>,
    /// Epoch ms at completion; freezes the elapsed clock.
    completed_epoch_ms: Option<u64>,
    /// Anchor for countdown deltas. `None` while paused or not counting.
    last_tick_epoch_ms: Option<u64>,
}

impl SessionEngine {
    pub fn new(plan: BrewPlan, clock: Arc<dyn Clock>) -> Self {
        Self {
            plan,
            clock,
            phase: SessionPhase::NotStarted,
            step_index: 0,
            remaining_ms: None,
            session_started_epoch_ms: None,
            completed_epoch_ms: None,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.remaining_ms
    }

    pub fn plan(&self) -> &BrewPlan {
        &self.plan
    }

    pub fn current_step(&self) -> Option<&ScaledStep> {
        self.plan.step(self.step_index)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Whether the session clock has started.
    pub fn session_clock_running(&self) -> bool {
        self.session_started_epoch_ms.is_some()
    }

    /// Elapsed session time, recomputed from wall clock on every read.
    /// `None` until the first timed action; frozen at completion.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.session_started_epoch_ms.map(|started| {
            let end = self
                .completed_epoch_ms
                .unwrap_or_else(|| self.clock.now_epoch_ms());
            end.saturating_sub(started)
        })
    }

    /// Whether the current pour step's milestone time has passed.
    pub fn milestone_passed(&self) -> bool {
        match (self.current_step().and_then(|s| s.target_elapsed_ms()), self.elapsed_ms()) {
            (Some(target), Some(elapsed)) => elapsed >= target,
            _ => false,
        }
    }

    /// True when `next` will advance: the step is ready, or it is a pour
    /// step awaiting manual confirmation of completion.
    pub fn ready_to_advance(&self) -> bool {
        match self.phase {
            SessionPhase::StepReady => true,
            SessionPhase::Active => self
                .current_step()
                .is_some_and(|s| s.kind == StepKind::Pour),
            _ => false,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> SessionEvent {
        SessionEvent::StateSnapshot {
            phase: self.phase,
            step_index: self.step_index,
            label: self
                .current_step()
                .map(|s| s.label.clone())
                .unwrap_or_default(),
            remaining_ms: self.remaining_ms,
            elapsed_ms: self.elapsed_ms(),
            ready_to_advance: self.ready_to_advance(),
            at: Utc::now(),
        }
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Enter the first step. Valid from `NotStarted` only.
    pub fn start(&mut self) -> Option<SessionEvent> {
        if self.phase != SessionPhase::NotStarted {
            debug!(phase = ?self.phase, "ignoring start: session already entered");
            return None;
        }
        let kind = self.current_step()?.kind;
        self.enter_current_step();
        Some(SessionEvent::SessionStarted {
            step_index: self.step_index,
            kind,
            at: Utc::now(),
        })
    }

    /// Confirm the bloom pour: starts the session clock (if unset) and the
    /// bloom countdown.
    pub fn confirm_pour(&mut self) -> Option<SessionEvent> {
        if self.phase != SessionPhase::AwaitingPour {
            debug!(phase = ?self.phase, "ignoring confirm_pour: no pour awaiting confirmation");
            return None;
        }
        self.ensure_session_clock();
        let step_index = self.step_index;
        match self.current_step().and_then(|s| s.duration_ms()) {
            Some(duration_ms) => {
                self.remaining_ms = Some(duration_ms);
                self.last_tick_epoch_ms = Some(self.clock.now_epoch_ms());
                self.phase = SessionPhase::Active;
                Some(SessionEvent::PourConfirmed {
                    step_index,
                    duration_secs: duration_ms / 1000,
                    at: Utc::now(),
                })
            }
            None => {
                // A bloom without a duration cannot count down; fail safe by
                // treating the step as immediately ready.
                warn!(step_index, "bloom step has no duration; marking ready");
                self.phase = SessionPhase::StepReady;
                Some(SessionEvent::StepCompleted {
                    step_index,
                    kind: StepKind::Bloom,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Advance to the next step, or complete the session on the final one.
    /// Valid from `StepReady`, and from `Active` on a pour step (manual
    /// completion of a milestone-tracked pour).
    pub fn next(&mut self) -> Option<SessionEvent> {
        let allowed = match self.phase {
            SessionPhase::StepReady => true,
            SessionPhase::Active => self
                .current_step()
                .is_some_and(|s| s.kind == StepKind::Pour),
            _ => false,
        };
        if !allowed {
            debug!(phase = ?self.phase, "ignoring next: step not ready");
            return None;
        }
        self.advance()
    }

    /// Freeze a running countdown. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if self.last_tick_epoch_ms.is_none() {
            return false;
        }
        self.flush_countdown();
        self.last_tick_epoch_ms = None;
        true
    }

    /// Re-anchor a frozen countdown. Returns whether anything changed.
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Active
            || self.remaining_ms.is_none()
            || self.last_tick_epoch_ms.is_some()
        {
            return false;
        }
        self.last_tick_epoch_ms = Some(self.clock.now_epoch_ms());
        true
    }

    /// Reset the cursor to step zero against the same frozen plan. Valid
    /// from every phase; destructive-confirmation is the boundary's job.
    pub fn restart(&mut self) -> Option<SessionEvent> {
        self.phase = SessionPhase::NotStarted;
        self.step_index = 0;
        self.remaining_ms = None;
        self.session_started_epoch_ms = None;
        self.completed_epoch_ms = None;
        self.last_tick_epoch_ms = None;
        Some(SessionEvent::SessionRestarted { at: Utc::now() })
    }

    /// Call periodically while the session clock or a countdown is live.
    /// Returns `Some(StepCompleted)` on a countdown zero-crossing.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        if self.last_tick_epoch_ms.is_none() || self.remaining_ms.is_none() {
            // Milestone step or paused countdown; the tick only refreshes
            // the caller's elapsed-clock display.
            return None;
        }
        self.flush_countdown();
        if self.remaining_ms == Some(0) {
            let step_index = self.step_index;
            let kind = self.current_step().map(|s| s.kind)?;
            self.remaining_ms = None;
            self.last_tick_epoch_ms = None;
            self.phase = SessionPhase::StepReady;
            return Some(SessionEvent::StepCompleted {
                step_index,
                kind,
                at: Utc::now(),
            });
        }
        None
    }

    /// Fail-safe for tick-source anomalies: a countdown that can never be
    /// driven is treated as immediately ready rather than leaving the
    /// session stuck.
    pub fn force_step_ready(&mut self) -> Option<SessionEvent> {
        if self.phase != SessionPhase::Active || self.remaining_ms.is_none() {
            return None;
        }
        warn!(step_index = self.step_index, "forcing countdown step ready");
        let step_index = self.step_index;
        let kind = self.current_step().map(|s| s.kind)?;
        self.remaining_ms = None;
        self.last_tick_epoch_ms = None;
        self.phase = SessionPhase::StepReady;
        Some(SessionEvent::StepCompleted {
            step_index,
            kind,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_session_clock(&mut self) {
        if self.session_started_epoch_ms.is_none() {
            self.session_started_epoch_ms = Some(self.clock.now_epoch_ms());
        }
    }

    fn flush_countdown(&mut self) {
        if let (Some(anchor), Some(remaining)) = (self.last_tick_epoch_ms, self.remaining_ms) {
            let now = self.clock.now_epoch_ms();
            let elapsed = now.saturating_sub(anchor);
            self.remaining_ms = Some(remaining.saturating_sub(elapsed));
            self.last_tick_epoch_ms = Some(now);
        }
    }

    fn advance(&mut self) -> Option<SessionEvent> {
        if self.step_index + 1 < self.plan.len() {
            self.step_index += 1;
            self.remaining_ms = None;
            self.last_tick_epoch_ms = None;
            let kind = self.current_step()?.kind;
            self.enter_current_step();
            Some(SessionEvent::StepAdvanced {
                step_index: self.step_index,
                kind,
                at: Utc::now(),
            })
        } else {
            self.remaining_ms = None;
            self.last_tick_epoch_ms = None;
            if self.session_started_epoch_ms.is_some() {
                self.completed_epoch_ms = Some(self.clock.now_epoch_ms());
            }
            self.phase = SessionPhase::Completed;
            Some(SessionEvent::SessionCompleted {
                elapsed_ms: self.elapsed_ms(),
                at: Utc::now(),
            })
        }
    }

    /// Apply the step-kind entry table to the current step.
    fn enter_current_step(&mut self) {
        let Some(step) = self.plan.step(self.step_index) else {
            self.phase = SessionPhase::Completed;
            return;
        };
        match step.kind {
            StepKind::Preparation | StepKind::Agitate => {
                self.phase = SessionPhase::StepReady;
                self.remaining_ms = None;
            }
            StepKind::Bloom => {
                self.phase = SessionPhase::AwaitingPour;
                self.remaining_ms = None;
            }
            StepKind::Pour => {
                self.ensure_session_clock();
                self.phase = SessionPhase::Active;
                self.remaining_ms = None;
            }
            StepKind::Wait => {
                let duration = step.duration_ms();
                self.ensure_session_clock();
                match duration {
                    Some(duration_ms) => {
                        self.remaining_ms = Some(duration_ms);
                        self.last_tick_epoch_ms = Some(self.clock.now_epoch_ms());
                        self.phase = SessionPhase::Active;
                    }
                    None => {
                        warn!(step_index = self.step_index, "wait step has no duration; marking ready");
                        self.remaining_ms = None;
                        self.phase = SessionPhase::StepReady;
                    }
                }
            }
        }
    }
}
