use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipe::StepKind;
use crate::session::SessionPhase;

/// Every observable state change in a session produces an event.
/// The UI collaborator consumes these; the persistence collaborator only
/// ever sees the final `CreateLogRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    SessionStarted {
        step_index: usize,
        kind: StepKind,
        at: DateTime<Utc>,
    },
    /// The user confirmed the bloom pour; countdown and session clock run.
    PourConfirmed {
        step_index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown crossed zero; the step is ready to advance.
    StepCompleted {
        step_index: usize,
        kind: StepKind,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        step_index: usize,
        kind: StepKind,
        at: DateTime<Utc>,
    },
    SessionRestarted {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        elapsed_ms: Option<u64>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SessionPhase,
        step_index: usize,
        label: String,
        remaining_ms: Option<u64>,
        elapsed_ms: Option<u64>,
        ready_to_advance: bool,
        at: DateTime<Utc>,
    },
}
