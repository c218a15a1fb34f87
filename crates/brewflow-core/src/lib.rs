//! # Brewflow Core Library
//!
//! Core business logic for Brewflow, a guided pour-over brewing assistant.
//! All operations are available via a standalone CLI binary; any GUI is a
//! thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Scaling engine**: a pure calculator deriving per-step water targets
//!   from recipe defaults and user edits, with an exact-sum guarantee on
//!   the final cumulative pour
//! - **Plan builder**: merges step templates with scaled targets into an
//!   immutable, numbered brew plan with regenerated instruction text
//! - **Session engine**: a wall-clock-based state machine; the session
//!   driver owns it and applies ticks and user intents in arrival order
//! - **Tick scheduler**: a single cancellable repeating tick source per
//!   active session
//!
//! ## Key Components
//!
//! - [`scaling::scale`]: dose/yield/water scaling
//! - [`BrewPlanBuilder`]: plan construction
//! - [`SessionEngine`]: session state machine
//! - [`SessionDriver`]: single-writer intent loop
//! - [`TickScheduler`]: tick source

pub mod config;
pub mod error;
pub mod events;
pub mod log;
pub mod plan;
pub mod recipe;
pub mod scaling;
pub mod session;
pub mod ticker;

pub use config::{BrewConfig, MethodProfile, RangeF64};
pub use error::{ConfigError, CoreError, PlanBuildError, ValidationError};
pub use events::SessionEvent;
pub use log::{BrewOutcome, CreateLogRequest, LogSink};
pub use plan::{BrewPlan, BrewPlanBuilder, ScaledStep};
pub use recipe::{RecipeSnapshot, StepKind, StepTemplate};
pub use scaling::{scale, EditedField, ScaledInputs, ScaledResult, Warning, WaterTarget};
pub use session::{
    Clock, DisplayState, ManualClock, SessionDriver, SessionEngine, SessionHandle, SessionIntent,
    SessionPhase, SystemClock,
};
pub use ticker::TickScheduler;
