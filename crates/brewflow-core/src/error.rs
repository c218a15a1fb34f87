//! Core error types for brewflow-core.
//!
//! Scaling never fails -- out-of-range inputs produce advisory warnings, not
//! errors. The fallible surfaces are plan building, configuration, and
//! recipe validation, each with its own error enum below.

use std::path::PathBuf;
use thiserror::Error;

use crate::recipe::StepKind;

/// Core error type for brewflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Plan construction errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanBuildError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recipe validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Plan construction errors.
///
/// Both variants are fatal to session start and must be surfaced before the
/// session UI is entered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanBuildError {
    /// The recipe has no step templates.
    #[error("recipe has no steps")]
    NoSteps,

    /// The number of water-taking steps does not match the number of
    /// scaled water targets.
    #[error("water target count mismatch: {expected} water steps, {found} targets")]
    WaterTargetMismatch { expected: usize, found: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Recipe validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A step carries both a wait duration and a milestone time.
    #[error("step kind {kind:?} must not set both duration_secs and target_elapsed_secs")]
    ConflictingTimer { kind: StepKind },

    /// A timed step is missing its required wait duration.
    #[error("step kind {kind:?} requires duration_secs")]
    MissingDuration { kind: StepKind },

    /// A timer field is set on a kind that does not allow it.
    #[error("step kind {kind:?} does not allow '{field}'")]
    TimerNotAllowed { kind: StepKind, field: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
