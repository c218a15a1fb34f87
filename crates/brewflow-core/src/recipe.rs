//! Recipe snapshot and step templates.
//!
//! A [`RecipeSnapshot`] is supplied read-only by an external repository
//! collaborator and is never mutated by the core. Step timing is modelled as
//! two mutually exclusive optional fields: a counted-down wait duration
//! (bloom/wait) and a milestone time from session start (pour). They are
//! never collapsed into one field.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Preparation,
    Bloom,
    Pour,
    Wait,
    Agitate,
}

/// One step of a recipe, before scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTemplate {
    pub kind: StepKind,
    pub label: String,
    /// Counted-down wait time in seconds. Bloom and wait steps only.
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Target elapsed time (from session start) in seconds by which the
    /// pour should be complete. Pour steps only.
    #[serde(default)]
    pub target_elapsed_secs: Option<u64>,
    /// Whether this step consumes one scaled water target.
    #[serde(default)]
    pub takes_water: bool,
    /// Whether the step's water amount reads as a running total.
    #[serde(default)]
    pub is_cumulative: bool,
}

impl StepTemplate {
    pub fn preparation(label: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Preparation,
            label: label.into(),
            duration_secs: None,
            target_elapsed_secs: None,
            takes_water: false,
            is_cumulative: false,
        }
    }

    pub fn bloom(label: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            kind: StepKind::Bloom,
            label: label.into(),
            duration_secs: Some(duration_secs),
            target_elapsed_secs: None,
            takes_water: true,
            is_cumulative: false,
        }
    }

    pub fn pour(label: impl Into<String>, target_elapsed_secs: u64) -> Self {
        Self {
            kind: StepKind::Pour,
            label: label.into(),
            duration_secs: None,
            target_elapsed_secs: Some(target_elapsed_secs),
            takes_water: true,
            is_cumulative: true,
        }
    }

    pub fn wait(label: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            kind: StepKind::Wait,
            label: label.into(),
            duration_secs: Some(duration_secs),
            target_elapsed_secs: None,
            takes_water: false,
            is_cumulative: false,
        }
    }

    pub fn agitate(label: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Agitate,
            label: label.into(),
            duration_secs: None,
            target_elapsed_secs: None,
            takes_water: false,
            is_cumulative: false,
        }
    }

    /// Check the timer-field invariant for this step's kind.
    ///
    /// Bloom and wait steps require a duration and forbid a milestone. Pour
    /// steps forbid a duration (the milestone is optional). Preparation and
    /// agitate steps carry no timer fields at all.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_secs.is_some() && self.target_elapsed_secs.is_some() {
            return Err(ValidationError::ConflictingTimer { kind: self.kind });
        }
        match self.kind {
            StepKind::Bloom | StepKind::Wait => {
                if self.target_elapsed_secs.is_some() {
                    return Err(ValidationError::TimerNotAllowed {
                        kind: self.kind,
                        field: "target_elapsed_secs",
                    });
                }
                if self.duration_secs.is_none() {
                    return Err(ValidationError::MissingDuration { kind: self.kind });
                }
            }
            StepKind::Pour => {
                if self.duration_secs.is_some() {
                    return Err(ValidationError::TimerNotAllowed {
                        kind: self.kind,
                        field: "duration_secs",
                    });
                }
            }
            StepKind::Preparation | StepKind::Agitate => {
                if self.duration_secs.is_some() {
                    return Err(ValidationError::TimerNotAllowed {
                        kind: self.kind,
                        field: "duration_secs",
                    });
                }
                if self.target_elapsed_secs.is_some() {
                    return Err(ValidationError::TimerNotAllowed {
                        kind: self.kind,
                        field: "target_elapsed_secs",
                    });
                }
            }
        }
        Ok(())
    }
}

/// Immutable recipe snapshot, loaded once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSnapshot {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    /// Method tag, e.g. "v60". Selects the water split rule and the
    /// recommended ranges used for advisory warnings.
    pub method: String,
    pub default_dose_g: f64,
    pub default_yield_g: f64,
    pub water_temp_c: f64,
    pub grind_label: String,
    /// Brew ratio (yield / dose) of the recipe defaults.
    pub ratio: f64,
    /// Bloom water as a multiple of the dose.
    pub bloom_ratio: f64,
    pub steps: Vec<StepTemplate>,
}

impl RecipeSnapshot {
    /// The built-in V60 recipe: rinse, bloom, two pours, drawdown.
    pub fn default_v60() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "V60 Classic".into(),
            method: "v60".into(),
            default_dose_g: 15.0,
            default_yield_g: 250.0,
            water_temp_c: 93.0,
            grind_label: "medium-fine".into(),
            ratio: 250.0 / 15.0,
            bloom_ratio: 3.0,
            steps: vec![
                StepTemplate::preparation("Rinse the filter and preheat the brewer"),
                StepTemplate::bloom("Bloom", 45),
                StepTemplate::agitate("Gently swirl the brewer"),
                StepTemplate::pour("First pour", 90),
                StepTemplate::pour("Second pour", 150),
                StepTemplate::wait("Drawdown", 45),
            ],
        }
    }

    /// Validate every step template against the timer-field invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for step in &self.steps {
            step.validate()?;
        }
        Ok(())
    }

    /// Number of steps that consume a scaled water target.
    pub fn water_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.takes_water).count()
    }
}
