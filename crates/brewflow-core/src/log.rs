//! Brew log boundary.
//!
//! On completion plus user-confirmed outcome capture, the session produces
//! a [`CreateLogRequest`] and hands it to a [`LogSink`]. Persistence itself
//! lives behind the trait; the core never writes a log store of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plan::BrewPlan;
use crate::scaling::ScaledResult;

/// User-captured outcome of a finished brew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewOutcome {
    /// 1-5.
    pub rating: u8,
    pub tag: Option<String>,
    pub note: Option<String>,
}

/// Plain data request crossing the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub at: DateTime<Utc>,
    pub method: String,
    pub recipe_name: String,
    pub dose_g: f64,
    pub yield_g: f64,
    pub water_temp_c: f64,
    pub grind_label: String,
    pub rating: u8,
    pub tag: Option<String>,
    pub note: Option<String>,
}

impl CreateLogRequest {
    pub fn new(plan: &BrewPlan, scaled: &ScaledResult, outcome: BrewOutcome) -> Self {
        Self {
            at: Utc::now(),
            method: plan.method.clone(),
            recipe_name: plan.recipe_name.clone(),
            dose_g: scaled.dose_g,
            yield_g: scaled.yield_g,
            water_temp_c: scaled.water_temp_c,
            grind_label: scaled.grind_label.clone(),
            rating: outcome.rating.clamp(1, 5),
            tag: outcome.tag,
            note: outcome.note,
        }
    }
}

/// Persistence collaborator interface.
pub trait LogSink {
    fn append(&self, request: &CreateLogRequest) -> Result<(), CoreError>;
}
