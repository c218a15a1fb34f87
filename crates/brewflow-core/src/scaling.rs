//! Proportional scaling of recipe quantities.
//!
//! `scale` is a pure function: recipe defaults plus user edits in, resolved
//! dose/yield/water targets plus advisory warnings out. Identical inputs
//! always produce identical outputs. Nothing here touches a clock, a file,
//! or global state.
//!
//! Rounding is round-half-away-from-zero everywhere (`f64::round`
//! semantics): dose to the nearest 0.1 g, yield and water amounts to the
//! nearest 1 g. The tie-break is stated explicitly because silent drift
//! between rounding modes is exactly the kind of bug this module exists to
//! prevent.

use serde::{Deserialize, Serialize};

use crate::config::MethodProfile;
use crate::recipe::RecipeSnapshot;

/// Which of the two coupled fields the user touched last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditedField {
    Dose,
    Yield,
}

/// User-edited inputs. Mutable only before a session starts; frozen once a
/// plan is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledInputs {
    #[serde(default)]
    pub dose_g: Option<f64>,
    #[serde(default)]
    pub yield_g: Option<f64>,
    #[serde(default)]
    pub water_temp_c: Option<f64>,
    #[serde(default)]
    pub grind_label: Option<String>,
    pub last_edited: EditedField,
}

impl ScaledInputs {
    /// Inputs that leave every recipe default untouched.
    pub fn unchanged() -> Self {
        Self {
            dose_g: None,
            yield_g: None,
            water_temp_c: None,
            grind_label: None,
            last_edited: EditedField::Dose,
        }
    }
}

/// One resolved pour amount, in pouring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterTarget {
    /// Incremental grams poured in this step.
    pub grams: u32,
    /// Running total after this step.
    pub cumulative_g: u32,
}

/// Advisory warnings. These never block scaling; the result is always
/// usable, if degenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    DoseOutOfRange { value: f64, min: f64, max: f64 },
    YieldOutOfRange { value: f64, min: f64, max: f64 },
    RatioOutOfRange { value: f64, min: f64, max: f64 },
    TempOutOfRange { value: f64, min: f64, max: f64 },
    BloomExceedsYield { bloom_g: u32, yield_g: u32 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DoseOutOfRange { value, min, max } => {
                write!(f, "dose {value} g outside recommended {min}-{max} g")
            }
            Warning::YieldOutOfRange { value, min, max } => {
                write!(f, "yield {value} g outside recommended {min}-{max} g")
            }
            Warning::RatioOutOfRange { value, min, max } => {
                write!(f, "ratio 1:{value:.1} outside recommended 1:{min}-1:{max}")
            }
            Warning::TempOutOfRange { value, min, max } => {
                write!(f, "water temperature {value} C outside recommended {min}-{max} C")
            }
            Warning::BloomExceedsYield { bloom_g, yield_g } => {
                write!(f, "bloom {bloom_g} g meets or exceeds yield {yield_g} g; pours clamped to zero")
            }
        }
    }
}

/// Output of [`scale`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledResult {
    pub dose_g: f64,
    pub yield_g: f64,
    /// Resolved brew ratio (yield / dose) after rounding.
    pub ratio: f64,
    pub water_temp_c: f64,
    pub grind_label: String,
    /// Water targets in pouring order: bloom first, then the pours.
    pub water_targets: Vec<WaterTarget>,
    pub warnings: Vec<Warning>,
}

/// Round to the nearest 0.1, half away from zero.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to the nearest whole gram, half away from zero.
fn round_to_gram(value: f64) -> f64 {
    value.round()
}

/// Derive per-step quantities from recipe defaults and user edits.
///
/// Last-edited-wins: the most recently edited of dose/yield is held fixed
/// and the other is recomputed through the recipe's default ratio.
pub fn scale(defaults: &RecipeSnapshot, inputs: &ScaledInputs, profile: &MethodProfile) -> ScaledResult {
    let base_ratio = defaults.default_yield_g / defaults.default_dose_g;

    let (dose_g, yield_g) = match inputs.last_edited {
        EditedField::Dose => {
            let dose = round_to_tenth(inputs.dose_g.unwrap_or(defaults.default_dose_g));
            let yield_g = round_to_gram(dose * base_ratio);
            (dose, yield_g)
        }
        EditedField::Yield => {
            let yield_g = round_to_gram(inputs.yield_g.unwrap_or(defaults.default_yield_g));
            let dose = round_to_tenth(yield_g / base_ratio);
            (dose, yield_g)
        }
    };

    let water_temp_c = inputs.water_temp_c.unwrap_or(defaults.water_temp_c);
    let grind_label = inputs
        .grind_label
        .clone()
        .unwrap_or_else(|| defaults.grind_label.clone());
    let ratio = if dose_g > 0.0 { yield_g / dose_g } else { 0.0 };

    let mut warnings = Vec::new();
    if !profile.dose_g.contains(dose_g) {
        warnings.push(Warning::DoseOutOfRange {
            value: dose_g,
            min: profile.dose_g.min,
            max: profile.dose_g.max,
        });
    }
    if !profile.yield_g.contains(yield_g) {
        warnings.push(Warning::YieldOutOfRange {
            value: yield_g,
            min: profile.yield_g.min,
            max: profile.yield_g.max,
        });
    }
    if !profile.ratio.contains(ratio) {
        warnings.push(Warning::RatioOutOfRange {
            value: ratio,
            min: profile.ratio.min,
            max: profile.ratio.max,
        });
    }
    if !profile.water_temp_c.contains(water_temp_c) {
        warnings.push(Warning::TempOutOfRange {
            value: water_temp_c,
            min: profile.water_temp_c.min,
            max: profile.water_temp_c.max,
        });
    }

    let water_targets = split_water(defaults, profile, dose_g, yield_g, &mut warnings);

    ScaledResult {
        dose_g,
        yield_g,
        ratio,
        water_temp_c,
        grind_label,
        water_targets,
        warnings,
    }
}

/// Split total water into per-step targets, keyed by method tag.
///
/// The V60 rule (also the fallback for unknown tags): bloom water is
/// `bloom_ratio x dose`, the remainder is split into exactly two pours at
/// 50/50 rounded independently, and the final cumulative target is forced
/// to equal the yield so no rounding residue survives.
fn split_water(
    defaults: &RecipeSnapshot,
    profile: &MethodProfile,
    dose_g: f64,
    yield_g: f64,
    warnings: &mut Vec<Warning>,
) -> Vec<WaterTarget> {
    match defaults.method.as_str() {
        "v60" => v60_split(profile, dose_g, yield_g, warnings),
        // Unknown tags fall back to the V60 two-pour rule.
        _ => v60_split(profile, dose_g, yield_g, warnings),
    }
}

fn v60_split(
    profile: &MethodProfile,
    dose_g: f64,
    yield_g: f64,
    warnings: &mut Vec<Warning>,
) -> Vec<WaterTarget> {
    let bloom = round_to_gram(profile.bloom_ratio * dose_g).max(0.0) as u32;
    let yield_whole = yield_g.max(0.0) as u32;

    let remaining = if bloom >= yield_whole {
        warnings.push(Warning::BloomExceedsYield {
            bloom_g: bloom,
            yield_g: yield_whole,
        });
        0
    } else {
        yield_whole - bloom
    };

    let first = round_to_gram(remaining as f64 / 2.0) as u32;
    // Forcing the second pour to the remainder lands the final cumulative
    // target on the yield exactly, with no rounding residue.
    let second = remaining - first;

    let mut cumulative = bloom;
    let mut targets = Vec::with_capacity(3);
    targets.push(WaterTarget { grams: bloom, cumulative_g: cumulative });
    cumulative += first;
    targets.push(WaterTarget { grams: first, cumulative_g: cumulative });
    cumulative += second;
    targets.push(WaterTarget { grams: second, cumulative_g: cumulative });
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RecipeSnapshot {
        RecipeSnapshot::default_v60()
    }

    fn profile() -> MethodProfile {
        MethodProfile::v60()
    }

    #[test]
    fn dose_edit_recomputes_yield() {
        let inputs = ScaledInputs {
            dose_g: Some(20.0),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let result = scale(&defaults(), &inputs, &profile());
        assert_eq!(result.dose_g, 20.0);
        assert_eq!(result.yield_g, 333.0);
        assert_eq!(
            result.water_targets,
            vec![
                WaterTarget { grams: 60, cumulative_g: 60 },
                WaterTarget { grams: 137, cumulative_g: 197 },
                WaterTarget { grams: 136, cumulative_g: 333 },
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn yield_edit_recomputes_dose() {
        let inputs = ScaledInputs {
            yield_g: Some(500.0),
            last_edited: EditedField::Yield,
            ..ScaledInputs::unchanged()
        };
        let result = scale(&defaults(), &inputs, &profile());
        assert_eq!(result.yield_g, 500.0);
        // 500 / (250/15) = 30.0
        assert_eq!(result.dose_g, 30.0);
    }

    #[test]
    fn dose_rounds_to_tenth() {
        let inputs = ScaledInputs {
            dose_g: Some(17.234),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let result = scale(&defaults(), &inputs, &profile());
        assert_eq!(result.dose_g, 17.2);
    }

    #[test]
    fn final_cumulative_target_equals_yield() {
        let inputs = ScaledInputs {
            dose_g: Some(18.7),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let result = scale(&defaults(), &inputs, &profile());
        let last = result.water_targets.last().unwrap();
        assert_eq!(f64::from(last.cumulative_g), result.yield_g);
    }

    #[test]
    fn bloom_exceeding_yield_clamps_and_warns() {
        // Degenerate recipe: tiny yield relative to dose.
        let mut recipe = defaults();
        recipe.default_dose_g = 30.0;
        recipe.default_yield_g = 60.0;
        let result = scale(&recipe, &ScaledInputs::unchanged(), &profile());
        // bloom = 3.0 * 30 = 90 >= yield 60
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::BloomExceedsYield { .. })));
        // No negative pours: the two pours are zero.
        assert_eq!(result.water_targets[1].grams, 0);
        assert_eq!(result.water_targets[2].grams, 0);
    }

    #[test]
    fn out_of_range_inputs_warn_but_still_scale() {
        let inputs = ScaledInputs {
            dose_g: Some(50.0),
            water_temp_c: Some(99.0),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let result = scale(&defaults(), &inputs, &profile());
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::DoseOutOfRange { .. })));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::TempOutOfRange { .. })));
        assert!(!result.water_targets.is_empty());
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let inputs = ScaledInputs {
            dose_g: Some(22.5),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let a = scale(&defaults(), &inputs, &profile());
        let b = scale(&defaults(), &inputs, &profile());
        assert_eq!(a, b);
    }
}
