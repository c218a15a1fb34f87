//! Brew plan construction.
//!
//! A [`BrewPlan`] is an immutable, 0-indexed step sequence built once at
//! session start from a recipe's templates and the scaling output. Restart
//! reuses the same plan; it never rebuilds.
//!
//! Instruction text is regenerated here from the step kind and the resolved
//! numbers. Freeform text from the recipe is never carried into the plan,
//! so an instruction can never reference pre-scaling values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PlanBuildError;
use crate::recipe::{RecipeSnapshot, StepKind, StepTemplate};
use crate::scaling::{ScaledResult, WaterTarget};

/// Render whole seconds as m:ss.
pub(crate) fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// One fully resolved step of a brew plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledStep {
    pub index: usize,
    pub kind: StepKind,
    pub label: String,
    /// Regenerated instruction text (verb plus resolved numbers).
    pub instruction: String,
    /// Incremental water for this step, grams.
    pub water_g: Option<u32>,
    /// Running water total after this step, grams.
    pub cumulative_g: Option<u32>,
    pub duration_secs: Option<u64>,
    pub target_elapsed_secs: Option<u64>,
}

impl ScaledStep {
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_secs.map(|s| s.saturating_mul(1000))
    }

    pub fn target_elapsed_ms(&self) -> Option<u64> {
        self.target_elapsed_secs.map(|s| s.saturating_mul(1000))
    }

    fn render_instruction(template: &StepTemplate, water: Option<&WaterTarget>) -> String {
        match template.kind {
            StepKind::Preparation | StepKind::Agitate => template.label.clone(),
            StepKind::Bloom => {
                let (grams, cumulative) = water.map(|w| (w.grams, w.cumulative_g)).unwrap_or((0, 0));
                match template.duration_secs {
                    Some(secs) => format!(
                        "Pour {grams} g to bloom ({cumulative} g total), rest {secs} s"
                    ),
                    None => format!("Pour {grams} g to bloom ({cumulative} g total)"),
                }
            }
            StepKind::Pour => {
                let (grams, cumulative) = water.map(|w| (w.grams, w.cumulative_g)).unwrap_or((0, 0));
                let line = if template.is_cumulative {
                    format!("Pour to {cumulative} g total")
                } else {
                    format!("Pour {grams} g ({cumulative} g total)")
                };
                match template.target_elapsed_secs {
                    Some(target) => format!("{line} by {}", format_clock(target)),
                    None => line,
                }
            }
            StepKind::Wait => match template.duration_secs {
                Some(secs) => format!("Wait {secs} s"),
                None => "Wait".to_string(),
            },
        }
    }
}

/// Immutable, numbered step sequence for one brewing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewPlan {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub method: String,
    pub steps: Vec<ScaledStep>,
    pub total_water_g: u32,
}

impl BrewPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&ScaledStep> {
        self.steps.get(index)
    }
}

/// Combines step templates with scaling output into a frozen plan.
pub struct BrewPlanBuilder;

impl BrewPlanBuilder {
    /// Positionally merge templates with the scaled water targets: the k-th
    /// water-taking template receives the k-th target.
    pub fn build(snapshot: &RecipeSnapshot, scaled: &ScaledResult) -> Result<BrewPlan, PlanBuildError> {
        if snapshot.steps.is_empty() {
            return Err(PlanBuildError::NoSteps);
        }
        let expected = snapshot.water_step_count();
        if expected != scaled.water_targets.len() {
            return Err(PlanBuildError::WaterTargetMismatch {
                expected,
                found: scaled.water_targets.len(),
            });
        }

        let mut water_iter = scaled.water_targets.iter();
        let steps: Vec<ScaledStep> = snapshot
            .steps
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let water = if template.takes_water {
                    water_iter.next()
                } else {
                    None
                };
                ScaledStep {
                    index,
                    kind: template.kind,
                    label: template.label.clone(),
                    instruction: ScaledStep::render_instruction(template, water),
                    water_g: water.map(|w| w.grams),
                    cumulative_g: water.map(|w| w.cumulative_g),
                    duration_secs: template.duration_secs,
                    target_elapsed_secs: template.target_elapsed_secs,
                }
            })
            .collect();

        let total_water_g = scaled
            .water_targets
            .iter()
            .map(|w| w.cumulative_g)
            .max()
            .unwrap_or(0);

        Ok(BrewPlan {
            recipe_id: snapshot.id,
            recipe_name: snapshot.name.clone(),
            method: snapshot.method.clone(),
            steps,
            total_water_g,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MethodProfile;
    use crate::scaling::{scale, EditedField, ScaledInputs};

    fn scaled_for_dose(dose: f64) -> (RecipeSnapshot, ScaledResult) {
        let recipe = RecipeSnapshot::default_v60();
        let inputs = ScaledInputs {
            dose_g: Some(dose),
            last_edited: EditedField::Dose,
            ..ScaledInputs::unchanged()
        };
        let scaled = scale(&recipe, &inputs, &MethodProfile::v60());
        (recipe, scaled)
    }

    #[test]
    fn empty_recipe_fails_with_no_steps() {
        let (mut recipe, scaled) = scaled_for_dose(20.0);
        recipe.steps.clear();
        assert_eq!(
            BrewPlanBuilder::build(&recipe, &scaled),
            Err(PlanBuildError::NoSteps)
        );
    }

    #[test]
    fn water_count_mismatch_is_detected() {
        let (mut recipe, scaled) = scaled_for_dose(20.0);
        // Drop one water-taking step; the scaled result still has 3 targets.
        recipe.steps.retain(|s| s.kind != StepKind::Bloom);
        assert_eq!(
            BrewPlanBuilder::build(&recipe, &scaled),
            Err(PlanBuildError::WaterTargetMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn water_targets_merge_positionally() {
        let (recipe, scaled) = scaled_for_dose(20.0);
        let plan = BrewPlanBuilder::build(&recipe, &scaled).unwrap();
        assert_eq!(plan.len(), 6);
        // bloom, pour, pour carry water; the rest do not
        assert_eq!(plan.step(1).unwrap().water_g, Some(60));
        assert_eq!(plan.step(3).unwrap().cumulative_g, Some(197));
        assert_eq!(plan.step(4).unwrap().cumulative_g, Some(333));
        assert_eq!(plan.step(0).unwrap().water_g, None);
        assert_eq!(plan.step(5).unwrap().water_g, None);
        assert_eq!(plan.total_water_g, 333);
    }

    #[test]
    fn instructions_reference_scaled_values_only() {
        let (recipe, scaled) = scaled_for_dose(20.0);
        let plan = BrewPlanBuilder::build(&recipe, &scaled).unwrap();
        let bloom = &plan.step(1).unwrap().instruction;
        assert_eq!(bloom, "Pour 60 g to bloom (60 g total), rest 45 s");
        let pour = &plan.step(3).unwrap().instruction;
        assert_eq!(pour, "Pour to 197 g total by 1:30");
        // Default-dose bloom would be 45 g; it must not appear anywhere.
        for step in &plan.steps {
            assert!(!step.instruction.contains("45 g"));
        }
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let (recipe, scaled) = scaled_for_dose(20.0);
        let plan = BrewPlanBuilder::build(&recipe, &scaled).unwrap();
        for (i, step) in plan.steps.iter().enumerate() {
            assert_eq!(step.index, i);
        }
    }
}
