use std::path::PathBuf;

use clap::Args;

use brewflow_core::scaling::scale;
use brewflow_core::BrewPlanBuilder;

use crate::common;

#[derive(Args)]
pub struct PlanArgs {
    /// Recipe TOML file (defaults to the built-in V60 recipe)
    #[arg(long)]
    pub recipe: Option<PathBuf>,
    /// Dose in grams; marks dose as the last-edited field
    #[arg(long)]
    pub dose: Option<f64>,
    /// Target yield in grams; marks yield as last edited when given alone
    #[arg(long = "yield")]
    pub yield_g: Option<f64>,
    /// Water temperature in Celsius
    #[arg(long)]
    pub temp: Option<f64>,
    /// Grind label
    #[arg(long)]
    pub grind: Option<String>,
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let recipe = common::load_recipe(args.recipe.as_deref())?;
    let config = common::load_config()?;
    let inputs = common::build_inputs(args.dose, args.yield_g, args.temp, args.grind);
    let profile = common::effective_profile(&config, &recipe);
    let scaled = scale(&recipe, &inputs, &profile);
    let plan = BrewPlanBuilder::build(&recipe, &scaled)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} ({}) -- {} g : {} g, {} C, {}",
        plan.recipe_name, plan.method, scaled.dose_g, scaled.yield_g, scaled.water_temp_c,
        scaled.grind_label
    );
    for step in &plan.steps {
        println!("  {}. {}", step.index + 1, step.instruction);
    }
    println!("Total water: {} g", plan.total_water_g);
    for warning in &scaled.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}
