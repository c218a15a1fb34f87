use std::path::PathBuf;

use clap::Args;

use brewflow_core::scaling::scale;

use crate::common;

#[derive(Args)]
pub struct ScaleArgs {
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
}

pub fn run(args: ScaleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let recipe = common::load_recipe(args.recipe.as_deref())?;
    let config = common::load_config()?;
    let inputs = common::build_inputs(args.dose, args.yield_g, args.temp, args.grind);
    let profile = common::effective_profile(&config, &recipe);
    let result = scale(&recipe, &inputs, &profile);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
