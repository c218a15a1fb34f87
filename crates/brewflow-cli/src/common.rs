//! Shared helpers for CLI commands.

use std::path::{Path, PathBuf};

use brewflow_core::scaling::{EditedField, ScaledInputs};
use brewflow_core::{BrewConfig, MethodProfile, RecipeSnapshot};

/// Returns `~/.config/brewflow[-dev]/` based on BREWFLOW_ENV.
///
/// Set BREWFLOW_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREWFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("brewflow-dev")
    } else {
        base_dir.join("brewflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<BrewConfig, Box<dyn std::error::Error>> {
    Ok(BrewConfig::load_from(&config_path()?)?)
}

/// Load a recipe from a TOML file, or fall back to the built-in V60.
pub fn load_recipe(path: Option<&Path>) -> Result<RecipeSnapshot, Box<dyn std::error::Error>> {
    let recipe = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str::<RecipeSnapshot>(&text)?
        }
        None => RecipeSnapshot::default_v60(),
    };
    recipe.validate()?;
    Ok(recipe)
}

/// Method profile for this run: the configured profile, with the recipe's
/// own bloom ratio taking precedence over the profile default.
pub fn effective_profile(config: &BrewConfig, recipe: &RecipeSnapshot) -> MethodProfile {
    let mut profile = config.profile.clone();
    if recipe.bloom_ratio > 0.0 {
        profile.bloom_ratio = recipe.bloom_ratio;
    }
    profile
}

/// Build scaling inputs from command-line flags. The edited field is
/// inferred: `--yield` alone marks yield as last edited, anything else
/// (including both flags) marks dose.
pub fn build_inputs(
    dose: Option<f64>,
    yield_g: Option<f64>,
    temp: Option<f64>,
    grind: Option<String>,
) -> ScaledInputs {
    let last_edited = if yield_g.is_some() && dose.is_none() {
        EditedField::Yield
    } else {
        EditedField::Dose
    };
    ScaledInputs {
        dose_g: dose,
        yield_g,
        water_temp_c: temp,
        grind_label: grind,
        last_edited,
    }
}
