//! TOML-based application configuration.
//!
//! Stores the active method profile (recommended ranges and the default
//! bloom ratio) plus session preferences. Ranges live here rather than as
//! constants so that new methods can ship their own profiles.
//!
//! The core is path-free: callers decide where the file lives and pass the
//! path in explicitly.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Inclusive recommended range for a scalar input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeF64 {
    pub min: f64,
    pub max: f64,
}

impl RangeF64 {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Method-specific scaling configuration: recommended ranges and the
/// default bloom ratio. Advisory only -- values outside a range produce
/// warnings, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodProfile {
    /// Method tag this profile applies to, e.g. "v60".
    pub method: String,
    /// Bloom water as a multiple of the dose.
    #[serde(default = "default_bloom_ratio")]
    pub bloom_ratio: f64,
    #[serde(default = "default_dose_range")]
    pub dose_g: RangeF64,
    #[serde(default = "default_yield_range")]
    pub yield_g: RangeF64,
    #[serde(default = "default_ratio_range")]
    pub ratio: RangeF64,
    #[serde(default = "default_temp_range")]
    pub water_temp_c: RangeF64,
}

impl MethodProfile {
    pub fn v60() -> Self {
        Self {
            method: "v60".into(),
            bloom_ratio: default_bloom_ratio(),
            dose_g: default_dose_range(),
            yield_g: default_yield_range(),
            ratio: default_ratio_range(),
            water_temp_c: default_temp_range(),
        }
    }
}

impl Default for MethodProfile {
    fn default() -> Self {
        Self::v60()
    }
}

// Default functions
fn default_bloom_ratio() -> f64 {
    3.0
}
fn default_dose_range() -> RangeF64 {
    RangeF64::new(10.0, 40.0)
}
fn default_yield_range() -> RangeF64 {
    RangeF64::new(150.0, 600.0)
}
fn default_ratio_range() -> RangeF64 {
    RangeF64::new(13.0, 18.0)
}
fn default_temp_range() -> RangeF64 {
    RangeF64::new(85.0, 96.0)
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_true() -> bool {
    true
}

/// Application configuration.
///
/// Serialized to/from TOML; the CLI stores it at
/// `~/.config/brewflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrewConfig {
    #[serde(default)]
    pub profile: MethodProfile,
    /// Tick resolution of the session scheduler in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Ask before a restart discards in-progress session state.
    #[serde(default = "default_true")]
    pub confirm_restart: bool,
    /// Ask before exit tears down an unfinished session.
    #[serde(default = "default_true")]
    pub confirm_exit: bool,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            profile: MethodProfile::default(),
            tick_interval_ms: default_tick_interval_ms(),
            confirm_restart: true,
            confirm_exit: true,
        }
    }
}

impl BrewConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// String-keyed read access for the `config get` command.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "bloom_ratio" => Some(self.profile.bloom_ratio.to_string()),
            "tick_interval_ms" => Some(self.tick_interval_ms.to_string()),
            "confirm_restart" => Some(self.confirm_restart.to_string()),
            "confirm_exit" => Some(self.confirm_exit.to_string()),
            "ratio_min" => Some(self.profile.ratio.min.to_string()),
            "ratio_max" => Some(self.profile.ratio.max.to_string()),
            "temp_min" => Some(self.profile.water_temp_c.min.to_string()),
            "temp_max" => Some(self.profile.water_temp_c.max.to_string()),
            _ => None,
        }
    }

    /// String-keyed write access for the `config set` command.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            "bloom_ratio" => {
                let v: f64 = value.parse().map_err(|_| invalid("expected a number".into()))?;
                if v <= 0.0 {
                    return Err(invalid("must be positive".into()));
                }
                self.profile.bloom_ratio = v;
            }
            "tick_interval_ms" => {
                let v: u64 = value.parse().map_err(|_| invalid("expected an integer".into()))?;
                if v == 0 {
                    return Err(invalid("must be nonzero".into()));
                }
                self.tick_interval_ms = v;
            }
            "confirm_restart" => {
                self.confirm_restart =
                    value.parse().map_err(|_| invalid("expected true/false".into()))?;
            }
            "confirm_exit" => {
                self.confirm_exit =
                    value.parse().map_err(|_| invalid("expected true/false".into()))?;
            }
            "ratio_min" => {
                self.profile.ratio.min =
                    value.parse().map_err(|_| invalid("expected a number".into()))?;
            }
            "ratio_max" => {
                self.profile.ratio.max =
                    value.parse().map_err(|_| invalid("expected a number".into()))?;
            }
            "temp_min" => {
                self.profile.water_temp_c.min =
                    value.parse().map_err(|_| invalid("expected a number".into()))?;
            }
            "temp_max" => {
                self.profile.water_temp_c.max =
                    value.parse().map_err(|_| invalid("expected a number".into()))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
