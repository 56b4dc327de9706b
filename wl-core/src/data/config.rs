//! Configuration management
//!
//! Thresholds and pin identifiers, loaded once at startup from an optional
//! JSON file and then treated as immutable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{paths, pins, thresholds};
use crate::error::{Result, WaterLevelError};

/// Water level thresholds, as distances from the sensor in cm
///
/// Invariant: `top_cm < target_cm < fill_cm < bottom_cm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_top_cm")]
    pub top_cm: f32,
    #[serde(default = "default_bottom_cm")]
    pub bottom_cm: f32,
    #[serde(default = "default_target_cm")]
    pub target_cm: f32,
    #[serde(default = "default_fill_cm")]
    pub fill_cm: f32,
}

fn default_top_cm() -> f32 {
    thresholds::DEFAULT_TOP_CM
}

fn default_bottom_cm() -> f32 {
    thresholds::DEFAULT_BOTTOM_CM
}

fn default_target_cm() -> f32 {
    thresholds::DEFAULT_TARGET_CM
}

fn default_fill_cm() -> f32 {
    thresholds::DEFAULT_FILL_CM
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            top_cm: default_top_cm(),
            bottom_cm: default_bottom_cm(),
            target_cm: default_target_cm(),
            fill_cm: default_fill_cm(),
        }
    }
}

impl ThresholdConfig {
    /// Check every value is finite and the four thresholds are strictly ordered
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("top_cm", self.top_cm),
            ("target_cm", self.target_cm),
            ("fill_cm", self.fill_cm),
            ("bottom_cm", self.bottom_cm),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(WaterLevelError::invalid_config(
                    name,
                    format!("{} is not a non-negative finite distance", value),
                ));
            }
        }

        for pair in fields.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if lower >= upper {
                return Err(WaterLevelError::invalid_config(
                    lower_name,
                    format!(
                        "must be smaller than {} ({} >= {})",
                        upper_name, lower, upper
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// GPIO identifiers for the valve and the range sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    #[serde(default = "default_valve_pin")]
    pub valve: String,
    #[serde(default = "default_echo_pin")]
    pub echo: String,
    #[serde(default = "default_trigger_pin")]
    pub trigger: String,
}

fn default_valve_pin() -> String {
    pins::DEFAULT_VALVE_PIN.to_string()
}

fn default_echo_pin() -> String {
    pins::DEFAULT_ECHO_PIN.to_string()
}

fn default_trigger_pin() -> String {
    pins::DEFAULT_TRIGGER_PIN.to_string()
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            valve: default_valve_pin(),
            echo: default_echo_pin(),
            trigger: default_trigger_pin(),
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pins: PinConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| WaterLevelError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "Configuration file parsed");
        Ok(config)
    }

    /// Resolve which configuration file to read, if any
    ///
    /// An explicit path wins, then `WATERLEVEL_CONFIG`, then the default
    /// system file when it exists.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(env_path) = std::env::var(paths::CONFIG_ENV_VAR) {
            if !env_path.trim().is_empty() {
                return Some(PathBuf::from(env_path));
            }
        }
        let default = Path::new(paths::DEFAULT_CONFIG_FILE);
        default.exists().then(|| default.to_path_buf())
    }

    /// Load the resolved configuration file, or fall back to built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::load(&path)
            }
            None => {
                info!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("pins.valve", &self.pins.valve),
            ("pins.echo", &self.pins.echo),
            ("pins.trigger", &self.pins.trigger),
        ] {
            if value.trim().is_empty() {
                return Err(WaterLevelError::invalid_config(field, "pin identifier is empty"));
            }
        }
        self.thresholds.validate()
    }
}
