//! Configuration file support for LiftLab.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlab/config.toml`.

use crate::progression::ProgressionSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub linear_progression: LinearProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Program-wide training settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Honor per-lift deload week overrides
    #[serde(default)]
    pub lift_specific_deloading: bool,

    #[serde(default = "default_increment")]
    pub default_increment: f64,

    #[serde(default = "default_rest_time_secs")]
    pub default_rest_time_secs: u32,

    #[serde(default)]
    pub weight_rounding: Option<f64>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            lift_specific_deloading: false,
            default_increment: default_increment(),
            default_rest_time_secs: default_rest_time_secs(),
            weight_rounding: None,
        }
    }
}

/// Linear progression failure handling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearProgressionConfig {
    #[serde(default = "default_failures_before_deload")]
    pub failures_before_deload: u32,

    #[serde(default = "default_deload_percentage")]
    pub deload_percentage: f64,
}

impl Default for LinearProgressionConfig {
    fn default() -> Self {
        Self {
            failures_before_deload: default_failures_before_deload(),
            deload_percentage: default_deload_percentage(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("liftlab")
}

fn default_increment() -> f64 {
    5.0
}

fn default_rest_time_secs() -> u32 {
    120
}

fn default_failures_before_deload() -> u32 {
    2
}

fn default_deload_percentage() -> f64 {
    0.1
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftlab").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let increment = self.settings.default_increment;
        if !increment.is_finite() || increment <= 0.0 {
            return Err(Error::Config(format!(
                "default_increment must be positive, got {}",
                increment
            )));
        }

        if let Some(step) = self.settings.weight_rounding {
            if !step.is_finite() || step <= 0.0 {
                return Err(Error::Config(format!(
                    "weight_rounding must be positive, got {}",
                    step
                )));
            }
        }

        let pct = self.linear_progression.deload_percentage;
        if !(0.0..1.0).contains(&pct) {
            return Err(Error::Config(format!(
                "deload_percentage must be in [0, 1), got {}",
                pct
            )));
        }

        Ok(())
    }

    /// Calculator settings for a program with the given deload week
    pub fn progression_settings(&self, deload_week: u32) -> ProgressionSettings {
        ProgressionSettings {
            deload_week,
            lift_specific_deloading: self.settings.lift_specific_deloading,
            default_increment: self.settings.default_increment,
            weight_rounding: self.settings.weight_rounding,
            lp_failures_before_deload: self.linear_progression.failures_before_deload,
            lp_deload_percentage: self.linear_progression.deload_percentage,
        }
    }
}
