//! Capture geometry and tuning, loadable from TOML with environment
//! overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub ruler: RulerConfig,
    pub gauge: GaugeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulerConfig {
    /// Pixels per internal unit of the measured quantity.
    pub pitch_px: f64,
    /// Offset from scroll position 0 to the viewport center. 0 means the
    /// host pads the strip so the minimum tick sits centered at offset 0.
    pub center_offset_px: f64,
    /// Programmatic scroll repositions within this distance of the expected
    /// offset are treated as echoes of our own write and swallowed.
    pub echo_tolerance_px: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeConfig {
    pub sweep_min_deg: f64,
    pub sweep_max_deg: f64,
    /// Pivot point of the pointer in the host's coordinate space.
    pub pivot_x: f64,
    pub pivot_y: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ruler: RulerConfig::default(),
            gauge: GaugeConfig::default(),
        }
    }
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            pitch_px: 8.0,
            center_offset_px: 0.0,
            echo_tolerance_px: 0.5,
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            sweep_min_deg: -135.0,
            sweep_max_deg: 135.0,
            pivot_x: 150.0,
            pivot_y: 150.0,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CaptureConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    /// Variables are prefixed with VITALOG_, e.g. VITALOG_RULER_PITCH_PX=10.0
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(val) = env_override("VITALOG_RULER_PITCH_PX")? {
            self.ruler.pitch_px = val
                .parse()
                .map_err(|_| ConfigError::Validation("Invalid VITALOG_RULER_PITCH_PX".to_string()))?;
        }
        if let Some(val) = env_override("VITALOG_RULER_CENTER_OFFSET_PX")? {
            self.ruler.center_offset_px = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid VITALOG_RULER_CENTER_OFFSET_PX".to_string())
            })?;
        }
        if let Some(val) = env_override("VITALOG_GAUGE_SWEEP_MIN_DEG")? {
            self.gauge.sweep_min_deg = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid VITALOG_GAUGE_SWEEP_MIN_DEG".to_string())
            })?;
        }
        if let Some(val) = env_override("VITALOG_GAUGE_SWEEP_MAX_DEG")? {
            self.gauge.sweep_max_deg = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid VITALOG_GAUGE_SWEEP_MAX_DEG".to_string())
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ruler.pitch_px <= 0.0 || !self.ruler.pitch_px.is_finite() {
            return Err(ConfigError::Validation(
                "ruler.pitch_px must be positive".to_string(),
            ));
        }
        if self.ruler.center_offset_px < 0.0 {
            return Err(ConfigError::Validation(
                "ruler.center_offset_px must be non-negative".to_string(),
            ));
        }
        if self.ruler.echo_tolerance_px < 0.0 {
            return Err(ConfigError::Validation(
                "ruler.echo_tolerance_px must be non-negative".to_string(),
            ));
        }
        if self.gauge.sweep_min_deg >= self.gauge.sweep_max_deg {
            return Err(ConfigError::Validation(
                "gauge.sweep_min_deg must be < sweep_max_deg".to_string(),
            ));
        }
        if self.gauge.sweep_max_deg - self.gauge.sweep_min_deg > 360.0 {
            return Err(ConfigError::Validation(
                "gauge sweep must not exceed 360 degrees".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self
            .to_toml_string()
            .map_err(|e| ConfigError::Validation(format!("TOML serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Absent variables are skipped; unreadable (non-Unicode) ones surface as
/// [`ConfigError::EnvVar`] instead of silently keeping the file value.
fn env_override(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVar(e)),
    }
}
