use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{math::frame::AxisMap, track::estimator::EstimatorParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("listen_port must be a positive integer")]
    InvalidPort,

    #[error("pendulum_length_m must be positive and finite, got {0}")]
    NonPositivePendulumLength(f64),

    #[error("max_sway_radius_m must be non-negative and finite, got {0}")]
    InvalidSwayRadius(f64),

    #[error("mounting_roll_offset_deg must be finite, got {0}")]
    InvalidMountingOffset(f64),
}

/// Startup configuration. Every field is validated before any thread is
/// spawned; a violation is fatal.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// UDP port the sensor streams to.
    pub listen_port: u16,

    /// Vertical drop from anchor to tracked body (m).
    pub pendulum_length_m: f64,

    /// Horizontal sway clamp radius (m); omit to disable.
    #[serde(default)]
    pub max_sway_radius_m: Option<f64>,

    /// Roll offset compensating the sensor mounting (deg).
    #[serde(default)]
    pub mounting_roll_offset_deg: f64,

    /// Sensor-to-target axis mapping, e.g. `["+y", "-z", "-x"]`. Must be a
    /// proper rotation; the deserializer rejects reflections.
    #[serde(default)]
    pub axis_map: AxisMap,
}

impl TrackerConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !(self.pendulum_length_m.is_finite() && self.pendulum_length_m > 0.0) {
            return Err(ConfigError::NonPositivePendulumLength(
                self.pendulum_length_m,
            ));
        }
        if let Some(radius) = self.max_sway_radius_m {
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(ConfigError::InvalidSwayRadius(radius));
            }
        }
        if !self.mounting_roll_offset_deg.is_finite() {
            return Err(ConfigError::InvalidMountingOffset(
                self.mounting_roll_offset_deg,
            ));
        }

        Ok(())
    }

    pub fn estimator_params(&self) -> EstimatorParams {
        EstimatorParams {
            pendulum_length_m: self.pendulum_length_m,
            mounting_roll_offset_deg: self.mounting_roll_offset_deg,
            max_sway_radius_m: self.max_sway_radius_m,
        }
    }
}
