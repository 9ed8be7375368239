//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;

use crate::sim::CarTuning;

/// Runner configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Level definition file
    pub level_path: PathBuf,
    /// Optional drive script; without one the runner reads stdin
    pub script_path: Option<PathBuf>,

    /// Fixed tick duration in seconds
    pub movement_precision: f32,
    /// Car top speed
    pub car_max_speed: f32,
    /// Exponential-approach acceleration rate
    pub car_acceleration_factor: f32,
    /// Heading interpolation rate while steering
    pub car_rotation_factor: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = CarTuning::default();

        let config = Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            level_path: env::var("LEVEL_FILE")
                .unwrap_or_else(|_| "levels/demo.json".to_string())
                .into(),
            script_path: env::var("SCRIPT_FILE").ok().map(PathBuf::from),

            movement_precision: parse_f32("MOVEMENT_PRECISION", defaults.movement_precision)?,
            car_max_speed: parse_f32("CAR_MAX_SPEED", defaults.max_speed)?,
            car_acceleration_factor: parse_f32(
                "CAR_ACCELERATION_FACTOR",
                defaults.acceleration_factor,
            )?,
            car_rotation_factor: parse_f32("CAR_ROTATION_FACTOR", defaults.rotation_factor)?,
        };

        if config.movement_precision <= 0.0 {
            return Err(ConfigError::NonPositive("MOVEMENT_PRECISION"));
        }

        Ok(config)
    }

    /// Movement tuning handed to every spawned car
    pub fn car_tuning(&self) -> CarTuning {
        CarTuning {
            max_speed: self.car_max_speed,
            acceleration_factor: self.car_acceleration_factor,
            rotation_factor: self.car_rotation_factor,
            movement_precision: self.movement_precision,
        }
    }
}

fn parse_f32(name: &'static str, default: f32) -> Result<f32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid numeric value for environment variable: {0}")]
    InvalidNumber(&'static str),

    #[error("Environment variable must be positive: {0}")]
    NonPositive(&'static str),
}
