//! Car simulation modules

pub mod car;
pub mod kinematics;
pub mod recorder;

pub use car::{Car, ContactOutcome};
pub use recorder::RotationTimeline;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a spawned car
pub type CarId = Uuid;

/// Discrete steering state at a simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Left,
    #[default]
    Straight,
    Right,
}

impl Rotation {
    /// Steering sign: -1 left, 0 straight, +1 right
    pub fn sign(self) -> f32 {
        match self {
            Rotation::Left => -1.0,
            Rotation::Straight => 0.0,
            Rotation::Right => 1.0,
        }
    }
}

/// Car role; the transition player -> bot is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarRole {
    Player,
    Bot,
}

/// Position and heading on the driving plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Heading in radians, 0 = +x axis
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }
}

/// Movement tuning shared by every car in a level
#[derive(Debug, Clone, Copy)]
pub struct CarTuning {
    /// Maximum forward speed (units per second)
    pub max_speed: f32,
    /// Exponential-approach acceleration rate
    pub acceleration_factor: f32,
    /// Heading interpolation rate while steering
    pub rotation_factor: f32,
    /// Fixed tick duration in seconds
    pub movement_precision: f32,
}

impl Default for CarTuning {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration_factor: 1.0,
            rotation_factor: 1.0,
            movement_precision: 0.02,
        }
    }
}
