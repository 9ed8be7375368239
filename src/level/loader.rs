//! Level definitions and JSON loading

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A whole level as authored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub checkpoints: Vec<CheckpointDef>,
    /// Solid obstacles; consumed by the external collision probe, not the core
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
}

/// One turn checkpoint: entrance/exit markers plus the car spawn
///
/// Every reference is optional; a missing one degrades to a logged default at
/// use time instead of failing the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointDef {
    pub turn_index: usize,
    pub entrance: Option<[f32; 2]>,
    pub exit: Option<[f32; 2]>,
    pub spawn: Option<SpawnDef>,
}

/// Car spawn transform for a checkpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnDef {
    pub position: [f32; 2],
    /// Heading in radians; defaults to facing +x
    #[serde(default)]
    pub heading: f32,
}

/// Circular solid obstacle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Failures while reading a level file
#[derive(Debug, thiserror::Error)]
pub enum LevelLoadError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse level file: {0}")]
    Json(#[from] serde_json::Error),
}

impl LevelDef {
    /// Load a level definition from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
