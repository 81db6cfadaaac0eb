// src/error.rs
//! Error types for every fallible boundary of the planner.
//! Total-function surfaces (classification, penalty layer, short-game lookup)
//! never return these; they log and fall back instead.

use std::path::PathBuf;

// ---------- Settings / assets ----------

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("I/O while reading settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error in settings: {0}")]
    Ron(String),
}

#[derive(thiserror::Error, Debug)]
pub enum CourseError {
    #[error("I/O while reading course: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error in course: {0}")]
    Ron(String),
    #[error("Unknown hole {0}")]
    UnknownHole(u32),
}

#[derive(thiserror::Error, Debug)]
pub enum ModifierTableError {
    #[error("I/O while reading modifier table: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error in modifier table: {0}")]
    Ron(String),
    #[error("Duplicate modifier key '{key}' (entries {first} and {second})")]
    DuplicateKey { key: String, first: usize, second: usize },
}

/// Anything that stops the planner from starting.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error("course has no hole with a pin")]
    NoPin,
}

// ---------- Classification ----------

/// Internal classification faults. Callers of `classify` never see these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("no active hole selected")]
    NoActiveHole,
    #[error("hole {0} is not part of the course")]
    MissingHole(u32),
    #[error("non-finite query point ({lon}, {lat})")]
    NonFinitePoint { lon: f64, lat: f64 },
}

// ---------- Terrain ----------

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("elevation provider unavailable: {0}")]
    Unavailable(String),
    #[error("partial elevation response: asked {requested}, got {returned}")]
    Partial { requested: usize, returned: usize },
    #[error("grid shape {rows}x{cols} does not match {len} values")]
    Shape { rows: usize, cols: usize, len: usize },
    #[error("heightmap load failed: {0}")]
    Image(String),
}

// ---------- Worker ----------

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error("wire codec: {0}")]
    Codec(#[from] serde_json::Error),
}

// ---------- Persistence ----------

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("I/O during export/import: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
