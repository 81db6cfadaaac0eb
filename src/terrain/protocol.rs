// src/terrain/protocol.rs
//! Messages between the interactive context and the terrain worker, plus
//! their JSON wire form.
//!
//! Requests: `{ "type": "sampleTerrain" | "calculateSlopes" |
//! "advancedExpectedStrokes", "currentJobId": n, "data": {...} }`.
//! Responses are tagged `progress`, `terrain_complete`, `slopes_complete`,
//! `expected_strokes_complete` or `error`, with camelCase fields.

use serde::{Deserialize, Serialize};

use super::grid::{CellSlope, GridBounds};
use crate::error::WorkerError;
use crate::geo::GeoPoint;
use crate::strokes::Surface;

/// Worker job slot; one job of each kind is tracked at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobKind {
    Terrain,
    Slopes,
    ExpectedStrokes,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Terrain, JobKind::Slopes, JobKind::ExpectedStrokes];

    #[inline]
    pub fn slot(self) -> usize {
        match self {
            JobKind::Terrain => 0,
            JobKind::Slopes => 1,
            JobKind::ExpectedStrokes => 2,
        }
    }
}

// ---------- Requests ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleTerrainData {
    pub points: Vec<GeoPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateSlopesData {
    pub rows: usize,
    pub cols: usize,
    pub bounds: GridBounds,
    /// Pre-sampled elevations (row-major, null = missing). Sampled from the
    /// provider when absent.
    #[serde(default)]
    pub elevations: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub mask: Option<Vec<bool>>,
    #[serde(default)]
    pub smooth: bool,
    /// Emit an arrow for every n-th row/column.
    #[serde(default = "default_arrow_stride")]
    pub arrow_stride: usize,
}

fn default_arrow_stride() -> usize {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortGamePoint {
    pub point: GeoPoint,
    pub distance_yards: f64,
    pub surface: Surface,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedStrokesData {
    pub pin: GeoPoint,
    #[serde(default)]
    pub green: Option<Vec<GeoPoint>>,
    pub points: Vec<ShortGamePoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkerRequest {
    SampleTerrain { current_job_id: u64, data: SampleTerrainData },
    CalculateSlopes { current_job_id: u64, data: CalculateSlopesData },
    AdvancedExpectedStrokes { current_job_id: u64, data: ExpectedStrokesData },
}

impl WorkerRequest {
    pub fn job_id(&self) -> u64 {
        match self {
            WorkerRequest::SampleTerrain { current_job_id, .. }
            | WorkerRequest::CalculateSlopes { current_job_id, .. }
            | WorkerRequest::AdvancedExpectedStrokes { current_job_id, .. } => *current_job_id,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            WorkerRequest::SampleTerrain { .. } => JobKind::Terrain,
            WorkerRequest::CalculateSlopes { .. } => JobKind::Slopes,
            WorkerRequest::AdvancedExpectedStrokes { .. } => JobKind::ExpectedStrokes,
        }
    }

    /// Same request re-stamped with another job id.
    pub fn with_job_id(mut self, id: u64) -> Self {
        match &mut self {
            WorkerRequest::SampleTerrain { current_job_id, .. }
            | WorkerRequest::CalculateSlopes { current_job_id, .. }
            | WorkerRequest::AdvancedExpectedStrokes { current_job_id, .. } => *current_job_id = id,
        }
        self
    }
}

// ---------- Responses ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Sampling,
    Smoothing,
    Slopes,
    Strokes,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlopeRecord {
    pub row: usize,
    pub col: usize,
    pub magnitude: f64,
    pub slope_percent: f64,
    /// Radians, `atan2` of the downhill vector.
    pub direction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowRecord {
    pub row: usize,
    pub col: usize,
    pub magnitude: f64,
    pub slope_percent: f64,
    pub direction: f64,
    pub slope_x: f64,
    pub slope_y: f64,
}

impl From<&CellSlope> for SlopeRecord {
    fn from(s: &CellSlope) -> Self {
        Self { row: s.row, col: s.col, magnitude: s.magnitude(), slope_percent: s.percent(), direction: s.direction() }
    }
}

impl From<&CellSlope> for ArrowRecord {
    fn from(s: &CellSlope) -> Self {
        Self {
            row: s.row,
            col: s.col,
            magnitude: s.magnitude(),
            slope_percent: s.percent(),
            direction: s.direction(),
            slope_x: s.slope.x,
            slope_y: s.slope.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WorkerResponse {
    Progress { job_id: u64, phase: Phase, progress: f64, message: String },
    TerrainComplete { job_id: u64, elevations: Vec<Option<f64>>, processed: usize },
    SlopesComplete { job_id: u64, slopes: Vec<SlopeRecord>, arrows: Vec<ArrowRecord> },
    ExpectedStrokesComplete { job_id: u64, average_strokes: Option<f64>, valid_points: usize, total_points: usize },
    Error {
        job_id: u64,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

impl WorkerResponse {
    pub fn job_id(&self) -> u64 {
        match self {
            WorkerResponse::Progress { job_id, .. }
            | WorkerResponse::TerrainComplete { job_id, .. }
            | WorkerResponse::SlopesComplete { job_id, .. }
            | WorkerResponse::ExpectedStrokesComplete { job_id, .. }
            | WorkerResponse::Error { job_id, .. } => *job_id,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool { !matches!(self, WorkerResponse::Progress { .. }) }
}

// ---------- Codec ----------

pub fn encode_request(req: &WorkerRequest) -> Result<String, WorkerError> {
    Ok(serde_json::to_string(req)?)
}

pub fn decode_request(text: &str) -> Result<WorkerRequest, WorkerError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_response(resp: &WorkerResponse) -> Result<String, WorkerError> {
    Ok(serde_json::to_string(resp)?)
}

pub fn decode_response(text: &str) -> Result<WorkerResponse, WorkerError> {
    Ok(serde_json::from_str(text)?)
}
