// src/terrain/mod.rs
//! Elevation sampling and the slope pipeline that runs off the interactive
//! thread.

pub mod grid;
pub mod protocol;
pub mod provider;
pub mod worker;

pub use grid::{CellSlope, GridBounds, TerrainGrid};
pub use protocol::{JobKind, Phase, WorkerRequest, WorkerResponse};
pub use provider::{ElevationProvider, FailingTerrain, FlatTerrain, HeightmapTerrain, ProceduralTerrain};
pub use worker::{JobSlots, TerrainWorker};
