// src/planner/mod.rs
//! ECS surface of the planner: resources, events and plugin wiring.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::clubs::{Club, ShotShape};
use crate::config::PlannerSettings;
use crate::course::{ConditionCategory, CourseClassifier, Ring, UserConditions};
use crate::dispersion::{AimCandidate, BatchSummary, ResampleGate, SampleBatch};
use crate::geo::{GeoPoint, LocalFrame};
use crate::jobs::Debouncer;
use crate::shortgame::ShortGameModel;
use crate::terrain::protocol::SlopeRecord;
use crate::terrain::{ElevationProvider, GridBounds, WorkerResponse};

pub mod plugin;
pub mod systems;

pub use plugin::{PlannerSet, ShotPlannerPlugin};

/// Debounce keys.
pub const AIM_KEY: &str = "drag-aim";
pub const OPTIMIZE_KEY: &str = "optimize-aim";
pub const SLOPE_KEY: &str = "slope-analysis";

// ---------- Resources ----------

/// Interactive-side state for the active hole.
#[derive(Resource)]
pub struct PlannerState {
    pub classifier: CourseClassifier,
    pub conditions: UserConditions,
    pub gate: ResampleGate,
    pub rng: ChaCha8Rng,
    /// Marker transforms are (east, -north) meters in this frame.
    pub frame: Option<LocalFrame>,
    pub last_batch: Option<SampleBatch>,
    pub recommendations: Vec<AimCandidate>,
    /// Lattice of the slope job in flight or last completed.
    pub slope_grid: Option<(usize, usize, GridBounds)>,
    pub slopes: Vec<SlopeRecord>,
}

impl PlannerState {
    pub fn new(classifier: CourseClassifier, settings: &PlannerSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self {
            classifier,
            conditions: UserConditions::new(),
            gate: ResampleGate::new(settings.aim_threshold_m, settings.size_threshold_m),
            rng: ChaCha8Rng::seed_from_u64(seed),
            frame: None,
            last_batch: None,
            recommendations: Vec::new(),
            slope_grid: None,
            slopes: Vec::new(),
        }
    }

    /// Frame for marker placement; falls back to `near` before a hole is set.
    pub fn frame_or(&self, near: GeoPoint) -> LocalFrame { self.frame.unwrap_or_else(|| LocalFrame::at(near)) }
}

/// Read-only collaborators shared with the sampling systems.
#[derive(Resource, Clone)]
pub struct PlannerServices {
    pub short_game: ShortGameModel,
    pub terrain: Arc<dyn ElevationProvider>,
}

#[derive(Clone, Copy, Debug)]
pub enum PlannerAction {
    Sample(AimRequest),
    Optimize(OptimizeRequest),
    Slopes(SlopeRequest),
}

#[derive(Resource)]
pub struct PendingActions(pub Debouncer<PlannerAction>);

// ---------- Events ----------

#[derive(Event, Clone, Copy, Debug)]
pub struct SelectHole(pub u32);

/// User-drawn condition polygons.
#[derive(Event, Clone, Debug)]
pub enum EditConditions {
    Add { category: ConditionCategory, ring: Ring },
    Clear(ConditionCategory),
    ClearAll,
}

/// Aim point moved (debounced as a drag).
#[derive(Event, Clone, Copy, Debug)]
pub struct AimRequest {
    pub launch: GeoPoint,
    pub aim: GeoPoint,
    pub club: Club,
    pub shape: ShotShape,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct OptimizeRequest {
    pub launch: GeoPoint,
    pub club: Club,
    pub shape: ShotShape,
}

/// Slope analysis around `center` (the pin when `None`).
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct SlopeRequest {
    pub center: Option<GeoPoint>,
}

#[derive(Event, Clone, Debug)]
pub struct SamplesReady(pub BatchSummary);

#[derive(Event, Clone, Debug)]
pub struct AimRecommended(pub Vec<AimCandidate>);

/// Worker replies that survived stale filtering, progress included.
#[derive(Event, Clone, Debug)]
pub struct WorkerMessage(pub WorkerResponse);

/// (east, -north) placement of `p` in `frame`.
#[inline]
pub fn marker_transform(frame: &LocalFrame, p: GeoPoint) -> Transform {
    let v = frame.to_local(p);
    Transform::from_xyz(v.x as f32, 0.0, -v.y as f32)
}
