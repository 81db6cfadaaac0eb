// src/dispersion/mod.rs
//! Monte-Carlo evaluation of an aim point: landing ovals, the sampled batch
//! and its aggregates, and the gate that skips re-sampling on jitter.

use bevy::log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clubs::{DispersionProfile, Firmness};
use crate::course::SurfaceLabel;
use crate::geo::{Ellipse, GeoPoint, LocalFrame};

pub mod optimizer;
pub mod sampler;

pub use optimizer::{recommend_aim, AimCandidate, AimSearch};
pub use sampler::{sample, ShortGameContext, SampleContext};

pub const DEFAULT_SAMPLE_COUNT: usize = 600;
/// Rejection sampling gives up after this many attempts per wanted sample.
pub const MAX_ATTEMPTS_PER_SAMPLE: usize = 5;
/// Aim movement below this does not trigger a new pass (meters).
pub const DEFAULT_AIM_THRESHOLD_M: f64 = 5.0;
/// Oval width/depth changes below this do not trigger a new pass (meters).
pub const DEFAULT_SIZE_THRESHOLD_M: f64 = 5.0;

/// Roll oval for a landing oval: same rotation, scaled by firmness, pushed
/// forward so both near edges coincide.
pub fn roll_oval(landing: &Ellipse, firmness: Firmness) -> Ellipse {
    let (wm, dm) = firmness.roll_multipliers();
    let (width, depth) = (landing.width_m * wm, landing.depth_m * dm);
    let shift = depth * 0.5 - landing.semi_depth();
    let center = LocalFrame::at(landing.center).to_geo(landing.forward() * shift);
    Ellipse::new(center, width, depth, landing.rotation)
}

/// Where the ball may finish for one aim point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotPattern {
    pub landing: Ellipse,
    pub roll: Option<Ellipse>,
}

impl ShotPattern {
    /// Landing oval centered on `aim`, its depth axis along launch → aim.
    pub fn aimed(launch: GeoPoint, aim: GeoPoint, width_m: f64, depth_m: f64) -> Self {
        Self { landing: Ellipse::facing(aim, width_m, depth_m, launch.bearing_to(aim)), roll: None }
    }

    pub fn from_profile(launch: GeoPoint, aim: GeoPoint, profile: &DispersionProfile) -> Self {
        Self::aimed(launch, aim, profile.width_m, profile.depth_m)
    }

    pub fn with_roll(mut self, firmness: Firmness) -> Self {
        self.roll = Some(roll_oval(&self.landing, firmness));
        self
    }

    /// Inside the landing oval or the roll oval.
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.landing.contains(p) || self.roll.is_some_and(|r| r.contains(p))
    }
}

/// One evaluated draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub point: GeoPoint,
    pub label: SurfaceLabel,
    pub distance_yards: f64,
    /// `None` when the distance is outside the cost model's domain.
    pub strokes: Option<f64>,
}

/// Aggregates of one pass. Means skip samples with no cost.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBatch {
    /// In generation order.
    pub samples: Vec<Sample>,
    pub requested: usize,
    pub mean_distance_yards: f64,
    pub mean_expected_strokes: Option<f64>,
    pub surface_counts: BTreeMap<SurfaceLabel, usize>,
    /// Samples left out of the stroke mean.
    pub skipped: usize,
    /// Short-game lookups that fell back to flat terrain.
    pub terrain_fallbacks: usize,
}

impl SampleBatch {
    #[inline]
    pub fn len(&self) -> usize { self.samples.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// Rejection sampling stopped early.
    #[inline]
    pub fn is_partial(&self) -> bool { self.samples.len() < self.requested }

    pub fn count(&self, label: SurfaceLabel) -> usize { self.surface_counts.get(&label).copied().unwrap_or(0) }

    /// Per-label share of the batch, for the stacked breakdown.
    pub fn breakdown(&self) -> Vec<(SurfaceLabel, f64)> {
        let n = self.samples.len().max(1) as f64;
        self.surface_counts.iter().map(|(l, c)| (*l, *c as f64 / n)).collect()
    }

    /// Labels rendered as strings (`"fairway"`, `"user_hazards"`, ...).
    pub fn labelled_counts(&self) -> BTreeMap<String, usize> {
        self.surface_counts.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }
}

/// Serializable summary for the display layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub samples: usize,
    pub mean_distance_yards: f64,
    pub mean_expected_strokes: Option<f64>,
    pub surface_counts: BTreeMap<String, usize>,
}

impl From<&SampleBatch> for BatchSummary {
    fn from(b: &SampleBatch) -> Self {
        Self {
            samples: b.len(),
            mean_distance_yards: b.mean_distance_yards,
            mean_expected_strokes: b.mean_expected_strokes,
            surface_counts: b.labelled_counts(),
        }
    }
}

// ---------- Re-sample gate ----------

#[derive(Clone, Copy, Debug, PartialEq)]
struct GateState {
    aim: GeoPoint,
    width_m: f64,
    depth_m: f64,
}

/// Remembers the inputs of the last pass; a new pass is only worth running
/// when the aim moved or the oval changed size beyond the thresholds.
#[derive(Clone, Debug)]
pub struct ResampleGate {
    pub aim_threshold_m: f64,
    pub size_threshold_m: f64,
    last: Option<GateState>,
}

impl Default for ResampleGate {
    fn default() -> Self { Self::new(DEFAULT_AIM_THRESHOLD_M, DEFAULT_SIZE_THRESHOLD_M) }
}

impl ResampleGate {
    pub fn new(aim_threshold_m: f64, size_threshold_m: f64) -> Self {
        Self { aim_threshold_m, size_threshold_m, last: None }
    }

    pub fn needs_resample(&self, aim: GeoPoint, width_m: f64, depth_m: f64) -> bool {
        let Some(last) = self.last else { return true };
        let moved = last.aim.distance_m(aim) >= self.aim_threshold_m;
        let resized = (last.width_m - width_m).abs() >= self.size_threshold_m
            || (last.depth_m - depth_m).abs() >= self.size_threshold_m;
        if !(moved || resized) {
            debug!("ResampleGate: change below threshold, keeping previous batch");
        }
        moved || resized
    }

    pub fn record(&mut self, aim: GeoPoint, width_m: f64, depth_m: f64) {
        self.last = Some(GateState { aim, width_m, depth_m });
    }

    /// Check and, when a pass is due, record the new inputs.
    pub fn admit(&mut self, aim: GeoPoint, width_m: f64, depth_m: f64) -> bool {
        let due = self.needs_resample(aim, width_m, depth_m);
        if due {
            self.record(aim, width_m, depth_m);
        }
        due
    }

    /// Forget the last pass (hole or conditions changed).
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
