// src/dispersion/optimizer.rs
//! Aim recommendation: sample a fan of candidate aim points and rank them
//! by mean expected strokes.

use bevy::log::debug;
use bevy::math::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::sampler::{sample, SampleContext};
use super::ShotPattern;
use crate::clubs::{DispersionProfile, Firmness};
use crate::geo::{bearing_vector, yards_to_meters, GeoPoint, LocalFrame};

/// Candidate grid around the nominal aim (launch → pin, capped at carry).
#[derive(Clone, Debug)]
pub struct AimSearch {
    /// Offsets across the line (meters, positive = right of the line).
    pub lateral_offsets_m: Vec<f64>,
    /// Offsets along the line (meters, positive = longer).
    pub distance_offsets_m: Vec<f64>,
    pub samples_per_candidate: usize,
    pub seed: u64,
    pub roll: Option<Firmness>,
}

impl Default for AimSearch {
    fn default() -> Self {
        Self {
            lateral_offsets_m: vec![-20.0, -10.0, 0.0, 10.0, 20.0],
            distance_offsets_m: vec![-20.0, -10.0, 0.0, 10.0],
            samples_per_candidate: 200,
            seed: 0x5EED,
            roll: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimCandidate {
    pub aim: GeoPoint,
    pub lateral_offset_m: f64,
    pub distance_offset_m: f64,
    pub mean_expected_strokes: f64,
    pub mean_distance_yards: f64,
}

/// Candidates best first; ties go to the one finishing closer to the pin.
/// Candidates whose samples all fall outside the cost model are dropped.
pub fn recommend_aim(
    launch: GeoPoint,
    pin: GeoPoint,
    profile: &DispersionProfile,
    search: &AimSearch,
    ctx: &mut SampleContext<'_>,
) -> Vec<AimCandidate> {
    let bearing = launch.bearing_to(pin);
    let forward = bearing_vector(bearing);
    let right = DVec2::new(forward.y, -forward.x);
    let nominal = launch.distance_m(pin).min(yards_to_meters(profile.carry_yards));
    let frame = LocalFrame::at(launch);

    let mut out = Vec::new();
    let mut index = 0u64;
    for &along in &search.distance_offsets_m {
        for &across in &search.lateral_offsets_m {
            index += 1;
            let reach = nominal + along;
            if reach <= 0.0 {
                continue;
            }
            let aim = frame.to_geo(forward * reach + right * across);
            let mut pattern = ShotPattern::from_profile(launch, aim, profile);
            if let Some(firmness) = search.roll {
                pattern = pattern.with_roll(firmness);
            }
            let mut rng = ChaCha8Rng::seed_from_u64(search.seed.wrapping_add(index));
            let batch = sample(&pattern, pin, search.samples_per_candidate, ctx, &mut rng);
            if let Some(mean) = batch.mean_expected_strokes {
                out.push(AimCandidate {
                    aim,
                    lateral_offset_m: across,
                    distance_offset_m: along,
                    mean_expected_strokes: mean,
                    mean_distance_yards: batch.mean_distance_yards,
                });
            }
        }
    }

    out.sort_by(|a, b| {
        a.mean_expected_strokes
            .total_cmp(&b.mean_expected_strokes)
            .then(a.mean_distance_yards.total_cmp(&b.mean_distance_yards))
    });
    if let Some(best) = out.first() {
        debug!(
            "Optimizer: best of {} candidates at ({:+.0} m, {:+.0} m): {:.3} strokes",
            out.len(),
            best.lateral_offset_m,
            best.distance_offset_m,
            best.mean_expected_strokes
        );
    }
    out
}
