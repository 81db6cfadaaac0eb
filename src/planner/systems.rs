// src/planner/systems.rs
//! Per-frame planner systems: input, debounced compute, worker pump, cleanup.

use bevy::prelude::*;

use super::{
    marker_transform, AimRecommended, AimRequest, EditConditions, OptimizeRequest, PendingActions, PlannerAction,
    PlannerServices, PlannerState, SamplesReady, SelectHole, SlopeRequest, WorkerMessage, AIM_KEY, OPTIMIZE_KEY,
    SLOPE_KEY,
};
use crate::clubs::DispersionProfile;
use crate::config::PlannerSettings;
use crate::dispersion::{recommend_aim, sample, AimSearch, BatchSummary, SampleBatch, SampleContext, ShortGameContext, ShotPattern};
use crate::geo::{GeoPoint, LocalFrame};
use crate::jobs::{JobCoordinator, Marker, MarkerPool, MarkerPurpose, MarkerQueue, MarkerRequest};
use crate::terrain::protocol::{ArrowRecord, CalculateSlopesData};
use crate::terrain::{GridBounds, JobKind, WorkerRequest, WorkerResponse};

/// Aim markers shown after an optimization pass.
const SHOWN_AIM_CANDIDATES: usize = 3;

/// Hole changes reset everything hole-scoped; condition edits only
/// invalidate the last pass.
pub fn apply_hole_selection(
    mut commands: Commands,
    mut holes: EventReader<SelectHole>,
    mut edits: EventReader<EditConditions>,
    mut state: ResMut<PlannerState>,
    mut coordinator: ResMut<JobCoordinator>,
    mut pool: ResMut<MarkerPool>,
    mut queue: ResMut<MarkerQueue>,
) {
    if let Some(SelectHole(hole)) = holes.read().last().copied() {
        state.classifier.set_active_hole(hole);
        state.frame = state.classifier.pin().map(LocalFrame::at);
        state.gate.invalidate();
        state.last_batch = None;
        state.recommendations.clear();
        state.slope_grid = None;
        state.slopes.clear();
        for kind in JobKind::ALL {
            coordinator.cancel(kind);
        }
        queue.items.clear();
        for purpose in MarkerPurpose::ALL {
            pool.release_all(&mut commands, purpose);
        }
        info!("Planner: hole {} selected", hole);
    }

    for edit in edits.read() {
        match edit {
            EditConditions::Add { category, ring } => state.conditions.add_polygon(*category, ring.clone()),
            EditConditions::Clear(category) => state.conditions.clear_category(*category),
            EditConditions::ClearAll => state.conditions.clear(),
        }
        state.gate.invalidate();
    }
}

pub fn queue_debounced_actions(
    time: Res<Time>,
    mut pending: ResMut<PendingActions>,
    mut aims: EventReader<AimRequest>,
    mut optimizations: EventReader<OptimizeRequest>,
    mut slopes: EventReader<SlopeRequest>,
) {
    let now = time.elapsed();
    for req in aims.read() {
        pending.0.trigger(AIM_KEY, now, PlannerAction::Sample(*req));
    }
    for req in optimizations.read() {
        pending.0.trigger(OPTIMIZE_KEY, now, PlannerAction::Optimize(*req));
    }
    for req in slopes.read() {
        pending.0.trigger(SLOPE_KEY, now, PlannerAction::Slopes(*req));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_debounced_actions(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<PlannerSettings>,
    services: Res<PlannerServices>,
    mut pending: ResMut<PendingActions>,
    mut state: ResMut<PlannerState>,
    mut coordinator: ResMut<JobCoordinator>,
    mut pool: ResMut<MarkerPool>,
    mut queue: ResMut<MarkerQueue>,
    mut samples_ready: EventWriter<SamplesReady>,
    mut recommended: EventWriter<AimRecommended>,
) {
    let state = &mut *state;
    for (key, action) in pending.0.poll(time.elapsed()) {
        debug!("Planner: debounced '{}' fired", key);
        match action {
            PlannerAction::Sample(req) => {
                let Some(batch) = sample_aim(&req, &settings, &services, state) else { continue };
                let frame = state.frame_or(req.aim);
                pool.release_all(&mut commands, MarkerPurpose::DispersionSample);
                queue.clear_purpose(MarkerPurpose::DispersionSample);
                queue.items.extend(batch.samples.iter().map(|s| MarkerRequest {
                    marker: Marker { purpose: MarkerPurpose::DispersionSample, hidden: false, label: Some(s.label), arrow: None },
                    transform: marker_transform(&frame, s.point),
                }));
                samples_ready.write(SamplesReady(BatchSummary::from(&batch)));
                state.last_batch = Some(batch);
            }
            PlannerAction::Optimize(req) => {
                let candidates = optimize_aim(&req, &settings, &services, state);
                let frame = state.frame_or(req.launch);
                pool.release_all(&mut commands, MarkerPurpose::AimPoint);
                queue.clear_purpose(MarkerPurpose::AimPoint);
                queue.items.extend(candidates.iter().take(SHOWN_AIM_CANDIDATES).map(|c| MarkerRequest {
                    marker: Marker { purpose: MarkerPurpose::AimPoint, hidden: false, label: None, arrow: None },
                    transform: marker_transform(&frame, c.aim),
                }));
                recommended.write(AimRecommended(candidates.clone()));
                state.recommendations = candidates;
            }
            PlannerAction::Slopes(req) => {
                let Some(center) = req.center.or_else(|| state.classifier.pin()) else {
                    warn!("Planner: slope request with no active hole");
                    continue;
                };
                let grid = &settings.terrain_grid;
                let bounds = GridBounds::around(center, grid.half_extent_m);
                state.slope_grid = Some((grid.rows, grid.cols, bounds));
                state.slopes.clear();
                coordinator.submit(WorkerRequest::CalculateSlopes {
                    current_job_id: 0,
                    data: CalculateSlopesData {
                        rows: grid.rows,
                        cols: grid.cols,
                        bounds,
                        elevations: None,
                        mask: None,
                        smooth: grid.smooth,
                        arrow_stride: grid.arrow_stride,
                    },
                });
            }
        }
    }
}

fn pattern_for(launch: GeoPoint, aim: GeoPoint, profile: &DispersionProfile, settings: &PlannerSettings) -> ShotPattern {
    let pattern = ShotPattern::from_profile(launch, aim, profile);
    if settings.roll { pattern.with_roll(settings.firmness) } else { pattern }
}

/// One dispersion pass, or `None` when the gate holds or no hole is active.
fn sample_aim(
    req: &AimRequest,
    settings: &PlannerSettings,
    services: &PlannerServices,
    state: &mut PlannerState,
) -> Option<SampleBatch> {
    let Some(pin) = state.classifier.pin() else {
        warn!("Planner: aim request with no active hole");
        return None;
    };
    let profile = DispersionProfile::for_shot(req.club, req.shape, settings.skill);
    if !state.gate.admit(req.aim, profile.width_m, profile.depth_m) {
        return None;
    }
    let pattern = pattern_for(req.launch, req.aim, &profile, settings);

    let PlannerState { classifier, conditions, rng, .. } = state;
    let mut ctx = SampleContext::new(classifier, conditions);
    if settings.advanced_short_game {
        ctx = ctx.with_short_game(ShortGameContext { model: &services.short_game, terrain: services.terrain.as_ref(), green: None });
    }
    let batch = sample(&pattern, pin, settings.sample_count, &mut ctx, rng);
    info!(
        "Planner: {} samples with {}, mean {:.1} yd, {:?} strokes",
        batch.len(),
        req.club,
        batch.mean_distance_yards,
        batch.mean_expected_strokes
    );
    Some(batch)
}

fn optimize_aim(
    req: &OptimizeRequest,
    settings: &PlannerSettings,
    services: &PlannerServices,
    state: &mut PlannerState,
) -> Vec<crate::dispersion::AimCandidate> {
    let Some(pin) = state.classifier.pin() else {
        warn!("Planner: optimize request with no active hole");
        return Vec::new();
    };
    let profile = DispersionProfile::for_shot(req.club, req.shape, settings.skill);
    let defaults = AimSearch::default();
    let search = AimSearch {
        seed: settings.seed.unwrap_or(defaults.seed),
        roll: settings.roll.then_some(settings.firmness),
        ..defaults
    };

    let PlannerState { classifier, conditions, .. } = state;
    let mut ctx = SampleContext::new(classifier, conditions);
    if settings.advanced_short_game {
        ctx = ctx.with_short_game(ShortGameContext { model: &services.short_game, terrain: services.terrain.as_ref(), green: None });
    }
    recommend_aim(req.launch, pin, &profile, &search, &mut ctx)
}

/// Retire finished tasks, forward live replies, turn slope results into
/// arrow markers.
pub fn pump_worker_jobs(
    mut commands: Commands,
    mut coordinator: ResMut<JobCoordinator>,
    mut state: ResMut<PlannerState>,
    mut pool: ResMut<MarkerPool>,
    mut queue: ResMut<MarkerQueue>,
    mut messages: EventWriter<WorkerMessage>,
) {
    coordinator.poll_tasks();
    for resp in coordinator.drain() {
        match &resp {
            WorkerResponse::Progress { job_id, phase, progress, .. } => {
                debug!("Planner: job {} {:?} {:.0}%", job_id, phase, progress * 100.0);
            }
            WorkerResponse::SlopesComplete { job_id, slopes, arrows } => {
                info!("Planner: slope job {} done, {} cells, {} arrows", job_id, slopes.len(), arrows.len());
                state.slopes = slopes.clone();
                if let Some((rows, cols, bounds)) = state.slope_grid {
                    let frame = state.frame_or(bounds.center());
                    pool.release_all(&mut commands, MarkerPurpose::SlopeArrow);
                    queue.clear_purpose(MarkerPurpose::SlopeArrow);
                    queue.items.extend(arrows.iter().map(|a| arrow_request(&frame, &bounds, rows, cols, a)));
                }
            }
            WorkerResponse::Error { job_id, error, .. } => warn!("Planner: job {} failed: {}", job_id, error),
            WorkerResponse::TerrainComplete { .. } | WorkerResponse::ExpectedStrokesComplete { .. } => {}
        }
        messages.write(WorkerMessage(resp));
    }
}

fn arrow_request(frame: &LocalFrame, bounds: &GridBounds, rows: usize, cols: usize, a: &ArrowRecord) -> MarkerRequest {
    let point = bounds.node(rows, cols, a.row, a.col);
    let transform = marker_transform(frame, point).with_rotation(Quat::from_rotation_y(a.direction as f32));
    MarkerRequest {
        marker: Marker {
            purpose: MarkerPurpose::SlopeArrow,
            hidden: false,
            label: None,
            arrow: Some((a.direction as f32, a.slope_percent as f32)),
        },
        transform,
    }
}

/// Pooled markers are despawned explicitly on shutdown.
pub fn dispose_markers_on_exit(mut commands: Commands, mut exits: EventReader<AppExit>, mut pool: ResMut<MarkerPool>) {
    if exits.read().next().is_some() {
        pool.dispose_all(&mut commands);
        debug!("Planner: disposed {} pooled markers", pool.spawned());
    }
}
