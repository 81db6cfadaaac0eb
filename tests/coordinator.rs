//! Debounce coalescing and job supersession through the async pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fairway_planner::error::TerrainError;
use fairway_planner::geo::GeoPoint;
use fairway_planner::jobs::{DebounceDelays, Debouncer, JobCoordinator};
use fairway_planner::shortgame::{ModifierTable, ShortGameModel};
use fairway_planner::terrain::protocol::SampleTerrainData;
use fairway_planner::terrain::{ElevationProvider, JobKind, JobSlots, TerrainWorker, WorkerRequest, WorkerResponse};

/// Flat ground that takes a while to answer.
struct SlowTerrain {
    per_call: Duration,
}

impl ElevationProvider for SlowTerrain {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        std::thread::sleep(self.per_call);
        Ok(vec![1.0; points.len()])
    }
}

fn coordinator(per_call: Duration) -> JobCoordinator {
    let worker = TerrainWorker::new(
        Arc::new(SlowTerrain { per_call }),
        ShortGameModel::new(Arc::new(ModifierTable::empty())),
        JobSlots::new(),
    );
    JobCoordinator::new(worker)
}

fn terrain_request(n: usize) -> WorkerRequest {
    let points = (0..n).map(|i| GeoPoint::new(0.0, i as f64 * 1e-5)).collect();
    WorkerRequest::SampleTerrain { current_job_id: 0, data: SampleTerrainData { points } }
}

/// Poll until `done` holds and nothing is left in flight.
fn pump(coord: &mut JobCoordinator, done: impl Fn(&[WorkerResponse]) -> bool) -> Vec<WorkerResponse> {
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut seen = Vec::new();
    loop {
        coord.poll_tasks();
        seen.extend(coord.drain());
        if (done(&seen) && coord.is_idle()) || Instant::now() > deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    seen.extend(coord.drain());
    seen
}

#[test]
fn ten_rapid_drags_fire_once() {
    let mut d = Debouncer::new(DebounceDelays::default());
    let ms = Duration::from_millis;
    let mut invoked = Vec::new();

    for i in 0..10u64 {
        d.trigger("drag-x", ms(i * 10), i);
        invoked.extend(d.poll(ms(i * 10)));
    }
    invoked.extend(d.poll(ms(150)));
    assert!(invoked.is_empty());

    invoked.extend(d.poll(ms(90 + 200)));
    invoked.extend(d.poll(ms(2000)));
    assert_eq!(invoked, vec![("drag-x".to_string(), 9)]);
}

#[test]
fn superseded_job_replies_are_dropped() {
    let mut coord = coordinator(Duration::from_millis(5));
    let first = coord.submit(terrain_request(100));
    let second = coord.submit(terrain_request(40));
    assert!(second > first);
    assert_eq!(coord.tracked(JobKind::Terrain), Some(second));

    let seen = pump(&mut coord, |s| s.iter().any(|r| r.is_terminal()));

    assert!(seen.iter().all(|r| r.job_id() == second), "stale reply leaked: {seen:?}");
    let terminals: Vec<_> = seen.iter().filter(|r| r.is_terminal()).collect();
    assert!(matches!(
        terminals.as_slice(),
        [WorkerResponse::TerrainComplete { job_id, processed: 40, .. }] if *job_id == second
    ));
    assert_eq!(coord.tracked(JobKind::Terrain), None);
}

#[test]
fn cancelled_job_goes_quiet() {
    let mut coord = coordinator(Duration::from_millis(3));
    coord.submit(terrain_request(60));
    coord.cancel(JobKind::Terrain);

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut leaked = Vec::new();
    while Instant::now() < deadline {
        coord.poll_tasks();
        leaked.extend(coord.drain());
        if coord.is_idle() {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(coord.is_idle());
    assert!(leaked.is_empty(), "cancelled job still reported: {leaked:?}");
    assert_eq!(coord.tracked(JobKind::Terrain), None);
}
