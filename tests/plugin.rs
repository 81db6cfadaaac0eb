//! The planner inside a headless Bevy app: debounced sampling, the
//! re-sample gate, pooled markers and a slope job through the worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bevy::prelude::*;
use fairway_planner::clubs::{Club, ShotShape};
use fairway_planner::config::PlannerSettings;
use fairway_planner::course::{Course, CourseFeatures, Hole};
use fairway_planner::geo::{GeoPoint, LocalFrame};
use fairway_planner::jobs::{DebounceDelays, MarkerPool, MarkerPurpose};
use fairway_planner::planner::{AimRequest, PlannerState, SelectHole, ShotPlannerPlugin, SlopeRequest};
use fairway_planner::shortgame::ModifierTable;
use fairway_planner::terrain::ProceduralTerrain;

const ORIGIN: GeoPoint = GeoPoint::new(151.2, -33.9);

fn app() -> App {
    let f = LocalFrame::at(ORIGIN);
    let field: Vec<GeoPoint> = [(-800.0, -800.0), (800.0, -800.0), (800.0, 800.0), (-800.0, 800.0)]
        .into_iter()
        .map(|(e, n)| f.to_geo(bevy::math::DVec2::new(e, n)))
        .collect();
    let pin = ORIGIN.offset(0.0, 350.0);
    let course = Course {
        name: "plugin".into(),
        holes: vec![Hole { number: 1, par: 4, centerline: vec![ORIGIN, pin], pin: None }],
        features: CourseFeatures { fairways: vec![field], ..Default::default() },
        association: None,
    };
    let settings = PlannerSettings {
        seed: Some(7),
        debounce: DebounceDelays::ZERO,
        ..Default::default()
    };
    let plugin = ShotPlannerPlugin::new(settings, course, ModifierTable::empty(), Arc::new(ProceduralTerrain::new(pin)));

    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(plugin);
    app.update();
    app
}

fn aim(north_m: f64) -> AimRequest {
    AimRequest { launch: ORIGIN, aim: ORIGIN.offset(0.0, north_m), club: Club::Driver, shape: ShotShape::Stock }
}

fn pool(app: &App) -> &MarkerPool { app.world().resource::<MarkerPool>() }

#[test]
fn aim_request_samples_and_places_markers_in_batches() {
    let mut app = app();
    app.world_mut().send_event(SelectHole(1));
    app.world_mut().send_event(aim(260.0));
    app.update();

    let state = app.world().resource::<PlannerState>();
    let batch = state.last_batch.as_ref().expect("no batch after debounced aim");
    assert_eq!(batch.len(), 600);
    assert!(batch.mean_expected_strokes.is_some());
    assert_eq!(pool(&app).active_count(MarkerPurpose::DispersionSample), 100);

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(pool(&app).active_count(MarkerPurpose::DispersionSample), 600);
    let mut markers = app.world_mut().query::<&fairway_planner::jobs::Marker>();
    assert_eq!(markers.iter(app.world()).filter(|m| !m.hidden).count(), 600);
}

#[test]
fn jitter_keeps_the_batch_and_moves_reuse_markers() {
    let mut app = app();
    app.world_mut().send_event(SelectHole(1));
    app.world_mut().send_event(aim(260.0));
    for _ in 0..7 {
        app.update();
    }
    let first_mean = app.world().resource::<PlannerState>().last_batch.as_ref().unwrap().mean_distance_yards;

    app.world_mut().send_event(aim(262.0));
    app.update();
    let state = app.world().resource::<PlannerState>();
    assert_eq!(state.last_batch.as_ref().unwrap().mean_distance_yards, first_mean);
    assert_eq!(pool(&app).active_count(MarkerPurpose::DispersionSample), 600);

    app.world_mut().send_event(aim(230.0));
    app.update();
    assert_ne!(app.world().resource::<PlannerState>().last_batch.as_ref().unwrap().mean_distance_yards, first_mean);
    assert_eq!(pool(&app).active_count(MarkerPurpose::DispersionSample), 100);
    assert_eq!(pool(&app).free_count(MarkerPurpose::DispersionSample), 500);
    for _ in 0..6 {
        app.update();
    }
    assert_eq!(pool(&app).spawned(), 600, "markers should be recycled");
}

#[test]
fn slope_request_round_trips_through_the_worker() {
    let mut app = app();
    app.world_mut().send_event(SelectHole(1));
    app.world_mut().send_event(SlopeRequest::default());

    let deadline = Instant::now() + Duration::from_secs(20);
    while app.world().resource::<PlannerState>().slopes.is_empty() && Instant::now() < deadline {
        app.update();
        std::thread::sleep(Duration::from_millis(5));
    }
    let state = app.world().resource::<PlannerState>();
    // 24 × 24 lattice; only interior cells carry a gradient
    assert!(!state.slopes.is_empty() && state.slopes.len() <= 22 * 22, "{}", state.slopes.len());

    for _ in 0..3 {
        app.update();
    }
    assert!(pool(&app).active_count(MarkerPurpose::SlopeArrow) > 0);
}
