// src/main.rs
//! Headless demo: load the course, aim the tee shot on hole 1, ask for the
//! best aim and the green slopes, print what comes back and exit.

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::time::Duration;

use fairway_planner::clubs::{Club, ShotShape};
use fairway_planner::config::PlannerSettings;
use fairway_planner::planner::{
    AimRecommended, AimRequest, OptimizeRequest, PlannerSet, PlannerState, SamplesReady, SelectHole,
    ShotPlannerPlugin, SlopeRequest, WorkerMessage,
};
use fairway_planner::terrain::WorkerResponse;

const SETTINGS_PATH: &str = "assets/planner.ron";
const DEMO_HOLE: u32 = 1;
/// Give up after this many frames (~20 s at 60 Hz).
const MAX_FRAMES: u32 = 1200;

#[derive(Resource, Default)]
struct DemoProgress {
    sampled: bool,
    optimized: bool,
    slopes: bool,
    frames: u32,
}

fn main() -> AppExit {
    let settings = match PlannerSettings::load(SETTINGS_PATH) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("fairway-planner: {e}");
            return AppExit::error();
        }
    };
    let plugin = match ShotPlannerPlugin::from_settings(settings) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("fairway-planner: {e}");
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .add_plugins(LogPlugin::default())
        .add_plugins(plugin)
        .init_resource::<DemoProgress>()
        .add_systems(Startup, start_demo)
        .add_systems(Update, report_and_exit.after(PlannerSet::Markers))
        .run()
}

fn start_demo(
    state: Res<PlannerState>,
    mut holes: EventWriter<SelectHole>,
    mut aims: EventWriter<AimRequest>,
    mut optimizations: EventWriter<OptimizeRequest>,
    mut slopes: EventWriter<SlopeRequest>,
    mut exit: EventWriter<AppExit>,
) {
    let hole = match state.classifier.course().require_hole(DEMO_HOLE) {
        Ok(h) => h,
        Err(e) => {
            error!("Demo: {}", e);
            exit.write(AppExit::error());
            return;
        }
    };
    let (Some(tee), Some(pin)) = (hole.tee(), hole.pin()) else {
        error!("Demo: hole {} has no centerline", DEMO_HOLE);
        exit.write(AppExit::error());
        return;
    };

    let club = Club::for_distance(tee.distance_yards(pin));
    let reach = tee.distance_m(pin).min(fairway_planner::geo::yards_to_meters(club.carry_yards(ShotShape::Stock)));
    let aim = tee.offset(tee.bearing_to(pin), reach);
    info!("Demo: hole {} par {}, {:.0} yd, hitting {}", hole.number, hole.par, tee.distance_yards(pin), club);

    holes.write(SelectHole(DEMO_HOLE));
    aims.write(AimRequest { launch: tee, aim, club, shape: ShotShape::Stock });
    optimizations.write(OptimizeRequest { launch: tee, club, shape: ShotShape::Stock });
    slopes.write(SlopeRequest::default());
}

fn report_and_exit(
    mut progress: ResMut<DemoProgress>,
    mut samples: EventReader<SamplesReady>,
    mut recommended: EventReader<AimRecommended>,
    mut messages: EventReader<WorkerMessage>,
    mut exit: EventWriter<AppExit>,
) {
    progress.frames += 1;

    for SamplesReady(summary) in samples.read() {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("dispersion summary:\n{text}"),
            Err(e) => warn!("Demo: could not render summary: {}", e),
        }
        progress.sampled = true;
    }
    for AimRecommended(candidates) in recommended.read() {
        for (rank, c) in candidates.iter().take(3).enumerate() {
            println!(
                "aim #{}: {:+.0} m across, {:+.0} m along, {:.3} strokes",
                rank + 1,
                c.lateral_offset_m,
                c.distance_offset_m,
                c.mean_expected_strokes
            );
        }
        progress.optimized = true;
    }
    for WorkerMessage(resp) in messages.read() {
        match resp {
            WorkerResponse::SlopesComplete { slopes, arrows, .. } => {
                let steepest = slopes.iter().map(|s| s.slope_percent).fold(0.0_f64, f64::max);
                println!("green slopes: {} cells, {} arrows, steepest {:.1}%", slopes.len(), arrows.len(), steepest);
                progress.slopes = true;
            }
            WorkerResponse::Error { error, .. } => {
                println!("slope job failed: {error}");
                progress.slopes = true;
            }
            _ => {}
        }
    }

    if progress.sampled && progress.optimized && progress.slopes {
        exit.write(AppExit::Success);
    } else if progress.frames >= MAX_FRAMES {
        error!("Demo: timed out waiting for results");
        exit.write(AppExit::error());
    }
}
