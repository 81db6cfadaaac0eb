// src/planner/plugin.rs

use bevy::prelude::*;
use std::sync::Arc;

use super::systems::{
    apply_hole_selection, dispose_markers_on_exit, pump_worker_jobs, queue_debounced_actions, run_debounced_actions,
};
use super::{
    AimRecommended, AimRequest, EditConditions, OptimizeRequest, PendingActions, PlannerServices, PlannerState,
    SamplesReady, SelectHole, SlopeRequest, WorkerMessage,
};
use crate::config::PlannerSettings;
use crate::course::{Course, CourseClassifier};
use crate::error::StartupError;
use crate::jobs::{drain_marker_queue, Debouncer, JobCoordinator, MarkerPool, MarkerQueue, MarkerQueueConfig};
use crate::shortgame::{ModifierTable, ShortGameModel};
use crate::terrain::{ElevationProvider, JobSlots, TerrainWorker};

/// Per-frame ordering of the planner systems.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PlannerSet {
    Input,    // hole selection + condition edits
    Debounce, // requests -> pending timers
    Compute,  // fired timers: sampling, optimization, job submission
    Jobs,     // worker replies
    Markers,  // bounded marker placement
}

pub struct ShotPlannerPlugin {
    pub settings: PlannerSettings,
    pub course: Arc<Course>,
    pub modifiers: Arc<ModifierTable>,
    pub terrain: Arc<dyn ElevationProvider>,
}

impl ShotPlannerPlugin {
    pub fn new(
        settings: PlannerSettings,
        course: Course,
        modifiers: ModifierTable,
        terrain: Arc<dyn ElevationProvider>,
    ) -> Self {
        Self { settings, course: Arc::new(course), modifiers: Arc::new(modifiers), terrain }
    }

    /// Course, modifier table and terrain source named by `settings`.
    /// A missing modifier table is not fatal; a missing course is.
    pub fn from_settings(settings: PlannerSettings) -> Result<Self, StartupError> {
        let course = Course::load(&settings.course_path)?;
        let modifiers = ModifierTable::load_or_empty(&settings.modifier_table_path);
        let origin = course.holes.iter().find_map(|h| h.pin()).ok_or(StartupError::NoPin)?;
        let terrain = settings.terrain.provider(origin)?;
        info!(
            "Planner: course '{}' ({} holes, {} features), terrain '{}'",
            course.name,
            course.holes.len(),
            course.features.feature_count(),
            terrain.name()
        );
        Ok(Self::new(settings, course, modifiers, terrain))
    }
}

impl Plugin for ShotPlannerPlugin {
    fn build(&self, app: &mut App) {
        let settings = self.settings.clone();
        let short_game = ShortGameModel { table: self.modifiers.clone(), radius_yards: settings.short_game_radius_yards };
        let worker = TerrainWorker::new(self.terrain.clone(), short_game.clone(), JobSlots::new());
        let association = Arc::new(self.course.resolve_association());
        let classifier = CourseClassifier::new(self.course.clone(), association);

        app
            // --- Resources ---
            .insert_resource(PlannerState::new(classifier, &settings))
            .insert_resource(PlannerServices { short_game, terrain: self.terrain.clone() })
            .insert_resource(JobCoordinator::new(worker))
            .insert_resource(PendingActions(Debouncer::new(settings.debounce)))
            .insert_resource(MarkerQueueConfig { max_per_frame: settings.markers_per_frame })
            .init_resource::<MarkerPool>()
            .init_resource::<MarkerQueue>()
            .insert_resource(settings)

            // --- Events ---
            .add_event::<SelectHole>()
            .add_event::<EditConditions>()
            .add_event::<AimRequest>()
            .add_event::<OptimizeRequest>()
            .add_event::<SlopeRequest>()
            .add_event::<SamplesReady>()
            .add_event::<AimRecommended>()
            .add_event::<WorkerMessage>()

            // --- Update ordering ---
            .configure_sets(
                Update,
                (
                    PlannerSet::Input,
                    PlannerSet::Debounce.after(PlannerSet::Input),
                    PlannerSet::Compute.after(PlannerSet::Debounce),
                    PlannerSet::Jobs.after(PlannerSet::Compute),
                    PlannerSet::Markers.after(PlannerSet::Jobs),
                ),
            )
            .add_systems(Update, apply_hole_selection.in_set(PlannerSet::Input))
            .add_systems(Update, queue_debounced_actions.in_set(PlannerSet::Debounce))
            .add_systems(Update, run_debounced_actions.in_set(PlannerSet::Compute))
            .add_systems(Update, pump_worker_jobs.in_set(PlannerSet::Jobs))
            .add_systems(Update, drain_marker_queue.in_set(PlannerSet::Markers))
            .add_systems(Last, dispose_markers_on_exit);
    }
}
