// src/jobs/pool.rs
//! Recycled marker entities for samples, slope arrows and aim points, plus
//! the queue that places them a bounded number per frame.

use bevy::log::debug;
use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use crate::course::SurfaceLabel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerPurpose {
    DispersionSample,
    SlopeArrow,
    AimPoint,
}

impl MarkerPurpose {
    pub const ALL: [MarkerPurpose; 3] = [MarkerPurpose::DispersionSample, MarkerPurpose::SlopeArrow, MarkerPurpose::AimPoint];
}

/// Pooled visualization handle.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub purpose: MarkerPurpose,
    pub hidden: bool,
    /// Surface under a dispersion sample.
    pub label: Option<SurfaceLabel>,
    /// Arrow heading (radians from east) and slope percent.
    pub arrow: Option<(f32, f32)>,
}

impl Marker {
    fn reset(purpose: MarkerPurpose) -> Self {
        Self { purpose, hidden: true, label: None, arrow: None }
    }
}

#[derive(Resource, Default)]
pub struct MarkerPool {
    free: HashMap<MarkerPurpose, Vec<Entity>>,
    active: HashMap<MarkerPurpose, Vec<Entity>>,
    spawned: usize,
}

impl MarkerPool {
    /// Reuse a free marker for `purpose`, or spawn one.
    pub fn acquire(&mut self, commands: &mut Commands, marker: Marker, transform: Transform) -> Entity {
        let purpose = marker.purpose;
        let entity = match self.free.get_mut(&purpose).and_then(Vec::pop) {
            Some(e) => {
                commands.entity(e).insert((marker, transform));
                e
            }
            None => {
                self.spawned += 1;
                commands.spawn((marker, transform)).id()
            }
        };
        self.active.entry(purpose).or_default().push(entity);
        entity
    }

    /// Hide and park every active marker of `purpose`.
    pub fn release_all(&mut self, commands: &mut Commands, purpose: MarkerPurpose) {
        let Some(active) = self.active.remove(&purpose) else { return };
        for &e in &active {
            commands.entity(e).insert((Marker::reset(purpose), Transform::default()));
        }
        debug!("MarkerPool: released {} {:?} markers", active.len(), purpose);
        self.free.entry(purpose).or_default().extend(active);
    }

    /// Despawn everything of `purpose`, active or free.
    pub fn dispose(&mut self, commands: &mut Commands, purpose: MarkerPurpose) {
        let active = self.active.remove(&purpose).unwrap_or_default();
        let free = self.free.remove(&purpose).unwrap_or_default();
        for e in active.into_iter().chain(free) {
            commands.entity(e).despawn();
        }
    }

    pub fn dispose_all(&mut self, commands: &mut Commands) {
        for purpose in MarkerPurpose::ALL {
            self.dispose(commands, purpose);
        }
    }

    pub fn active_count(&self, purpose: MarkerPurpose) -> usize { self.active.get(&purpose).map_or(0, Vec::len) }

    pub fn free_count(&self, purpose: MarkerPurpose) -> usize { self.free.get(&purpose).map_or(0, Vec::len) }

    /// Entities ever spawned by the pool.
    #[inline]
    pub fn spawned(&self) -> usize { self.spawned }
}

// ---------- Placement queue ----------

#[derive(Clone, Copy, Debug)]
pub struct MarkerRequest {
    pub marker: Marker,
    pub transform: Transform,
}

/// Filled by sampling/slope results, drained in insertion order.
#[derive(Resource, Default)]
pub struct MarkerQueue {
    pub items: VecDeque<MarkerRequest>,
}

#[derive(Resource)]
pub struct MarkerQueueConfig {
    pub max_per_frame: usize,
}

impl Default for MarkerQueueConfig {
    fn default() -> Self { Self { max_per_frame: 100 } }
}

impl MarkerQueue {
    /// Drop queued placements of `purpose` (superseded by a newer pass).
    pub fn clear_purpose(&mut self, purpose: MarkerPurpose) {
        self.items.retain(|r| r.marker.purpose != purpose);
    }
}

pub fn drain_marker_queue(
    mut commands: Commands,
    mut queue: ResMut<MarkerQueue>,
    mut pool: ResMut<MarkerPool>,
    cfg: Res<MarkerQueueConfig>,
) {
    let take = cfg.max_per_frame.min(queue.items.len());
    for _ in 0..take {
        if let Some(req) = queue.items.pop_front() {
            pool.acquire(&mut commands, req.marker, req.transform);
        }
    }
}
