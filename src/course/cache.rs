// src/course/cache.rs
//! Per-hole spatial cache: planar rings for every list the classifier walks.
//! Built wholesale for one hole; never patched.

use bevy::log::debug;
use bevy::math::DVec2;

use super::{Course, HoleAssociation, Ring};
use crate::error::ClassifyError;
use crate::geo::polygon::to_planar_ring;
use crate::geo::{point_in_polygon, GeoPoint};
use crate::strokes::Surface;

#[derive(Clone, Debug, Default)]
pub struct SpatialCache {
    /// Hole this cache was built for (the invalidation token).
    pub hole: u32,
    /// Hole-scoped.
    pub water: Vec<Vec<DVec2>>,
    /// Hole-scoped.
    pub bunkers: Vec<Vec<DVec2>>,
    /// Course-wide: a shot can finish on any tee box.
    pub tees: Vec<Vec<DVec2>>,
    /// Course-wide.
    pub fairways: Vec<Vec<DVec2>>,
    /// Course-wide individual rough patches.
    pub roughs: Vec<Vec<DVec2>>,
    pub green: Option<Vec<DVec2>>,
    /// Same green in geographic form (short-game geometry works in meters).
    pub green_geo: Option<Ring>,
}

fn planar_all(rings: &[Ring]) -> Vec<Vec<DVec2>> {
    rings.iter().map(|r| to_planar_ring(r)).collect()
}

fn planar_subset(rings: &[Ring], indices: &[usize]) -> Vec<Vec<DVec2>> {
    indices.iter().filter_map(|&i| rings.get(i)).map(|r| to_planar_ring(r)).collect()
}

impl SpatialCache {
    pub fn build(course: &Course, association: &HoleAssociation, hole: u32) -> Result<Self, ClassifyError> {
        if course.hole(hole).is_none() {
            return Err(ClassifyError::MissingHole(hole));
        }
        let f = &course.features;
        let scoped = association.get(hole).cloned().unwrap_or_default();
        let green_geo = scoped.green.and_then(|i| f.greens.get(i)).cloned();

        let cache = Self {
            hole,
            water: planar_subset(&f.water, &scoped.water),
            bunkers: planar_subset(&f.bunkers, &scoped.bunkers),
            tees: planar_all(&f.tees),
            fairways: planar_all(&f.fairways),
            roughs: planar_all(&f.roughs),
            green: green_geo.as_deref().map(to_planar_ring),
            green_geo,
        };
        debug!(
            "SpatialCache: hole {} built ({} water, {} bunkers, {} tees, {} fairways, {} roughs, green: {})",
            hole,
            cache.water.len(),
            cache.bunkers.len(),
            cache.tees.len(),
            cache.fairways.len(),
            cache.roughs.len(),
            cache.green.is_some()
        );
        Ok(cache)
    }

    /// Fixed priority, first hit wins:
    /// water → sand → green → tee → fairway → rough patch → rough.
    pub fn classify(&self, p: DVec2) -> Surface {
        let any = |rings: &[Vec<DVec2>]| rings.iter().any(|r| point_in_polygon(p, r));

        if any(&self.water) {
            Surface::Water
        } else if any(&self.bunkers) {
            Surface::Sand
        } else if self.green.as_ref().is_some_and(|g| point_in_polygon(p, g)) {
            Surface::Green
        } else if any(&self.tees) {
            Surface::Tee
        } else if any(&self.fairways) {
            Surface::Fairway
        } else {
            // rough patches and the uncovered default share a label
            Surface::Rough
        }
    }

    pub fn in_green(&self, p: GeoPoint) -> bool {
        self.green.as_ref().is_some_and(|g| point_in_polygon(p.planar(), g))
    }
}
