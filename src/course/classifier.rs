// src/course/classifier.rs
//! Surface classifier over the active hole's spatial cache.
//!
//! The cache is keyed on the hole id: asking for the hole that is already
//! built is free, anything else rebuilds wholesale on the next query.

use bevy::log::{debug, warn};
use std::mem::{discriminant, Discriminant};
use std::sync::Arc;

use super::{Course, HoleAssociation, Ring, SpatialCache};
use crate::error::ClassifyError;
use crate::geo::GeoPoint;
use crate::strokes::Surface;

#[derive(Clone, Debug)]
pub struct CourseClassifier {
    course: Arc<Course>,
    association: Arc<HoleAssociation>,
    active_hole: Option<u32>,
    cache: Option<SpatialCache>,
    rebuilds: usize,
    /// Fault kinds already reported for the current hole.
    warned: Vec<Discriminant<ClassifyError>>,
}

impl CourseClassifier {
    pub fn new(course: Arc<Course>, association: Arc<HoleAssociation>) -> Self {
        Self { course, association, active_hole: None, cache: None, rebuilds: 0, warned: Vec::new() }
    }

    /// Classifier with the course's own (or derived) association.
    pub fn for_course(course: Course) -> Self {
        let association = Arc::new(course.resolve_association());
        Self::new(Arc::new(course), association)
    }

    #[inline]
    pub fn course(&self) -> &Course { &self.course }

    #[inline]
    pub fn active_hole(&self) -> Option<u32> { self.active_hole }

    /// How many times the spatial cache has been (re)built.
    #[inline]
    pub fn rebuild_count(&self) -> usize { self.rebuilds }

    /// Distinct faults warned about since the last hole change.
    #[inline]
    pub fn warned_faults(&self) -> usize { self.warned.len() }

    /// Select the hole; the cache is rebuilt lazily on the next query.
    pub fn set_active_hole(&mut self, hole: u32) {
        if self.active_hole != Some(hole) {
            debug!("Classifier: active hole {:?} -> {}", self.active_hole, hole);
            self.active_hole = Some(hole);
            self.warned.clear();
        }
    }

    /// Cache for the active hole, rebuilding only when the hole id differs.
    pub fn ensure_cache(&mut self) -> Result<&SpatialCache, ClassifyError> {
        let hole = self.active_hole.ok_or(ClassifyError::NoActiveHole)?;
        let stale = self.cache.as_ref().map_or(true, |c| c.hole != hole);
        if stale {
            let built = SpatialCache::build(&self.course, &self.association, hole)?;
            self.rebuilds += 1;
            self.cache = Some(built);
        }
        self.cache.as_ref().ok_or(ClassifyError::NoActiveHole)
    }

    pub fn try_classify(&mut self, p: GeoPoint) -> Result<Surface, ClassifyError> {
        if !p.is_finite() {
            return Err(ClassifyError::NonFinitePoint { lon: p.lon, lat: p.lat });
        }
        Ok(self.ensure_cache()?.classify(p.planar()))
    }

    /// Total: any fault resolves to rough. Each kind of fault is warned
    /// about once per hole; repeats go to debug.
    pub fn classify(&mut self, p: GeoPoint) -> Surface {
        match self.try_classify(p) {
            Ok(s) => s,
            Err(e) => {
                let kind = discriminant(&e);
                if self.warned.contains(&kind) {
                    debug!("Classifier: {} - treating point as rough", e);
                } else {
                    warn!("Classifier: {} - treating points as rough", e);
                    self.warned.push(kind);
                }
                Surface::Rough
            }
        }
    }

    /// Geographic green ring of the active hole, if one is associated.
    pub fn green_ring(&mut self) -> Option<Ring> {
        self.ensure_cache().ok().and_then(|c| c.green_geo.clone())
    }

    /// Pin of the active hole.
    pub fn pin(&self) -> Option<GeoPoint> {
        self.active_hole.and_then(|h| self.course.hole(h)).and_then(|h| h.pin())
    }
}
