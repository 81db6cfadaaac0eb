// src/course/mod.rs
//! Course snapshot (holes + categorized feature polygons), hole→feature
//! association, the per-hole spatial cache and the surface classifier.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CourseError;
use crate::geo::GeoPoint;

pub mod association;
pub mod cache;
pub mod classifier;
pub mod conditions;

pub use association::{HoleAssociation, HoleFeatures};
pub use cache::SpatialCache;
pub use classifier::CourseClassifier;
pub use conditions::{ConditionCategory, PointCost, SurfaceLabel, UserConditions};

/// Closed ring of geographic vertices.
pub type Ring = Vec<GeoPoint>;

/// Categorized feature polygons for a whole course, as supplied by the
/// course data provider. Read-only once loaded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CourseFeatures {
    #[serde(default)]
    pub greens: Vec<Ring>,
    #[serde(default)]
    pub fairways: Vec<Ring>,
    #[serde(default)]
    pub bunkers: Vec<Ring>,
    #[serde(default)]
    pub roughs: Vec<Ring>,
    #[serde(default)]
    pub tees: Vec<Ring>,
    #[serde(default)]
    pub water: Vec<Ring>,
}

impl CourseFeatures {
    pub fn feature_count(&self) -> usize {
        self.greens.len()
            + self.fairways.len()
            + self.bunkers.len()
            + self.roughs.len()
            + self.tees.len()
            + self.water.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hole {
    pub number: u32,
    #[serde(default = "default_par")]
    pub par: u8,
    /// Tee → (doglegs) → green polyline.
    pub centerline: Vec<GeoPoint>,
    /// Flag position; defaults to the last centerline point.
    #[serde(default)]
    pub pin: Option<GeoPoint>,
}

fn default_par() -> u8 {
    4
}

impl Hole {
    pub fn pin(&self) -> Option<GeoPoint> {
        self.pin.or_else(|| self.centerline.last().copied())
    }

    pub fn tee(&self) -> Option<GeoPoint> {
        self.centerline.first().copied()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub holes: Vec<Hole>,
    #[serde(default)]
    pub features: CourseFeatures,
    /// Provider-supplied hole→feature association; computed when absent.
    #[serde(default)]
    pub association: Option<HoleAssociation>,
}

impl Course {
    pub fn hole(&self, number: u32) -> Option<&Hole> {
        self.holes.iter().find(|h| h.number == number)
    }

    pub fn require_hole(&self, number: u32) -> Result<&Hole, CourseError> {
        self.hole(number).ok_or(CourseError::UnknownHole(number))
    }

    /// Provided association, or one derived from the centerlines.
    pub fn resolve_association(&self) -> HoleAssociation {
        match &self.association {
            Some(a) => a.clone(),
            None => HoleAssociation::build(self),
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self, CourseError> {
        ron::de::from_str(text).map_err(|e| CourseError::Ron(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CourseError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_course() {
        let text = r#"(
            name: "Links",
            holes: [(number: 1, centerline: [(lon: 0.0, lat: 0.0), (lon: 0.0, lat: 0.003)])],
            features: (greens: [[(lon: -0.0001, lat: 0.0029), (lon: 0.0001, lat: 0.0029), (lon: 0.0, lat: 0.0031)]]),
        )"#;
        let course = Course::from_ron_str(text).unwrap();
        assert_eq!(course.holes[0].par, 4);
        assert_eq!(course.hole(1).and_then(|h| h.pin()), Some(GeoPoint::new(0.0, 0.003)));
        assert_eq!(course.features.feature_count(), 1);
        assert!(course.hole(2).is_none());
        assert!(matches!(course.require_hole(2), Err(CourseError::UnknownHole(2))));
        assert_eq!(course.require_hole(1).map(|h| h.number).ok(), Some(1));
    }

    #[test]
    fn malformed_course_is_an_error() {
        assert!(matches!(Course::from_ron_str("(name: 3)"), Err(CourseError::Ron(_))));
    }
}
