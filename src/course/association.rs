// src/course/association.rs
//! Hole → feature association derived from hole centerlines.

use bevy::log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Course, Ring};
use crate::geo::{densify, min_point_set_distance_m};

/// Greens and tees must come within this distance of the centerline.
pub const GREEN_TEE_RADIUS_M: f64 = 50.0;
pub const BUNKER_RADIUS_M: f64 = 200.0;
pub const WATER_RADIUS_M: f64 = 300.0;
/// Centerline vertex spacing used for the distance checks.
const CENTERLINE_STEP_M: f64 = 10.0;

/// Indices into the course-wide feature lists that belong to one hole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleFeatures {
    #[serde(default)]
    pub green: Option<usize>,
    #[serde(default)]
    pub tees: Vec<usize>,
    #[serde(default)]
    pub bunkers: Vec<usize>,
    #[serde(default)]
    pub water: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleAssociation {
    pub holes: BTreeMap<u32, HoleFeatures>,
}

impl HoleAssociation {
    pub fn get(&self, hole: u32) -> Option<&HoleFeatures> {
        self.holes.get(&hole)
    }

    /// Nearest green within 50 m, tees within 50 m, bunkers within 200 m
    /// and water within 300 m of each hole's (densified) centerline.
    pub fn build(course: &Course) -> Self {
        let f = &course.features;
        let mut holes = BTreeMap::new();

        for hole in &course.holes {
            let dense = densify(&hole.centerline, CENTERLINE_STEP_M);
            let line = &dense;
            let within = |rings: &[Ring], radius: f64| -> Vec<usize> {
                rings
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| min_point_set_distance_m(line, r) <= radius)
                    .map(|(i, _)| i)
                    .collect()
            };

            let green = f
                .greens
                .iter()
                .enumerate()
                .map(|(i, r)| (i, min_point_set_distance_m(line, r)))
                .filter(|(_, d)| *d <= GREEN_TEE_RADIUS_M)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i);

            let entry = HoleFeatures {
                green,
                tees: within(&f.tees, GREEN_TEE_RADIUS_M),
                bunkers: within(&f.bunkers, BUNKER_RADIUS_M),
                water: within(&f.water, WATER_RADIUS_M),
            };
            debug!(
                "Association: hole {} -> green {:?}, {} tees, {} bunkers, {} water",
                hole.number,
                entry.green,
                entry.tees.len(),
                entry.bunkers.len(),
                entry.water.len()
            );
            holes.insert(hole.number, entry);
        }

        Self { holes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{CourseFeatures, Hole};
    use crate::geo::GeoPoint;

    fn blob(center: GeoPoint, half_deg: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(center.lon - half_deg, center.lat - half_deg),
            GeoPoint::new(center.lon + half_deg, center.lat - half_deg),
            GeoPoint::new(center.lon + half_deg, center.lat + half_deg),
            GeoPoint::new(center.lon - half_deg, center.lat + half_deg),
        ]
    }

    #[test]
    fn picks_nearest_green_and_scopes_hazards() {
        let tee = GeoPoint::new(0.0, 0.0);
        let green_c = GeoPoint::new(0.0, 0.004);
        let course = Course {
            name: "t".into(),
            holes: vec![Hole { number: 7, par: 4, centerline: vec![tee, green_c], pin: None }],
            features: CourseFeatures {
                // far green (≈ 1 km east), near green on the line
                greens: vec![blob(GeoPoint::new(0.01, 0.004), 0.0001), blob(green_c, 0.0001)],
                tees: vec![blob(tee, 0.00005)],
                // bunker ≈ 110 m off the line, another ≈ 560 m away
                bunkers: vec![blob(GeoPoint::new(0.001, 0.002), 0.00002), blob(GeoPoint::new(0.005, 0.002), 0.00002)],
                water: vec![blob(GeoPoint::new(0.0025, 0.002), 0.00002)],
                ..Default::default()
            },
            association: None,
        };

        let assoc = HoleAssociation::build(&course);
        let h = assoc.get(7).unwrap();
        assert_eq!(h.green, Some(1));
        assert_eq!(h.tees, vec![0]);
        assert_eq!(h.bunkers, vec![0]);
        assert_eq!(h.water, vec![0]);
    }
}
