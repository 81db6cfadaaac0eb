// src/course/conditions.rs
//! User-drawn condition polygons layered over natural classification.
//!
//! Check order: the polygon being drawn (≥3 vertices), then completed
//! categories in the order they were first added, then the classifier.

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CourseClassifier, Ring};
use crate::geo::polygon::to_planar_ring;
use crate::geo::{point_in_polygon, GeoPoint};
use crate::strokes::{expected_strokes, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Water,
    Bunkers,
    Greens,
    Fairways,
    Roughs,
    Hazards,
    Ob,
    Recovery,
    Tees,
}

impl ConditionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionCategory::Water => "water",
            ConditionCategory::Bunkers => "bunkers",
            ConditionCategory::Greens => "greens",
            ConditionCategory::Fairways => "fairways",
            ConditionCategory::Roughs => "roughs",
            ConditionCategory::Hazards => "hazards",
            ConditionCategory::Ob => "ob",
            ConditionCategory::Recovery => "recovery",
            ConditionCategory::Tees => "tees",
        }
    }

    /// Cost curve the category is charged on.
    pub fn surface(self) -> Surface {
        match self {
            ConditionCategory::Water => Surface::Water,
            ConditionCategory::Bunkers => Surface::Sand,
            ConditionCategory::Greens => Surface::Green,
            ConditionCategory::Fairways => Surface::Fairway,
            ConditionCategory::Roughs | ConditionCategory::Hazards | ConditionCategory::Ob => Surface::Rough,
            ConditionCategory::Recovery => Surface::Recovery,
            ConditionCategory::Tees => Surface::Tee,
        }
    }

    /// Strokes added on top of the surface cost.
    pub fn penalty(self) -> f64 {
        match self {
            ConditionCategory::Hazards => 1.0,
            ConditionCategory::Ob => 2.0,
            _ => 0.0,
        }
    }

    /// Surface cost plus penalty; `None` outside the cost model's domain.
    pub fn cost(self, distance_yards: f64) -> Option<f64> {
        expected_strokes(distance_yards, self.surface()).map(|s| s + self.penalty())
    }
}

/// Label a sample ends up with: a natural surface or a user category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceLabel {
    Natural(Surface),
    User(ConditionCategory),
}

impl fmt::Display for SurfaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceLabel::Natural(s) => f.write_str(s.as_str()),
            SurfaceLabel::User(c) => write!(f, "user_{}", c.as_str()),
        }
    }
}

impl From<Surface> for SurfaceLabel {
    fn from(s: Surface) -> Self { SurfaceLabel::Natural(s) }
}

/// Label and cost of one query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointCost {
    pub label: SurfaceLabel,
    /// `None` when the distance is outside the cost model's domain.
    pub strokes: Option<f64>,
}

#[derive(Clone, Debug)]
struct ConditionLayer {
    category: ConditionCategory,
    rings: Vec<Ring>,
    planar: Vec<Vec<DVec2>>,
}

/// Session-scoped user conditions plus the polygon currently being drawn.
#[derive(Clone, Debug, Default)]
pub struct UserConditions {
    layers: Vec<ConditionLayer>,
    drawing: Option<(ConditionCategory, Ring)>,
}

impl UserConditions {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.rings.is_empty()) && self.drawing.is_none()
    }

    /// Append a completed polygon to `category`.
    pub fn add_polygon(&mut self, category: ConditionCategory, ring: Ring) {
        let planar = to_planar_ring(&ring);
        match self.layers.iter_mut().find(|l| l.category == category) {
            Some(layer) => {
                layer.rings.push(ring);
                layer.planar.push(planar);
            }
            None => self.layers.push(ConditionLayer { category, rings: vec![ring], planar: vec![planar] }),
        }
    }

    pub fn clear_category(&mut self, category: ConditionCategory) {
        self.layers.retain(|l| l.category != category);
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.drawing = None;
    }

    pub fn polygons(&self, category: ConditionCategory) -> &[Ring] {
        self.layers.iter().find(|l| l.category == category).map(|l| l.rings.as_slice()).unwrap_or(&[])
    }

    /// Categories in insertion order with their polygons.
    pub fn iter(&self) -> impl Iterator<Item = (ConditionCategory, &[Ring])> {
        self.layers.iter().map(|l| (l.category, l.rings.as_slice()))
    }

    // ---------- In-progress drawing ----------

    pub fn begin_drawing(&mut self, category: ConditionCategory) {
        self.drawing = Some((category, Vec::new()));
    }

    pub fn push_vertex(&mut self, p: GeoPoint) {
        if let Some((_, ring)) = self.drawing.as_mut() {
            ring.push(p);
        }
    }

    /// Commit the drawing; polygons with fewer than three vertices are dropped.
    pub fn finish_drawing(&mut self) -> bool {
        match self.drawing.take() {
            Some((category, ring)) if ring.len() >= 3 => {
                self.add_polygon(category, ring);
                true
            }
            _ => false,
        }
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing = None;
    }

    /// User category covering `p`, if any.
    pub fn category_at(&self, p: GeoPoint) -> Option<ConditionCategory> {
        if !p.is_finite() {
            return None;
        }
        let q = p.planar();
        if let Some((category, ring)) = &self.drawing {
            if ring.len() >= 3 && point_in_polygon(q, &to_planar_ring(ring)) {
                return Some(*category);
            }
        }
        self.layers
            .iter()
            .find(|l| l.planar.iter().any(|r| point_in_polygon(q, r)))
            .map(|l| l.category)
    }

    /// Label and cost of `p` at `distance_yards` from the target.
    pub fn evaluate(&self, classifier: &mut CourseClassifier, distance_yards: f64, p: GeoPoint) -> PointCost {
        if let Some(category) = self.category_at(p) {
            return PointCost { label: SurfaceLabel::User(category), strokes: category.cost(distance_yards) };
        }
        let surface = classifier.classify(p);
        PointCost { label: surface.into(), strokes: expected_strokes(distance_yards, surface) }
    }

    /// Expected strokes only.
    pub fn classify_with_penalty(&self, classifier: &mut CourseClassifier, distance_yards: f64, p: GeoPoint) -> Option<f64> {
        self.evaluate(classifier, distance_yards, p).strokes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(cx: f64, cy: f64) -> Ring {
        vec![GeoPoint::new(cx - 0.001, cy - 0.001), GeoPoint::new(cx + 0.001, cy - 0.001), GeoPoint::new(cx, cy + 0.001)]
    }

    #[test]
    fn labels_render_like_the_ui_expects() {
        assert_eq!(SurfaceLabel::Natural(Surface::Sand).to_string(), "sand");
        assert_eq!(SurfaceLabel::User(ConditionCategory::Ob).to_string(), "user_ob");
    }

    #[test]
    fn penalties_sit_on_rough() {
        let rough = expected_strokes(120.0, Surface::Rough).unwrap();
        assert_eq!(ConditionCategory::Hazards.cost(120.0), Some(rough + 1.0));
        assert_eq!(ConditionCategory::Ob.cost(120.0), Some(rough + 2.0));
        assert_eq!(ConditionCategory::Fairways.cost(120.0), expected_strokes(120.0, Surface::Fairway));
        assert_eq!(ConditionCategory::Ob.cost(700.0), None);
    }

    #[test]
    fn first_inserted_category_wins() {
        let mut u = UserConditions::new();
        u.add_polygon(ConditionCategory::Ob, tri(0.0, 0.0));
        u.add_polygon(ConditionCategory::Hazards, tri(0.0, 0.0));
        assert_eq!(u.category_at(GeoPoint::new(0.0, 0.0)), Some(ConditionCategory::Ob));
        assert_eq!(u.category_at(GeoPoint::new(0.5, 0.5)), None);
    }

    #[test]
    fn drawing_polygon_needs_three_vertices_and_takes_precedence() {
        let mut u = UserConditions::new();
        u.add_polygon(ConditionCategory::Ob, tri(0.0, 0.0));
        u.begin_drawing(ConditionCategory::Water);
        u.push_vertex(GeoPoint::new(-0.002, -0.002));
        u.push_vertex(GeoPoint::new(0.002, -0.002));
        assert_eq!(u.category_at(GeoPoint::new(0.0, 0.0)), Some(ConditionCategory::Ob));
        u.push_vertex(GeoPoint::new(0.0, 0.002));
        assert_eq!(u.category_at(GeoPoint::new(0.0, 0.0)), Some(ConditionCategory::Water));
        assert!(u.finish_drawing());
        assert_eq!(u.polygons(ConditionCategory::Water).len(), 1);

        u.begin_drawing(ConditionCategory::Tees);
        u.push_vertex(GeoPoint::new(0.0, 0.0));
        assert!(!u.finish_drawing());
        assert!(u.polygons(ConditionCategory::Tees).is_empty());
    }
}
