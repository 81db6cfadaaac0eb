// src/geo/polygon.rs
//! Even-odd point-in-polygon and brute-force point-set distances.

use bevy::math::DVec2;

use super::GeoPoint;

/// Even-odd ray cast over a closed ring in planar degree coordinates.
/// The ring may or may not repeat its first vertex. Fewer than three
/// vertices, or a non-finite query, is never inside.
pub fn point_in_polygon(p: DVec2, ring: &[DVec2]) -> bool {
    if ring.len() < 3 || !p.is_finite() {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (vi, vj) = (ring[i], ring[j]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Convert a geographic ring into the planar degree form once.
pub fn to_planar_ring(points: &[GeoPoint]) -> Vec<DVec2> {
    points.iter().map(|p| p.planar()).collect()
}

/// Minimum great-circle distance (meters) between any pair of points in
/// the two sets. Feature rings are tens of vertices, so pairwise is fine.
/// Either set empty → `f64::INFINITY`.
pub fn min_point_set_distance_m(a: &[GeoPoint], b: &[GeoPoint]) -> f64 {
    let mut best = f64::INFINITY;
    for pa in a {
        for pb in b {
            let d = pa.distance_m(*pb);
            if d < best {
                best = d;
            }
        }
    }
    best
}
