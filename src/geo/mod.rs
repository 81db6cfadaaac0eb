// src/geo/mod.rs
//! Geographic points, distances and the local metric frame used by the
//! polygon/ellipse primitives. Planar work happens in plain degrees
//! (`DVec2(lon, lat)`); metric work goes through [`LocalFrame`].

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};

pub mod ellipse;
pub mod polygon;

pub use ellipse::Ellipse;
pub use polygon::{min_point_set_distance_m, point_in_polygon};

/// Meters per degree of latitude (fixed).
pub const METERS_PER_DEG_LAT: f64 = 110_574.27;
/// Meters per degree of longitude at the equator; scale by cos(latitude).
pub const METERS_PER_DEG_LON_EQUATOR: f64 = 111_319.49;
/// Mean earth radius for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const METERS_PER_YARD: f64 = 0.9144;

#[inline]
pub fn meters_to_yards(m: f64) -> f64 { m / METERS_PER_YARD }

#[inline]
pub fn yards_to_meters(y: f64) -> f64 { y * METERS_PER_YARD }

/// Longitude/latitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self { Self { lon, lat } }

    /// Planar degree representation shared by every polygon test.
    #[inline]
    pub fn planar(self) -> DVec2 { DVec2::new(self.lon, self.lat) }

    #[inline]
    pub fn is_finite(self) -> bool { self.lon.is_finite() && self.lat.is_finite() }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let (p1, p2) = (self.lat.to_radians(), other.lat.to_radians());
        let dp = p2 - p1;
        let dl = (other.lon - self.lon).to_radians();
        let h = (dp * 0.5).sin().powi(2) + p1.cos() * p2.cos() * (dl * 0.5).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
    }

    #[inline]
    pub fn distance_yards(self, other: GeoPoint) -> f64 { meters_to_yards(self.distance_m(other)) }

    /// Initial bearing towards `other`, radians clockwise from north in [0, 2π).
    pub fn bearing_to(self, other: GeoPoint) -> f64 {
        let (p1, p2) = (self.lat.to_radians(), other.lat.to_radians());
        let dl = (other.lon - self.lon).to_radians();
        let y = dl.sin() * p2.cos();
        let x = p1.cos() * p2.sin() - p1.sin() * p2.cos() * dl.cos();
        y.atan2(x).rem_euclid(std::f64::consts::TAU)
    }

    /// Move `meters` along `bearing` (radians clockwise from north), flat-earth.
    pub fn offset(self, bearing: f64, meters: f64) -> GeoPoint {
        let frame = LocalFrame::at(self);
        frame.to_geo(DVec2::new(bearing.sin(), bearing.cos()) * meters)
    }

    /// Linear interpolation in degree space (fine over a hole's extent).
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint::new(self.lon + (other.lon - self.lon) * t, self.lat + (other.lat - self.lat) * t)
    }
}

impl From<DVec2> for GeoPoint {
    fn from(v: DVec2) -> Self { GeoPoint::new(v.x, v.y) }
}

/// East/north meter offsets around an origin, using the local
/// meters-per-degree scale factors.
#[derive(Clone, Copy, Debug)]
pub struct LocalFrame {
    pub origin: GeoPoint,
    pub m_per_deg_lon: f64,
    pub m_per_deg_lat: f64,
}

impl LocalFrame {
    pub fn at(origin: GeoPoint) -> Self {
        Self {
            origin,
            m_per_deg_lon: METERS_PER_DEG_LON_EQUATOR * origin.lat.to_radians().cos(),
            m_per_deg_lat: METERS_PER_DEG_LAT,
        }
    }

    /// Geographic → (east, north) meters.
    #[inline]
    pub fn to_local(&self, p: GeoPoint) -> DVec2 {
        DVec2::new(
            (p.lon - self.origin.lon) * self.m_per_deg_lon,
            (p.lat - self.origin.lat) * self.m_per_deg_lat,
        )
    }

    /// (east, north) meters → geographic.
    #[inline]
    pub fn to_geo(&self, v: DVec2) -> GeoPoint {
        let lon_scale = if self.m_per_deg_lon.abs() > f64::EPSILON { self.m_per_deg_lon } else { f64::EPSILON };
        GeoPoint::new(self.origin.lon + v.x / lon_scale, self.origin.lat + v.y / self.m_per_deg_lat)
    }
}

/// Insert points so consecutive vertices are at most `step_m` apart.
pub fn densify(line: &[GeoPoint], step_m: f64) -> Vec<GeoPoint> {
    let mut out = Vec::with_capacity(line.len());
    for pair in line.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let n = (a.distance_m(b) / step_m.max(f64::EPSILON)).ceil().max(1.0) as usize;
        for i in 0..n {
            out.push(a.lerp(b, i as f64 / n as f64));
        }
    }
    if let Some(last) = line.last() {
        out.push(*last);
    }
    out
}

/// Unit (east, north) vector for a bearing.
#[inline]
pub fn bearing_vector(bearing: f64) -> DVec2 { DVec2::new(bearing.sin(), bearing.cos()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_matches_degree_scale_near_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.001);
        let d = a.distance_m(b);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn bearing_cardinals() {
        let o = GeoPoint::new(-1.0, 51.0);
        let north = GeoPoint::new(-1.0, 51.01);
        let east = GeoPoint::new(-0.99, 51.0);
        assert!(o.bearing_to(north).abs() < 1e-9);
        assert!((o.bearing_to(east) - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn offset_round_trips_through_local_frame() {
        let o = GeoPoint::new(-2.8, 56.34);
        let p = o.offset(1.0, 150.0);
        let back = LocalFrame::at(o).to_local(p);
        assert!((back.length() - 150.0).abs() < 1e-6);
        assert!((o.distance_m(p) - 150.0).abs() < 1.0);
    }

    #[test]
    fn densify_bounds_spacing() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.002)];
        let dense = densify(&line, 10.0);
        assert_eq!(dense.first(), line.first());
        assert_eq!(dense.last(), line.last());
        assert!(dense.windows(2).all(|w| w[0].distance_m(w[1]) <= 10.0 + 1e-6));
        assert_eq!(densify(&line[..1], 10.0), vec![line[0]]);
    }
}
