// src/geo/ellipse.rs
//! Rotated ellipses on the ground: membership, boundary rings and
//! uniform-area sampling.

use bevy::math::DVec2;
use rand::Rng;

use super::{GeoPoint, LocalFrame};

/// Segment count used for boundary rings.
pub const ELLIPSE_SEGMENTS: usize = 64;

/// Ellipse with metric extents. `rotation` is the counter-clockwise angle
/// (radians, from east) of the width axis; the depth axis is 90° further.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    pub center: GeoPoint,
    /// Full lateral extent (meters).
    pub width_m: f64,
    /// Full extent along the shot line (meters).
    pub depth_m: f64,
    pub rotation: f64,
}

impl Ellipse {
    pub fn new(center: GeoPoint, width_m: f64, depth_m: f64, rotation: f64) -> Self {
        Self { center, width_m, depth_m, rotation }
    }

    /// Orient the depth axis along `bearing` (radians clockwise from north).
    pub fn facing(center: GeoPoint, width_m: f64, depth_m: f64, bearing: f64) -> Self {
        Self::new(center, width_m, depth_m, -bearing)
    }

    #[inline]
    pub fn semi_width(&self) -> f64 { self.width_m * 0.5 }

    #[inline]
    pub fn semi_depth(&self) -> f64 { self.depth_m * 0.5 }

    #[inline]
    pub fn max_semi_axis(&self) -> f64 { self.semi_width().max(self.semi_depth()) }

    /// Unit (east, north) vector of the depth axis.
    #[inline]
    pub fn forward(&self) -> DVec2 { DVec2::new(-self.rotation.sin(), self.rotation.cos()) }

    fn frame(&self) -> LocalFrame { LocalFrame::at(self.center) }

    /// Point in the ellipse's own unrotated frame (x = width, y = depth), meters.
    pub fn to_ellipse_frame(&self, p: GeoPoint) -> DVec2 {
        let d = self.frame().to_local(p);
        let (s, c) = self.rotation.sin_cos();
        DVec2::new(d.x * c + d.y * s, -d.x * s + d.y * c)
    }

    /// Ellipse frame (meters) → geographic.
    pub fn from_ellipse_frame(&self, v: DVec2) -> GeoPoint {
        let (s, c) = self.rotation.sin_cos();
        self.frame().to_geo(DVec2::new(v.x * c - v.y * s, v.x * s + v.y * c))
    }

    /// `(x/a)² + (y/b)² <= 1` in the rotated local frame.
    pub fn contains(&self, p: GeoPoint) -> bool {
        let (a, b) = (self.semi_width(), self.semi_depth());
        if !(a > 0.0 && b > 0.0) || !p.is_finite() {
            return false;
        }
        let l = self.to_ellipse_frame(p);
        (l.x / a).powi(2) + (l.y / b).powi(2) <= 1.0
    }

    /// Closed ring (first vertex repeated) with `segments` edges.
    pub fn boundary(&self, segments: usize) -> Vec<GeoPoint> {
        let n = segments.max(3);
        let (a, b) = (self.semi_width(), self.semi_depth());
        let mut ring = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            ring.push(self.from_ellipse_frame(DVec2::new(a * t.cos(), b * t.sin())));
        }
        ring
    }

    /// Uniform-area sample: `r = sqrt(u)` keeps draws from clustering at the center.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> GeoPoint {
        let r = rng.random::<f64>().sqrt();
        let theta = rng.random_range(0.0..std::f64::consts::TAU);
        self.from_ellipse_frame(DVec2::new(
            self.semi_width() * r * theta.cos(),
            self.semi_depth() * r * theta.sin(),
        ))
    }
}

/// Uniform sample inside a metric disc around `center`.
pub fn random_point_in_disc<R: Rng + ?Sized>(center: GeoPoint, radius_m: f64, rng: &mut R) -> GeoPoint {
    let r = radius_m * rng.random::<f64>().sqrt();
    let theta = rng.random_range(0.0..std::f64::consts::TAU);
    LocalFrame::at(center).to_geo(DVec2::new(r * theta.cos(), r * theta.sin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn oval() -> Ellipse {
        Ellipse::facing(GeoPoint::new(-2.82, 56.34), 30.0, 20.0, 0.7)
    }

    #[test]
    fn center_inside_and_just_past_axes_outside() {
        let e = oval();
        assert!(e.contains(e.center));
        let r = e.max_semi_axis() * 1.01;
        for v in [DVec2::new(r, 0.0), DVec2::new(-r, 0.0), DVec2::new(0.0, r), DVec2::new(0.0, -r)] {
            assert!(!e.contains(e.from_ellipse_frame(v)), "{v:?} should be outside");
        }
        assert!(e.contains(e.from_ellipse_frame(DVec2::new(e.semi_width() * 0.98, 0.0))));
        assert!(e.contains(e.from_ellipse_frame(DVec2::new(0.0, e.semi_depth() * 0.98))));
    }

    #[test]
    fn forward_matches_bearing() {
        let e = Ellipse::facing(GeoPoint::new(0.0, 45.0), 10.0, 20.0, std::f64::consts::FRAC_PI_2);
        let f = e.forward();
        assert!((f.x - 1.0).abs() < 1e-12 && f.y.abs() < 1e-12);
        // depth extends east, width extends north-south
        let east = e.center.offset(std::f64::consts::FRAC_PI_2, 9.5);
        let north = e.center.offset(0.0, 9.5);
        assert!(e.contains(east));
        assert!(!e.contains(north));
    }

    #[test]
    fn boundary_points_lie_on_the_curve() {
        let e = oval();
        let ring = e.boundary(ELLIPSE_SEGMENTS);
        assert_eq!(ring.len(), ELLIPSE_SEGMENTS + 1);
        assert_eq!(ring.first(), ring.last());
        for p in &ring {
            let l = e.to_ellipse_frame(*p);
            let q = (l.x / e.semi_width()).powi(2) + (l.y / e.semi_depth()).powi(2);
            assert!((q - 1.0).abs() < 1e-6, "q = {q}");
        }
    }

    #[test]
    fn uniform_area_sampling_is_not_center_biased() {
        let e = oval();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 20_000;
        let mut inner = 0usize;
        for _ in 0..n {
            let l = e.to_ellipse_frame(e.random_point(&mut rng));
            let q = (l.x / e.semi_width()).powi(2) + (l.y / e.semi_depth()).powi(2);
            assert!(q <= 1.0 + 1e-9);
            // inner half-area ⇔ normalized radius < 1/√2 ⇔ q < 0.5
            if q < 0.5 {
                inner += 1;
            }
        }
        let frac = inner as f64 / n as f64;
        assert!((frac - 0.5).abs() < 0.02, "inner fraction {frac}");
    }

    #[test]
    fn degenerate_ellipse_contains_nothing() {
        let e = Ellipse::new(GeoPoint::new(0.0, 0.0), 0.0, 10.0, 0.0);
        assert!(!e.contains(e.center));
    }
}
