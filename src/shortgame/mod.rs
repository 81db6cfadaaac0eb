// src/shortgame/mod.rs
//! Short-game adjustment for balls close to the pin.
//!
//! Four discrete conditions are read from terrain between ball and pin
//! (lie, green slope, elevation trend, usable green) and turned into a key
//! for the modifier table.

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::TerrainError;
use crate::geo::polygon::to_planar_ring;
use crate::geo::{point_in_polygon, GeoPoint, LocalFrame};
use crate::terrain::provider::{sample_exact, ElevationProvider};

pub mod table;

pub use table::{ModifierLookup, ModifierRecord, ModifierTable};

/// Conditions only apply inside this distance.
pub const DEFAULT_SHORT_GAME_RADIUS_YARDS: f64 = 45.0;
/// Rise over run below which ground counts as flat.
pub const SLOPE_THRESHOLD: f64 = 0.02;
/// Ball-to-pin height difference below which the trend is flat (meters).
pub const TREND_THRESHOLD_M: f64 = 1.0;
/// Half-spacing of the gradient probe (meters).
const PROBE_OFFSET_M: f64 = 1.0;
/// Steps used to find where the ball→pin line enters the green.
const ENTRY_STEPS: usize = 64;
/// Short-game cost never drops below one stroke.
pub const MIN_SHORT_GAME_STROKES: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lie {
    #[default]
    Flat,
    Uphill,
    Downhill,
    Sidehill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Incline {
    #[default]
    Flat,
    Uphill,
    Downhill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsableGreen {
    #[default]
    Under20,
    From20To45,
    Over45,
}

impl Lie {
    pub fn label(self) -> &'static str {
        match self {
            Lie::Flat => "Flat",
            Lie::Uphill => "Uphill",
            Lie::Downhill => "Downhill",
            Lie::Sidehill => "Sidehill",
        }
    }
}

impl Incline {
    pub fn label(self) -> &'static str {
        match self {
            Incline::Flat => "Flat",
            Incline::Uphill => "Uphill",
            Incline::Downhill => "Downhill",
        }
    }

    fn from_signed(v: f64, threshold: f64) -> Self {
        if v > threshold {
            Incline::Uphill
        } else if v < -threshold {
            Incline::Downhill
        } else {
            Incline::Flat
        }
    }
}

impl UsableGreen {
    pub fn label(self) -> &'static str {
        match self {
            UsableGreen::Under20 => "<20%",
            UsableGreen::From20To45 => "20-45%",
            UsableGreen::Over45 => ">45%",
        }
    }

    pub fn from_fraction(f: f64) -> Self {
        if f < 0.20 {
            UsableGreen::Under20
        } else if f <= 0.45 {
            UsableGreen::From20To45
        } else {
            UsableGreen::Over45
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortGameConditions {
    pub lie: Lie,
    pub green_slope: Incline,
    pub trend: Incline,
    pub usable_green: UsableGreen,
}

impl ShortGameConditions {
    /// `"Lie, GreenSlope, Trend, Usable"`, e.g. `"Flat, Uphill, Downhill, <20%"`.
    pub fn key(&self) -> String { self.to_string() }
}

impl fmt::Display for ShortGameConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.lie.label(),
            self.green_slope.label(),
            self.trend.label(),
            self.usable_green.label()
        )
    }
}

// ---------- Terrain-derived conditions ----------

/// Rise-over-run gradient (east, north) from the five-point probe values
/// `[center, east, west, north, south]`.
fn probe_gradient(z: &[f64]) -> DVec2 {
    DVec2::new((z[1] - z[2]) / (2.0 * PROBE_OFFSET_M), (z[3] - z[4]) / (2.0 * PROBE_OFFSET_M))
}

fn probe_points(at: GeoPoint) -> [GeoPoint; 5] {
    let f = LocalFrame::at(at);
    [
        at,
        f.to_geo(DVec2::new(PROBE_OFFSET_M, 0.0)),
        f.to_geo(DVec2::new(-PROBE_OFFSET_M, 0.0)),
        f.to_geo(DVec2::new(0.0, PROBE_OFFSET_M)),
        f.to_geo(DVec2::new(0.0, -PROBE_OFFSET_M)),
    ]
}

/// Lie at the ball: flat under 2 %, otherwise split by whether the
/// steepest direction runs along the line to the pin or across it.
pub fn classify_lie(gradient: DVec2, toward_pin: DVec2) -> Lie {
    if gradient.length() < SLOPE_THRESHOLD {
        return Lie::Flat;
    }
    let along = gradient.dot(toward_pin);
    let across = gradient.perp_dot(toward_pin);
    if along.abs() >= across.abs() {
        if along > 0.0 { Lie::Uphill } else { Lie::Downhill }
    } else {
        Lie::Sidehill
    }
}

/// Lie, green slope and trend from one batched elevation request.
pub fn terrain_conditions(
    provider: &dyn ElevationProvider,
    ball: GeoPoint,
    pin: GeoPoint,
) -> Result<(Lie, Incline, Incline), TerrainError> {
    let mut points = Vec::with_capacity(10);
    points.extend(probe_points(ball));
    points.extend(probe_points(pin));
    let z = sample_exact(provider, &points)?;
    if z.iter().any(|v| !v.is_finite()) {
        let returned = z.iter().filter(|v| v.is_finite()).count();
        return Err(TerrainError::Partial { requested: z.len(), returned });
    }

    let toward_pin = LocalFrame::at(ball).to_local(pin).normalize_or_zero();
    let lie = classify_lie(probe_gradient(&z[..5]), toward_pin);
    let green_slope = Incline::from_signed(probe_gradient(&z[5..]).dot(toward_pin), SLOPE_THRESHOLD);
    let trend = Incline::from_signed(z[5] - z[0], TREND_THRESHOLD_M);
    Ok((lie, green_slope, trend))
}

/// Share of the ball→pin segment that runs over green, measured from where
/// the segment first enters the green to the pin. 1 when the ball is on the
/// green, 0 when the segment never reaches it.
pub fn usable_green_fraction(ball: GeoPoint, pin: GeoPoint, green: Option<&[GeoPoint]>) -> f64 {
    let Some(green) = green else { return 0.0 };
    let ring = to_planar_ring(green);
    let total = ball.distance_m(pin);
    if total <= f64::EPSILON {
        return 1.0;
    }
    (0..=ENTRY_STEPS)
        .map(|i| ball.lerp(pin, i as f64 / ENTRY_STEPS as f64))
        .find(|p| point_in_polygon(p.planar(), &ring))
        .map_or(0.0, |entry| (entry.distance_m(pin) / total).clamp(0.0, 1.0))
}

// ---------- Model ----------

#[derive(Clone, Debug, PartialEq)]
pub struct ShortGameOutcome {
    pub strokes: f64,
    pub conditions: ShortGameConditions,
    pub lookup: ModifierLookup,
    /// Terrain could not be read; lie/slope/trend fell back to flat.
    pub terrain_error: Option<TerrainError>,
}

/// Modifier table plus the radius inside which it applies.
#[derive(Clone, Debug)]
pub struct ShortGameModel {
    pub table: Arc<ModifierTable>,
    pub radius_yards: f64,
}

impl ShortGameModel {
    pub fn new(table: Arc<ModifierTable>) -> Self {
        Self { table, radius_yards: DEFAULT_SHORT_GAME_RADIUS_YARDS }
    }

    #[inline]
    pub fn applies(&self, distance_yards: f64) -> bool {
        (0.0..=self.radius_yards).contains(&distance_yards)
    }

    /// Conditions for one ball; terrain failure degrades to flat.
    pub fn conditions(
        &self,
        provider: &dyn ElevationProvider,
        ball: GeoPoint,
        pin: GeoPoint,
        green: Option<&[GeoPoint]>,
    ) -> (ShortGameConditions, Option<TerrainError>) {
        let usable_green = UsableGreen::from_fraction(usable_green_fraction(ball, pin, green));
        match terrain_conditions(provider, ball, pin) {
            Ok((lie, green_slope, trend)) => (ShortGameConditions { lie, green_slope, trend, usable_green }, None),
            Err(e) => (ShortGameConditions { usable_green, ..Default::default() }, Some(e)),
        }
    }

    /// `base + modifier`, floored at one stroke. `None` beyond the radius.
    pub fn advanced_expected_strokes(
        &self,
        provider: &dyn ElevationProvider,
        base: f64,
        distance_yards: f64,
        ball: GeoPoint,
        pin: GeoPoint,
        green: Option<&[GeoPoint]>,
    ) -> Option<ShortGameOutcome> {
        if !self.applies(distance_yards) {
            return None;
        }
        let (conditions, terrain_error) = self.conditions(provider, ball, pin, green);
        let lookup = self.table.lookup(&conditions.key());
        let strokes = (base + lookup.record.modifier).max(MIN_SHORT_GAME_STROKES);
        Some(ShortGameOutcome { strokes, conditions, lookup, terrain_error })
    }
}
