// src/strokes/mod.rs
//! Expected strokes to hole out from a distance on a given surface.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod curves;

pub use curves::{SurfaceCurve, MAX_DISTANCE_YARDS};

/// Nothing costs less than this; a ball is never "already holed".
pub const MIN_EXPECTED_STROKES: f64 = 1.001;
/// Strokes added for a ball that must be replayed from water.
pub const WATER_PENALTY: f64 = 1.0;

/// Natural course surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Fairway,
    Rough,
    Tee,
    Green,
    Sand,
    Water,
    Recovery,
}

impl Surface {
    pub const ALL: [Surface; 7] = [
        Surface::Fairway,
        Surface::Rough,
        Surface::Tee,
        Surface::Green,
        Surface::Sand,
        Surface::Water,
        Surface::Recovery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Fairway => "fairway",
            Surface::Rough => "rough",
            Surface::Tee => "tee",
            Surface::Green => "green",
            Surface::Sand => "sand",
            Surface::Water => "water",
            Surface::Recovery => "recovery",
        }
    }

    /// Parse a label; anything unrecognized is rough.
    pub fn parse_lenient(label: &str) -> Surface {
        match label.trim().to_ascii_lowercase().as_str() {
            "fairway" => Surface::Fairway,
            "tee" => Surface::Tee,
            "green" => Surface::Green,
            "sand" | "bunker" => Surface::Sand,
            "water" => Surface::Water,
            "recovery" => Surface::Recovery,
            _ => Surface::Rough,
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Expected strokes from `distance_yards` on `surface`.
///
/// Returns `None` outside `[0, 600]` yards (including NaN); callers skip
/// such samples. Results are floored at [`MIN_EXPECTED_STROKES`].
pub fn expected_strokes(distance_yards: f64, surface: Surface) -> Option<f64> {
    if !(0.0..=MAX_DISTANCE_YARDS).contains(&distance_yards) {
        return None;
    }
    let d = distance_yards;
    let raw = match surface {
        Surface::Fairway | Surface::Tee => curves::FAIRWAY.evaluate(d),
        Surface::Rough => curves::ROUGH.evaluate(d),
        Surface::Sand => curves::SAND.evaluate(d),
        Surface::Recovery => curves::RECOVERY.evaluate(d),
        Surface::Water => return expected_strokes(d, Surface::Rough).map(|r| r + WATER_PENALTY),
        Surface::Green if d <= curves::GREEN.upper => curves::GREEN.evaluate(d),
        Surface::Green => curves::FAIRWAY.evaluate(d),
    };
    Some(raw.max(MIN_EXPECTED_STROKES))
}

/// String-label entry point; unknown labels use the rough curve.
pub fn expected_strokes_for_label(distance_yards: f64, label: &str) -> Option<f64> {
    expected_strokes(distance_yards, Surface::parse_lenient(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_domain_is_not_applicable() {
        assert_eq!(expected_strokes(-0.5, Surface::Fairway), None);
        assert_eq!(expected_strokes(600.01, Surface::Rough), None);
        assert_eq!(expected_strokes(f64::NAN, Surface::Green), None);
        assert!(expected_strokes(600.0, Surface::Rough).is_some());
        assert!(expected_strokes(0.0, Surface::Sand).is_some());
    }

    #[test]
    fn unknown_label_uses_rough() {
        assert_eq!(expected_strokes_for_label(120.0, "native_area"), expected_strokes(120.0, Surface::Rough));
        assert_eq!(expected_strokes_for_label(120.0, " Fairway "), expected_strokes(120.0, Surface::Fairway));
    }

    #[test]
    fn tee_shares_fairway_curve() {
        for d in [5.0, 150.0, 420.0, 590.0] {
            assert_eq!(expected_strokes(d, Surface::Tee), expected_strokes(d, Surface::Fairway));
        }
    }

    #[test]
    fn deterministic() {
        let a = expected_strokes(231.7, Surface::Sand);
        let b = expected_strokes(231.7, Surface::Sand);
        assert_eq!(a, b);
    }
}
