// src/clubs.rs
//! Club carry table, player skill, course firmness and the dispersion
//! profile derived from them. Also the nine-way shot-curve classifier used
//! when labelling recorded shots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::yards_to_meters;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Club {
    Driver,
    Wood3,
    Wood5,
    Iron3,
    Iron4,
    Iron5,
    Iron6,
    Iron7,
    Iron8,
    Iron9,
    PitchingWedge,
    SandWedge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotShape {
    #[default]
    Stock,
    Draw,
    Fade,
}

impl Club {
    pub const ALL: [Club; 12] = [
        Club::Driver,
        Club::Wood3,
        Club::Wood5,
        Club::Iron3,
        Club::Iron4,
        Club::Iron5,
        Club::Iron6,
        Club::Iron7,
        Club::Iron8,
        Club::Iron9,
        Club::PitchingWedge,
        Club::SandWedge,
    ];

    /// (stock, draw, fade) carry in yards.
    const fn carries(self) -> (f64, f64, f64) {
        match self {
            Club::Driver => (310.0, 315.0, 303.0),
            Club::Wood3 => (275.0, 280.0, 268.0),
            Club::Wood5 => (255.0, 260.0, 248.0),
            Club::Iron3 => (235.0, 240.0, 228.0),
            Club::Iron4 => (225.0, 230.0, 218.0),
            Club::Iron5 => (210.0, 215.0, 203.0),
            Club::Iron6 => (195.0, 200.0, 188.0),
            Club::Iron7 => (180.0, 185.0, 173.0),
            Club::Iron8 => (165.0, 170.0, 158.0),
            Club::Iron9 => (150.0, 155.0, 143.0),
            Club::PitchingWedge => (135.0, 139.0, 129.0),
            Club::SandWedge => (100.0, 103.0, 96.0),
        }
    }

    pub fn carry_yards(self, shape: ShotShape) -> f64 {
        let (stock, draw, fade) = self.carries();
        match shape {
            ShotShape::Stock => stock,
            ShotShape::Draw => draw,
            ShotShape::Fade => fade,
        }
    }

    /// Longest-first club whose stock carry does not exceed `yards`;
    /// the shortest club when nothing fits.
    pub fn for_distance(yards: f64) -> Club {
        Club::ALL
            .iter()
            .copied()
            .find(|c| c.carry_yards(ShotShape::Stock) <= yards)
            .unwrap_or(Club::SandWedge)
    }

    pub fn label(self) -> &'static str {
        match self {
            Club::Driver => "Driver",
            Club::Wood3 => "3 Wood",
            Club::Wood5 => "5 Wood",
            Club::Iron3 => "3 Iron",
            Club::Iron4 => "4 Iron",
            Club::Iron5 => "5 Iron",
            Club::Iron6 => "6 Iron",
            Club::Iron7 => "7 Iron",
            Club::Iron8 => "8 Iron",
            Club::Iron9 => "9 Iron",
            Club::PitchingWedge => "Pitching Wedge",
            Club::SandWedge => "Sand Wedge",
        }
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Tour,
    Scratch,
    LowHandicap,
    #[default]
    MidHandicap,
    HighHandicap,
}

impl SkillLevel {
    /// (lateral, depth) dispersion as a fraction of carry.
    pub const fn factors(self) -> (f64, f64) {
        match self {
            SkillLevel::Tour => (0.05, 0.04),
            SkillLevel::Scratch => (0.07, 0.05),
            SkillLevel::LowHandicap => (0.09, 0.06),
            SkillLevel::MidHandicap => (0.12, 0.08),
            SkillLevel::HighHandicap => (0.16, 0.10),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Firmness {
    Soft,
    #[default]
    Normal,
    Firm,
    VeryFirm,
}

impl Firmness {
    /// (width, depth) multipliers applied to the dispersion oval to get
    /// the roll oval.
    pub const fn roll_multipliers(self) -> (f64, f64) {
        match self {
            Firmness::Soft => (1.0, 1.1),
            Firmness::Normal => (1.05, 1.3),
            Firmness::Firm => (1.1, 1.6),
            Firmness::VeryFirm => (1.15, 2.0),
        }
    }
}

/// Landing-oval size for one club/shape/skill combination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispersionProfile {
    pub carry_yards: f64,
    pub width_m: f64,
    pub depth_m: f64,
}

impl DispersionProfile {
    pub fn for_shot(club: Club, shape: ShotShape, skill: SkillLevel) -> Self {
        let carry_yards = club.carry_yards(shape);
        let carry_m = yards_to_meters(carry_yards);
        let (lateral, depth) = skill.factors();
        // curved shots spread a little wider
        let curve = if shape == ShotShape::Stock { 1.0 } else { 1.1 };
        Self { carry_yards, width_m: carry_m * lateral * curve, depth_m: carry_m * depth }
    }
}

// ---------- Shot curve ----------

/// Start direction × curvature of a recorded shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotCurve {
    PullDraw,
    Pull,
    PullFade,
    Draw,
    Straight,
    Fade,
    PushDraw,
    Push,
    PushFade,
}

impl ShotCurve {
    pub fn label(self) -> &'static str {
        match self {
            ShotCurve::PullDraw => "Pull Draw",
            ShotCurve::Pull => "Pull",
            ShotCurve::PullFade => "Pull Fade",
            ShotCurve::Draw => "Draw",
            ShotCurve::Straight => "Straight",
            ShotCurve::Fade => "Fade",
            ShotCurve::PushDraw => "Push Draw",
            ShotCurve::Push => "Push",
            ShotCurve::PushFade => "Push Fade",
        }
    }
}

impl fmt::Display for ShotCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Negative launch direction is a pull, negative spin axis a draw; exact
/// zero is straight on either axis. `None` when either reading is missing
/// (non-finite).
pub fn classify_shot_shape(launch_h_deg: f64, spin_axis_deg: f64) -> Option<ShotCurve> {
    use std::cmp::Ordering::*;
    if !(launch_h_deg.is_finite() && spin_axis_deg.is_finite()) {
        return None;
    }
    let start = launch_h_deg.partial_cmp(&0.0)?;
    let curve = spin_axis_deg.partial_cmp(&0.0)?;
    Some(match (start, curve) {
        (Less, Less) => ShotCurve::PullDraw,
        (Less, Equal) => ShotCurve::Pull,
        (Less, Greater) => ShotCurve::PullFade,
        (Equal, Less) => ShotCurve::Draw,
        (Equal, Equal) => ShotCurve::Straight,
        (Equal, Greater) => ShotCurve::Fade,
        (Greater, Less) => ShotCurve::PushDraw,
        (Greater, Equal) => ShotCurve::Push,
        (Greater, Greater) => ShotCurve::PushFade,
    })
}
