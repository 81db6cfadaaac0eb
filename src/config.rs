// src/config.rs
//! Planner settings, read from `assets/planner.ron`.

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::clubs::{Firmness, SkillLevel};
use crate::dispersion::{DEFAULT_AIM_THRESHOLD_M, DEFAULT_SAMPLE_COUNT, DEFAULT_SIZE_THRESHOLD_M};
use crate::error::{SettingsError, TerrainError};
use crate::geo::GeoPoint;
use crate::jobs::DebounceDelays;
use crate::shortgame::DEFAULT_SHORT_GAME_RADIUS_YARDS;
use crate::terrain::{ElevationProvider, FlatTerrain, HeightmapTerrain, ProceduralTerrain};

/// Slope grid defaults for terrain analysis requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainGridSettings {
    pub rows: usize,
    pub cols: usize,
    /// Half the side of the square analysed around the green (meters).
    pub half_extent_m: f64,
    pub smooth: bool,
    pub arrow_stride: usize,
}

impl Default for TerrainGridSettings {
    fn default() -> Self { Self { rows: 24, cols: 24, half_extent_m: 40.0, smooth: true, arrow_stride: 3 } }
}

/// Where elevations come from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TerrainSource {
    Flat { elevation: f64 },
    /// Rolling surface around the active hole's pin.
    #[default]
    Procedural,
    Heightmap { path: String, min: GeoPoint, max: GeoPoint, height_scale: f64 },
}

impl TerrainSource {
    /// Build the provider; `origin` anchors the procedural surface.
    pub fn provider(&self, origin: GeoPoint) -> Result<Arc<dyn ElevationProvider>, TerrainError> {
        Ok(match self {
            TerrainSource::Flat { elevation } => Arc::new(FlatTerrain { elevation: *elevation }),
            TerrainSource::Procedural => Arc::new(ProceduralTerrain::new(origin)),
            TerrainSource::Heightmap { path, min, max, height_scale } => {
                Arc::new(HeightmapTerrain::open(path, *min, *max, *height_scale)?)
            }
        })
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub sample_count: usize,
    /// Fixed RNG seed; random per run when `None`.
    pub seed: Option<u64>,
    pub short_game_radius_yards: f64,
    pub advanced_short_game: bool,
    pub aim_threshold_m: f64,
    pub size_threshold_m: f64,
    pub debounce: DebounceDelays,
    pub markers_per_frame: usize,
    pub skill: SkillLevel,
    pub firmness: Firmness,
    /// Add the roll oval to every pattern.
    pub roll: bool,
    pub terrain_grid: TerrainGridSettings,
    pub terrain: TerrainSource,
    pub course_path: String,
    pub modifier_table_path: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: None,
            short_game_radius_yards: DEFAULT_SHORT_GAME_RADIUS_YARDS,
            advanced_short_game: false,
            aim_threshold_m: DEFAULT_AIM_THRESHOLD_M,
            size_threshold_m: DEFAULT_SIZE_THRESHOLD_M,
            debounce: DebounceDelays::default(),
            markers_per_frame: 100,
            skill: SkillLevel::default(),
            firmness: Firmness::default(),
            roll: false,
            terrain_grid: TerrainGridSettings::default(),
            terrain: TerrainSource::default(),
            course_path: "assets/courses/demo.course.ron".to_string(),
            modifier_table_path: "assets/short_game_modifiers.ron".to_string(),
        }
    }
}

impl PlannerSettings {
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        ron::de::from_str(text).map_err(|e| SettingsError::Ron(e.to_string()))
    }

    /// Missing file → defaults; unreadable or malformed → error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Settings: '{}' not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(SettingsError::Io { path: path.to_path_buf(), source }),
        };
        let settings = Self::from_ron_str(&text)?;
        info!("Settings: loaded '{}'", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let s = PlannerSettings::from_ron_str("(sample_count: 200, roll: true, skill: scratch)").unwrap();
        assert_eq!(s.sample_count, 200);
        assert!(s.roll);
        assert_eq!(s.skill, SkillLevel::Scratch);
        assert_eq!(s.markers_per_frame, 100);
        assert_eq!(s.debounce, DebounceDelays::default());
    }

    #[test]
    fn malformed_is_an_error() {
        assert!(matches!(PlannerSettings::from_ron_str("(sample_count: \"many\")"), Err(SettingsError::Ron(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let s = PlannerSettings::load("does/not/exist/planner.ron").unwrap();
        assert_eq!(s, PlannerSettings::default());
    }
}
