// src/terrain/provider.rs
//! Elevation sources. Batches in, one value per point out; NaN is an
//! allowed "no data" answer for an individual point.

use bevy::log::info;
use bevy::math::DVec2;
use std::path::Path;
use std::sync::Arc;

use crate::error::TerrainError;
use crate::geo::{GeoPoint, LocalFrame};

/// Batch elevation sampling (meters).
pub trait ElevationProvider: Send + Sync + 'static {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError>;

    /// Short name for logs.
    fn name(&self) -> &str { "elevation" }
}

impl<T: ElevationProvider + ?Sized> ElevationProvider for Arc<T> {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        (**self).sample_elevations(points)
    }
    fn name(&self) -> &str { (**self).name() }
}

/// Sample and insist on one value per point.
pub fn sample_exact(provider: &dyn ElevationProvider, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
    let values = provider.sample_elevations(points)?;
    if values.len() != points.len() {
        return Err(TerrainError::Partial { requested: points.len(), returned: values.len() });
    }
    Ok(values)
}

// ---------- Flat ----------

#[derive(Clone, Copy, Debug, Default)]
pub struct FlatTerrain {
    pub elevation: f64,
}

impl ElevationProvider for FlatTerrain {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        Ok(vec![self.elevation; points.len()])
    }
    fn name(&self) -> &str { "flat" }
}

// ---------- Procedural ----------

/// Deterministic rolling surface: a plane tilt plus a sin/cos swell,
/// measured in meters around `origin`.
#[derive(Clone, Copy, Debug)]
pub struct ProceduralTerrain {
    pub origin: GeoPoint,
    pub base_m: f64,
    /// Rise per meter (east, north).
    pub tilt: DVec2,
    pub swell_amplitude_m: f64,
    pub swell_wavelength_m: f64,
}

impl ProceduralTerrain {
    pub fn new(origin: GeoPoint) -> Self {
        Self { origin, base_m: 20.0, tilt: DVec2::new(0.01, -0.015), swell_amplitude_m: 1.5, swell_wavelength_m: 120.0 }
    }

    pub fn elevation_at(&self, p: GeoPoint) -> f64 {
        if !p.is_finite() {
            return f64::NAN;
        }
        let local = LocalFrame::at(self.origin).to_local(p);
        let k = std::f64::consts::TAU / self.swell_wavelength_m.max(1.0);
        self.base_m + self.tilt.dot(local) + self.swell_amplitude_m * (local.x * k).sin() * (local.y * k).cos()
    }
}

impl ElevationProvider for ProceduralTerrain {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        Ok(points.iter().map(|&p| self.elevation_at(p)).collect())
    }
    fn name(&self) -> &str { "procedural" }
}

// ---------- Heightmap ----------

/// 16-bit grayscale heightmap stretched over a geographic rectangle.
/// Row 0 of the image is the northern edge.
#[derive(Clone, Debug)]
pub struct HeightmapTerrain {
    width: u32,
    height: u32,
    data: Arc<Vec<u16>>,
    pub min: GeoPoint,
    pub max: GeoPoint,
    /// Meters at full white (65535).
    pub height_scale: f64,
    pub base_m: f64,
}

impl HeightmapTerrain {
    pub fn from_image(img: image::ImageBuffer<image::Luma<u16>, Vec<u16>>, min: GeoPoint, max: GeoPoint, height_scale: f64) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, data: Arc::new(img.into_raw()), min, max, height_scale, base_m: 0.0 }
    }

    pub fn open(path: impl AsRef<Path>, min: GeoPoint, max: GeoPoint, height_scale: f64) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| TerrainError::Image(format!("{}: {e}", path.display())))?;
        let luma = img.to_luma16();
        info!("Heightmap: loaded {} ({}x{})", path.display(), luma.width(), luma.height());
        Ok(Self::from_image(luma, min, max, height_scale))
    }

    #[inline]
    fn texel(&self, x: i64, y: i64) -> f64 {
        let xi = x.clamp(0, self.width as i64 - 1) as usize;
        let yi = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[yi * self.width as usize + xi] as f64
    }

    /// Bilinear height; NaN outside the bounds or for an empty image.
    pub fn elevation_at(&self, p: GeoPoint) -> f64 {
        if self.width == 0 || self.height == 0 || !p.is_finite() {
            return f64::NAN;
        }
        let u = (p.lon - self.min.lon) / (self.max.lon - self.min.lon);
        let v = (self.max.lat - p.lat) / (self.max.lat - self.min.lat);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return f64::NAN;
        }
        let px = u * (self.width - 1) as f64;
        let py = v * (self.height - 1) as f64;
        let (x0, y0) = (px.floor() as i64, py.floor() as i64);
        let (dx, dy) = (px - x0 as f64, py - y0 as f64);

        let a = self.texel(x0, y0) * (1.0 - dx) + self.texel(x0 + 1, y0) * dx;
        let b = self.texel(x0, y0 + 1) * (1.0 - dx) + self.texel(x0 + 1, y0 + 1) * dx;
        let raw = a * (1.0 - dy) + b * dy;
        self.base_m + raw / u16::MAX as f64 * self.height_scale
    }
}

impl ElevationProvider for HeightmapTerrain {
    fn sample_elevations(&self, points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        Ok(points.iter().map(|&p| self.elevation_at(p)).collect())
    }
    fn name(&self) -> &str { "heightmap" }
}

// ---------- Failing ----------

/// Always unavailable. Exercises the degradation paths.
#[derive(Clone, Debug, Default)]
pub struct FailingTerrain {
    pub reason: String,
}

impl ElevationProvider for FailingTerrain {
    fn sample_elevations(&self, _points: &[GeoPoint]) -> Result<Vec<f64>, TerrainError> {
        let reason = if self.reason.is_empty() { "no terrain source" } else { self.reason.as_str() };
        Err(TerrainError::Unavailable(reason.to_string()))
    }
    fn name(&self) -> &str { "failing" }
}
