// src/terrain/grid.rs
//! Row-major elevation grid over a lon/lat rectangle: 3×3 smoothing and
//! central-difference slopes.

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::geo::{GeoPoint, LocalFrame};

/// Gradients below this are numerically flat and produce no record.
pub const FLAT_GRADIENT_EPS: f64 = 1e-6;

/// South-west / north-east corners of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GridBounds {
    pub fn around(center: GeoPoint, half_extent_m: f64) -> Self {
        let frame = LocalFrame::at(center);
        Self {
            min: frame.to_geo(DVec2::splat(-half_extent_m)),
            max: frame.to_geo(DVec2::splat(half_extent_m)),
        }
    }

    #[inline]
    pub fn center(&self) -> GeoPoint { self.min.lerp(self.max, 0.5) }

    /// Node `(row, col)` of a `rows × cols` lattice spanning the bounds;
    /// row 0 lies on the southern edge.
    pub fn node(&self, rows: usize, cols: usize, row: usize, col: usize) -> GeoPoint {
        let u = if cols > 1 { col as f64 / (cols - 1) as f64 } else { 0.5 };
        let v = if rows > 1 { row as f64 / (rows - 1) as f64 } else { 0.5 };
        GeoPoint::new(self.min.lon + (self.max.lon - self.min.lon) * u, self.min.lat + (self.max.lat - self.min.lat) * v)
    }
}

/// One slope sample: downhill vector (`-∇z`, rise over run) at a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSlope {
    pub row: usize,
    pub col: usize,
    pub slope: DVec2,
}

impl CellSlope {
    #[inline]
    pub fn magnitude(&self) -> f64 { self.slope.length() }
    #[inline]
    pub fn percent(&self) -> f64 { self.magnitude() * 100.0 }
    /// `atan2(y, x)` of the downhill vector, radians from east.
    #[inline]
    pub fn direction(&self) -> f64 { self.slope.y.atan2(self.slope.x) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGrid {
    pub rows: usize,
    pub cols: usize,
    pub bounds: GridBounds,
    /// Row-major, row 0 at `bounds.min.lat`. NaN marks a missing sample.
    pub elevations: Vec<f64>,
    /// Optional validity mask, same layout; `false` cells are ignored.
    pub mask: Option<Vec<bool>>,
}

impl TerrainGrid {
    pub fn new(rows: usize, cols: usize, bounds: GridBounds, elevations: Vec<f64>) -> Result<Self, TerrainError> {
        if rows * cols != elevations.len() {
            return Err(TerrainError::Shape { rows, cols, len: elevations.len() });
        }
        Ok(Self { rows, cols, bounds, elevations, mask: None })
    }

    pub fn with_mask(mut self, mask: Vec<bool>) -> Result<Self, TerrainError> {
        if mask.len() != self.elevations.len() {
            return Err(TerrainError::Shape { rows: self.rows, cols: self.cols, len: mask.len() });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize { row * self.cols + col }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 { self.elevations[self.index(row, col)] }

    #[inline]
    fn masked_in(&self, i: usize) -> bool { self.mask.as_ref().map_or(true, |m| m[i]) }

    /// Finite and not masked out.
    #[inline]
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        let i = self.index(row, col);
        self.elevations[i].is_finite() && self.masked_in(i)
    }

    /// Geographic position of a grid node.
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> GeoPoint { self.bounds.node(self.rows, self.cols, row, col) }

    /// Every node, row-major.
    pub fn points(rows: usize, cols: usize, bounds: GridBounds) -> Vec<GeoPoint> {
        (0..rows).flat_map(|r| (0..cols).map(move |c| bounds.node(rows, cols, r, c))).collect()
    }

    /// (east, north) node spacing in meters.
    pub fn spacing_m(&self) -> DVec2 {
        let frame = LocalFrame::at(self.bounds.center());
        let span = frame.to_local(self.bounds.max) - frame.to_local(self.bounds.min);
        DVec2::new(
            span.x / (self.cols.max(2) - 1) as f64,
            span.y / (self.rows.max(2) - 1) as f64,
        )
    }

    /// Mean of the valid cells in the 3×3 window around one cell; NaN when
    /// the window has no valid cell.
    pub fn smoothed_cell(&self, row: usize, col: usize) -> f64 {
        let (mut sum, mut n) = (0.0, 0u32);
        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                if self.is_valid(r, c) {
                    sum += self.get(r, c);
                    n += 1;
                }
            }
        }
        if n == 0 { f64::NAN } else { sum / n as f64 }
    }

    /// Whole-grid 3×3 mean filter.
    pub fn smoothed(&self) -> TerrainGrid {
        let elevations = (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .map(|(r, c)| self.smoothed_cell(r, c))
            .collect();
        TerrainGrid { elevations, ..self.clone() }
    }

    /// Central-difference slope at an interior valid cell. `None` on the
    /// border, when any axis neighbor is invalid, or when flat.
    pub fn slope_at(&self, row: usize, col: usize, spacing: DVec2) -> Option<CellSlope> {
        if row == 0 || col == 0 || row + 1 >= self.rows || col + 1 >= self.cols {
            return None;
        }
        let cells = [(row, col), (row, col - 1), (row, col + 1), (row - 1, col), (row + 1, col)];
        if !cells.iter().all(|&(r, c)| self.is_valid(r, c)) {
            return None;
        }
        let dzdx = (self.get(row, col + 1) - self.get(row, col - 1)) / (2.0 * spacing.x);
        let dzdy = (self.get(row + 1, col) - self.get(row - 1, col)) / (2.0 * spacing.y);
        let gradient = DVec2::new(dzdx, dzdy);
        if !gradient.is_finite() || gradient.length() < FLAT_GRADIENT_EPS {
            return None;
        }
        Some(CellSlope { row, col, slope: -gradient })
    }

    pub fn slopes(&self) -> Vec<CellSlope> {
        let spacing = self.spacing_m();
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .filter_map(|(r, c)| self.slope_at(r, c, spacing))
            .collect()
    }
}
