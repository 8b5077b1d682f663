//! Terrain rasterizer.
//!
//! Carves a grass/dirt/stone profile into a [`TileGrid`] from a 1D noise
//! height field: one noise query per column, grass at the surface row, dirt
//! below it, and stone from depth 3 down with a randomized transition band.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::TileId;
use crate::grid::{TileGrid, TileStack};
use crate::noise::{Noise1D, ValueNoise1D};
use crate::rng::DeterministicRng;

/// Errors from terrain generation.
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("smoothness must be finite and positive, got {0}")]
    InvalidSmoothness(f64),
}

/// How the column loop walks the noise domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// One sample per column at `column / smoothness`.
    #[default]
    Columns,
    /// Float stepping by `1 / smoothness` with the target column rounded from
    /// the accumulated position. Drift can repeat or skip columns.
    Accumulated,
}

/// Terrain generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Inverse sampling density: columns per unit of noise domain.
    pub smoothness: f64,
    /// Height (in tiles) reached by a noise value of 1.0.
    pub max_height: u32,
    /// Hard floor on the surface height, applied after scaling.
    pub min_height: u32,
    pub sampling: Sampling,
    pub grass: TileId,
    pub dirt: TileId,
    pub stone: TileId,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            smoothness: 14.0,
            max_height: 14,
            min_height: 3,
            sampling: Sampling::Columns,
            grass: TileId(0),
            dirt: TileId(1),
            stone: TileId(3),
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.smoothness.is_finite() || self.smoothness <= 0.0 {
            return Err(TerrainError::InvalidSmoothness(self.smoothness));
        }
        Ok(())
    }

    /// Surface height in tiles for a noise value.
    pub fn surface_height(&self, height_fraction: f64) -> i64 {
        // NaN saturates to 0 and then takes the floor.
        let scaled = (height_fraction * self.max_height as f64).floor() as i64;
        scaled.max(self.min_height as i64)
    }
}

/// One rasterized column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSample {
    /// Grid column written.
    pub column: u32,
    /// Position in the noise domain that was sampled.
    pub sample_x: f64,
    /// Raw noise value.
    pub height_fraction: f64,
    /// Surface height in tiles, after the `min_height` floor.
    pub height: i64,
    /// Row of the grass tile (row 0 is the top); may lie outside the grid.
    pub surface_row: i64,
}

/// Per-column record of a generation run, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TerrainProfile {
    pub samples: Vec<ColumnSample>,
}

impl TerrainProfile {
    /// The last sample written for `column`, which is what the grid shows.
    pub fn column(&self, column: u32) -> Option<&ColumnSample> {
        self.samples.iter().rev().find(|s| s.column == column)
    }
}

/// Target columns and sample positions for a grid `width` wide.
fn sample_points(width: u32, params: &TerrainParams) -> Vec<(u32, f64)> {
    let s = params.smoothness;
    match params.sampling {
        Sampling::Columns => (0..width).map(|x| (x, x as f64 / s)).collect(),
        Sampling::Accumulated => {
            let end = width as f64 / s;
            let step = 1.0 / s;
            let mut points = Vec::new();
            let mut p = 0.0_f64;
            while p < end {
                let column = (p * s).round();
                if column >= 0.0 && column < width as f64 {
                    points.push((column as u32, p));
                }
                let next = p + step;
                if next <= p {
                    break;
                }
                p = next;
            }
            points
        }
    }
}

/// Rasterize terrain into `grid` using the given noise and RNG.
///
/// The grid is cleared first. Columns the sampling loop never reaches stay
/// empty.
pub fn rasterize<N: Noise1D + ?Sized>(
    grid: &mut TileGrid,
    noise: &N,
    params: &TerrainParams,
    rng: &mut DeterministicRng,
) -> Result<TerrainProfile, TerrainError> {
    params.validate()?;
    grid.clear();

    let height = grid.height() as i64;
    let mut profile = TerrainProfile::default();

    for (column, p) in sample_points(grid.width(), params) {
        let height_fraction = noise.sample(p);
        let h = params.surface_height(height_fraction);
        let surface = height - h;

        // Later samples of the same column replace earlier ones.
        for row in 0..grid.height() {
            grid.clear_cell(column, row);
        }

        for ty in (surface + 1).max(0)..height {
            let depth = ty - surface;
            let tile = if depth > 3 {
                params.stone
            } else if depth > 2 && rng.pick(0, 3) == 0 {
                params.stone
            } else {
                params.dirt
            };
            grid.set(column, ty as u32, TileStack::single(tile));
        }

        if (0..height).contains(&surface) {
            grid.set(column, surface as u32, TileStack::single(params.grass));
        }

        profile.samples.push(ColumnSample {
            column,
            sample_x: p,
            height_fraction,
            height: h,
            surface_row: surface,
        });
    }

    debug!(
        "rasterized {} column samples into {}x{} grid",
        profile.samples.len(),
        grid.width(),
        grid.height()
    );

    Ok(profile)
}

/// Generate fresh terrain from a seed.
///
/// A new noise table is built for every call; the noise table and the stone
/// band draw from independent streams derived from `seed`.
pub fn generate(
    grid: &mut TileGrid,
    params: &TerrainParams,
    seed: u32,
) -> Result<TerrainProfile, TerrainError> {
    let noise = ValueNoise1D::new(DeterministicRng::derive_stream_seed(seed, "noise"));
    let mut rng = DeterministicRng::new(DeterministicRng::derive_stream_seed(seed, "stone"));
    rasterize(grid, &noise, params, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridConfig;
    use pretty_assertions::assert_eq;

    fn grid(w: u32, h: u32) -> TileGrid {
        TileGrid::new(GridConfig::new(16, w, h))
    }

    #[test]
    fn test_half_height_example() {
        let mut g = grid(4, 28);
        let params = TerrainParams::default();
        let mut rng = DeterministicRng::new(1);
        let profile = rasterize(&mut g, &|_x: f64| 0.5, &params, &mut rng).unwrap();

        let sample = profile.column(0).unwrap();
        assert_eq!(sample.height, 7);
        assert_eq!(sample.surface_row, 21);

        let column = g.column(0);
        assert!(column[..21].iter().all(Option::is_none));
        assert_eq!(column[21], Some(params.grass));
        assert_eq!(column[22], Some(params.dirt));
        assert_eq!(column[23], Some(params.dirt));
        assert!(column[24] == Some(params.dirt) || column[24] == Some(params.stone));
        for row in 25..28 {
            assert_eq!(column[row], Some(params.stone));
        }
    }

    #[test]
    fn test_min_height_floor() {
        let mut g = grid(2, 20);
        let params = TerrainParams::default();
        let mut rng = DeterministicRng::new(1);
        let profile = rasterize(&mut g, &|_x: f64| 0.0, &params, &mut rng).unwrap();
        assert_eq!(profile.column(1).unwrap().surface_row, 17);
        assert_eq!(g.column(1)[17], Some(params.grass));
    }

    #[test]
    fn test_columns_visit_every_column_once() {
        let mut g = grid(40, 28);
        let params = TerrainParams::default();
        let profile = generate(&mut g, &params, 99).unwrap();
        let columns: Vec<u32> = profile.samples.iter().map(|s| s.column).collect();
        assert_eq!(columns, (0..40).collect::<Vec<_>>());
        for x in 0..40 {
            let grass = g.column(x).iter().filter(|t| **t == Some(params.grass)).count();
            assert_eq!(grass, 1, "column {} should have exactly one grass tile", x);
        }
    }

    #[test]
    fn test_sample_positions_scale_with_smoothness() {
        let mut g = grid(10, 10);
        let params = TerrainParams {
            smoothness: 4.0,
            ..TerrainParams::default()
        };
        let mut rng = DeterministicRng::new(3);
        let profile = rasterize(&mut g, &|x: f64| x / 100.0, &params, &mut rng).unwrap();
        assert_eq!(profile.samples[2].sample_x, 0.5);
        assert_eq!(profile.samples[8].sample_x, 2.0);
    }

    #[test]
    fn test_accumulated_sampling_stays_in_grid() {
        let mut g = grid(40, 28);
        let params = TerrainParams {
            sampling: Sampling::Accumulated,
            ..TerrainParams::default()
        };
        let profile = generate(&mut g, &params, 5).unwrap();
        assert!(!profile.samples.is_empty());
        assert!(profile.samples.iter().all(|s| s.column < 40));
        // Visited columns come in non-decreasing order.
        assert!(profile.samples.windows(2).all(|w| w[0].column <= w[1].column));
    }

    #[test]
    fn test_invalid_smoothness_rejected() {
        let mut g = grid(4, 4);
        for smoothness in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let params = TerrainParams {
                smoothness,
                ..TerrainParams::default()
            };
            assert!(generate(&mut g, &params, 1).is_err());
        }
    }

    #[test]
    fn test_surface_above_grid_is_clipped() {
        let mut g = grid(1, 5);
        let params = TerrainParams::default();
        let mut rng = DeterministicRng::new(1);
        // h = 13 > H = 5, so the surface row is -8 and the whole column is stone.
        let profile = rasterize(&mut g, &|_x: f64| 0.99, &params, &mut rng).unwrap();
        assert_eq!(profile.samples[0].surface_row, 5 - 13);
        assert!(g.column(0).iter().all(|t| *t == Some(params.stone)));
    }

    #[test]
    fn test_non_positive_height_writes_nothing() {
        let mut g = grid(1, 5);
        let params = TerrainParams {
            min_height: 0,
            ..TerrainParams::default()
        };
        let mut rng = DeterministicRng::new(1);
        rasterize(&mut g, &|_x: f64| -1.0, &params, &mut rng).unwrap();
        assert!(g.column(0).iter().all(Option::is_none));
    }

    #[test]
    fn test_same_seed_same_grid() {
        let params = TerrainParams::default();
        let mut a = grid(40, 28);
        let mut b = grid(40, 28);
        generate(&mut a, &params, 2024).unwrap();
        generate(&mut b, &params, 2024).unwrap();
        assert_eq!(a, b);
    }
}
