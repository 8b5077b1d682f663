//! Tile grid: cell addressing, stacked tile cells and rendering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::{AtlasError, TileAtlas, TileId};
use crate::canvas::Canvas;

/// Largest canvas edge, in pixels, a grid may span.
pub const MAX_CANVAS_EDGE: u32 = 16384;

/// Immutable grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
    /// Number of tile columns.
    pub x_tiles: u32,
    /// Number of tile rows.
    pub y_tiles: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            x_tiles: 40,
            y_tiles: 28,
        }
    }
}

impl GridConfig {
    pub fn new(tile_size: u32, x_tiles: u32, y_tiles: u32) -> Self {
        Self {
            tile_size,
            x_tiles,
            y_tiles,
        }
    }

    /// Canvas width in pixels, saturating on overflow.
    pub fn pixel_width(&self) -> u32 {
        self.tile_size.saturating_mul(self.x_tiles)
    }

    /// Canvas height in pixels, saturating on overflow.
    pub fn pixel_height(&self) -> u32 {
        self.tile_size.saturating_mul(self.y_tiles)
    }

    /// Canvas size in pixels, or `None` when either edge is zero or larger
    /// than [`MAX_CANVAS_EDGE`].
    pub fn checked_pixel_size(&self) -> Option<(u32, u32)> {
        let edge = |tiles: u32| {
            self.tile_size
                .checked_mul(tiles)
                .filter(|px| (1..=MAX_CANVAS_EDGE).contains(px))
        };
        Some((edge(self.x_tiles)?, edge(self.y_tiles)?))
    }

    /// Cell containing a pixel.
    pub fn pixel_to_cell(&self, px: u32, py: u32) -> (u32, u32) {
        (px / self.tile_size, py / self.tile_size)
    }

    /// Top-left pixel of a cell.
    pub fn cell_to_pixel(&self, cx: u32, cy: u32) -> (u32, u32) {
        (cx * self.tile_size, cy * self.tile_size)
    }

    /// Snap a pixel to the origin of its cell.
    pub fn snap(&self, px: u32, py: u32) -> (u32, u32) {
        let (cx, cy) = self.pixel_to_cell(px, py);
        self.cell_to_pixel(cx, cy)
    }

    pub fn contains_cell(&self, cx: u32, cy: u32) -> bool {
        cx < self.x_tiles && cy < self.y_tiles
    }
}

/// Error parsing a tile stack such as `"1,3"`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid tile stack '{0}'")]
pub struct ParseStackError(pub String);

/// Tile ids drawn bottom to top into one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct TileStack(Vec<TileId>);

impl TileStack {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(id: TileId) -> Self {
        Self(vec![id])
    }

    pub fn push(&mut self, id: TileId) {
        self.0.push(id);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn layers(&self) -> &[TileId] {
        &self.0
    }

    /// Topmost layer, if any.
    pub fn top(&self) -> Option<TileId> {
        self.0.last().copied()
    }
}

impl From<Vec<TileId>> for TileStack {
    fn from(layers: Vec<TileId>) -> Self {
        Self(layers)
    }
}

impl fmt::Display for TileStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl FromStr for TileStack {
    type Err = ParseStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| part.trim().parse::<u32>().map(TileId))
            .collect::<Result<Vec<_>, _>>()
            .map(TileStack)
            .map_err(|_| ParseStackError(s.to_string()))
    }
}

/// Grid of tile stacks, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    config: GridConfig,
    cells: Vec<TileStack>,
}

impl TileGrid {
    /// Create an empty grid.
    pub fn new(config: GridConfig) -> Self {
        let size = config.x_tiles as usize * config.y_tiles as usize;
        Self {
            config,
            cells: vec![TileStack::new(); size],
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.x_tiles
    }

    pub fn height(&self) -> u32 {
        self.config.y_tiles
    }

    #[inline]
    fn index(&self, cx: u32, cy: u32) -> Option<usize> {
        self.config
            .contains_cell(cx, cy)
            .then(|| cy as usize * self.config.x_tiles as usize + cx as usize)
    }

    /// Stack at a cell, `None` outside the grid.
    pub fn get(&self, cx: u32, cy: u32) -> Option<&TileStack> {
        self.index(cx, cy).map(|i| &self.cells[i])
    }

    /// Replace the stack at a cell. Out-of-grid writes are ignored and
    /// reported as `false`.
    pub fn set(&mut self, cx: u32, cy: u32, stack: TileStack) -> bool {
        match self.index(cx, cy) {
            Some(i) => {
                self.cells[i] = stack;
                true
            }
            None => false,
        }
    }

    /// Add a layer on top of a cell's stack.
    pub fn push(&mut self, cx: u32, cy: u32, id: TileId) -> bool {
        match self.index(cx, cy) {
            Some(i) => {
                self.cells[i].push(id);
                true
            }
            None => false,
        }
    }

    /// Empty one cell.
    pub fn clear_cell(&mut self, cx: u32, cy: u32) -> bool {
        self.set(cx, cy, TileStack::new())
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = TileStack::new();
        }
    }

    /// Iterate non-empty cells as `(cx, cy, stack)`.
    pub fn occupied(&self) -> impl Iterator<Item = (u32, u32, &TileStack)> {
        let w = self.config.x_tiles.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(move |(i, s)| (i as u32 % w, i as u32 / w, s))
    }

    /// Tile id column from top to bottom, using each cell's top layer.
    pub fn column(&self, cx: u32) -> Vec<Option<TileId>> {
        (0..self.config.y_tiles)
            .map(|cy| self.get(cx, cy).and_then(TileStack::top))
            .collect()
    }
}

/// Composite every layer of `stack` at pixel (`x`, `y`), in order.
///
/// Stops at the first invalid id; layers before it are already drawn.
pub fn draw_stack(
    canvas: &mut Canvas,
    atlas: &TileAtlas,
    x: u32,
    y: u32,
    stack: &TileStack,
) -> Result<(), AtlasError> {
    for &id in stack.layers() {
        atlas.draw_tile(canvas, x, y, id)?;
    }
    Ok(())
}

/// Clear `canvas` to sky and draw every occupied cell of `grid`.
pub fn render_grid(grid: &TileGrid, atlas: &TileAtlas, canvas: &mut Canvas) -> Result<(), AtlasError> {
    canvas.clear();
    for (cx, cy, stack) in grid.occupied() {
        let (x, y) = grid.config().cell_to_pixel(cx, cy);
        draw_stack(canvas, atlas, x, y, stack)?;
    }
    Ok(())
}
