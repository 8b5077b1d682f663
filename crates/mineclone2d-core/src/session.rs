//! Sandbox session: selection, painting modes, terrain and save files.
//!
//! A [`Sandbox`] can only be built from a loaded [`TileAtlas`], so nothing
//! draws before the atlas and its offsets exist. Preference writes made by
//! the session are best-effort.

use log::{debug, warn};
use thiserror::Error;

use crate::atlas::{AtlasError, TileAtlas, TileId};
use crate::canvas::Canvas;
use crate::color::SKY;
use crate::grid::{render_grid, TileGrid, MAX_CANVAS_EDGE};
use crate::png::{decode_png, encode_canvas, PngConfig, PngError};
use crate::prefs::{self, keys, PrefsStore, Settings};
use crate::rng::DeterministicRng;
use crate::terrain::{self, TerrainError, TerrainParams, TerrainProfile};

/// Errors from sandbox operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Png(#[from] PngError),

    #[error("atlas tile size {atlas}px does not match configured tile size {grid}px")]
    TileSizeMismatch { atlas: u32, grid: u32 },

    #[error("a {x_tiles}x{y_tiles} grid of {tile_size}px tiles exceeds {max}px per side")]
    GridTooLarge {
        tile_size: u32,
        x_tiles: u32,
        y_tiles: u32,
        max: u32,
    },
}

/// Direction for stepping through the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// How a pointer action reached a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    /// Button pressed on the cell.
    Press,
    /// Pointer dragged onto the cell with the button held.
    Drag,
}

/// Interactive tile-painting session.
pub struct Sandbox<S: PrefsStore> {
    atlas: TileAtlas,
    settings: Settings,
    terrain: TerrainParams,
    grid: TileGrid,
    canvas: Canvas,
    store: S,
    rng: DeterministicRng,
    last_random_place: Option<(u32, u32)>,
    released_since_place: bool,
}

impl<S: PrefsStore> Sandbox<S> {
    /// Start a session over a ready atlas.
    ///
    /// A stored selection that the atlas does not contain is reset to tile 0.
    pub fn new(
        atlas: TileAtlas,
        mut settings: Settings,
        mut store: S,
        rng: DeterministicRng,
    ) -> Result<Self, SessionError> {
        if atlas.tile_size() != settings.grid.tile_size {
            return Err(SessionError::TileSizeMismatch {
                atlas: atlas.tile_size(),
                grid: settings.grid.tile_size,
            });
        }

        let (width, height) =
            settings
                .grid
                .checked_pixel_size()
                .ok_or(SessionError::GridTooLarge {
                    tile_size: settings.grid.tile_size,
                    x_tiles: settings.grid.x_tiles,
                    y_tiles: settings.grid.y_tiles,
                    max: MAX_CANVAS_EDGE,
                })?;

        if !atlas.contains(settings.selected_tile) {
            warn!(
                "stored tile {} is not in the {}-tile atlas, selecting tile 0",
                settings.selected_tile,
                atlas.len()
            );
            settings.selected_tile = TileId(0);
            prefs::persist(&mut store, keys::BLOCK_LAST_INDEX, "0");
        }

        let grid = TileGrid::new(settings.grid);
        let canvas = Canvas::new_sky(width, height);

        Ok(Self {
            atlas,
            settings,
            terrain: TerrainParams::default(),
            grid,
            canvas,
            store,
            rng,
            last_random_place: None,
            released_since_place: false,
        })
    }

    pub fn with_terrain(mut self, terrain: TerrainParams) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn atlas(&self) -> &TileAtlas {
        &self.atlas
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn terrain_params(&self) -> &TerrainParams {
        &self.terrain
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn selected(&self) -> TileId {
        self.settings.selected_tile
    }

    /// Image of the selected tile, for the selection preview.
    pub fn selected_tile_image(&self) -> Result<Canvas, SessionError> {
        Ok(self.atlas.tile_image(self.settings.selected_tile)?)
    }

    fn set_selected(&mut self, id: TileId) {
        self.settings.selected_tile = id;
        prefs::persist(&mut self.store, keys::BLOCK_LAST_INDEX, &id.to_string());
    }

    /// Select a tile by id.
    pub fn select(&mut self, id: TileId) -> Result<(), SessionError> {
        if !self.atlas.contains(id) {
            return Err(AtlasError::InvalidTileId {
                id,
                count: self.atlas.len(),
            }
            .into());
        }
        self.set_selected(id);
        Ok(())
    }

    /// Step the selection, wrapping at both ends.
    pub fn cycle(&mut self, direction: Direction) -> TileId {
        let last = self.atlas.len() as u32 - 1;
        let current = self.settings.selected_tile.0;
        let next = match direction {
            Direction::Next if current < last => current + 1,
            Direction::Next => 0,
            Direction::Previous if current > 0 => current - 1,
            Direction::Previous => last,
        };
        self.set_selected(TileId(next));
        TileId(next)
    }

    /// Select the tile under a pixel of the atlas image (tile chooser).
    pub fn select_from_chooser(&mut self, px: u32, py: u32) -> Result<TileId, SessionError> {
        let id = self.atlas.tile_at_pixel(px, py)?;
        self.set_selected(id);
        Ok(id)
    }

    fn persist_modes(&mut self) {
        prefs::persist_bool(&mut self.store, keys::RANDOM_MODE, self.settings.random_mode);
        prefs::persist_bool(&mut self.store, keys::PAINT_MODE, self.settings.paint_mode);
    }

    pub fn toggle_random_mode(&mut self) -> bool {
        self.settings.random_mode = !self.settings.random_mode;
        self.persist_modes();
        self.settings.random_mode
    }

    pub fn toggle_paint_mode(&mut self) -> bool {
        self.settings.paint_mode = !self.settings.paint_mode;
        self.persist_modes();
        self.settings.paint_mode
    }

    fn cell_at(&self, px: u32, py: u32) -> Option<(u32, u32)> {
        let (cx, cy) = self.settings.grid.pixel_to_cell(px, py);
        self.settings.grid.contains_cell(cx, cy).then_some((cx, cy))
    }

    /// Place the selected tile on the cell under a canvas pixel.
    ///
    /// Returns the cell written, or `None` when nothing was placed: outside
    /// the grid, a drag with paint mode off, or a repeat on the same cell in
    /// random mode before [`release`](Self::release).
    pub fn place(&mut self, px: u32, py: u32, stroke: Stroke) -> Result<Option<(u32, u32)>, SessionError> {
        if stroke == Stroke::Drag && !self.settings.paint_mode {
            return Ok(None);
        }
        let Some(cell) = self.cell_at(px, py) else {
            return Ok(None);
        };

        let random = self.settings.random_mode;
        let same_cell = self.last_random_place == Some(cell);
        if random && same_cell && !self.released_since_place {
            return Ok(None);
        }
        if random && stroke == Stroke::Press {
            self.released_since_place = false;
        }

        let tile = self.settings.selected_tile;
        let (x, y) = self.settings.grid.cell_to_pixel(cell.0, cell.1);
        self.atlas.draw_tile(&mut self.canvas, x, y, tile)?;
        self.grid.push(cell.0, cell.1, tile);
        debug!("placed tile {} at cell ({}, {})", tile, cell.0, cell.1);

        if random {
            self.last_random_place = Some(cell);
            let last = self.atlas.len() as u32 - 1;
            let next = TileId(self.rng.pick(0, last));
            self.set_selected(next);
        }

        Ok(Some(cell))
    }

    /// Clear the cell under a canvas pixel back to sky.
    pub fn erase(&mut self, px: u32, py: u32, stroke: Stroke) -> Option<(u32, u32)> {
        if stroke == Stroke::Drag && !self.settings.paint_mode {
            return None;
        }
        let cell = self.cell_at(px, py)?;
        let (x, y) = self.settings.grid.cell_to_pixel(cell.0, cell.1);
        let size = self.settings.grid.tile_size;
        self.canvas.fill_rect(x, y, size, size, SKY);
        self.grid.clear_cell(cell.0, cell.1);
        Some(cell)
    }

    /// Placement button released.
    pub fn release(&mut self) {
        self.released_since_place = true;
    }

    /// Clear the whole canvas.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.grid.clear();
    }

    /// Generate new terrain with a seed drawn from the session RNG.
    pub fn generate_terrain(&mut self) -> Result<TerrainProfile, SessionError> {
        let seed = self.rng.gen_u32();
        self.generate_terrain_with_seed(seed)
    }

    /// Replace the canvas with freshly generated terrain.
    ///
    /// On error the grid and canvas are left as they were.
    pub fn generate_terrain_with_seed(&mut self, seed: u32) -> Result<TerrainProfile, SessionError> {
        let mut grid = TileGrid::new(self.settings.grid);
        let profile = terrain::generate(&mut grid, &self.terrain, seed)?;
        let mut canvas = Canvas::new_sky(self.canvas.width, self.canvas.height);
        render_grid(&grid, &self.atlas, &mut canvas)?;
        self.grid = grid;
        self.canvas = canvas;
        debug!("generated terrain with seed {}", seed);
        Ok(profile)
    }

    /// Encode the canvas as PNG.
    pub fn save_png(&self, config: &PngConfig) -> Result<Vec<u8>, SessionError> {
        Ok(encode_canvas(&self.canvas, config)?)
    }

    /// Draw a saved PNG over a cleared canvas.
    ///
    /// The image is drawn at the origin as-is, without checking that it
    /// matches the grid. Saves carry pixels only, so the tile grid is reset.
    pub fn load_png(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let image = decode_png(bytes)?;
        self.load_canvas(&image);
        Ok(())
    }

    /// Draw an already decoded save over a cleared canvas.
    pub fn load_canvas(&mut self, image: &Canvas) {
        self.clear();
        self.canvas.draw_image(image, 0, 0);
    }

    /// True exactly once for a first-time user; the flag is then stored off.
    pub fn take_first_run(&mut self) -> bool {
        if !self.settings.first_timer {
            return false;
        }
        self.settings.first_timer = false;
        prefs::persist_bool(&mut self.store, keys::FIRST_TIMER, false);
        true
    }
}
