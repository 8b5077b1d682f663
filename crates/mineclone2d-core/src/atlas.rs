//! Sprite atlas: the tile sheet and its offset table.
//!
//! Tiles are laid out row-major in `tile_size` steps; a tile id is the index
//! of its offset in that scan. A `TileAtlas` is immutable: changing the tile
//! size or image means building a new one, so ids and offsets never drift
//! apart.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::Canvas;

/// Identifier of a tile within the atlas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TileId {
    fn from(id: u32) -> Self {
        TileId(id)
    }
}

/// Top-left pixel of a tile inside the atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasOffset {
    pub x: u32,
    pub y: u32,
}

/// Errors from atlas construction and lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    /// Tile size of zero.
    #[error("tile size must be non-zero")]
    ZeroTileSize,

    /// Image dimensions are not multiples of the tile size.
    #[error("atlas {width}x{height} is not a multiple of tile size {tile_size}")]
    Misaligned {
        width: u32,
        height: u32,
        tile_size: u32,
    },

    /// Image contains no tiles.
    #[error("atlas contains no tiles")]
    Empty,

    /// Lookup of an id past the end of the offset table, usually a stale id
    /// kept across an atlas swap.
    #[error("invalid tile id {id}: atlas has {count} tiles")]
    InvalidTileId { id: TileId, count: usize },
}

/// Compute the row-major offset table for an image of the given size.
pub fn compute_offsets(width: u32, height: u32, tile_size: u32) -> Vec<AtlasOffset> {
    if tile_size == 0 {
        return Vec::new();
    }
    let mut offsets = Vec::new();
    for y in (0..height).step_by(tile_size as usize) {
        for x in (0..width).step_by(tile_size as usize) {
            offsets.push(AtlasOffset { x, y });
        }
    }
    offsets
}

/// A decoded atlas image with its offset table.
#[derive(Debug, Clone)]
pub struct TileAtlas {
    image: Canvas,
    tile_size: u32,
    offsets: Vec<AtlasOffset>,
}

impl TileAtlas {
    /// Build an atlas, validating that the image splits evenly into tiles.
    pub fn new(image: Canvas, tile_size: u32) -> Result<Self, AtlasError> {
        if tile_size == 0 {
            return Err(AtlasError::ZeroTileSize);
        }
        if image.width % tile_size != 0 || image.height % tile_size != 0 {
            return Err(AtlasError::Misaligned {
                width: image.width,
                height: image.height,
                tile_size,
            });
        }

        let offsets = compute_offsets(image.width, image.height, tile_size);
        if offsets.is_empty() {
            return Err(AtlasError::Empty);
        }

        debug!(
            "atlas {}x{} split into {} tiles of {}px",
            image.width,
            image.height,
            offsets.len(),
            tile_size
        );

        Ok(Self {
            image,
            tile_size,
            offsets,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn image(&self) -> &Canvas {
        &self.image
    }

    /// Number of tiles in the atlas.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Tiles per atlas row.
    pub fn columns(&self) -> u32 {
        self.image.width / self.tile_size
    }

    pub fn offsets(&self) -> &[AtlasOffset] {
        &self.offsets
    }

    /// Iterator over every valid tile id.
    pub fn ids(&self) -> impl Iterator<Item = TileId> {
        (0..self.offsets.len() as u32).map(TileId)
    }

    pub fn contains(&self, id: TileId) -> bool {
        id.index() < self.offsets.len()
    }

    /// Look up the atlas offset of a tile.
    pub fn offset(&self, id: TileId) -> Result<AtlasOffset, AtlasError> {
        self.offsets
            .get(id.index())
            .copied()
            .ok_or(AtlasError::InvalidTileId {
                id,
                count: self.offsets.len(),
            })
    }

    /// Tile under an atlas pixel, as picked in the tile chooser.
    pub fn tile_at_pixel(&self, px: u32, py: u32) -> Result<TileId, AtlasError> {
        let col = px / self.tile_size;
        let row = py / self.tile_size;
        let id = TileId(row.saturating_mul(self.columns()).saturating_add(col));
        if col >= self.columns() || !self.contains(id) {
            return Err(AtlasError::InvalidTileId {
                id,
                count: self.offsets.len(),
            });
        }
        Ok(id)
    }

    /// Copy one tile out as its own canvas.
    pub fn tile_image(&self, id: TileId) -> Result<Canvas, AtlasError> {
        let off = self.offset(id)?;
        Ok(self
            .image
            .crop(off.x, off.y, self.tile_size, self.tile_size))
    }

    /// Composite one tile onto `canvas` with its top-left at (`x`, `y`).
    pub fn draw_tile(&self, canvas: &mut Canvas, x: u32, y: u32, id: TileId) -> Result<(), AtlasError> {
        let off = self.offset(id)?;
        canvas.blit(
            &self.image,
            off.x,
            off.y,
            self.tile_size,
            self.tile_size,
            x,
            y,
        );
        Ok(())
    }
}
