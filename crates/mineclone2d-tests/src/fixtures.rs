//! Test fixture utilities: a synthetic atlas on disk plus scratch paths.

use mineclone2d_core::png::{read_canvas, write_canvas};
use mineclone2d_core::{Canvas, FilePrefsStore, PngConfig, Rgba, TileAtlas};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Number of tiles in the fixture atlas (one row).
pub const ATLAS_TILES: u32 = 10;

/// Solid colour of each fixture tile. Tile 2 is only opaque in its top half.
pub const TILE_COLORS: [Rgba; ATLAS_TILES as usize] = [
    Rgba::rgb(60, 160, 40),   // 0 grass
    Rgba::rgb(120, 80, 40),   // 1 dirt
    Rgba::rgb(250, 250, 250), // 2 half-transparent overlay
    Rgba::rgb(110, 110, 110), // 3 stone
    Rgba::rgb(200, 180, 90),
    Rgba::rgb(30, 30, 200),
    Rgba::rgb(200, 30, 30),
    Rgba::rgb(30, 200, 200),
    Rgba::rgb(200, 30, 200),
    Rgba::rgb(10, 10, 10),
];

/// A temp directory holding a 160x16 atlas of 16px tiles.
pub struct AtlasFixture {
    pub root: TempDir,
    pub atlas_path: PathBuf,
    pub tile_size: u32,
}

impl AtlasFixture {
    /// Create the fixture with the standard 16px tiles.
    pub fn new() -> Self {
        Self::with_tile_size(16)
    }

    pub fn with_tile_size(tile_size: u32) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let atlas_path = root.path().join("assets.png");
        write_canvas(
            &Self::atlas_image(tile_size),
            &atlas_path,
            &PngConfig::default(),
        )
        .expect("Failed to write atlas");
        Self {
            root,
            atlas_path,
            tile_size,
        }
    }

    /// The atlas pixels, one solid tile per colour.
    pub fn atlas_image(tile_size: u32) -> Canvas {
        let mut image = Canvas::new(ATLAS_TILES * tile_size, tile_size, Rgba::transparent());
        for (i, color) in TILE_COLORS.iter().enumerate() {
            let h = if i == 2 { tile_size / 2 } else { tile_size };
            image.fill_rect(i as u32 * tile_size, 0, tile_size, h, *color);
        }
        image
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path of a scratch file inside the fixture.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Atlas path as a string, the form CLI options take.
    pub fn atlas_arg(&self) -> String {
        self.atlas_path.display().to_string()
    }

    /// Decode the atlas synchronously.
    pub fn atlas(&self) -> TileAtlas {
        let image = read_canvas(&self.atlas_path).expect("Failed to read atlas");
        TileAtlas::new(image, self.tile_size).expect("Invalid fixture atlas")
    }

    /// File-backed preferences inside the fixture.
    pub fn prefs_path(&self) -> PathBuf {
        self.file("prefs.json")
    }

    pub fn prefs_store(&self) -> FilePrefsStore {
        FilePrefsStore::new(self.prefs_path())
    }

    /// Write a session script and return its path.
    pub fn write_script(&self, name: &str, text: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, text).expect("Failed to write script");
        path
    }
}

impl Default for AtlasFixture {
    fn default() -> Self {
        Self::new()
    }
}
