//! mineclone2d sandbox core
//!
//! Headless core of a tile-painting sandbox: pick a tile from a sprite atlas,
//! paint or erase it on a grid canvas, generate terrain, and save or load the
//! canvas as PNG.
//!
//! # Features
//!
//! - **Value noise**: seeded 1D value noise with smoothstep interpolation
//! - **Terrain**: grass/dirt/stone column profiles carved from the noise
//! - **Tile grid**: pixel/cell addressing and stacked tile cells
//! - **Atlas**: row-major offset table with checked tile-id lookup
//! - **Canvas + PNG**: RGBA8 surface with alpha blits and reproducible PNG output
//! - **Preferences**: string key/value store with one-shot repair
//!
//! # Example
//!
//! ```no_run
//! use mineclone2d_core::{load_settings, loader, DeterministicRng, MemoryPrefsStore, Sandbox};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = MemoryPrefsStore::new();
//! let settings = load_settings(&mut store)?;
//! let atlas = loader::load_atlas("assets.png", settings.grid.tile_size).await?;
//!
//! let mut sandbox = Sandbox::new(atlas, settings, store, DeterministicRng::new(42))?;
//! sandbox.generate_terrain()?;
//! let png = sandbox.save_png(&Default::default())?;
//! std::fs::write("world.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Determinism
//!
//! Terrain depends only on its seed: the noise table and the dirt/stone band
//! draw from separate PCG32 streams derived from it, and PNG encoding uses
//! fixed settings, so equal seeds give byte-identical saves.

pub mod atlas;
pub mod canvas;
pub mod color;
pub mod grid;
pub mod loader;
pub mod noise;
pub mod png;
pub mod prefs;
pub mod rng;
pub mod session;
pub mod terrain;

// Re-export main types for convenience
pub use atlas::{AtlasError, AtlasOffset, TileAtlas, TileId};
pub use canvas::Canvas;
pub use color::{Rgba, SKY};
pub use grid::{draw_stack, render_grid, GridConfig, TileGrid, TileStack, MAX_CANVAS_EDGE};
pub use loader::LoadError;
pub use noise::{Noise1D, ValueNoise1D};
pub use self::png::{PngConfig, PngError};
pub use prefs::{
    load_settings, FilePrefsStore, MemoryPrefsStore, PrefsError, PrefsStore, Settings,
    SettingsError,
};
pub use rng::DeterministicRng;
pub use session::{Direction, Sandbox, SessionError, Stroke};
pub use terrain::{Sampling, TerrainError, TerrainParams, TerrainProfile};
