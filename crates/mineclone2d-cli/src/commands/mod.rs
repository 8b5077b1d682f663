//! CLI command implementations

pub mod atlas;
pub mod generate;
pub mod json_output;
pub mod prefs;
pub mod run;

use anyhow::{Context, Result};
use log::warn;
use mineclone2d_core::{loader, FilePrefsStore, MemoryPrefsStore, PrefsStore, TileAtlas};
use std::path::Path;

/// Open the preferences store: an explicit file, else the user config file.
///
/// Without a config directory the session keeps its preferences in memory.
pub(crate) fn open_store(prefs_path: Option<&str>) -> Box<dyn PrefsStore> {
    match prefs_path {
        Some(path) => Box::new(FilePrefsStore::new(path)),
        None => match FilePrefsStore::open_default() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("{}; preferences will not be saved", e);
                Box::new(MemoryPrefsStore::new())
            }
        },
    }
}

/// Runtime for the asynchronous loaders.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start async runtime")
}

/// Load an atlas and wait until it is ready.
pub(crate) fn load_atlas(
    rt: &tokio::runtime::Runtime,
    path: &Path,
    tile_size: u32,
) -> Result<TileAtlas> {
    rt.block_on(loader::load_atlas(path, tile_size))
        .with_context(|| format!("Failed to load atlas: {}", path.display()))
}
