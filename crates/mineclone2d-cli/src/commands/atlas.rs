//! Atlas command implementation
//!
//! Loads an atlas image and prints its tile count and offset table.

use anyhow::{Context, Result};
use colored::Colorize;
use mineclone2d_core::{GridConfig, TileAtlas};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, AtlasOutput, AtlasResult, JsonError};

/// Run the atlas command
///
/// # Arguments
/// * `atlas_path` - Path to the atlas PNG
/// * `tile_size` - Tile edge in pixels (default: the standard 16px tile)
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(atlas_path: &str, tile_size: Option<u32>, json_output: bool) -> Result<ExitCode> {
    let tile_size = tile_size.unwrap_or(GridConfig::default().tile_size);
    let loaded = super::runtime()
        .and_then(|rt| super::load_atlas(&rt, Path::new(atlas_path), tile_size));

    if json_output {
        let (output, code) = match loaded {
            Ok(atlas) => (
                AtlasOutput {
                    success: true,
                    errors: Vec::new(),
                    result: Some(describe(atlas_path, &atlas)),
                },
                ExitCode::SUCCESS,
            ),
            Err(e) => (
                AtlasOutput {
                    success: false,
                    errors: vec![JsonError::new(error_codes::ATLAS_LOAD, format!("{:#}", e))],
                    result: None,
                },
                ExitCode::from(1),
            ),
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(code);
    }

    let atlas = loaded?;
    let info = describe(atlas_path, &atlas);
    println!("{} {}", "Atlas:".cyan().bold(), info.path);
    println!(
        "{} {}x{} px, {}px tiles, {} per row",
        "Image:".cyan().bold(),
        info.width,
        info.height,
        info.tile_size,
        info.columns
    );
    println!("{} {}", "Tiles:".cyan().bold(), info.tile_count);
    for (id, offset) in atlas.ids().zip(atlas.offsets()) {
        println!("  {} {:>3} -> ({}, {})", "->".green(), id, offset.x, offset.y);
    }

    Ok(ExitCode::SUCCESS)
}

fn describe(path: &str, atlas: &TileAtlas) -> AtlasResult {
    AtlasResult {
        path: path.to_string(),
        tile_size: atlas.tile_size(),
        width: atlas.image().width,
        height: atlas.image().height,
        columns: atlas.columns(),
        tile_count: atlas.len(),
        offsets: atlas.offsets().to_vec(),
    }
}
