//! Preferences command implementation
//!
//! Shows, resets and edits the stored sandbox preferences.

use anyhow::{Context, Result};
use colored::Colorize;
use mineclone2d_core::prefs::{keys, read_settings, reset_settings, set_preference};
use mineclone2d_core::{FilePrefsStore, PrefsStore};
use std::path::PathBuf;
use std::process::ExitCode;

use super::json_output::PrefsOutput;

fn store_path(prefs_path: Option<&str>) -> Option<PathBuf> {
    prefs_path
        .map(PathBuf::from)
        .or_else(FilePrefsStore::default_path)
}

/// Print every stored preference.
///
/// Nothing is repaired here; invalid values are reported and left as-is.
pub fn show(prefs_path: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let store = super::open_store(prefs_path);
    let values = store.entries().context("Failed to read preferences")?;
    let path = store_path(prefs_path);

    if json_output {
        let output = PrefsOutput {
            path: path.map(|p| p.display().to_string()),
            values,
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    match &path {
        Some(p) => println!("{} {}", "Preferences:".cyan().bold(), p.display()),
        None => println!("{} (in memory)", "Preferences:".cyan().bold()),
    }
    for key in keys::ALL {
        match values.get(key) {
            Some(value) => println!("  {:<18} {}", key, value),
            None => println!("  {:<18} {}", key, "(unset)".dimmed()),
        }
    }

    match read_settings(&*store) {
        Ok(_) => println!("{}", "All preferences valid".green()),
        Err(e) => println!(
            "{} {} (defaults are restored on the next run)",
            "!!".yellow(),
            e
        ),
    }

    Ok(ExitCode::SUCCESS)
}

/// Reset every preference to its default.
pub fn reset(prefs_path: Option<&str>) -> Result<ExitCode> {
    let mut store = super::open_store(prefs_path);
    let defaults = reset_settings(&mut *store).context("Failed to reset preferences")?;
    println!(
        "{} grid {}x{} of {}px tiles",
        "Preferences reset:".green().bold(),
        defaults.grid.x_tiles,
        defaults.grid.y_tiles,
        defaults.grid.tile_size
    );
    Ok(ExitCode::SUCCESS)
}

/// Store a single preference after validating it.
pub fn set(prefs_path: Option<&str>, key: &str, value: &str) -> Result<ExitCode> {
    let mut store = super::open_store(prefs_path);
    set_preference(&mut *store, key, value)
        .with_context(|| format!("Failed to set preference '{}'", key))?;
    println!("{} {} = {}", "Set".green().bold(), key, value.trim());
    Ok(ExitCode::SUCCESS)
}
