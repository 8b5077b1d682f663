//! CLI argument definitions for the mineclone2d command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// mineclone2d - Tile Painting Sandbox
#[derive(Parser)]
#[command(name = "mineclone2d")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Preferences file (default: <config dir>/mineclone2d/prefs.json)
    #[arg(long, global = true)]
    pub prefs: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate terrain with the atlas tiles and save it as PNG
    Generate {
        /// Path to the atlas PNG
        #[arg(short, long)]
        atlas: String,

        /// Terrain seed (default: random)
        #[arg(short, long)]
        seed: Option<u32>,

        /// Columns per unit of noise; higher is flatter
        #[arg(long)]
        smoothness: Option<f64>,

        /// Surface height in tiles for a noise value of 1
        #[arg(long)]
        max_height: Option<u32>,

        /// Minimum surface height in tiles
        #[arg(long)]
        min_height: Option<u32>,

        /// Use accumulated float stepping instead of one sample per column
        #[arg(long)]
        accumulated: bool,

        /// Output PNG path (default: timestamped file name)
        #[arg(short, long)]
        out: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show the tile count and offsets of an atlas
    Atlas {
        /// Path to the atlas PNG
        #[arg(short, long)]
        atlas: String,

        /// Tile edge in pixels (default: 16)
        #[arg(short, long)]
        tile_size: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Manage stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Run a scripted sandbox session
    Run {
        /// Path to the atlas PNG
        #[arg(short, long)]
        atlas: String,

        /// Script file, one command per line (default: stdin)
        #[arg(long)]
        script: Option<String>,

        /// Seed for random tile selection and terrain (default: random)
        #[arg(short, long)]
        seed: Option<u32>,
    },
}

#[derive(Subcommand)]
pub(crate) enum PrefsCommands {
    /// Print every stored preference
    Show {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
    /// Reset preferences to defaults
    Reset,
    /// Set one preference
    Set {
        /// Preference key (e.g. tile_size, random_mode)
        key: String,
        /// New value
        value: String,
    },
}
