//! Generate command implementation
//!
//! Rasterizes a terrain profile with the atlas tiles and writes the canvas
//! as a PNG.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use log::info;
use mineclone2d_core::png::{hash_png, save_file_name};
use mineclone2d_core::{
    load_settings, DeterministicRng, PngConfig, Sampling, Sandbox, TerrainParams, TerrainProfile,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use super::json_output::{error_codes, GenerateOutput, GenerateResult, JsonError};

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub atlas: String,
    pub seed: Option<u32>,
    pub smoothness: Option<f64>,
    pub max_height: Option<u32>,
    pub min_height: Option<u32>,
    pub accumulated: bool,
    pub out: Option<String>,
    pub prefs: Option<String>,
}

impl GenerateOptions {
    /// Terrain parameters with the command-line overrides applied.
    pub fn terrain_params(&self) -> TerrainParams {
        let defaults = TerrainParams::default();
        TerrainParams {
            smoothness: self.smoothness.unwrap_or(defaults.smoothness),
            max_height: self.max_height.unwrap_or(defaults.max_height),
            min_height: self.min_height.unwrap_or(defaults.min_height),
            sampling: if self.accumulated {
                Sampling::Accumulated
            } else {
                Sampling::Columns
            },
            ..defaults
        }
    }
}

/// A finished generation run.
struct Generated {
    seed: u32,
    output: PathBuf,
    width: u32,
    height: u32,
    hash: String,
    profile: TerrainProfile,
}

/// A failure tagged with its stable JSON error code.
struct Failure {
    code: &'static str,
    error: anyhow::Error,
}

trait Tag<T> {
    fn tag(self, code: &'static str) -> std::result::Result<T, Failure>;
}

impl<T> Tag<T> for Result<T> {
    fn tag(self, code: &'static str) -> std::result::Result<T, Failure> {
        self.map_err(|error| Failure { code, error })
    }
}

/// Run the generate command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(options: &GenerateOptions, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(options)
    } else {
        run_human(options)
    }
}

fn run_human(options: &GenerateOptions) -> Result<ExitCode> {
    let start = Instant::now();
    println!("{} {}", "Atlas:".cyan().bold(), options.atlas);

    let generated = generate(options).map_err(|f| f.error)?;

    println!("{} {}", "Seed:".cyan().bold(), generated.seed);
    println!(
        "{} {} columns, surface rows {}",
        "Terrain:".cyan().bold(),
        generated.profile.samples.len(),
        surface_range(&generated.profile)
    );
    println!(
        "{} {} ({}x{})",
        "Wrote:".green().bold(),
        generated.output.display(),
        generated.width,
        generated.height
    );
    println!("  {} {}", "blake3:".dimmed(), generated.hash.dimmed());
    println!(
        "{} {:.2}s",
        "Done in".dimmed(),
        start.elapsed().as_secs_f64()
    );

    Ok(ExitCode::SUCCESS)
}

fn run_json(options: &GenerateOptions) -> Result<ExitCode> {
    let (output, code) = match generate(options) {
        Ok(generated) => (
            GenerateOutput {
                success: true,
                errors: Vec::new(),
                result: Some(GenerateResult {
                    seed: generated.seed,
                    sampling: options.terrain_params().sampling,
                    output: generated.output.display().to_string(),
                    width: generated.width,
                    height: generated.height,
                    hash: generated.hash,
                    columns: generated.profile.samples,
                }),
            },
            ExitCode::SUCCESS,
        ),
        Err(failure) => (
            GenerateOutput {
                success: false,
                errors: vec![JsonError::new(failure.code, format!("{:#}", failure.error))],
                result: None,
            },
            ExitCode::from(1),
        ),
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(code)
}

fn generate(options: &GenerateOptions) -> std::result::Result<Generated, Failure> {
    let mut store = super::open_store(options.prefs.as_deref());
    let settings = load_settings(&mut *store)
        .context("Failed to load preferences")
        .tag(error_codes::PREFS)?;

    let rt = super::runtime().tag(error_codes::ATLAS_LOAD)?;
    let atlas = super::load_atlas(&rt, Path::new(&options.atlas), settings.grid.tile_size)
        .tag(error_codes::ATLAS_LOAD)?;

    let seed = options
        .seed
        .unwrap_or_else(|| DeterministicRng::from_entropy().gen_u32());
    info!("generating terrain with seed {}", seed);

    let mut sandbox = Sandbox::new(atlas, settings, store, DeterministicRng::new(seed))
        .context("Failed to start session")
        .tag(error_codes::GENERATION)?
        .with_terrain(options.terrain_params());
    let profile = sandbox
        .generate_terrain_with_seed(seed)
        .context("Terrain generation failed")
        .tag(error_codes::GENERATION)?;

    let png = sandbox
        .save_png(&PngConfig::default())
        .context("Failed to encode PNG")
        .tag(error_codes::WRITE)?;
    let output = options
        .out
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(save_file_name(Utc::now())));
    fs::write(&output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))
        .tag(error_codes::WRITE)?;

    Ok(Generated {
        seed,
        output,
        width: sandbox.canvas().width,
        height: sandbox.canvas().height,
        hash: hash_png(&png),
        profile,
    })
}

fn surface_range(profile: &TerrainProfile) -> String {
    let rows = profile.samples.iter().map(|s| s.surface_row);
    match (rows.clone().min(), rows.max()) {
        (Some(lo), Some(hi)) => format!("{}..={}", lo, hi),
        _ => "(none)".to_string(),
    }
}
