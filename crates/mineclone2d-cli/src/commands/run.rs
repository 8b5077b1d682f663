//! Run command implementation
//!
//! Drives a sandbox session from a script of commands, one per line, read
//! from a file or stdin. Each mouse and keyboard action of the sandbox maps to
//! a script command (see [`HELP`]).

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use log::debug;
use mineclone2d_core::png::save_file_name;
use mineclone2d_core::{
    load_settings, loader, DeterministicRng, Direction, PngConfig, PrefsStore, Sandbox, Stroke,
    TileId,
};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::script::{parse_script, ScriptCommand, HELP};

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub atlas: String,
    pub script: Option<String>,
    pub seed: Option<u32>,
    pub prefs: Option<String>,
}

/// What a script command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Placed(Option<(u32, u32)>),
    Erased(Option<(u32, u32)>),
    Released,
    Selected(TileId),
    RandomMode(bool),
    PaintMode(bool),
    Cleared,
    Generated { columns: usize },
    Saved(PathBuf),
    Loaded(PathBuf),
    Help,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn on_off(on: bool) -> &'static str {
            if on {
                "on"
            } else {
                "off"
            }
        }
        match self {
            Outcome::Placed(Some((x, y))) => write!(f, "placed at cell ({}, {})", x, y),
            Outcome::Placed(None) => f.write_str("nothing placed"),
            Outcome::Erased(Some((x, y))) => write!(f, "erased cell ({}, {})", x, y),
            Outcome::Erased(None) => f.write_str("nothing erased"),
            Outcome::Released => f.write_str("released"),
            Outcome::Selected(id) => write!(f, "selected tile {}", id),
            Outcome::RandomMode(on) => write!(f, "random mode {}", on_off(*on)),
            Outcome::PaintMode(on) => write!(f, "paint mode {}", on_off(*on)),
            Outcome::Cleared => f.write_str("canvas cleared"),
            Outcome::Generated { columns } => write!(f, "generated {} columns", columns),
            Outcome::Saved(path) => write!(f, "saved {}", path.display()),
            Outcome::Loaded(path) => write!(f, "loaded {}", path.display()),
            Outcome::Help => f.write_str(HELP),
        }
    }
}

/// A sandbox plus the runtime its file loads run on.
pub struct ScriptSession<S: PrefsStore> {
    sandbox: Sandbox<S>,
    rt: tokio::runtime::Runtime,
}

impl<S: PrefsStore> ScriptSession<S> {
    pub fn new(sandbox: Sandbox<S>, rt: tokio::runtime::Runtime) -> Self {
        Self { sandbox, rt }
    }

    pub fn sandbox(&self) -> &Sandbox<S> {
        &self.sandbox
    }

    pub fn sandbox_mut(&mut self) -> &mut Sandbox<S> {
        &mut self.sandbox
    }

    /// Apply one command to the session.
    pub fn execute(&mut self, command: &ScriptCommand) -> Result<Outcome> {
        let sb = &mut self.sandbox;
        let outcome = match *command {
            ScriptCommand::Place { x, y } => Outcome::Placed(sb.place(x, y, Stroke::Press)?),
            ScriptCommand::DragPlace { x, y } => Outcome::Placed(sb.place(x, y, Stroke::Drag)?),
            ScriptCommand::Erase { x, y } => Outcome::Erased(sb.erase(x, y, Stroke::Press)),
            ScriptCommand::DragErase { x, y } => Outcome::Erased(sb.erase(x, y, Stroke::Drag)),
            ScriptCommand::Release => {
                sb.release();
                Outcome::Released
            }
            ScriptCommand::Select(id) => {
                sb.select(TileId(id))?;
                Outcome::Selected(TileId(id))
            }
            ScriptCommand::Next => Outcome::Selected(sb.cycle(Direction::Next)),
            ScriptCommand::Prev => Outcome::Selected(sb.cycle(Direction::Previous)),
            ScriptCommand::Choose { x, y } => Outcome::Selected(sb.select_from_chooser(x, y)?),
            ScriptCommand::Random => Outcome::RandomMode(sb.toggle_random_mode()),
            ScriptCommand::Paint => Outcome::PaintMode(sb.toggle_paint_mode()),
            ScriptCommand::Clear => {
                sb.clear();
                Outcome::Cleared
            }
            ScriptCommand::Generate { seed } => {
                let profile = match seed {
                    Some(seed) => sb.generate_terrain_with_seed(seed)?,
                    None => sb.generate_terrain()?,
                };
                Outcome::Generated {
                    columns: profile.samples.len(),
                }
            }
            ScriptCommand::Save(ref path) => {
                let path = path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(save_file_name(Utc::now())));
                let png = sb.save_png(&PngConfig::default())?;
                fs::write(&path, png)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Outcome::Saved(path)
            }
            ScriptCommand::Load(ref path) => {
                let image = self
                    .rt
                    .block_on(loader::load_save(path))
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                sb.load_canvas(&image);
                Outcome::Loaded(path.clone())
            }
            ScriptCommand::Help => Outcome::Help,
        };
        Ok(outcome)
    }
}

fn read_script(script: Option<&str>) -> Result<String> {
    match script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path)),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            Ok(text)
        }
    }
}

/// Run the run command
///
/// The whole script is parsed before anything executes. A command that fails
/// at run time is reported and the script continues.
///
/// # Returns
/// Exit code: 0 if every command succeeded, 1 otherwise
pub fn run(options: &RunOptions) -> Result<ExitCode> {
    let text = read_script(options.script.as_deref())?;
    let commands = parse_script(&text)?;

    let mut store = super::open_store(options.prefs.as_deref());
    let settings = load_settings(&mut *store).context("Failed to load preferences")?;

    let rt = super::runtime()?;
    let atlas = super::load_atlas(&rt, Path::new(&options.atlas), settings.grid.tile_size)?;
    println!(
        "{} {} ({} tiles)",
        "Atlas:".cyan().bold(),
        options.atlas,
        atlas.len()
    );

    let rng = match options.seed {
        Some(seed) => DeterministicRng::new(seed),
        None => DeterministicRng::from_entropy(),
    };
    let sandbox = Sandbox::new(atlas, settings, store, rng).context("Failed to start session")?;
    let mut session = ScriptSession::new(sandbox, rt);

    if session.sandbox_mut().take_first_run() {
        println!("{}", "Welcome! Here is what you can do:".bold());
        println!("{}", HELP);
    }

    let mut failures = 0usize;
    for (line, command) in &commands {
        debug!("line {}: {}", line, command);
        match session.execute(command) {
            Ok(Outcome::Help) => println!("{}", HELP),
            Ok(outcome) => println!("  {} {}", "->".green(), outcome),
            Err(e) => {
                failures += 1;
                println!("  {} line {}: {}: {:#}", "!!".red(), line, command, e);
            }
        }
    }

    if failures == 0 {
        println!("{} {} commands", "Done:".green().bold(), commands.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} {} of {} commands failed",
            "Done:".yellow().bold(),
            failures,
            commands.len()
        );
        Ok(ExitCode::from(1))
    }
}
