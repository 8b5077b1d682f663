//! mineclone2d CLI - Command-line front end for the tile sandbox
//!
//! Generates terrain, inspects atlases, manages preferences and runs
//! scripted painting sessions.

use clap::Parser;
use std::process::ExitCode;

mod cli_args;

use cli_args::{Cli, Commands, PrefsCommands};
use mineclone2d_cli::commands;
use mineclone2d_cli::commands::generate::GenerateOptions;
use mineclone2d_cli::commands::run::RunOptions;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let prefs = cli.prefs;

    let result = match cli.command {
        Commands::Generate {
            atlas,
            seed,
            smoothness,
            max_height,
            min_height,
            accumulated,
            out,
            json,
        } => commands::generate::run(
            &GenerateOptions {
                atlas,
                seed,
                smoothness,
                max_height,
                min_height,
                accumulated,
                out,
                prefs,
            },
            json,
        ),
        Commands::Atlas {
            atlas,
            tile_size,
            json,
        } => commands::atlas::run(&atlas, tile_size, json),
        Commands::Prefs { command } => match command {
            PrefsCommands::Show { json } => commands::prefs::show(prefs.as_deref(), json),
            PrefsCommands::Reset => commands::prefs::reset(prefs.as_deref()),
            PrefsCommands::Set { key, value } => {
                commands::prefs::set(prefs.as_deref(), &key, &value)
            }
        },
        Commands::Run {
            atlas,
            script,
            seed,
        } => commands::run::run(&RunOptions {
            atlas,
            script,
            seed,
            prefs,
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
