//! Session script parsing.
//!
//! A script is line oriented: one command per line, arguments separated by
//! whitespace. Blank lines and lines starting with `#` are skipped.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Script parse errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    Arguments {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{command}': '{value}' is not a non-negative integer")]
    InvalidNumber { command: &'static str, value: String },

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ScriptError>,
    },
}

/// One sandbox action.
///
/// Coordinates are canvas pixels, except for `Choose`, which takes atlas
/// pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Place { x: u32, y: u32 },
    Erase { x: u32, y: u32 },
    DragPlace { x: u32, y: u32 },
    DragErase { x: u32, y: u32 },
    Release,
    Select(u32),
    Next,
    Prev,
    Choose { x: u32, y: u32 },
    Random,
    Paint,
    Clear,
    Generate { seed: Option<u32> },
    Save(Option<PathBuf>),
    Load(PathBuf),
    Help,
}

impl ScriptCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptCommand::Place { .. } => "place",
            ScriptCommand::Erase { .. } => "erase",
            ScriptCommand::DragPlace { .. } => "drag-place",
            ScriptCommand::DragErase { .. } => "drag-erase",
            ScriptCommand::Release => "release",
            ScriptCommand::Select(_) => "select",
            ScriptCommand::Next => "next",
            ScriptCommand::Prev => "prev",
            ScriptCommand::Choose { .. } => "choose",
            ScriptCommand::Random => "random",
            ScriptCommand::Paint => "paint",
            ScriptCommand::Clear => "clear",
            ScriptCommand::Generate { .. } => "generate",
            ScriptCommand::Save(_) => "save",
            ScriptCommand::Load(_) => "load",
            ScriptCommand::Help => "help",
        }
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Place { x, y }
            | ScriptCommand::Erase { x, y }
            | ScriptCommand::DragPlace { x, y }
            | ScriptCommand::DragErase { x, y }
            | ScriptCommand::Choose { x, y } => write!(f, "{} {} {}", self.name(), x, y),
            ScriptCommand::Select(id) => write!(f, "select {}", id),
            ScriptCommand::Generate { seed: Some(seed) } => write!(f, "generate {}", seed),
            ScriptCommand::Save(Some(path)) => write!(f, "save {}", path.display()),
            ScriptCommand::Load(path) => write!(f, "load {}", path.display()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Help text listing every command with the shortcut it stands in for.
pub const HELP: &str = "\
Commands (one per line, '#' starts a comment):
  place X Y        place the selected tile at canvas pixel (X, Y)      [right click]
  erase X Y        clear the cell at canvas pixel (X, Y)               [left click]
  drag-place X Y   place while dragging, only in paint mode            [right drag]
  drag-erase X Y   erase while dragging, only in paint mode            [left drag]
  release          end the current placement                           [mouse up]
  select N         select tile N
  next / prev      cycle the selected tile                             [arrows / wheel]
  choose X Y       select the tile under atlas pixel (X, Y)            [e, then click]
  random           toggle random mode                                  [r]
  paint            toggle paint mode                                   [p]
  clear            clear the canvas                                    [c]
  generate [SEED]  generate terrain                                    [g]
  save [PATH]      save the canvas as PNG                              [s]
  load PATH        load a saved PNG                                    [l / o]
  help             show this text                                      [h]";

fn number(command: &'static str, value: &str) -> Result<u32, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        command,
        value: value.to_string(),
    })
}

fn point(command: &'static str, args: &[&str]) -> Result<(u32, u32), ScriptError> {
    match args {
        [x, y] => Ok((number(command, x)?, number(command, y)?)),
        _ => Err(ScriptError::Arguments {
            command,
            expected: "two coordinates X Y",
        }),
    }
}

fn no_args(command: &'static str, args: &[&str]) -> Result<(), ScriptError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ScriptError::Arguments {
            command,
            expected: "no arguments",
        })
    }
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match name {
            "place" => {
                let (x, y) = point("place", &args)?;
                ScriptCommand::Place { x, y }
            }
            "erase" => {
                let (x, y) = point("erase", &args)?;
                ScriptCommand::Erase { x, y }
            }
            "drag-place" => {
                let (x, y) = point("drag-place", &args)?;
                ScriptCommand::DragPlace { x, y }
            }
            "drag-erase" => {
                let (x, y) = point("drag-erase", &args)?;
                ScriptCommand::DragErase { x, y }
            }
            "choose" => {
                let (x, y) = point("choose", &args)?;
                ScriptCommand::Choose { x, y }
            }
            "select" => match args.as_slice() {
                [id] => ScriptCommand::Select(number("select", id)?),
                _ => {
                    return Err(ScriptError::Arguments {
                        command: "select",
                        expected: "a tile id",
                    })
                }
            },
            "generate" => match args.as_slice() {
                [] => ScriptCommand::Generate { seed: None },
                [seed] => ScriptCommand::Generate {
                    seed: Some(number("generate", seed)?),
                },
                _ => {
                    return Err(ScriptError::Arguments {
                        command: "generate",
                        expected: "at most one seed",
                    })
                }
            },
            "save" => match args.as_slice() {
                [] => ScriptCommand::Save(None),
                [path] => ScriptCommand::Save(Some(PathBuf::from(path))),
                _ => {
                    return Err(ScriptError::Arguments {
                        command: "save",
                        expected: "at most one path",
                    })
                }
            },
            "load" => match args.as_slice() {
                [path] => ScriptCommand::Load(PathBuf::from(path)),
                _ => {
                    return Err(ScriptError::Arguments {
                        command: "load",
                        expected: "a path",
                    })
                }
            },
            "release" => no_args("release", &args).map(|_| ScriptCommand::Release)?,
            "next" => no_args("next", &args).map(|_| ScriptCommand::Next)?,
            "prev" => no_args("prev", &args).map(|_| ScriptCommand::Prev)?,
            "random" => no_args("random", &args).map(|_| ScriptCommand::Random)?,
            "paint" => no_args("paint", &args).map(|_| ScriptCommand::Paint)?,
            "clear" => no_args("clear", &args).map(|_| ScriptCommand::Clear)?,
            "help" => no_args("help", &args).map(|_| ScriptCommand::Help)?,
            other => return Err(ScriptError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Parse one script line; `None` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    line.parse().map(Some)
}

/// Parse a whole script, tagging errors with their 1-based line number.
pub fn parse_script(text: &str) -> Result<Vec<(usize, ScriptCommand)>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let parsed = parse_line(line).map_err(|source| ScriptError::AtLine {
            line: idx + 1,
            source: Box::new(source),
        })?;
        if let Some(command) = parsed {
            commands.push((idx + 1, command));
        }
    }
    Ok(commands)
}
