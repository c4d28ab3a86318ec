// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Argument parsing.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{self, ConfigError, Overrides};
use crate::logging::Verbosity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Show,
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub overrides: Overrides,
    pub verbosity: Verbosity,
    pub no_color: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("unknown command or flag: {0}")]
    Unknown(String),
    #[error("{0} needs a value")]
    MissingValue(String),
    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for ArgError {
    fn from(err: ConfigError) -> Self {
        ArgError::Invalid(err.to_string())
    }
}

/// Parse everything after the program name.
pub fn parse(args: &[String]) -> Result<Cli, ArgError> {
    let mut command = None;
    let mut overrides = Overrides::default();
    let (mut verbose, mut quiet, mut no_color) = (false, false, false);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "run" if command.is_none() => command = Some(Command::Run),
            "show" if command.is_none() => command = Some(Command::Show),
            "help" | "--help" | "-h" => command = Some(Command::Help),
            "version" | "--version" | "-V" => command = Some(Command::Version),
            "-v" | "--verbose" => verbose = true,
            "-q" | "--quiet" => quiet = true,
            "--no-color" => no_color = true,
            "--scenario" | "-s" => {
                let value = iter
                    .next()
                    .ok_or_else(|| ArgError::MissingValue(arg.clone()))?;
                overrides.scenario = Some(PathBuf::from(value));
            }
            "--unit-ms" => {
                let value = iter
                    .next()
                    .ok_or_else(|| ArgError::MissingValue(arg.clone()))?;
                overrides.unit_ms = Some(config::parse_unit(arg, value)?);
            }
            other => return Err(ArgError::Unknown(other.to_string())),
        }
    }

    Ok(Cli {
        command: command.unwrap_or(Command::Run),
        overrides,
        verbosity: Verbosity::from_flags(verbose, quiet),
        no_color,
    })
}
