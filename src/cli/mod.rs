//! Command-line interface.
//!
//! `autocombine <machinefile> <inputfile> <step1> [step2 ...]`

pub mod commands;

use crate::core::config::ConfigOverrides;
use crate::core::error::{CombineError, CombineResult};
use crate::core::runtime::RunRequest;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Usage text printed when the command line is incomplete.
pub const USAGE: &str = "\
Automatically find the input parameters from a CitcomS input file and
combine the per-processor ASCII output of each timestep.

usage: autocombine machinefile inputfile step1 [step2 [...] ]

Run `autocombine --help` for options.";

/// autocombine - combine per-processor CitcomS output into one file per cap.
#[derive(Parser, Debug)]
#[command(name = "autocombine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine file listing the compute nodes of the run.
    pub machinefile: PathBuf,

    /// CitcomS input file of the run.
    pub inputfile: PathBuf,

    /// Timesteps to combine, in the order given.
    #[arg(required = true, allow_negative_numbers = true, value_parser = parse_timestep)]
    pub steps: Vec<u64>,

    /// Settings file (TOML).
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Directory receiving the combined files.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not write OpenDX .general headers.
    #[arg(long)]
    pub no_general: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Parse one timestep; negative integers get their own diagnostic.
fn parse_timestep(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(step) => Ok(step),
        Err(_) if value.parse::<i64>().is_ok() => {
            Err("timesteps must be non-negative".to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

impl Cli {
    /// The run described by the positional arguments.
    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            machinefile: self.machinefile.clone(),
            inputfile: self.inputfile.clone(),
            timesteps: self.steps.clone(),
        }
    }

    /// Settings overrides given as flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            log_level: self.log_level.clone(),
            output_dir: self.output_dir.clone(),
            no_general: self.no_general,
        }
    }
}

/// Result of reading the command line.
#[derive(Debug)]
pub enum Invocation {
    /// Arguments are complete.
    Run(Cli),
    /// Help or version text to print before exiting successfully.
    Print(String),
}

/// Parse the command line.
///
/// Missing positionals are a [`CombineError::Usage`]; any other rejected
/// argument, such as a timestep that is not an integer, is a
/// [`CombineError::InvalidArgument`].
pub fn parse_invocation<I, T>(args: I) -> CombineResult<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Print(err.to_string()))
            }
            ErrorKind::MissingRequiredArgument
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Err(CombineError::Usage),
            _ => {
                let rendered = err.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_string();
                Err(CombineError::InvalidArgument { message })
            }
        },
    }
}

/// Exit code for an error returned by a command.
///
/// Errors that are not a [`CombineError`] exit with 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CombineError>()
        .map(CombineError::exit_code)
        .unwrap_or(1)
}
