//! autocombine - unified CLI entrypoint.
//!
//! Usage:
//!   autocombine <machinefile> <inputfile> <step1> [step2 ...]
//!   autocombine machines in.cfg 0 100 200 --output-dir combined
//!   autocombine machines in.cfg 500 --settings autocombine.toml

use autocombine::cli::commands::run_combine;
use autocombine::cli::{exit_code, parse_invocation, Invocation, USAGE};
use autocombine::error::CombineError;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match parse_invocation(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Print(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Err(CombineError::Usage) => {
            println!("{}", USAGE);
            return ExitCode::from(CombineError::Usage.exit_code());
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    match run_combine(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
