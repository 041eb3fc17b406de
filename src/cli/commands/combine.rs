//! Combine command implementation.

use crate::cli::Cli;
use crate::combine::AsciiCombiner;
use crate::core::config::Config;
use crate::core::params::Defaults;
use crate::core::runtime::{RunSummary, Runtime};
use crate::nodes::MachineFileResolver;
use anyhow::{Context, Result};

/// Initialize tracing subscriber if the telemetry feature is enabled.
///
/// An explicit level wins over `RUST_LOG`; without either, "info" applies.
#[cfg(feature = "telemetry")]
fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // A subscriber may already be installed when running inside tests.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "telemetry"))]
fn init_tracing(_level: Option<&str>) {}

/// Load settings for `cli`: the settings file, then flag overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.settings.as_deref())?;
    config
        .apply_overrides(&cli.overrides())
        .context("invalid command-line override")?;
    Ok(config)
}

/// Run the combine command.
pub fn run_combine(cli: Cli) -> Result<RunSummary> {
    let config = load_config(&cli)?;
    init_tracing(config.logging.level.as_deref());

    let combiner = AsciiCombiner::from_config(&config);
    let mut runtime = Runtime::new(Defaults::citcoms(), MachineFileResolver, combiner);
    let summary = runtime.run(&cli.run_request())?;

    tracing::info!(
        total_nodes = summary.total_nodes,
        timesteps = summary.timesteps.len(),
        files = summary.outputs.len(),
        "combine finished"
    );
    Ok(summary)
}
