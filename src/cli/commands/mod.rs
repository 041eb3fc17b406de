//! CLI command implementations.

mod combine;

pub use combine::{load_config, run_combine};
