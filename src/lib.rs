//! autocombine - combine per-processor CitcomS output.
//!
//! A parallel CitcomS run writes one set of ASCII files per processor and
//! output step. This crate reads the run's input file, works out how the
//! mesh was split across processors, finds the node each rank ran on from
//! the machine file, and merges the per-processor files of each requested
//! timestep into one file per cap.
//!
//! # Pipeline
//!
//! ```text
//! input file ──► parameters ──► format gate ──► layout
//!                                                  │
//! machine file ───────────────────────────────► node list
//!                                                  │
//!            for each timestep: paste ranks ──► assemble caps ──► write
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::params`] - Input-file parameters and defaults
//! - [`core::layout`] - Mesh and processor layout
//! - [`core::runtime`] - Run orchestration
//! - [`core::config`] - Tool settings
//! - [`core::error`] - Error types and exit codes
//!
//! ## Nodes
//! - [`nodes::machinefile`] - Machine-file parsing
//!
//! ## Combine
//! - [`combine::paste`] - Per-rank field pasting
//! - [`combine::cap`] - Cap assembly
//! - [`combine::general`] - OpenDX headers
//!
//! ## CLI
//! - [`cli::commands`] - CLI command implementations

// Core infrastructure
pub mod core;

// Node resolution
pub mod nodes;

// Combining
pub mod combine;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::{config, error, layout, params, runtime};
