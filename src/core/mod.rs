//! Core run infrastructure.
//!
//! - [`params`] - CitcomS input-file parameters and defaults
//! - [`layout`] - Mesh and processor layout
//! - [`runtime`] - Run orchestration
//! - [`config`] - Tool settings
//! - [`error`] - Error types and exit codes

pub mod config;
pub mod error;
pub mod layout;
pub mod params;
pub mod runtime;
