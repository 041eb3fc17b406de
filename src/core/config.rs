//! Tool settings.
//!
//! Settings are loaded from an optional TOML file and then overridden by
//! command-line flags. They control where combined files go and which
//! per-processor fields are pasted together; the run parameters themselves
//! come from the CitcomS input file (see [`crate::core::params`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-processor fields, pasted column-wise in this order.
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            fields: default_fields(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the combined cap files.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Write an OpenDX `.general` header next to each cap file.
    #[serde(default = "default_write_general")]
    pub write_general: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_general: default_write_general(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// When unset, `RUST_LOG` applies, then "info".
    #[serde(default)]
    pub level: Option<String>,
}

/// One per-processor output field.
///
/// A field file is `<datafile>.<name>.<rank>` or, for per-step fields,
/// `<datafile>.<name>.<rank>.<step>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in file names.
    pub name: String,

    /// Header lines to skip before the data rows.
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Whether a new file is written every output step.
    #[serde(default = "default_per_step")]
    pub per_step: bool,

    /// Columns of a data row, used to describe the combined file.
    #[serde(default)]
    pub components: Vec<Component>,
}

/// A group of columns within a field row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component name (e.g. "velocity").
    pub name: String,
    /// Number of columns; 1 is a scalar.
    #[serde(default = "default_component_width")]
    pub width: usize,
}

impl FieldSpec {
    /// Create a field description.
    pub fn new(name: impl Into<String>, header_lines: usize, per_step: bool) -> Self {
        Self {
            name: name.into(),
            header_lines,
            per_step,
            components: Vec::new(),
        }
    }

    /// Add a component.
    pub fn with_component(mut self, name: impl Into<String>, width: usize) -> Self {
        self.components.push(Component {
            name: name.into(),
            width,
        });
        self
    }

    /// File name of this field for `rank` at `step`.
    pub fn file_name(&self, datafile: &str, rank: usize, step: u64) -> String {
        if self.per_step {
            format!("{}.{}.{}.{}", datafile, self.name, rank, step)
        } else {
            format!("{}.{}.{}", datafile, self.name, rank)
        }
    }
}

// Default value functions

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_write_general() -> bool {
    true
}

fn default_header_lines() -> usize {
    1
}

fn default_per_step() -> bool {
    true
}

fn default_component_width() -> usize {
    1
}

/// Fields written by a CitcomS ASCII run.
pub fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("coord", 1, false).with_component("location", 3),
        FieldSpec::new("velo", 2, true)
            .with_component("velocity", 3)
            .with_component("temperature", 1),
        FieldSpec::new("visc", 1, true).with_component("viscosity", 1),
    ]
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "failed to parse settings file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "failed to parse settings")?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply CLI overrides to the settings.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(ref level) = overrides.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(ref dir) = overrides.output_dir {
            self.output.dir = dir.clone();
        }
        if overrides.no_general {
            self.output.write_general = false;
        }
        self.validate_logging()
    }

    /// Validate settings consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_logging()?;
        self.validate_fields()?;
        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        if let Some(ref level) = self.logging.level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                anyhow::bail!(
                    "logging.level must be one of {:?}, got: {}",
                    LOG_LEVELS,
                    level
                );
            }
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        if self.fields.is_empty() {
            anyhow::bail!("at least one field must be configured");
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                anyhow::bail!("fields.name must not be empty");
            }
            if !seen.insert(field.name.as_str()) {
                anyhow::bail!("field {} is configured twice", field.name);
            }
            if let Some(component) = field.components.iter().find(|c| c.width == 0) {
                anyhow::bail!(
                    "field {}: component {} must have width > 0",
                    field.name,
                    component.name
                );
            }
        }
        Ok(())
    }
}

/// CLI override options that can be applied to the settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override log level.
    pub log_level: Option<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Disable OpenDX headers.
    pub no_general: bool,
}
