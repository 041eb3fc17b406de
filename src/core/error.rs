//! Error types and exit-code mapping.
//!
//! Every failure of a run is a [`CombineError`]. The CLI translates the error
//! into a diagnostic and a process exit code via [`CombineError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Common autocombine error conditions.
#[derive(Debug, Error)]
pub enum CombineError {
    /// Fewer positional arguments than the command requires.
    #[error("usage: autocombine <machinefile> <inputfile> <step1> [step2 ...]")]
    Usage,

    /// A command-line argument could not be parsed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The run was written in an output format that cannot be combined.
    #[error("don't know how to combine the output (output_format={format})")]
    UnsupportedFormat { format: String },

    /// Parameter absent from both the input file and the defaults.
    #[error("missing parameter: {name}")]
    MissingParameter { name: String },

    /// Parameter value cannot be read as the requested type.
    #[error("parameter {name}={value} is not a valid {expected}")]
    TypeMismatch {
        name: String,
        value: String,
        expected: &'static str,
    },

    /// Parameter has the right type but an unusable value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Global mesh cannot be split evenly across the processor grid.
    #[error(
        "invalid mesh: {axis} has {nodes} nodes, which cannot be split across {procs} processors"
    )]
    InvalidMesh {
        axis: &'static str,
        nodes: usize,
        procs: usize,
    },

    /// Input file could not be read.
    #[error("failed to read input file {}: {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Machine file could not be read.
    #[error("failed to read machine file {}: {source}", .path.display())]
    MachineFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Machine file entry is malformed.
    #[error("{}:{line}: {message}", .path.display())]
    MachineFileSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Machine file lists fewer nodes than the run used.
    #[error("machine file {} lists {available} nodes, {required} required", .path.display())]
    InsufficientNodes {
        path: PathBuf,
        available: usize,
        required: usize,
    },

    /// Node list does not hold one node per rank.
    #[error("node list holds {actual} nodes, run has {expected} ranks")]
    NodeCountMismatch { expected: usize, actual: usize },

    /// Per-processor data file could not be read.
    #[error("failed to read data file {}: {source}", .path.display())]
    DataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fields of one rank disagree on their number of data lines.
    #[error("rank {rank}: field {field} has {actual} lines, expected {expected}")]
    FieldLengthMismatch {
        rank: usize,
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A rank supplied a different number of rows than its local mesh holds.
    #[error("rank {rank}: got {actual} rows, local mesh holds {expected}")]
    DataSize {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    /// Combined output could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error category, used to choose an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad invocation or rejected run.
    Invocation,
    /// Input parameters missing or malformed.
    Parameter,
    /// Node list could not be resolved.
    NodeResolution,
    /// Reading, merging or writing data failed.
    Combine,
}

impl CombineError {
    /// Create a TypeMismatch error.
    pub fn type_mismatch(
        name: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage | Self::InvalidArgument { .. } | Self::UnsupportedFormat { .. } => {
                ErrorKind::Invocation
            }
            Self::MissingParameter { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidParameter { .. }
            | Self::InvalidMesh { .. }
            | Self::InputRead { .. } => ErrorKind::Parameter,
            Self::MachineFileRead { .. }
            | Self::MachineFileSyntax { .. }
            | Self::InsufficientNodes { .. }
            | Self::NodeCountMismatch { .. } => ErrorKind::NodeResolution,
            Self::DataRead { .. }
            | Self::FieldLengthMismatch { .. }
            | Self::DataSize { .. }
            | Self::OutputWrite { .. } => ErrorKind::Combine,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Invocation => 1,
            ErrorKind::Parameter => 2,
            ErrorKind::NodeResolution => 3,
            ErrorKind::Combine => 4,
        }
    }
}

/// Result type using CombineError.
pub type CombineResult<T> = Result<T, CombineError>;
