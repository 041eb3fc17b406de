//! Combining per-processor output into one file per cap.
//!
//! - [`paste`] - Joins the field files of one rank column-wise
//! - [`cap`] - Places rank rows at their global mesh position
//! - [`general`] - OpenDX headers for the combined files

pub mod cap;
pub mod general;
pub mod paste;

pub use cap::CapAssembly;

use crate::core::config::{Config, FieldSpec};
use crate::core::error::{CombineError, CombineResult};
use crate::core::layout::Layout;
use crate::nodes::NodeList;
use std::path::{Path, PathBuf};

/// Everything needed to combine one timestep.
#[derive(Debug, Clone, Copy)]
pub struct CombineRequest<'a> {
    /// Node of every rank.
    pub nodes: &'a NodeList,
    /// Data directory template (`%HOSTNAME` and `%RANK` are expanded).
    pub datadir: &'a str,
    /// Base name of the data files.
    pub datafile: &'a str,
    /// Timestep to combine.
    pub timestep: u64,
    /// Mesh and processor layout.
    pub layout: &'a Layout,
}

/// Files produced for one timestep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineReport {
    pub timestep: u64,
    pub outputs: Vec<PathBuf>,
}

/// Merges the per-processor output of one timestep.
pub trait Combiner {
    /// Combine `request.timestep`.
    fn combine(&mut self, request: &CombineRequest<'_>) -> CombineResult<CombineReport>;
}

/// Combines ASCII output read from the local filesystem.
#[derive(Debug, Clone)]
pub struct AsciiCombiner {
    output_dir: PathBuf,
    fields: Vec<FieldSpec>,
    write_general: bool,
}

impl AsciiCombiner {
    /// Combiner writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, fields: Vec<FieldSpec>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fields,
            write_general: true,
        }
    }

    /// Combiner configured from the tool settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output.dir.clone(), config.fields.clone())
            .with_general(config.output.write_general)
    }

    /// Enable or disable OpenDX headers.
    pub fn with_general(mut self, write_general: bool) -> Self {
        self.write_general = write_general;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the combined file of `cap` at `step`.
    pub fn cap_path(&self, datafile: &str, cap: usize, step: u64) -> PathBuf {
        self.output_dir
            .join(format!("{}.cap{:02}.{}", datafile, cap, step))
    }

    fn combine_cap(&self, request: &CombineRequest<'_>, cap: usize) -> CombineResult<CapAssembly> {
        let mut assembly = CapAssembly::new(request.layout)?;
        for rank in request.layout.cap_ranks(cap) {
            let node = request.nodes.node(rank).ok_or(CombineError::NodeCountMismatch {
                expected: request.layout.total_nodes(),
                actual: request.nodes.len(),
            })?;
            let dir = paste::expand_datadir(request.datadir, node, rank);
            let rows = paste::paste_rank(
                &dir,
                request.datafile,
                &self.fields,
                rank,
                request.timestep,
            )?;
            assembly.join(rank, rows)?;
        }
        Ok(assembly)
    }
}

impl Combiner for AsciiCombiner {
    fn combine(&mut self, request: &CombineRequest<'_>) -> CombineResult<CombineReport> {
        let layout = request.layout;
        if request.nodes.len() != layout.total_nodes() {
            return Err(CombineError::NodeCountMismatch {
                expected: layout.total_nodes(),
                actual: request.nodes.len(),
            });
        }

        let mut report = CombineReport {
            timestep: request.timestep,
            outputs: Vec::new(),
        };

        for cap in 0..layout.ncap {
            let assembly = self.combine_cap(request, cap)?;

            std::fs::create_dir_all(&self.output_dir).map_err(|source| {
                CombineError::OutputWrite {
                    path: self.output_dir.clone(),
                    source,
                }
            })?;
            let path = self.cap_path(request.datafile, cap, request.timestep);
            assembly.write(&path)?;
            tracing::info!(cap, path = %path.display(), "cap written");
            report.outputs.push(path.clone());

            if self.write_general {
                let mut general_path = path.clone().into_os_string();
                general_path.push(".general");
                let general_path = PathBuf::from(general_path);
                let data_file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                general::write(&general_path, &data_file, &layout.nodes, &self.fields)?;
                report.outputs.push(general_path);
            }
        }

        Ok(report)
    }
}
