//! Run orchestration.
//!
//! A run goes through its stages strictly in order:
//! input parameters → output-format gate → layout → node list → one combine
//! per timestep. The first failing stage ends the run.

use crate::combine::{CombineRequest, Combiner};
use crate::core::error::{CombineError, CombineResult};
use crate::core::layout::Layout;
use crate::core::params::{Defaults, InputParameters};
use crate::nodes::NodeResolver;
use std::path::PathBuf;

/// The only output format that can be combined.
pub const SUPPORTED_FORMAT: &str = "ascii";

/// What to combine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Machine file of the run.
    pub machinefile: PathBuf,
    /// CitcomS input file of the run.
    pub inputfile: PathBuf,
    /// Timesteps, combined in this order.
    pub timesteps: Vec<u64>,
}

/// Parameters of a run that passed the output-format gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Data directory template.
    pub datadir: String,
    /// Base name of the data files.
    pub datafile: String,
    /// Mesh and processor layout.
    pub layout: Layout,
}

impl RunPlan {
    /// Resolve the plan from input parameters.
    ///
    /// The format gate runs before any layout parameter is read.
    pub fn from_params(params: &InputParameters) -> CombineResult<Self> {
        let datadir = params.get_str("datadir")?;
        let datafile = params.get_str("datafile")?;
        let output_format = params.get_str("output_format")?;
        check_output_format(&output_format)?;

        let layout = Layout::from_params(params)?;
        Ok(Self {
            datadir,
            datafile,
            layout,
        })
    }
}

/// Reject every output format except [`SUPPORTED_FORMAT`].
pub fn check_output_format(format: &str) -> CombineResult<()> {
    if format != SUPPORTED_FORMAT {
        return Err(CombineError::UnsupportedFormat {
            format: format.to_string(),
        });
    }
    Ok(())
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of ranks of the run.
    pub total_nodes: usize,
    /// Timesteps combined, in order.
    pub timesteps: Vec<u64>,
    /// Files written.
    pub outputs: Vec<PathBuf>,
}

/// Drives a run through its stages.
pub struct Runtime<R, C> {
    defaults: Defaults,
    resolver: R,
    combiner: C,
}

impl<R: NodeResolver, C: Combiner> Runtime<R, C> {
    /// Create a runtime from its collaborators.
    pub fn new(defaults: Defaults, resolver: R, combiner: C) -> Self {
        Self {
            defaults,
            resolver,
            combiner,
        }
    }

    /// Run every stage for `request`.
    pub fn run(&mut self, request: &RunRequest) -> CombineResult<RunSummary> {
        let params = InputParameters::load(&self.defaults, &request.inputfile)?;
        for (name, value) in params.iter() {
            tracing::trace!(parameter = name, value, "input parameter");
        }
        let plan = RunPlan::from_params(&params)?;
        let layout = plan.layout;
        tracing::info!(
            datadir = %plan.datadir,
            datafile = %plan.datafile,
            nodex = layout.nodes.nodex,
            nodey = layout.nodes.nodey,
            nodez = layout.nodes.nodez,
            nprocx = layout.procs.nprocx,
            nprocy = layout.procs.nprocy,
            nprocz = layout.procs.nprocz,
            ncap = layout.ncap,
            "parameters resolved"
        );

        let total_nodes = layout.total_nodes();
        let nodes = self.resolver.resolve(&request.machinefile, total_nodes)?;
        tracing::info!(total_nodes, "node list resolved");

        let mut summary = RunSummary {
            total_nodes,
            ..Default::default()
        };
        for &timestep in &request.timesteps {
            let report = self.combiner.combine(&CombineRequest {
                nodes: &nodes,
                datadir: &plan.datadir,
                datafile: &plan.datafile,
                timestep,
                layout: &layout,
            })?;
            tracing::info!(timestep, files = report.outputs.len(), "timestep combined");
            summary.timesteps.push(timestep);
            summary.outputs.extend(report.outputs);
        }

        Ok(summary)
    }

    /// Node resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Combiner.
    pub fn combiner(&self) -> &C {
        &self.combiner
    }
}
