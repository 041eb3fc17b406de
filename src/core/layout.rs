//! Processor and mesh layout of a run.
//!
//! A CitcomS run splits each cap's mesh of `nodex * nodey * nodez` nodes
//! across a processor grid of `nprocx * nprocy * nprocz` ranks. Neighbouring
//! ranks share one layer of boundary nodes.

use crate::core::error::{CombineError, CombineResult};
use crate::core::params::InputParameters;

/// Global mesh size of one cap, in nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeGrid {
    pub nodex: usize,
    pub nodey: usize,
    pub nodez: usize,
}

/// Number of processors along each axis of one cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorGrid {
    pub nprocx: usize,
    pub nprocy: usize,
    pub nprocz: usize,
}

/// Position of a rank inside its cap's processor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLocation {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl ProcessorGrid {
    /// Ranks per cap.
    pub fn ranks_per_cap(&self) -> usize {
        self.nprocx * self.nprocy * self.nprocz
    }

    /// Location of `rank` in the grid. Rank numbering runs z fastest, then
    /// x, then y, and restarts for every cap.
    pub fn location(&self, rank: usize) -> RankLocation {
        let z = rank % self.nprocz;
        let x = (rank / self.nprocz) % self.nprocx;
        let y = (rank / (self.nprocz * self.nprocx)) % self.nprocy;
        RankLocation { x, y, z }
    }
}

/// Complete layout of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub nodes: NodeGrid,
    pub procs: ProcessorGrid,
    /// Number of caps (`nproc_surf`).
    pub ncap: usize,
    total_nodes: usize,
    cap_nodes: usize,
}

impl Layout {
    /// Build a layout, rejecting zero sizes, overflowing rank counts and
    /// overflowing mesh sizes.
    pub fn new(nodes: NodeGrid, procs: ProcessorGrid, ncap: usize) -> CombineResult<Self> {
        let sizes = [
            ("nodex", nodes.nodex),
            ("nodey", nodes.nodey),
            ("nodez", nodes.nodez),
            ("nproc_surf", ncap),
            ("nprocx", procs.nprocx),
            ("nprocy", procs.nprocy),
            ("nprocz", procs.nprocz),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(CombineError::invalid_parameter(name, "must be positive"));
            }
        }

        let total_nodes = procs
            .nprocx
            .checked_mul(procs.nprocy)
            .and_then(|n| n.checked_mul(procs.nprocz))
            .and_then(|n| n.checked_mul(ncap))
            .ok_or_else(|| {
                CombineError::invalid_parameter("nproc_surf", "total node count overflows")
            })?;
        let cap_nodes = nodes.checked_len().ok_or_else(|| {
            CombineError::invalid_parameter("nodex", "mesh size nodex * nodey * nodez overflows")
        })?;

        Ok(Self {
            nodes,
            procs,
            ncap,
            total_nodes,
            cap_nodes,
        })
    }

    /// Read the layout parameters of a run.
    pub fn from_params(params: &InputParameters) -> CombineResult<Self> {
        let nodes = NodeGrid {
            nodex: positive(params, "nodex")?,
            nodey: positive(params, "nodey")?,
            nodez: positive(params, "nodez")?,
        };
        let ncap = positive(params, "nproc_surf")?;
        let procs = ProcessorGrid {
            nprocx: positive(params, "nprocx")?,
            nprocy: positive(params, "nprocy")?,
            nprocz: positive(params, "nprocz")?,
        };
        Self::new(nodes, procs, ncap)
    }

    /// Number of ranks in the run: `nprocx * nprocy * nprocz * nproc_surf`.
    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    /// Nodes in the mesh of one cap.
    pub fn cap_nodes(&self) -> usize {
        self.cap_nodes
    }

    /// Ranks belonging to `cap`.
    pub fn cap_ranks(&self, cap: usize) -> std::ops::Range<usize> {
        let per_cap = self.procs.ranks_per_cap();
        cap * per_cap..(cap + 1) * per_cap
    }

    /// Mesh held by a single rank, including shared boundary nodes.
    ///
    /// Fails if the global mesh cannot be split evenly along an axis.
    pub fn local_grid(&self) -> CombineResult<NodeGrid> {
        Ok(NodeGrid {
            nodex: local_size("nodex", self.nodes.nodex, self.procs.nprocx)?,
            nodey: local_size("nodey", self.nodes.nodey, self.procs.nprocy)?,
            nodez: local_size("nodez", self.nodes.nodez, self.procs.nprocz)?,
        })
    }
}

impl NodeGrid {
    /// Number of nodes in the grid.
    ///
    /// Saturates on overflow; grids held by a [`Layout`] never overflow.
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Number of nodes in the grid, or `None` on overflow.
    pub fn checked_len(&self) -> Option<usize> {
        self.nodex
            .checked_mul(self.nodey)
            .and_then(|n| n.checked_mul(self.nodez))
    }

    /// Whether the grid holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn positive(params: &InputParameters, name: &str) -> CombineResult<usize> {
    let value = params.get_int(name)?;
    if value <= 0 {
        return Err(CombineError::invalid_parameter(
            name,
            format!("must be positive, got {}", value),
        ));
    }
    usize::try_from(value).map_err(|_| CombineError::invalid_parameter(name, "value too large"))
}

fn local_size(axis: &'static str, nodes: usize, procs: usize) -> CombineResult<usize> {
    if (nodes - 1) % procs != 0 {
        return Err(CombineError::InvalidMesh { axis, nodes, procs });
    }
    Ok(1 + (nodes - 1) / procs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(nodes: (usize, usize, usize), procs: (usize, usize, usize), ncap: usize) -> Layout {
        Layout::new(
            NodeGrid {
                nodex: nodes.0,
                nodey: nodes.1,
                nodez: nodes.2,
            },
            ProcessorGrid {
                nprocx: procs.0,
                nprocy: procs.1,
                nprocz: procs.2,
            },
            ncap,
        )
        .unwrap()
    }

    #[test]
    fn total_nodes_is_grid_times_caps() {
        assert_eq!(layout((9, 9, 9), (2, 2, 2), 1).total_nodes(), 8);
        assert_eq!(layout((9, 9, 9), (1, 1, 1), 12).total_nodes(), 12);
        assert_eq!(layout((17, 17, 9), (2, 2, 1), 12).total_nodes(), 48);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = Layout::new(
            NodeGrid {
                nodex: 9,
                nodey: 9,
                nodez: 9,
            },
            ProcessorGrid {
                nprocx: 1,
                nprocy: 0,
                nprocz: 1,
            },
            1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nprocy"));
    }

    #[test]
    fn overflowing_mesh_is_rejected() {
        let err = Layout::new(
            NodeGrid {
                nodex: 3_000_001,
                nodey: 3_000_001,
                nodez: 3_000_001,
            },
            ProcessorGrid {
                nprocx: 1,
                nprocy: 1,
                nprocz: 1,
            },
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CombineError::InvalidParameter { .. }));
        assert_eq!(err.exit_code(), 2);

        let l = layout((17, 33, 9), (2, 2, 1), 1);
        assert_eq!(l.cap_nodes(), 17 * 33 * 9);
    }

    #[test]
    fn rank_location_runs_z_fastest() {
        let grid = ProcessorGrid {
            nprocx: 2,
            nprocy: 3,
            nprocz: 2,
        };
        assert_eq!(grid.location(0), RankLocation { x: 0, y: 0, z: 0 });
        assert_eq!(grid.location(1), RankLocation { x: 0, y: 0, z: 1 });
        assert_eq!(grid.location(2), RankLocation { x: 1, y: 0, z: 0 });
        assert_eq!(grid.location(5), RankLocation { x: 0, y: 1, z: 1 });
        assert_eq!(grid.location(11), RankLocation { x: 1, y: 2, z: 1 });
        // Second cap starts over.
        assert_eq!(grid.location(12), RankLocation { x: 0, y: 0, z: 0 });
    }

    #[test]
    fn local_grid_shares_boundary_nodes() {
        let local = layout((9, 17, 5), (2, 4, 1), 1).local_grid().unwrap();
        assert_eq!(
            local,
            NodeGrid {
                nodex: 5,
                nodey: 5,
                nodez: 5
            }
        );
        assert_eq!(local.len(), 125);
    }

    #[test]
    fn uneven_mesh_is_rejected() {
        let err = layout((10, 9, 9), (2, 1, 1), 1).local_grid().unwrap_err();
        assert!(matches!(
            err,
            CombineError::InvalidMesh {
                axis: "nodex",
                nodes: 10,
                procs: 2
            }
        ));
    }

    #[test]
    fn cap_ranks_are_contiguous() {
        let l = layout((9, 9, 9), (2, 1, 2), 3);
        assert_eq!(l.cap_ranks(0), 0..4);
        assert_eq!(l.cap_ranks(2), 8..12);
    }
}
