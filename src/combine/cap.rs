//! Cap assembly.
//!
//! Places the rows of every rank of a cap at their global mesh position.
//! Global index of node `(x, y, z)` is `z + x * nodez + y * nodex * nodez`.

use crate::core::error::{CombineError, CombineResult};
use crate::core::layout::{Layout, NodeGrid, ProcessorGrid};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rows of one cap being assembled from its ranks.
#[derive(Debug, Clone)]
pub struct CapAssembly {
    global: NodeGrid,
    local: NodeGrid,
    procs: ProcessorGrid,
    cap_nodes: usize,
    rows: Vec<String>,
}

impl CapAssembly {
    /// Empty assembly for a cap of `layout`.
    ///
    /// The cap buffer is allocated when the first rank joins, so a mesh
    /// described by the input file costs nothing until data has been read.
    pub fn new(layout: &Layout) -> CombineResult<Self> {
        let local = layout.local_grid()?;
        Ok(Self {
            global: layout.nodes,
            local,
            procs: layout.procs,
            cap_nodes: layout.cap_nodes(),
            rows: Vec::new(),
        })
    }

    /// Number of rows a single rank must provide.
    pub fn rows_per_rank(&self) -> usize {
        self.local.len()
    }

    /// Place the rows of `rank`. Boundary nodes shared with a rank joined
    /// earlier are overwritten.
    pub fn join(&mut self, rank: usize, rows: Vec<String>) -> CombineResult<()> {
        if rows.len() != self.local.len() {
            return Err(CombineError::DataSize {
                rank,
                expected: self.local.len(),
                actual: rows.len(),
            });
        }

        if self.rows.is_empty() {
            self.rows = vec![String::new(); self.cap_nodes];
        }

        let loc = self.procs.location(rank);
        let xs = (self.local.nodex - 1) * loc.x;
        let ys = (self.local.nodey - 1) * loc.y;
        let zs = (self.local.nodez - 1) * loc.z;

        let mut rows = rows.into_iter();
        for i in ys..ys + self.local.nodey {
            for j in xs..xs + self.local.nodex {
                for k in zs..zs + self.local.nodez {
                    let m = k + j * self.global.nodez + i * self.global.nodex * self.global.nodez;
                    if let Some(row) = rows.next() {
                        self.rows[m] = row;
                    }
                }
            }
        }
        Ok(())
    }

    /// Assembled rows in global order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Write the combined cap file.
    pub fn write(&self, path: &Path) -> CombineResult<()> {
        let to_error = |source: std::io::Error| CombineError::OutputWrite {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::create(path).map_err(to_error)?;
        let mut out = BufWriter::new(file);
        writeln!(
            out,
            "{} x {} x {}",
            self.global.nodex, self.global.nodey, self.global.nodez
        )
        .map_err(to_error)?;
        for row in &self.rows {
            writeln!(out, "{}", row).map_err(to_error)?;
        }
        out.flush().map_err(to_error)
    }
}
