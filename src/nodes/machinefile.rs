//! Machine-file parsing.
//!
//! Accepted entry forms, one per line:
//!
//! ```text
//! node01            # one slot
//! node02:4          # MPICH
//! node02:4:ib0      # MPICH hydra, with network interface
//! node03 slots=4    # Open MPI
//! node04 cpu=2      # LAM
//! ```
//!
//! An entry with `N` slots contributes its host `N` times. Ranks are placed
//! on the expanded list in order.

use crate::core::error::{CombineError, CombineResult};
use crate::nodes::{NodeList, NodeResolver};
use std::path::Path;

/// Resolves nodes by reading a machine file from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineFileResolver;

impl NodeResolver for MachineFileResolver {
    fn resolve(&self, machinefile: &Path, total_nodes: usize) -> CombineResult<NodeList> {
        let content = std::fs::read_to_string(machinefile).map_err(|source| {
            CombineError::MachineFileRead {
                path: machinefile.to_path_buf(),
                source,
            }
        })?;

        let mut nodes = parse_machinefile(&content).map_err(|(line, message)| {
            CombineError::MachineFileSyntax {
                path: machinefile.to_path_buf(),
                line,
                message,
            }
        })?;

        if nodes.len() < total_nodes {
            return Err(CombineError::InsufficientNodes {
                path: machinefile.to_path_buf(),
                available: nodes.len(),
                required: total_nodes,
            });
        }
        if nodes.len() > total_nodes {
            tracing::debug!(
                available = nodes.len(),
                required = total_nodes,
                "ignoring surplus machine file entries"
            );
        }
        nodes.truncate(total_nodes);
        Ok(NodeList::new(nodes))
    }
}

/// Expand the entries of a machine file.
///
/// On failure returns the 1-based line number and a description.
pub fn parse_machinefile(content: &str) -> Result<Vec<String>, (usize, String)> {
    let mut nodes = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut tokens = line.split_whitespace();
        let Some(entry) = tokens.next() else {
            continue;
        };

        // host[:slots[:interface]]; the interface does not change placement
        let mut fields = entry.splitn(3, ':');
        let host = fields.next().unwrap_or_default();
        let mut slots = match fields.next() {
            Some(count) => parse_slots(count, line_no)?,
            None => 1,
        };
        if host.is_empty() {
            return Err((line_no, "missing host name".to_string()));
        }

        for token in tokens {
            match token.split_once('=') {
                Some(("slots", count)) | Some(("cpu", count)) => {
                    slots = parse_slots(count, line_no)?;
                }
                // max_slots and scheduler hints do not change placement
                Some(_) => {}
                None => {
                    return Err((line_no, format!("unexpected token: {}", token)));
                }
            }
        }

        nodes.extend(std::iter::repeat(host.to_string()).take(slots));
    }

    Ok(nodes)
}

fn parse_slots(count: &str, line_no: usize) -> Result<usize, (usize, String)> {
    match count.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err((line_no, format!("invalid slot count: {}", count))),
    }
}
