//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

use autocombine::combine::{CombineReport, CombineRequest, Combiner};
use autocombine::error::{CombineError, CombineResult};
use autocombine::nodes::{NodeList, NodeResolver};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Create an input file with the given content.
pub fn create_input_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write input file");
    file
}

/// Create an input file setting only the required parameters.
pub fn create_minimal_input(datadir: &str, nproc_surf: usize) -> NamedTempFile {
    create_input_file(&format!(
        "# minimal run\ndatadir=\"{}\"\ndatafile=\"test\"\nnproc_surf={}\n",
        datadir, nproc_surf
    ))
}

/// Create a machine file with one host per line.
pub fn create_machinefile(hosts: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for host in hosts {
        writeln!(file, "{}", host).expect("Failed to write machine file");
    }
    file
}

/// Create a temporary directory.
pub fn temp_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write the coord, velo and visc files of `rank` at `step`.
///
/// Row `n` of each field holds a single tag naming the field, rank and row,
/// so pasted rows read `c<rank>_<n> v<rank>_<n> s<rank>_<n>`.
pub fn write_rank_fields(dir: &Path, datafile: &str, rank: usize, step: u64, rows: usize) {
    let mut coord = format!("  1 {:7}\n", rows);
    let mut velo = format!("{} {} 0.00000e+00\n  1 {:7}\n", step, rows, rows);
    let mut visc = format!("  1 {:7}\n", rows);
    for n in 0..rows {
        coord.push_str(&format!("c{}_{}\n", rank, n));
        velo.push_str(&format!("v{}_{}\n", rank, n));
        visc.push_str(&format!("s{}_{}\n", rank, n));
    }

    std::fs::create_dir_all(dir).expect("Failed to create data dir");
    let write = |name: String, content: &str| {
        std::fs::write(dir.join(name), content).expect("Failed to write field file");
    };
    write(format!("{}.coord.{}", datafile, rank), &coord);
    write(format!("{}.velo.{}.{}", datafile, rank, step), &velo);
    write(format!("{}.visc.{}.{}", datafile, rank, step), &visc);
}

/// Pasted row `n` of `rank`, as written by [`write_rank_fields`].
pub fn pasted_row(rank: usize, n: usize) -> String {
    format!("c{r}_{n} v{r}_{n} s{r}_{n}", r = rank, n = n)
}

/// Read a combined file into its lines.
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Resolver that names nodes `node0`, `node1`, ... and records its calls.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    pub calls: RefCell<Vec<(PathBuf, usize)>>,
}

impl NodeResolver for RecordingResolver {
    fn resolve(&self, machinefile: &Path, total_nodes: usize) -> CombineResult<NodeList> {
        self.calls
            .borrow_mut()
            .push((machinefile.to_path_buf(), total_nodes));
        Ok(NodeList::new(
            (0..total_nodes).map(|i| format!("node{}", i)).collect(),
        ))
    }
}

/// Combiner that records the timesteps it is asked for.
#[derive(Debug, Default)]
pub struct RecordingCombiner {
    /// Timesteps in call order.
    pub timesteps: Vec<u64>,
    /// Node count seen on each call.
    pub node_counts: Vec<usize>,
    /// Fail when asked for this timestep.
    pub fail_on: Option<u64>,
}

impl RecordingCombiner {
    /// Combiner failing on `timestep`.
    pub fn failing_on(timestep: u64) -> Self {
        Self {
            fail_on: Some(timestep),
            ..Default::default()
        }
    }
}

impl Combiner for RecordingCombiner {
    fn combine(&mut self, request: &CombineRequest<'_>) -> CombineResult<CombineReport> {
        self.timesteps.push(request.timestep);
        self.node_counts.push(request.nodes.len());
        if self.fail_on == Some(request.timestep) {
            return Err(CombineError::DataSize {
                rank: 0,
                expected: 1,
                actual: 0,
            });
        }
        Ok(CombineReport {
            timestep: request.timestep,
            outputs: vec![PathBuf::from(format!("step{}", request.timestep))],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_minimal_input() {
        let file = create_minimal_input("out", 12);
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("datadir=\"out\""));
        assert!(content.contains("nproc_surf=12"));
    }

    #[test]
    fn test_write_rank_fields() {
        let dir = temp_test_dir();
        write_rank_fields(dir.path(), "t", 2, 7, 3);
        let velo = read_lines(&dir.path().join("t.velo.2.7"));
        assert_eq!(velo.len(), 5);
        assert_eq!(velo[2], "v2_0");
        assert!(dir.path().join("t.coord.2").exists());
    }

    #[test]
    fn test_recording_resolver() {
        let resolver = RecordingResolver::default();
        let nodes = resolver.resolve(Path::new("mf"), 3).unwrap();
        assert_eq!(nodes.node(2), Some("node2"));
        assert_eq!(resolver.calls.borrow().len(), 1);
    }
}
