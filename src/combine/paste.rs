//! Per-rank field pasting.
//!
//! Each rank writes one file per field. Pasting strips the headers and joins
//! the remaining lines column-wise, so row `n` of the result holds every
//! field of local node `n`.

use crate::core::config::FieldSpec;
use crate::core::error::{CombineError, CombineResult};
use std::path::{Path, PathBuf};

/// Replace `%HOSTNAME` and `%RANK` in a data-directory template.
pub fn expand_datadir(template: &str, node: &str, rank: usize) -> PathBuf {
    PathBuf::from(
        template
            .replace("%HOSTNAME", node)
            .replace("%RANK", &rank.to_string()),
    )
}

/// Paste the fields of one rank at one step.
pub fn paste_rank(
    dir: &Path,
    datafile: &str,
    fields: &[FieldSpec],
    rank: usize,
    step: u64,
) -> CombineResult<Vec<String>> {
    let mut rows: Vec<String> = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let path = dir.join(field.file_name(datafile, rank, step));
        tracing::debug!(rank, path = %path.display(), "reading field");
        let content = std::fs::read_to_string(&path)
            .map_err(|source| CombineError::DataRead { path, source })?;
        let lines: Vec<&str> = content
            .lines()
            .skip(field.header_lines)
            .map(str::trim_end)
            .collect();

        if index == 0 {
            rows = lines.into_iter().map(str::to_string).collect();
            continue;
        }

        if lines.len() != rows.len() {
            return Err(CombineError::FieldLengthMismatch {
                rank,
                field: field.name.clone(),
                expected: rows.len(),
                actual: lines.len(),
            });
        }
        for (row, line) in rows.iter_mut().zip(lines) {
            row.push(' ');
            row.push_str(line);
        }
    }

    Ok(rows)
}
