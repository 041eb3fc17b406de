//! OpenDX `.general` headers for combined cap files.

use crate::core::config::FieldSpec;
use crate::core::error::{CombineError, CombineResult};
use crate::core::layout::NodeGrid;
use std::path::Path;

/// Render the header describing `data_file`.
///
/// A field without components is described as one scalar named after the
/// field.
pub fn render(data_file: &str, grid: &NodeGrid, fields: &[FieldSpec]) -> String {
    let mut names = Vec::new();
    let mut structures = Vec::new();
    for field in fields {
        if field.components.is_empty() {
            names.push(field.name.clone());
            structures.push("scalar".to_string());
            continue;
        }
        for component in &field.components {
            names.push(component.name.clone());
            structures.push(match component.width {
                1 => "scalar".to_string(),
                n => format!("{}-vector", n),
            });
        }
    }
    let types = vec!["float"; names.len()];

    // z varies fastest in the cap file, so it is the first (column-major) axis.
    format!(
        "file = {}\n\
         grid = {} x {} x {}\n\
         format = ascii\n\
         interleaving = field\n\
         majority = column\n\
         header = lines 1\n\
         field = {}\n\
         structure = {}\n\
         type = {}\n\
         \n\
         end\n",
        data_file,
        grid.nodez,
        grid.nodex,
        grid.nodey,
        names.join(", "),
        structures.join(", "),
        types.join(", "),
    )
}

/// Write the header for `data_file` to `path`.
pub fn write(
    path: &Path,
    data_file: &str,
    grid: &NodeGrid,
    fields: &[FieldSpec],
) -> CombineResult<()> {
    std::fs::write(path, render(data_file, grid, fields)).map_err(|source| {
        CombineError::OutputWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}
