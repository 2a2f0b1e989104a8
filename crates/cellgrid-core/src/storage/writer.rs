//! Writer for the .grd file format

use crate::error::Result;
use cellgrid_engine::engine::Grid;
use std::fs;
use std::path::Path;

/// Write a grid to a .grd file
pub fn write_grd(path: &Path, grid: &Grid) -> Result<()> {
    let content = write_grd_content(grid);
    fs::write(path, content)?;
    Ok(())
}

/// Write a grid to a .grd format string, cells sorted by row then column.
pub fn write_grd_content(grid: &Grid) -> String {
    let mut lines = vec!["# Cellgrid sheet".to_string()];

    let mut cells: Vec<_> = grid
        .iter()
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect();
    cells.sort_by(|(a, _), (b, _)| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));

    for (cell_ref, raw) in cells {
        if raw.trim().is_empty() {
            continue;
        }
        lines.push(format!("{}: {}", cell_ref, escape_raw(&raw)));
    }

    lines.join("\n") + "\n"
}

fn escape_raw(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
