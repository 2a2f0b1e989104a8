//! Parser for the .grd file format.
//!
//! One `CELLREF: RAW` entry per line. The single space after the colon is a
//! separator; everything after it is the cell's raw text. `\n`, `\r` and
//! `\\` escapes let raw text span lines.

use crate::error::{CellgridError, Result};
use cellgrid_engine::engine::{CellRef, Grid};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse a .grd file into a grid of raw cell contents.
pub fn parse_grd(path: &Path) -> Result<Grid> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Grid> {
    let grid = Grid::default();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((cell_ref_str, raw)) = line.split_once(':') else {
            return Err(CellgridError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_str(cell_ref_str).ok_or_else(|| CellgridError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let raw = unescape_raw(raw.strip_prefix(' ').unwrap_or(raw));
        if raw.trim().is_empty() {
            continue;
        }
        if grid.insert(cell_ref, raw).is_some() {
            debug!(cell = %cell_ref, line = line_num + 1, "duplicate cell entry, keeping the last");
        }
    }

    Ok(grid)
}

fn unescape_raw(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_at(grid: &Grid, name: &str) -> Option<String> {
        grid.get(&CellRef::from_str(name).unwrap())
            .map(|entry| entry.value().clone())
    }

    #[test]
    fn test_parse_keeps_raw_text() {
        let content = "A1: 42\nA2: Hello world\nA3: =B1 + C1\nA4: 'quoted'";
        let grid = parse_grd_content(content).unwrap();
        assert_eq!(raw_at(&grid, "A1").as_deref(), Some("42"));
        assert_eq!(raw_at(&grid, "A2").as_deref(), Some("Hello world"));
        assert_eq!(raw_at(&grid, "A3").as_deref(), Some("=B1 + C1"));
        assert_eq!(raw_at(&grid, "A4").as_deref(), Some("'quoted'"));
    }

    #[test]
    fn test_parse_preserves_extra_whitespace_and_colons() {
        let grid = parse_grd_content("b2:   =IF(A1>1, 'a:b', 0)  ").unwrap();
        assert_eq!(
            raw_at(&grid, "B2").as_deref(),
            Some("  =IF(A1>1, 'a:b', 0)  ")
        );
    }

    #[test]
    fn test_parse_escapes() {
        let grid = parse_grd_content(r"A1: line one\nline two\\n C:\temp").unwrap();
        assert_eq!(
            raw_at(&grid, "A1").as_deref(),
            Some("line one\nline two\\n C:\\temp")
        );
    }

    #[test]
    fn test_skip_comments_blank_lines_and_blank_values() {
        let content = r#"
# This is a comment
A1: 42

# Another comment
A2:
B1: 100
"#;
        let grid = parse_grd_content(content).unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        match parse_grd_content("A1: 1\nnot a cell line") {
            Err(CellgridError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other.map(|g| g.len())),
        }
        match parse_grd_content("# header\n\n1A: 5") {
            Err(CellgridError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("1A"));
            }
            other => panic!("expected parse error, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_duplicate_entries_keep_last() {
        let grid = parse_grd_content("A1: 1\nA1: 2").unwrap();
        assert_eq!(raw_at(&grid, "A1").as_deref(), Some("2"));
    }
}
