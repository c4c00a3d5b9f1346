//! Symbol table artifact: a tab-separated header row plus data rows.
//!
//! Cells are text; there is no type coercion. Rows are allowed to be
//! ragged: cells beyond the header are kept but unreachable by name,
//! missing cells read as empty.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The only non-result of parsing: the artifact file is absent. Any
/// unreadable file counts as absent; the caller substitutes a one-cell
/// table rather than failing the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymtabNotFound {
    pub path: PathBuf,
}

impl SymbolTable {
    /// Parse the tab-separated artifact at `path`.
    pub fn parse(path: &Path) -> Result<SymbolTable, SymtabNotFound> {
        let content = std::fs::read(path).map_err(|_| SymtabNotFound {
            path: path.to_path_buf(),
        })?;
        Ok(Self::parse_text(&String::from_utf8_lossy(&content)))
    }

    /// Parse symbol table text: first line is the header, every later
    /// line is a row, all split on tabs. Idempotent over the same text.
    pub fn parse_text(text: &str) -> SymbolTable {
        let mut lines = text.lines();
        let header = match lines.next() {
            Some(line) => split_cells(line),
            None => Vec::new(),
        };
        let rows = lines.map(split_cells).collect();
        SymbolTable { header, rows }
    }

    /// Substitute table rendered when the artifact is missing.
    pub fn not_found(path: &Path) -> SymbolTable {
        SymbolTable {
            header: vec!["Error".to_string()],
            rows: vec![vec![format!("{} not found.", path.display())]],
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cell by row index and column name. A ragged row short of the
    /// column reads as empty; columns past the header are unindexed.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        let row = self.rows.get(row)?;
        Some(row.get(col).map(String::as_str).unwrap_or(""))
    }

    /// Render as aligned plain-text columns for terminal display.
    pub fn render_text(&self) -> String {
        let columns = self
            .header
            .len()
            .max(self.rows.iter().map(Vec::len).max().unwrap_or(0));
        let mut widths = vec![0usize; columns];
        for (i, h) in self.header.iter().enumerate() {
            widths[i] = widths[i].max(h.chars().count());
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        render_row(&mut out, &self.header, &widths);
        for row in &self.rows {
            render_row(&mut out, row, &widths);
        }
        out
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.trim().split('\t').map(str::to_string).collect()
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i + 1 < cells.len() {
            for _ in cell.chars().count()..widths[i] {
                out.push(' ');
            }
        }
    }
    out.push('\n');
}
