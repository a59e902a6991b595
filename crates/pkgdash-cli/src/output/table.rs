//! Table rendering on top of comfy-table.

use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL_CONDENSED};
use comfy_table::{Cell, CellAlignment, ContentArrangement};

/// A table with the session's glyph set and dynamic column widths.
#[derive(Debug)]
pub struct Table {
    inner: comfy_table::Table,
    numeric: Vec<usize>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        let mut inner = comfy_table::Table::new();
        inner
            .load_preset(if crate::output::unicode_enabled() {
                UTF8_FULL_CONDENSED
            } else {
                ASCII_MARKDOWN
            })
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(headers.iter().map(|h| Cell::new(h)));
        Self {
            inner,
            numeric: Vec::new(),
        }
    }

    /// Right-align a column.
    pub fn numeric(mut self, column: usize) -> Self {
        self.numeric.push(column);
        self
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<Cell> = cells
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let text: String = text.into();
                let cell = Cell::new(text);
                if self.numeric.contains(&i) {
                    cell.set_alignment(CellAlignment::Right)
                } else {
                    cell
                }
            })
            .collect();
        self.inner.add_row(row);
    }

    pub fn print(&self) {
        println!("{}", self.inner);
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows() {
        let mut table = Table::new(&["Name", "Stars"]).numeric(1);
        let empty = table.to_string();
        assert!(empty.contains("Stars"));
        assert!(!empty.contains("curl"));

        table.row(["curl", "1200"]);
        table.row(["wget".to_string(), "80".to_string()]);

        let rendered = table.to_string();
        assert!(rendered.contains("curl"));
        assert!(rendered.contains("1200"));
        assert!(rendered.contains("wget"));
        assert!(rendered.lines().count() > empty.lines().count());
    }
}
