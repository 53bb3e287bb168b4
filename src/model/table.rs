//! Table types (`a:tbl` inside a graphic frame).

use super::Paragraph;
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Whether the first row is styled as a header (`firstRow="1"`)
    pub first_row_header: bool,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.cells.is_empty())
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell (`a:tc`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content (paragraphs)
    pub paragraphs: Vec<Paragraph>,

    /// Columns spanned (`gridSpan`)
    pub colspan: u32,

    /// Rows spanned (`rowSpan`)
    pub rowspan: u32,

    /// Continuation of a merged cell (`hMerge` / `vMerge`)
    pub merged: bool,
}

impl TableCell {
    /// Create a cell from paragraphs.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            colspan: 1,
            rowspan: 1,
            merged: false,
        }
    }

    /// Create a cell with plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Paragraph::with_text(text)])
    }

    /// Get plain text content, paragraphs joined by a space.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dimensions() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["A", "B", "C"]));
        table.add_row(TableRow::from_strings(["1", "2"]));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_cell_plain_text_joins_paragraphs() {
        let cell = TableCell::new(vec![
            Paragraph::with_text("first"),
            Paragraph::with_text("  "),
            Paragraph::with_text("second"),
        ]);
        assert_eq!(cell.plain_text(), "first second");
    }

    #[test]
    fn test_table_plain_text() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["Name", "Value"]));
        table.add_row(TableRow::from_strings(["x", "1"]));
        assert_eq!(table.plain_text(), "Name\tValue\nx\t1");
    }
}
