//! Table builder for default-format listings.
//!
//! Thin layer over `comfy-table`: header row, data rows, separators from the
//! UTF8 preset, and optional vertical auto-merge of repeated cells on chosen
//! columns (useful when a listing is sorted on that column).

use crate::printer::Printer;
use comfy_table::presets::UTF8_FULL;

/// Accumulates rows, renders on demand.
#[derive(Debug, Default, Clone)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    merge_columns: Vec<usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header<I, S>(&mut self, header: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = header.into_iter().map(Into::into).collect();
    }

    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Blank out a cell when it repeats the cell directly above it.
    /// Only meaningful when the rows are sorted on that column.
    pub fn merge_on(&mut self, column: usize) {
        if !self.merge_columns.contains(&column) {
            self.merge_columns.push(column);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn merged_rows(&self) -> Vec<Vec<String>> {
        let mut rows = self.rows.clone();
        for &column in &self.merge_columns {
            let mut previous: Option<String> = None;
            for row in rows.iter_mut() {
                let Some(cell) = row.get_mut(column) else {
                    continue;
                };
                if previous.as_deref() == Some(cell.as_str()) {
                    cell.clear();
                } else {
                    previous = Some(cell.clone());
                }
            }
        }
        rows
    }

    /// Render to a string. Column widths come from content; comfy-table is
    /// Unicode-aware, so wide characters keep the grid aligned.
    pub fn render(&self) -> String {
        let mut table = comfy_table::Table::new();
        table.load_preset(UTF8_FULL);
        if !self.header.is_empty() {
            table.set_header(self.header.clone());
        }
        for row in self.merged_rows() {
            table.add_row(row);
        }
        table.to_string()
    }

    /// Render and write through the printer's result channel.
    pub fn display(&self, p: &Printer) {
        p.outputln(&self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new();
        t.set_header(["ZONE", "NAME"]);
        t.add_row(["eu01-1", "alpha"]);
        t.add_row(["eu01-1", "beta"]);
        t.add_row(["eu01-2", "gamma"]);
        t
    }

    #[test]
    fn test_render_contains_header_and_rows() {
        let rendered = sample().render();
        for needle in ["ZONE", "NAME", "alpha", "beta", "gamma"] {
            assert!(rendered.contains(needle), "missing {needle}:\n{rendered}");
        }
    }

    #[test]
    fn test_merge_blanks_repeated_cells() {
        let mut t = sample();
        t.merge_on(0);
        let rows = t.merged_rows();
        assert_eq!(rows[0][0], "eu01-1");
        assert_eq!(rows[1][0], "", "repeated zone should be blanked");
        assert_eq!(rows[2][0], "eu01-2");
    }

    #[test]
    fn test_merge_only_touches_chosen_column() {
        let mut t = Table::new();
        t.set_header(["A", "B"]);
        t.add_row(["x", "same"]);
        t.add_row(["x", "same"]);
        t.merge_on(0);
        let rows = t.merged_rows();
        assert_eq!(rows[1][1], "same", "unmerged column must keep its value");
    }

    #[test]
    fn test_unicode_rows_render() {
        let mut t = Table::new();
        t.set_header(["NAME"]);
        t.add_row(["ボリューム"]);
        let rendered = t.render();
        assert!(rendered.contains("ボリューム"));
    }

    #[test]
    fn test_empty_table_reports_empty() {
        let t = Table::new();
        assert!(t.is_empty());
        assert!(!sample().is_empty());
    }
}
