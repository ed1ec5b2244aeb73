//! In-memory worksheet that receives placed table blocks.
//!
//! Cells are keyed by 1-based `(row, col)` so iteration yields them in the
//! order `<sheetData>` wants.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::format::TableFormatter;
use crate::layout::{LayoutConfig, TableStack};
use crate::types::{Component, Scalar, TableBlock};

/// Sheet name used when a screen has no title.
pub const DEFAULT_SHEET_NAME: &str = "页面";

/// Longest sheet name the format allows.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Longest table name the format allows.
const MAX_TABLE_NAME_CHARS: usize = 255;

/// Built-in table style and the banding flags that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    pub name: String,
    pub show_row_stripes: bool,
    pub show_column_stripes: bool,
    pub show_first_column: bool,
    pub show_last_column: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            name: "TableStyleDark3".to_string(),
            show_row_stripes: true,
            show_column_stripes: false,
            show_first_column: false,
            show_last_column: false,
        }
    }
}

/// A table object registered over a rectangle of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Workbook-unique name, also used as display name.
    pub name: String,
    /// The block's whole rectangle, e.g. `"B3:E8"`.
    pub reference: String,
    /// Header texts, unique ignoring case.
    pub columns: Vec<String>,
    pub style: TableStyle,
}

/// One worksheet's cells, tables and column settings.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Scalar>,
    tables: Vec<TableDef>,
    column_widths: BTreeMap<u32, f64>,
    pub show_grid_lines: bool,
}

impl Worksheet {
    /// Empty sheet; the name is cleaned up to what the format accepts.
    pub fn new(name: &str) -> Self {
        Self {
            name: sanitize_sheet_name(name),
            cells: BTreeMap::new(),
            tables: Vec::new(),
            column_widths: BTreeMap::new(),
            show_grid_lines: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// Set a cell; `Null` clears it.
    pub fn set_cell(&mut self, col: u32, row: u32, value: Scalar) {
        if matches!(value, Scalar::Null) {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    pub fn cell(&self, col: u32, row: u32) -> Option<&Scalar> {
        self.cells.get(&(row, col))
    }

    /// Non-empty cells in row-major order as `(row, col, value)`.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &Scalar)> {
        self.cells.iter().map(|(&(row, col), v)| (row, col, v))
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [TableDef] {
        &mut self.tables
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Set a width unless the column is already at least that wide.
    pub fn widen_column(&mut self, col: u32, width: f64) {
        let entry = self.column_widths.entry(col).or_insert(width);
        *entry = entry.max(width);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Custom widths as `(col, width)` in column order.
    pub fn column_widths(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.column_widths.iter().map(|(&c, &w)| (c, w))
    }

    /// Bounding box of the written cells as `(min_col, min_row, max_col, max_row)`.
    pub fn used_range(&self) -> Option<(u32, u32, u32, u32)> {
        let (&(first_row, _), _) = self.cells.first_key_value()?;
        let (&(last_row, _), _) = self.cells.last_key_value()?;
        let min_col = self.cells.keys().map(|&(_, c)| c).min()?;
        let max_col = self.cells.keys().map(|&(_, c)| c).max()?;
        Some((min_col, first_row, max_col, last_row))
    }

    /// Write `block` for `component`: header at the origin row, record `i`
    /// at `origin.row + 1 + i`, field `j` at `origin.column + j`, then
    /// register the table over the header and data rows.
    pub fn write_block(&mut self, component: &Component, block: &TableBlock, style: &TableStyle) {
        let headers = unique_headers(&block.column_names);
        let origin_row = block.origin.row();
        let origin_col = block.origin.column();

        for (col, header) in (origin_col..).zip(&headers) {
            self.set_cell(col, origin_row, Scalar::Text(header.clone()));
        }
        for (row, values) in (origin_row + 1..).zip(&block.rows) {
            for (col, value) in (origin_col..).zip(values) {
                self.set_cell(col, row, value.clone());
            }
        }

        let name = self.unique_table_name(&component.id);
        self.tables.push(TableDef {
            name,
            reference: block.range_ref(),
            columns: headers,
            style: style.clone(),
        });
    }

    /// Lay out `components` from `config`, writing each block and running
    /// `formatter` on it before the next one is placed.
    ///
    /// # Errors
    /// Fails on the first component that cannot be placed; the sheet keeps
    /// the blocks written before it.
    pub fn fill(
        &mut self,
        components: &[Component],
        config: &LayoutConfig,
        style: &TableStyle,
        formatter: &dyn TableFormatter,
    ) -> Result<Vec<TableBlock>> {
        let mut stack = TableStack::new(config);
        let mut blocks = Vec::with_capacity(components.len());
        for component in components {
            let block = stack.place(component)?;
            self.write_block(component, &block, style);
            formatter.format_table(self, &block);
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn unique_table_name(&self, id: &str) -> String {
        let cleaned: String = id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        let base: String = format!("Component{cleaned}")
            .chars()
            .take(MAX_TABLE_NAME_CHARS - 8)
            .collect();
        let taken = |n: &str| self.tables.iter().any(|t| t.name.eq_ignore_ascii_case(n));
        if !taken(&base) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}_{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Make header texts usable as table column names: non-empty and unique
/// ignoring case (`name`, `Name2`, ...).
fn unique_headers(names: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Column{}", idx + 1)
        } else {
            name.clone()
        };
        let mut candidate = base.clone();
        let mut n = 2u32;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{base}{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

/// Clean a sheet name: forbidden characters dropped, at most 31 chars,
/// falling back to [`DEFAULT_SHEET_NAME`].
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::format::NoopFormatter;
    use crate::types::Record;

    fn component(id: &str, rows: Vec<Record>) -> Component {
        Component {
            id: id.into(),
            rows,
            ..Default::default()
        }
    }

    #[test]
    fn test_block_cells_land_below_header() {
        let c = component(
            "121231231231231",
            vec![
                Record::new().with("name", "后台").with("value", 14),
                Record::new().with("name", "前端").with("value", 20),
            ],
        );
        let mut sheet = Worksheet::new("页面1");
        let blocks = sheet
            .fill(
                std::slice::from_ref(&c),
                &LayoutConfig::default(),
                &TableStyle::default(),
                &NoopFormatter,
            )
            .unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(sheet.cell(2, 3), Some(&Scalar::from("name")));
        assert_eq!(sheet.cell(3, 3), Some(&Scalar::from("value")));
        assert_eq!(sheet.cell(2, 4), Some(&Scalar::from("后台")));
        assert_eq!(sheet.cell(3, 5), Some(&Scalar::from(20)));
        assert_eq!(sheet.used_range(), Some((2, 3, 3, 5)));

        let table = &sheet.tables()[0];
        assert_eq!(table.name, "Component121231231231231");
        assert_eq!(table.reference, "B3:C6");
    }

    #[test]
    fn test_table_names_are_unique() {
        let rows = vec![Record::new().with("a", 1)];
        let mut sheet = Worksheet::new("s");
        let config = LayoutConfig::default();
        let comps = vec![component("x-1", rows.clone()), component("x1", rows)];
        sheet
            .fill(&comps, &config, &TableStyle::default(), &NoopFormatter)
            .unwrap();
        let names: Vec<&str> = sheet.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Componentx1", "Componentx1_2"]);
    }

    #[test]
    fn test_headers_unique_ignoring_case() {
        let names = vec!["name".to_string(), "Name".to_string(), String::new()];
        assert_eq!(unique_headers(&names), vec!["name", "Name2", "Column3"]);
    }

    #[test]
    fn test_sheet_name_cleanup() {
        assert_eq!(sanitize_sheet_name(""), DEFAULT_SHEET_NAME);
        assert_eq!(sanitize_sheet_name("a/b:c"), "abc");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
    }
}
