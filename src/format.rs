//! Presentation hooks run after each table lands on the sheet.
//!
//! Formatters may touch column widths or the table just registered, but
//! never cell positions: layout is settled before they run.

use crate::types::TableBlock;
use crate::worksheet::Worksheet;

/// Widest column [`AutoWidthFormatter`] will produce, in characters.
const MAX_AUTO_WIDTH: f64 = 60.0;

/// Strategy invoked once per placed table.
pub trait TableFormatter {
    /// `sheet.tables().last()` is the table registered for `block`.
    fn format_table(&self, sheet: &mut Worksheet, block: &TableBlock);
}

/// Leaves the sheet as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl TableFormatter for NoopFormatter {
    fn format_table(&self, _sheet: &mut Worksheet, _block: &TableBlock) {}
}

/// Widens each column a table spans to fit its longest header or value.
///
/// Widths only grow, so a narrow table never shrinks a column sized for a
/// wider one above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoWidthFormatter;

impl TableFormatter for AutoWidthFormatter {
    fn format_table(&self, sheet: &mut Worksheet, block: &TableBlock) {
        let columns = (block.origin.column()..).zip(&block.column_names).enumerate();
        for (idx, (col, header)) in columns {
            let longest = block
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|v| text_width(&v.to_string()))
                .fold(text_width(header), f64::max);
            let width = (longest + 2.0).min(MAX_AUTO_WIDTH);
            sheet.widen_column(col, width);
        }
    }
}

/// Rough character width: CJK and other wide glyphs count double.
fn text_width(s: &str) -> f64 {
    let units: u32 = s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    f64::from(units)
}
