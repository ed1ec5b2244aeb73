//! Sequential placement of component tables on one sheet.
//!
//! Every table starts at the left margin column. The next one starts `gap`
//! rows below the previous table's extent, so consecutive rectangles never
//! share a row.

use tracing::debug;

use super::LayoutConfig;
use crate::error::{Result, XlstackError};
use crate::types::{Component, Coordinate, Record, Scalar, TableBlock};

/// Blank rows between two consecutive tables.
pub const GAP: u32 = 2;

/// Column names of a component, in the first record's key order.
///
/// # Errors
/// Returns [`XlstackError::SchemaMismatch`] when there are no records, the
/// first record has no fields, or a later record's key set differs from the
/// first one's (key order may differ).
pub fn derive_columns(records: &[Record]) -> Result<Vec<String>> {
    let Some(first) = records.first() else {
        return Err(XlstackError::schema("", "no records to derive columns from"));
    };
    if first.is_empty() {
        return Err(XlstackError::schema("", "first record has no fields"));
    }

    let columns: Vec<String> = first.keys().map(str::to_string).collect();
    for (idx, record) in records.iter().enumerate().skip(1) {
        let same_set =
            record.len() == columns.len() && record.keys().all(|k| columns.iter().any(|c| c == k));
        if !same_set {
            let found: Vec<&str> = record.keys().collect();
            return Err(XlstackError::schema(
                "",
                format!("record {idx} has fields {found:?}, expected {columns:?}"),
            ));
        }
    }
    Ok(columns)
}

/// Project every record's values in `columns` order.
///
/// Missing fields come out as [`Scalar::Null`]; [`derive_columns`] rules
/// that out for validated input.
pub fn to_rows(records: &[Record], columns: &[String]) -> Vec<Vec<Scalar>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).cloned().unwrap_or(Scalar::Null))
                .collect()
        })
        .collect()
}

/// Place a component's table with its header cell at `anchor`.
///
/// The extent spans `columns - 1` columns to the right and `records + 1`
/// rows below the anchor (the header counts as a row).
///
/// # Errors
/// Propagates [`derive_columns`] failures tagged with the component id, and
/// returns [`XlstackError::InvalidAddress`] if the table would leave the sheet.
pub fn place_table(component: &Component, anchor: &Coordinate) -> Result<TableBlock> {
    let column_names =
        derive_columns(&component.rows).map_err(|e| e.in_component(&component.id))?;
    let rows = to_rows(&component.rows, &column_names);

    let column_count = u32::try_from(column_names.len()).map_err(|_| {
        XlstackError::InvalidAddress(format!("component {} is too wide", component.id))
    })?;
    let row_count = u32::try_from(rows.len())
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| {
            XlstackError::InvalidAddress(format!("component {} is too long", component.id))
        })?;

    // column_count >= 1, checked by derive_columns
    let extent = anchor.offset(column_count - 1, row_count)?;

    Ok(TableBlock {
        origin: anchor.clone(),
        extent,
        column_names,
        rows,
    })
}

/// Anchor for the table after `block`: back at the left margin, [`GAP`]
/// rows below the block's extent.
///
/// # Errors
/// Returns [`XlstackError::InvalidAddress`] if that cell is off the sheet.
pub fn next_anchor(block: &TableBlock, left_margin_column: u32) -> Result<Coordinate> {
    next_anchor_with_gap(block, left_margin_column, GAP)
}

pub(crate) fn next_anchor_with_gap(
    block: &TableBlock,
    left_margin_column: u32,
    gap: u32,
) -> Result<Coordinate> {
    let row = block.extent.row().checked_add(gap).ok_or_else(|| {
        XlstackError::InvalidAddress(format!("row after {} overflows", block.extent))
    })?;
    Coordinate::new(left_margin_column, row)
}

/// Lay out `components` top to bottom from `initial_anchor`, re-anchoring
/// every table at the initial anchor's column.
///
/// # Errors
/// Fails on the first component that cannot be placed.
pub fn layout_all(components: &[Component], initial_anchor: &Coordinate) -> Result<Vec<TableBlock>> {
    render(components, initial_anchor, initial_anchor.column())
}

/// Lay out `components` top to bottom from `initial_anchor`, re-anchoring
/// every following table at `left_margin_column`.
///
/// Returns exactly one block per component, in input order.
///
/// # Errors
/// Fails on the first component that cannot be placed.
pub fn render(
    components: &[Component],
    initial_anchor: &Coordinate,
    left_margin_column: u32,
) -> Result<Vec<TableBlock>> {
    let config = LayoutConfig {
        anchor: initial_anchor.clone(),
        gap: GAP,
        left_margin_column: Some(left_margin_column),
    };
    config.layout(components)
}

/// Threads the anchor through a sequence of placements.
#[derive(Debug, Clone)]
pub struct TableStack {
    anchor: Coordinate,
    left_margin_column: u32,
    gap: u32,
}

impl TableStack {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            anchor: config.anchor.clone(),
            left_margin_column: config.left_margin(),
            gap: config.effective_gap(),
        }
    }

    /// Where the next table will be placed.
    pub fn anchor(&self) -> &Coordinate {
        &self.anchor
    }

    /// Place `component` at the current anchor and advance past it.
    ///
    /// On error the anchor is left untouched, so a caller may skip the
    /// component and keep going.
    ///
    /// # Errors
    /// See [`place_table`] and [`next_anchor`].
    pub fn place(&mut self, component: &Component) -> Result<TableBlock> {
        let block = place_table(component, &self.anchor)?;
        let next = next_anchor_with_gap(&block, self.left_margin_column, self.gap)?;
        debug!(
            component = %component.id,
            origin = %block.origin,
            extent = %block.extent,
            anchor = %next,
            "placed table"
        );
        self.anchor = next;
        Ok(block)
    }
}
