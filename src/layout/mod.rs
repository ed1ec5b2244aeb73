//! Table layout engine.
//!
//! This module handles:
//! - Deriving a component's header and value rows from its records
//! - Computing the rectangle each table occupies from its anchor
//! - Threading the anchor so tables stack without overlapping

mod table_layout;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Component, Coordinate, TableBlock};

pub use table_layout::{
    derive_columns, layout_all, next_anchor, place_table, render, to_rows, TableStack, GAP,
};

/// Where stacking starts and how far apart tables sit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Header cell of the first table.
    pub anchor: Coordinate,
    /// Blank rows between tables. Values below 1 are treated as 1.
    pub gap: u32,
    /// Column every following table re-anchors to; the anchor's column when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_margin_column: Option<u32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            anchor: Coordinate::from_parts(2, "B".to_string(), 3),
            gap: GAP,
            left_margin_column: None,
        }
    }
}

impl LayoutConfig {
    pub fn left_margin(&self) -> u32 {
        self.left_margin_column.unwrap_or(self.anchor.column())
    }

    pub(crate) fn effective_gap(&self) -> u32 {
        self.gap.max(1)
    }

    /// Lay out every component in order.
    ///
    /// # Errors
    /// Fails on the first component that cannot be placed.
    pub fn layout(&self, components: &[Component]) -> Result<Vec<TableBlock>> {
        let mut stack = TableStack::new(self);
        components.iter().map(|c| stack.place(c)).collect()
    }
}
