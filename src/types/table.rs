use serde::Serialize;

use super::{Coordinate, Scalar};
use crate::cell_ref::format_range;

/// The rectangle one component occupies on the sheet, plus its cell values.
///
/// `origin` is the header's first cell; `extent` is the bottom-right cell.
/// The header row is included in the rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBlock {
    pub origin: Coordinate,
    pub extent: Coordinate,
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl TableBlock {
    /// Range reference of the whole rectangle, e.g. `"B3:E8"`.
    ///
    /// This is also the ref of the table object registered for the block.
    pub fn range_ref(&self) -> String {
        format_range(&self.origin, &self.extent)
    }

    pub fn column_count(&self) -> u32 {
        self.extent.column().saturating_sub(self.origin.column()) + 1
    }
}
