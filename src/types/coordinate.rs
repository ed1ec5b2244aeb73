use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cell_ref::{column_letter_of, format_cell, parse_cell, MAX_ROW};
use crate::error::{Result, XlstackError};

/// A single cell position: 1-based column, its letters, and 1-based row.
///
/// Fields are private so `letter` always matches `column`. Serializes as
/// `{column, letter, row}`; deserializes from that map or from a reference
/// string such as `"B3"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CoordinateRepr")]
pub struct Coordinate {
    column: u32,
    letter: String,
    row: u32,
}

impl Coordinate {
    /// Build a coordinate from a column index and row.
    ///
    /// # Errors
    /// Returns [`XlstackError::InvalidAddress`] if either axis is off the sheet.
    pub fn new(column: u32, row: u32) -> Result<Self> {
        if row == 0 || row > MAX_ROW {
            return Err(XlstackError::InvalidAddress(format!(
                "row {row} outside 1..={MAX_ROW}"
            )));
        }
        let letter = column_letter_of(column)?;
        Ok(Self {
            column,
            letter,
            row,
        })
    }

    /// Caller guarantees `letter` encodes `column` and `row` is in range.
    pub(crate) fn from_parts(column: u32, letter: String, row: u32) -> Self {
        Self {
            column,
            letter,
            row,
        }
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn letter(&self) -> &str {
        &self.letter
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Coordinate `columns` to the right and `rows` below this one.
    ///
    /// # Errors
    /// Returns [`XlstackError::InvalidAddress`] if the result leaves the sheet.
    pub fn offset(&self, columns: u32, rows: u32) -> Result<Self> {
        let column = self.column.checked_add(columns).ok_or_else(|| {
            XlstackError::InvalidAddress(format!("{self} + {columns} columns overflows"))
        })?;
        let row = self.row.checked_add(rows).ok_or_else(|| {
            XlstackError::InvalidAddress(format!("{self} + {rows} rows overflows"))
        })?;
        Self::new(column, row)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cell(self))
    }
}

impl FromStr for Coordinate {
    type Err = XlstackError;

    fn from_str(s: &str) -> Result<Self> {
        parse_cell(s)
    }
}

/// Accepted input shapes for a [`Coordinate`].
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Reference(String),
    Parts {
        column: u32,
        #[serde(default)]
        letter: Option<String>,
        row: u32,
    },
}

impl TryFrom<CoordinateRepr> for Coordinate {
    type Error = XlstackError;

    fn try_from(repr: CoordinateRepr) -> Result<Self> {
        match repr {
            CoordinateRepr::Reference(s) => Self::try_from(s),
            CoordinateRepr::Parts {
                column,
                letter,
                row,
            } => {
                let coord = Self::new(column, row)?;
                match letter {
                    Some(l) if l != coord.letter => Err(XlstackError::InvalidAddress(
                        format!("letter {l:?} does not match column {column}"),
                    )),
                    _ => Ok(coord),
                }
            }
        }
    }
}

impl TryFrom<String> for Coordinate {
    type Error = XlstackError;

    fn try_from(s: String) -> Result<Self> {
        parse_cell(&s)
    }
}
