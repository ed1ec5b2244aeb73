//! Conversions between Excel-style cell references and coordinates.
//!
//! Columns use the bijective base-26 scheme (`A` = 1, `Z` = 26, `AA` = 27)
//! up to the format's last column, `XFD`. Rows are 1-based.

use crate::error::{Result, XlstackError};
use crate::types::Coordinate;

/// Highest column index a worksheet can address (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Highest row index a worksheet can address.
pub const MAX_ROW: u32 = 1_048_576;

/// Resolve column letters (`"B"`, `"AA"`) to a 1-based column index.
///
/// # Errors
/// Returns [`XlstackError::InvalidAddress`] for empty input, anything other
/// than uppercase `A`-`Z`, or a column past `XFD`.
pub fn column_index_of(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(XlstackError::invalid_address(letters, "empty column"));
    }
    if letters.len() > 3 {
        return Err(XlstackError::invalid_address(letters, "column past XFD"));
    }

    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(XlstackError::invalid_address(
                letters,
                "column must be uppercase A-Z",
            ));
        }
        col = col * 26 + u32::from(b - b'A') + 1;
    }

    if col > MAX_COLUMN {
        return Err(XlstackError::invalid_address(letters, "column past XFD"));
    }
    Ok(col)
}

/// Encode a 1-based column index as letters (`2` -> `"B"`, `27` -> `"AA"`).
///
/// # Errors
/// Returns [`XlstackError::InvalidAddress`] when `index` is outside `1..=16384`.
pub fn column_letter_of(index: u32) -> Result<String> {
    if index == 0 || index > MAX_COLUMN {
        return Err(XlstackError::InvalidAddress(format!(
            "column index {index} outside 1..={MAX_COLUMN}"
        )));
    }

    let mut letters = Vec::with_capacity(3);
    let mut n = index;
    while n > 0 {
        n -= 1;
        // n % 26 < 26
        #[allow(clippy::cast_possible_truncation)]
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    Ok(letters.into_iter().map(char::from).collect())
}

/// Parse a reference like `"B3"` or `"AA12"` into a [`Coordinate`].
///
/// Only the plain `LETTERS DIGITS` shape is accepted: no `$` markers, no
/// whitespace, no lowercase, no leading zeros in the row.
///
/// # Errors
/// Returns [`XlstackError::InvalidAddress`] when the reference does not have
/// that shape or addresses a cell outside the sheet.
pub fn parse_cell(reference: &str) -> Result<Coordinate> {
    let split = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    let (letters, digits) = reference.split_at(split);

    if letters.is_empty() {
        return Err(XlstackError::invalid_address(
            reference,
            "missing column letters",
        ));
    }
    if digits.is_empty() {
        return Err(XlstackError::invalid_address(reference, "missing row number"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(XlstackError::invalid_address(
            reference,
            "row must be decimal digits",
        ));
    }
    if digits.starts_with('0') {
        return Err(XlstackError::invalid_address(reference, "row must start at 1"));
    }

    let column = column_index_of(letters)?;
    let row: u32 = digits
        .parse()
        .map_err(|_| XlstackError::invalid_address(reference, "row out of range"))?;
    if row > MAX_ROW {
        return Err(XlstackError::invalid_address(reference, "row out of range"));
    }

    Ok(Coordinate::from_parts(column, letters.to_string(), row))
}

/// Format a coordinate back into its reference, e.g. `"B3"`.
pub fn format_cell(coord: &Coordinate) -> String {
    format!("{}{}", coord.letter(), coord.row())
}

/// Format a rectangle as a range reference like `"B3:E8"`.
pub fn format_range(from: &Coordinate, to: &Coordinate) -> String {
    format!("{}:{}", format_cell(from), format_cell(to))
}
