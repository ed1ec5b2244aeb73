//! Generates worksheet XML from a [`Worksheet`].
//!
//! Text cells use inline strings (`t="inlineStr"`) so no shared string
//! table has to be built or merged into a template's.

use std::fmt::Write as _;

use crate::cell_ref::column_letter_of;
use crate::error::{Result, XlstackError};
use crate::namespaces::{NS_OFFICE_RELATIONSHIPS, NS_SPREADSHEET, XML_DECLARATION};
use crate::types::Scalar;
use crate::worksheet::Worksheet;
use crate::xml_helpers::xml_escape;

/// Write a complete worksheet XML string from a `Worksheet`.
///
/// Table parts are referenced as `rId1..rIdN` in table order; the sheet's
/// relationship part must use the same ids.
pub(crate) fn write_sheet_xml(sheet: &Worksheet) -> Result<String> {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<worksheet xmlns="{NS_SPREADSHEET}" xmlns:r="{NS_OFFICE_RELATIONSHIPS}">"#
    );
    out.push('\n');

    // <dimension>
    let dimension = match sheet.used_range() {
        Some((min_col, min_row, max_col, max_row)) => format!(
            "{}{}:{}{}",
            column_letter_of(min_col)?,
            min_row,
            column_letter_of(max_col)?,
            max_row
        ),
        None => "A1".to_string(),
    };
    let _ = writeln!(out, r#"<dimension ref="{dimension}"/>"#);

    // <sheetViews>
    if sheet.show_grid_lines {
        out.push_str(r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#);
    } else {
        out.push_str(
            r#"<sheetViews><sheetView showGridLines="0" workbookViewId="0"/></sheetViews>"#,
        );
    }
    out.push('\n');

    out.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);
    out.push('\n');

    // <cols>
    let mut widths = sheet.column_widths().peekable();
    if widths.peek().is_some() {
        out.push_str("<cols>\n");
        for (col, width) in widths {
            let _ = writeln!(
                out,
                r#"<col min="{col}" max="{col}" width="{width:.4}" customWidth="1"/>"#
            );
        }
        out.push_str("</cols>\n");
    }

    // <sheetData>
    out.push_str("<sheetData>\n");
    write_sheet_data(&mut out, sheet)?;
    out.push_str("</sheetData>\n");

    // <tableParts>
    let table_count = sheet.tables().len();
    if table_count > 0 {
        let _ = write!(out, r#"<tableParts count="{table_count}">"#);
        for idx in 1..=table_count {
            let _ = write!(out, r#"<tablePart r:id="rId{idx}"/>"#);
        }
        out.push_str("</tableParts>\n");
    }

    out.push_str("</worksheet>");
    Ok(out)
}

/// Write all cell rows into `<sheetData>`.
fn write_sheet_data(out: &mut String, sheet: &Worksheet) -> Result<()> {
    let mut current_row: Option<u32> = None;
    for (row, col, value) in sheet.cells() {
        if current_row != Some(row) {
            if current_row.is_some() {
                out.push_str("</row>\n");
            }
            let _ = write!(out, r#"<row r="{row}">"#);
            current_row = Some(row);
        }
        write_cell(out, row, col, value)?;
    }
    if current_row.is_some() {
        out.push_str("</row>\n");
    }
    Ok(())
}

/// Write a single `<c>` element.
fn write_cell(out: &mut String, row: u32, col: u32, value: &Scalar) -> Result<()> {
    let cell_ref = format!("{}{}", column_letter_of(col)?, row);
    match value {
        Scalar::Null => {}
        Scalar::Text(s) => {
            let space = if s.trim() == s { "" } else { r#" xml:space="preserve""# };
            let _ = write!(
                out,
                r#"<c r="{cell_ref}" t="inlineStr"><is><t{space}>{}</t></is></c>"#,
                xml_escape(s)
            );
        }
        Scalar::Number(n) => {
            if !n.is_finite() {
                return Err(XlstackError::InvalidValue {
                    cell: cell_ref,
                    detail: format!("{n} is not a finite number"),
                });
            }
            let _ = write!(out, r#"<c r="{cell_ref}"><v>{n}</v></c>"#);
        }
        Scalar::Bool(b) => {
            let _ = write!(out, r#"<c r="{cell_ref}" t="b"><v>{}</v></c>"#, u8::from(*b));
        }
    }
    Ok(())
}
