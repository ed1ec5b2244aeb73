//! Generates table part XML (`xl/tables/tableN.xml`) from a [`TableDef`].
//!
//! Tables are written without an `<autoFilter>`, which leaves the header
//! filter buttons off.

use std::fmt::Write as _;

use crate::namespaces::{NS_SPREADSHEET, XML_DECLARATION};
use crate::worksheet::TableDef;
use crate::xml_helpers::xml_escape;

/// Write the XML of one table part. `id` must be unique within the workbook.
pub(crate) fn write_table_xml(table: &TableDef, id: u32) -> String {
    let name = xml_escape(&table.name);
    let mut out = String::with_capacity(512);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<table xmlns="{NS_SPREADSHEET}" id="{id}" name="{name}" displayName="{name}" ref="{}" headerRowCount="1" totalsRowShown="0">"#,
        xml_escape(&table.reference)
    );

    let _ = write!(out, r#"<tableColumns count="{}">"#, table.columns.len());
    for (column_id, column) in (1u32..).zip(&table.columns) {
        let _ = write!(
            out,
            r#"<tableColumn id="{column_id}" name="{}"/>"#,
            xml_escape(column)
        );
    }
    out.push_str("</tableColumns>");

    let style = &table.style;
    let _ = write!(
        out,
        r#"<tableStyleInfo name="{}" showFirstColumn="{}" showLastColumn="{}" showRowStripes="{}" showColumnStripes="{}"/>"#,
        xml_escape(&style.name),
        u8::from(style.show_first_column),
        u8::from(style.show_last_column),
        u8::from(style.show_row_stripes),
        u8::from(style.show_column_stripes),
    );
    out.push_str("</table>");
    out
}
