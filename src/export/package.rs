//! Builds a fresh single-sheet XLSX package.

use std::fmt::Write as _;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::namespaces::{
    CT_RELATIONSHIPS, CT_STYLES, CT_TABLE, CT_WORKBOOK, CT_WORKSHEET, CT_XML, NS_CONTENT_TYPES,
    NS_OFFICE_RELATIONSHIPS, NS_RELATIONSHIPS, NS_SPREADSHEET, REL_OFFICE_DOCUMENT, REL_STYLES,
    REL_TABLE, REL_WORKSHEET, XML_DECLARATION,
};
use crate::worksheet::Worksheet;
use crate::xml_helpers::xml_escape;

use super::sheet_writer::write_sheet_xml;
use super::table_writer::write_table_xml;

/// Smallest stylesheet Excel accepts: one font, the two mandatory fills,
/// one border, one cell format.
const STYLES_XML: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Serialized parts belonging to one worksheet.
pub(crate) struct SheetParts {
    /// `xl/worksheets/sheetN.xml`
    pub sheet_xml: String,
    /// `xl/worksheets/_rels/sheetN.xml.rels`, present when the sheet has tables
    pub rels_xml: Option<String>,
    /// `(id, xml)` for each `xl/tables/table{id}.xml`
    pub tables: Vec<(u32, String)>,
}

/// Serialize `sheet` and its tables, numbering tables from `first_table_id`.
pub(crate) fn sheet_parts(sheet: &Worksheet, first_table_id: u32) -> Result<SheetParts> {
    let sheet_xml = write_sheet_xml(sheet)?;
    let tables: Vec<(u32, String)> = (first_table_id..)
        .zip(sheet.tables())
        .map(|(id, table)| (id, write_table_xml(table, id)))
        .collect();

    let rels_xml = if tables.is_empty() {
        None
    } else {
        let mut rels = relationships_open();
        for (rel_id, (table_id, _)) in (1u32..).zip(&tables) {
            push_relationship(
                &mut rels,
                &format!("rId{rel_id}"),
                REL_TABLE,
                &format!("../tables/{}", table_part_name(*table_id)),
            );
        }
        rels.push_str("</Relationships>");
        Some(rels)
    };

    Ok(SheetParts {
        sheet_xml,
        rels_xml,
        tables,
    })
}

pub(crate) fn table_part_name(id: u32) -> String {
    format!("table{id}.xml")
}

pub(crate) fn relationships_open() -> String {
    format!("{XML_DECLARATION}\n<Relationships xmlns=\"{NS_RELATIONSHIPS}\">")
}

pub(crate) fn push_relationship(out: &mut String, id: &str, rel_type: &str, target: &str) {
    let _ = write!(
        out,
        r#"<Relationship Id="{}" Type="{rel_type}" Target="{}"/>"#,
        xml_escape(id),
        xml_escape(target)
    );
}

pub(crate) fn content_type_override(part_name: &str, content_type: &str) -> String {
    format!(
        r#"<Override PartName="{}" ContentType="{content_type}"/>"#,
        xml_escape(part_name)
    )
}

/// Start a deflated entry and write `contents` into it.
pub(crate) fn add_part<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    name: &str,
    contents: &[u8],
) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(name, options)?;
    writer.write_all(contents)?;
    Ok(())
}

/// Write a new workbook containing only `sheet`.
pub(crate) fn write_workbook(sheet: &Worksheet) -> Result<Vec<u8>> {
    let parts = sheet_parts(sheet, 1)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    // [Content_Types].xml
    let mut content_types = format!(
        "{XML_DECLARATION}\n<Types xmlns=\"{NS_CONTENT_TYPES}\"><Default Extension=\"rels\" ContentType=\"{CT_RELATIONSHIPS}\"/><Default Extension=\"xml\" ContentType=\"{CT_XML}\"/>"
    );
    content_types.push_str(&content_type_override("/xl/workbook.xml", CT_WORKBOOK));
    content_types.push_str(&content_type_override("/xl/worksheets/sheet1.xml", CT_WORKSHEET));
    content_types.push_str(&content_type_override("/xl/styles.xml", CT_STYLES));
    for (id, _) in &parts.tables {
        content_types.push_str(&content_type_override(
            &format!("/xl/tables/{}", table_part_name(*id)),
            CT_TABLE,
        ));
    }
    content_types.push_str("</Types>");
    add_part(&mut writer, "[Content_Types].xml", content_types.as_bytes())?;

    // _rels/.rels
    let mut root_rels = relationships_open();
    push_relationship(&mut root_rels, "rId1", REL_OFFICE_DOCUMENT, "xl/workbook.xml");
    root_rels.push_str("</Relationships>");
    add_part(&mut writer, "_rels/.rels", root_rels.as_bytes())?;

    // xl/workbook.xml
    let workbook = format!(
        r#"{XML_DECLARATION}
<workbook xmlns="{NS_SPREADSHEET}" xmlns:r="{NS_OFFICE_RELATIONSHIPS}"><bookViews><workbookView/></bookViews><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        xml_escape(sheet.name())
    );
    add_part(&mut writer, "xl/workbook.xml", workbook.as_bytes())?;

    // xl/_rels/workbook.xml.rels
    let mut workbook_rels = relationships_open();
    push_relationship(&mut workbook_rels, "rId1", REL_WORKSHEET, "worksheets/sheet1.xml");
    push_relationship(&mut workbook_rels, "rId2", REL_STYLES, "styles.xml");
    workbook_rels.push_str("</Relationships>");
    add_part(&mut writer, "xl/_rels/workbook.xml.rels", workbook_rels.as_bytes())?;

    let styles = format!("{XML_DECLARATION}\n{STYLES_XML}");
    add_part(&mut writer, "xl/styles.xml", styles.as_bytes())?;

    add_part(&mut writer, "xl/worksheets/sheet1.xml", parts.sheet_xml.as_bytes())?;
    if let Some(rels) = &parts.rels_xml {
        add_part(&mut writer, "xl/worksheets/_rels/sheet1.xml.rels", rels.as_bytes())?;
    }
    for (id, xml) in &parts.tables {
        add_part(
            &mut writer,
            &format!("xl/tables/{}", table_part_name(*id)),
            xml.as_bytes(),
        )?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
