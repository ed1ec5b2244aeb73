//! Append a rendered worksheet to an existing XLSX archive.
//!
//! Unmodified entries are copied via `raw_copy_file` (zero recompression cost).
//! Only the workbook, its relationships and the content types are rewritten,
//! each by splicing new elements in front of a closing tag, so whatever the
//! template carries (styles, themes, other sheets) passes through untouched.

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Result, XlstackError};
use crate::namespaces::{CT_TABLE, CT_WORKSHEET, NS_OFFICE_RELATIONSHIPS, REL_WORKSHEET};
use crate::worksheet::Worksheet;
use crate::xml_helpers::{attr_string, attr_u32, for_each_element, xml_escape};

use super::package::{
    add_part, content_type_override, push_relationship, sheet_parts, table_part_name,
};

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// Longest sheet name the format allows.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// What the template already uses, so new parts get fresh names and ids.
#[derive(Debug, Default)]
struct TemplateInventory {
    sheet_names: Vec<String>,
    max_sheet_id: u32,
    rel_ids: HashSet<String>,
    max_sheet_file: u32,
    max_table_id: u32,
    table_names: HashSet<String>,
}

impl TemplateInventory {
    fn next_rel_id(&self) -> String {
        let mut n = self.rel_ids.len() + 1;
        loop {
            let id = format!("rId{n}");
            if !self.rel_ids.contains(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn sheet_name_taken(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.sheet_names.iter().any(|n| n.to_lowercase() == lower)
    }

    /// `name`, or `name (2)`, `name (3)`, ... trimmed to fit 31 characters.
    fn unique_sheet_name(&self, name: &str) -> String {
        if !self.sheet_name_taken(name) {
            return name.to_string();
        }
        let mut n = 2u32;
        loop {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            let candidate: String = name.chars().take(keep).chain(suffix.chars()).collect();
            if !self.sheet_name_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn unique_table_name(&self, name: &str, claimed: &HashSet<String>) -> String {
        let taken = |n: &str| {
            let lower = n.to_lowercase();
            self.table_names.contains(&lower) || claimed.contains(&lower)
        };
        if !taken(name) {
            return name.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{name}_{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Append `sheet` (and its tables) to the workbook in `template`.
///
/// Returns the new XLSX file as `Vec<u8>`. The sheet and table names are
/// suffixed if the template already uses them.
///
/// # Errors
/// Returns [`XlstackError::Template`] if the template lacks a workbook,
/// its relationships or content types, and ZIP/XML errors as they occur.
pub(crate) fn append_sheet(template: &[u8], sheet: &Worksheet) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))?;

    let content_types = read_required(&mut archive, CONTENT_TYPES)?;
    let workbook = read_required(&mut archive, WORKBOOK)?;
    let workbook_rels = read_required(&mut archive, WORKBOOK_RELS)?;
    let inventory = take_inventory(&mut archive, &workbook, &workbook_rels)?;

    // Rename what collides, then serialize.
    let mut sheet = sheet.clone();
    sheet.rename(inventory.unique_sheet_name(sheet.name()));
    let mut claimed = HashSet::new();
    for table in sheet.tables_mut() {
        table.name = inventory.unique_table_name(&table.name, &claimed);
        claimed.insert(table.name.to_lowercase());
    }

    let sheet_file = inventory.max_sheet_file + 1;
    let sheet_id = inventory.max_sheet_id + 1;
    let rel_id = inventory.next_rel_id();
    let parts = sheet_parts(&sheet, inventory.max_table_id + 1)?;
    debug!(
        sheet = sheet.name(),
        sheet_file,
        sheet_id,
        rel_id = %rel_id,
        "appending sheet to template"
    );

    let sheet_path = format!("xl/worksheets/sheet{sheet_file}.xml");

    // [Content_Types].xml
    let mut overrides = content_type_override(&format!("/{sheet_path}"), CT_WORKSHEET);
    for (id, _) in &parts.tables {
        overrides.push_str(&content_type_override(
            &format!("/xl/tables/{}", table_part_name(*id)),
            CT_TABLE,
        ));
    }
    let content_types = insert_before_closing(&content_types, b"Types", |_| overrides)?;

    // xl/workbook.xml
    let workbook = insert_before_closing(&workbook, b"sheets", |prefix| {
        format!(
            r#"<{prefix}sheet xmlns:r="{NS_OFFICE_RELATIONSHIPS}" name="{}" sheetId="{sheet_id}" r:id="{}"/>"#,
            xml_escape(sheet.name()),
            xml_escape(&rel_id)
        )
    })?;

    // xl/_rels/workbook.xml.rels
    let workbook_rels = insert_before_closing(&workbook_rels, b"Relationships", |prefix| {
        let mut rel = String::new();
        push_relationship(
            &mut rel,
            &rel_id,
            REL_WORKSHEET,
            &format!("worksheets/sheet{sheet_file}.xml"),
        );
        if prefix.is_empty() {
            rel
        } else {
            rel.replacen("<Relationship ", &format!("<{prefix}Relationship "), 1)
        }
    })?;

    let buf: Vec<u8> = Vec::with_capacity(template.len() + parts.sheet_xml.len());
    let mut writer = ZipWriter::new(Cursor::new(buf));

    // Copy all entries, replacing the three patched ones
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();
        let replacement = match name.as_str() {
            CONTENT_TYPES => Some(&content_types),
            WORKBOOK => Some(&workbook),
            WORKBOOK_RELS => Some(&workbook_rels),
            _ => None,
        };
        match replacement {
            Some(xml) => {
                drop(entry);
                add_part(&mut writer, &name, xml.as_bytes())?;
            }
            // Pass through unmodified entry (raw copy, no re-compression)
            None => writer.raw_copy_file(entry)?,
        }
    }

    add_part(&mut writer, &sheet_path, parts.sheet_xml.as_bytes())?;
    if let Some(rels) = &parts.rels_xml {
        add_part(
            &mut writer,
            &format!("xl/worksheets/_rels/sheet{sheet_file}.xml.rels"),
            rels.as_bytes(),
        )?;
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

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_required<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    read_entry(archive, name)?
        .ok_or_else(|| XlstackError::Template(format!("missing part {name}")))
}

/// Trailing number of a part path like `xl/tables/table12.xml`.
fn part_number(name: &str, prefix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn take_inventory<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    workbook: &str,
    workbook_rels: &str,
) -> Result<TemplateInventory> {
    let mut inv = TemplateInventory::default();

    for_each_element(workbook, b"sheet", |e| {
        inv.sheet_names.extend(attr_string(e, b"name"));
        if let Some(id) = attr_u32(e, b"sheetId") {
            inv.max_sheet_id = inv.max_sheet_id.max(id);
        }
    })?;
    for_each_element(workbook_rels, b"Relationship", |e| {
        inv.rel_ids.extend(attr_string(e, b"Id"));
    })?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    for name in &names {
        if let Some(n) = part_number(name, "xl/worksheets/sheet") {
            inv.max_sheet_file = inv.max_sheet_file.max(n);
        }
        if let Some(n) = part_number(name, "xl/tables/table") {
            inv.max_table_id = inv.max_table_id.max(n);
            if let Some(xml) = read_entry(archive, name)? {
                for_each_element(&xml, b"table", |e| {
                    if let Some(id) = attr_u32(e, b"id") {
                        inv.max_table_id = inv.max_table_id.max(id);
                    }
                    let keys: [&[u8]; 2] = [b"name", b"displayName"];
                    for key in keys {
                        inv.table_names
                            .extend(attr_string(e, key).map(|n| n.to_lowercase()));
                    }
                })?;
            }
        }
    }
    Ok(inv)
}

/// Insert the markup built by `make` right before the closing tag of the
/// first element whose local name is `local`.
///
/// `make` receives the element's namespace prefix including the colon
/// (`""` for the default namespace) so the new markup can match it.
fn insert_before_closing<F>(xml: &str, local: &[u8], make: F) -> Result<String>
where
    F: FnOnce(&str) -> String,
{
    let mut reader = Reader::from_str(xml);
    loop {
        let before = reader.buffer_position();
        match reader.read_event()? {
            Event::End(e) if e.local_name().as_ref() == local => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let prefix = match qname.split_once(':') {
                    Some((p, _)) => format!("{p}:"),
                    None => String::new(),
                };
                let (head, tail) = match (xml.get(..before), xml.get(before..)) {
                    (Some(h), Some(t)) => (h, t),
                    _ => break,
                };
                let insert = make(&prefix);
                let mut out = String::with_capacity(xml.len() + insert.len());
                out.push_str(head);
                out.push_str(&insert);
                out.push_str(tail);
                return Ok(out);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(XlstackError::Template(format!(
        "no closing </{}> to insert into",
        String::from_utf8_lossy(local)
    )))
}
