//! Shared fixtures and archive helpers for the integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use xlstack::{Component, Record, Screen};

// ============================================================================
// Screen fixtures
// ============================================================================

/// Four rows, four columns: name, value, increase, decrease.
pub fn staffing_component() -> Component {
    let rows = [("后台", 14), ("前端", 20), ("测试", 7), ("数据", 8)]
        .into_iter()
        .map(|(name, value)| {
            Record::new()
                .with("name", name)
                .with("value", value)
                .with("increase", 0)
                .with("decrease", 1)
        })
        .collect();
    Component {
        id: "121231231231231".into(),
        title: "人力分布".into(),
        kind_label: "表格".into(),
        rows,
    }
}

/// Four rows, two columns: name, value.
pub fn project_component() -> Component {
    let rows = [("2020-1", 14), ("2020-2", 20), ("2020-3", 7), ("2020-4", 8)]
        .into_iter()
        .map(|(name, value)| Record::new().with("name", name).with("value", value))
        .collect();
    Component {
        id: "121231231231232".into(),
        title: "项目情况".into(),
        kind_label: "柱状图".into(),
        rows,
    }
}

/// `n` rows of a single `k` column.
pub fn narrow_component(id: &str, n: usize) -> Component {
    Component {
        id: id.into(),
        rows: (0..n).map(|i| Record::new().with("k", i.to_string())).collect(),
        ..Default::default()
    }
}

pub fn sample_screen() -> Screen {
    Screen {
        title: "页面1".into(),
        components: vec![staffing_component(), project_component()],
    }
}

// ============================================================================
// Archive helpers
// ============================================================================

/// Names of all entries in an XLSX archive.
pub fn part_names(xlsx: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(xlsx)).expect("valid zip");
    archive.file_names().map(str::to_string).collect()
}

/// Read one entry as UTF-8, or `None` if it is missing.
pub fn read_part(xlsx: &[u8], name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).expect("valid zip");
    let mut file = archive.by_name(name).ok()?;
    let mut out = String::new();
    file.read_to_string(&mut out).expect("utf-8 part");
    Some(out)
}

/// Build a minimal XLSX in memory with one sheet named `sheet_name` and,
/// optionally, one table part.
pub fn create_template(sheet_name: &str, table: Option<(&str, u32)>) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        let options = FileOptions::default();

        // [Content_Types].xml
        zip.start_file("[Content_Types].xml", options).unwrap();
        let mut content_types = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#
            .to_string();
        if table.is_some() {
            content_types.push_str(r#"<Override PartName="/xl/tables/table1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#);
        }
        content_types.push_str("</Types>");
        zip.write_all(content_types.as_bytes()).unwrap();

        // _rels/.rels
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#).unwrap();

        // xl/_rels/workbook.xml.rels
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#).unwrap();

        // xl/workbook.xml
        zip.start_file("xl/workbook.xml", options).unwrap();
        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="{sheet_name}" sheetId="1" r:id="rId1"/>
</sheets>
</workbook>"#
        );
        zip.write_all(workbook.as_bytes()).unwrap();

        // xl/styles.xml
        zip.start_file("xl/styles.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"/>"#)
            .unwrap();

        // xl/worksheets/sheet1.xml
        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>cover</t></is></c></row></sheetData></worksheet>"#)
            .unwrap();

        if let Some((name, id)) = table {
            zip.start_file("xl/tables/table1.xml", options).unwrap();
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{id}" name="{name}" displayName="{name}" ref="A1:A2"><tableColumns count="1"><tableColumn id="1" name="cover"/></tableColumns></table>"#
            );
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
    buf.into_inner()
}
