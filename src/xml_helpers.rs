//! Shared XML helpers for writing parts and reading template parts.
//!
//! Reading goes through quick-xml and matches element names by local name,
//! so prefixed and default-namespace documents look the same.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;

/// Extract a string attribute value by key.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.parse().ok())
}

/// Call `f` for every start or empty element whose local name is `local`.
///
/// # Errors
/// Returns the first XML syntax error in `xml`.
pub fn for_each_element<F>(xml: &str, local: &[u8], mut f: F) -> Result<()>
where
    F: FnMut(&BytesStart),
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == local => f(e),
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Escape text for element content and attribute values.
///
/// Control characters XML 1.0 cannot carry are dropped.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() && u32::from(c) < 0x20 => {}
            _ => out.push(c),
        }
    }
    out
}
