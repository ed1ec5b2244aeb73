//! xlstack - stack screen components into one XLSX worksheet
//!
//! Turns a screen of tabular components into a single worksheet where every
//! component becomes a table placed below the previous one:
//! - Cell reference algebra (`"B3"` <-> column/row, `A`..`XFD`)
//! - Sequential, non-overlapping table layout from a fixed anchor
//! - Worksheet model with native table objects and pluggable formatting
//! - XLSX packaging, fresh or appended to a template workbook
//!
//! # Usage (Rust)
//!
//! ```rust,ignore
//! use xlstack::{export_screen, ExportOptions, Screen};
//!
//! let screen: Screen = serde_json::from_str(json)?;
//! let bytes = export_screen(&screen, &ExportOptions::default())?;
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { export_screen_json } from 'xlstack';
//! await init();
//! const bytes = export_screen_json(JSON.stringify(screen));
//! ```

pub mod cell_ref;
pub mod error;
pub mod export;
pub mod format;
pub mod layout;
pub mod namespaces;
pub mod types;
pub mod worksheet;
pub mod xml_helpers;

use wasm_bindgen::prelude::*;

pub use error::XlstackError;
pub use export::{
    build_sheet, export_download, export_screen, export_screen_into, export_screen_with,
    DownloadResponse, ExportOptions,
};
pub use format::{AutoWidthFormatter, NoopFormatter, TableFormatter};
pub use layout::{layout_all, render, LayoutConfig};
pub use types::*;
pub use worksheet::{TableDef, TableStyle, Worksheet};

/// Export a screen given as JSON and return the XLSX bytes.
///
/// # Arguments
/// * `screen_json` - `{"title": ..., "components": [...]}`
/// * `options_json` - optional [`ExportOptions`] as JSON; defaults when empty
///
/// # Errors
/// Returns an error if the JSON is invalid or the screen cannot be laid out.
#[wasm_bindgen]
pub fn export_screen_json(screen_json: &str, options_json: Option<String>) -> Result<Vec<u8>, JsValue> {
    let screen: Screen =
        serde_json::from_str(screen_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options = parse_options(options_json.as_deref())?;
    export_screen(&screen, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Lay out a screen given as JSON and return the table blocks as a `JsValue`.
///
/// Nothing is packaged; useful for previewing where each table will land.
///
/// # Errors
/// Returns an error if the JSON is invalid or the screen cannot be laid out.
#[wasm_bindgen]
pub fn layout_screen_json(screen_json: &str, options_json: Option<String>) -> Result<JsValue, JsValue> {
    let screen: Screen =
        serde_json::from_str(screen_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options = parse_options(options_json.as_deref())?;
    let blocks = options
        .layout
        .layout(&screen.components)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&blocks)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn parse_options(json: Option<&str>) -> Result<ExportOptions, JsValue> {
    match json {
        Some(s) if !s.trim().is_empty() => {
            serde_json::from_str(s).map_err(|e| JsValue::from_str(&e.to_string()))
        }
        _ => Ok(ExportOptions::default()),
    }
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
