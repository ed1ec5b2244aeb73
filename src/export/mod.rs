//! XLSX export pipeline.
//!
//! Lays a screen's components out on one worksheet and packs it either into
//! a fresh workbook or, given template bytes, appends it to that workbook.
//! Any failure aborts the whole export; no partial file is produced.

mod package;
mod response;
pub(crate) mod sheet_writer;
pub(crate) mod table_writer;
pub(crate) mod zip_patcher;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::format::{AutoWidthFormatter, NoopFormatter, TableFormatter};
use crate::layout::LayoutConfig;
use crate::types::{Screen, TableBlock};
use crate::worksheet::{TableStyle, Worksheet};

pub use response::{DownloadResponse, DEFAULT_FILE_NAME};

/// Everything about an export that is not the data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub layout: LayoutConfig,
    pub table_style: TableStyle,
    pub show_grid_lines: bool,
    /// Width of every column left of the left margin; `None` leaves them default.
    pub gutter_width: Option<f64>,
    /// Size columns to their contents after each table is placed.
    pub auto_width: bool,
    /// Download name offered to the client.
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            table_style: TableStyle::default(),
            show_grid_lines: false,
            gutter_width: Some(2.0),
            auto_width: false,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl ExportOptions {
    fn formatter(&self) -> &'static dyn TableFormatter {
        if self.auto_width {
            &AutoWidthFormatter
        } else {
            &NoopFormatter
        }
    }
}

/// Lay `screen` out on a new worksheet named after its title.
///
/// # Errors
/// Fails with the first component that cannot be placed.
pub fn build_sheet(
    screen: &Screen,
    options: &ExportOptions,
    formatter: &dyn TableFormatter,
) -> Result<(Worksheet, Vec<TableBlock>)> {
    let mut sheet = Worksheet::new(&screen.title);
    sheet.show_grid_lines = options.show_grid_lines;
    if let Some(width) = options.gutter_width {
        for col in 1..options.layout.left_margin() {
            sheet.set_column_width(col, width);
        }
    }
    let blocks = sheet.fill(
        &screen.components,
        &options.layout,
        &options.table_style,
        formatter,
    )?;
    Ok((sheet, blocks))
}

/// Export `screen` as a new single-sheet workbook.
///
/// # Errors
/// Layout failures and packaging errors abort the export.
pub fn export_screen(screen: &Screen, options: &ExportOptions) -> Result<Vec<u8>> {
    export_screen_with(screen, options, options.formatter())
}

/// [`export_screen`] with a caller-supplied formatter.
///
/// # Errors
/// Layout failures and packaging errors abort the export.
pub fn export_screen_with(
    screen: &Screen,
    options: &ExportOptions,
    formatter: &dyn TableFormatter,
) -> Result<Vec<u8>> {
    let (sheet, blocks) = build_sheet(screen, options, formatter)?;
    let bytes = package::write_workbook(&sheet)?;
    info!(
        sheet = sheet.name(),
        tables = blocks.len(),
        bytes = bytes.len(),
        "exported screen"
    );
    Ok(bytes)
}

/// Export `screen` as an extra sheet appended to the workbook in `template`.
///
/// # Errors
/// Layout failures, an unusable template and packaging errors abort the export.
pub fn export_screen_into(
    template: &[u8],
    screen: &Screen,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let (sheet, blocks) = build_sheet(screen, options, options.formatter())?;
    let bytes = zip_patcher::append_sheet(template, &sheet)?;
    info!(
        sheet = sheet.name(),
        tables = blocks.len(),
        bytes = bytes.len(),
        "exported screen into template"
    );
    Ok(bytes)
}

/// Export `screen` and wrap it as an attachment download named after
/// `options.file_name`.
///
/// # Errors
/// Same as [`export_screen`].
pub fn export_download(screen: &Screen, options: &ExportOptions) -> Result<DownloadResponse> {
    let bytes = export_screen(screen, options)?;
    Ok(DownloadResponse::for_workbook(bytes, &options.file_name))
}
