//! Structured error types for xlstack.
//!
//! Address and schema failures come from the layout core; the rest are
//! raised by the packaging collaborators around it.

/// All errors that can occur while laying out and exporting a screen.
#[derive(Debug, thiserror::Error)]
pub enum XlstackError {
    /// Malformed or out-of-range cell reference or column letter.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A component's records do not share one field set.
    #[error("Schema mismatch in component {component}: {detail}")]
    SchemaMismatch { component: String, detail: String },

    /// A cell value the file format cannot store.
    #[error("Invalid cell value at {cell}: {detail}")]
    InvalidValue { cell: String, detail: String },

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A template workbook is missing a part we need to patch.
    #[error("Template: {0}")]
    Template(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlstackError>;

impl XlstackError {
    pub(crate) fn invalid_address(input: &str, reason: &str) -> Self {
        Self::InvalidAddress(format!("{input:?}: {reason}"))
    }

    pub(crate) fn schema(component: &str, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            component: component.to_string(),
            detail: detail.into(),
        }
    }

    /// Attach a component id to a schema error raised without one.
    pub(crate) fn in_component(self, id: &str) -> Self {
        match self {
            Self::SchemaMismatch { component, detail } if component.is_empty() => {
                Self::SchemaMismatch {
                    component: id.to_string(),
                    detail,
                }
            }
            other => other,
        }
    }
}

