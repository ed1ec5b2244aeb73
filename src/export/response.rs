//! The download response a web layer sends back with an exported workbook.
//!
//! No HTTP types here: a status code and header pairs are enough for any
//! server framework to copy over.

use crate::namespaces::MIME_XLSX;

/// File name offered when the caller does not pick one.
pub const DEFAULT_FILE_NAME: &str = "画板数据导出.xlsx";

/// Status, headers and body of a workbook download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl DownloadResponse {
    /// Attachment response for `body`, never cached by the client.
    pub fn for_workbook(body: Vec<u8>, file_name: &str) -> Self {
        let headers = vec![
            ("Content-Type".to_string(), MIME_XLSX.to_string()),
            (
                "Content-Disposition".to_string(),
                content_disposition(file_name),
            ),
            ("Content-Length".to_string(), body.len().to_string()),
            (
                "Cache-Control".to_string(),
                "no-cache, no-store, must-revalidate".to_string(),
            ),
            ("Pragma".to_string(), "no-cache".to_string()),
            ("Expires".to_string(), "0".to_string()),
        ];
        Self {
            status: 200,
            headers,
            body,
        }
    }

    /// First header with this name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// name in RFC 5987 form.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if fallback == file_name {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let res = DownloadResponse::for_workbook(vec![1, 2, 3], "report.xlsx");
        assert_eq!(res.status, 200);
        assert_eq!(res.header("content-type"), Some(MIME_XLSX));
        assert_eq!(res.header("Content-Length"), Some("3"));
        assert_eq!(
            res.header("Content-Disposition"),
            Some("attachment; filename=\"report.xlsx\"")
        );
        assert_eq!(
            res.header("Cache-Control"),
            Some("no-cache, no-store, must-revalidate")
        );
        assert_eq!(res.header("Pragma"), Some("no-cache"));
        assert_eq!(res.header("Expires"), Some("0"));
    }

    #[test]
    fn test_non_ascii_file_name() {
        let res = DownloadResponse::for_workbook(Vec::new(), "数据.xlsx");
        assert_eq!(
            res.header("Content-Disposition"),
            Some("attachment; filename=\"__.xlsx\"; filename*=UTF-8''%E6%95%B0%E6%8D%AE.xlsx")
        );
    }
}
