//! Charset normalization for the report page body.
//!
//! The portal serves the report in a legacy single-byte charset, so the raw
//! bytes must be transcoded to UTF-8 before parsing or non-ASCII label text
//! is corrupted. Resolution order follows what browsers do: BOM, then the
//! transport-level `Content-Type` charset, then a `<meta>` prescan of the
//! first kilobyte, then windows-1252.

use encoding_rs::Encoding;

use crate::error::ScrapeError;

/// How many leading bytes the `<meta>` prescan inspects.
const PRESCAN_BYTES: usize = 1024;

/// Decode a response body to UTF-8 text.
///
/// # Errors
///
/// Returns [`ScrapeError::Encoding`] when the bytes contain sequences that
/// are malformed under the resolved charset.
pub fn normalize(bytes: &[u8], content_type: Option<&str>) -> Result<String, ScrapeError> {
    let encoding = resolve_encoding(bytes, content_type);
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ScrapeError::Encoding {
            charset: actual.name().to_string(),
        });
    }
    tracing::debug!(charset = actual.name(), bytes = bytes.len(), "decoded report body");
    Ok(text.into_owned())
}

fn resolve_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return encoding;
    }
    if let Some(encoding) = prescan_meta_charset(bytes) {
        return encoding;
    }
    encoding_rs::WINDOWS_1252
}

/// Extract the `charset` parameter from a `Content-Type` header value.
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let lower = content_type.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let rest = &content_type[start..];
    let label = rest
        .trim_start_matches(['"', '\''])
        .split([';', '"', '\'', ' '])
        .next()?
        .trim();
    Encoding::for_label(label.as_bytes())
}

/// Look for `charset=` inside the first kilobyte of the document, the way
/// the HTML standard's encoding prescan does for `<meta charset>` and
/// `<meta http-equiv="content-type">` declarations.
fn prescan_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let prefix = &bytes[..bytes.len().min(PRESCAN_BYTES)];
    let haystack = String::from_utf8_lossy(prefix).to_ascii_lowercase();
    let start = haystack.find("charset=")? + "charset=".len();
    let label: String = haystack[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | ';' | '>' | '/' | ' ' | '\t' | '\n' | '\r'))
        .collect();
    Encoding::for_label(label.trim().as_bytes())
}
