//! Character encoding handling for fetched pages and uploaded files.
//!
//! Transports hand the fetch layer raw bytes; uploaded `.txt` files arrive
//! the same way. Both are converted to UTF-8 here before any parsing, with
//! invalid sequences replaced by the Unicode replacement character rather
//! than failing the extraction.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match `<meta charset="...">`.
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("META_CHARSET regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`.
#[allow(clippy::expect_used)]
static META_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("META_CONTENT_TYPE regex")
});

/// How far into the payload to look for a charset declaration.
const SNIFF_WINDOW: usize = 1024;

/// Detects the charset of an HTML payload from its meta tags, defaulting to
/// UTF-8 when no declaration is found.
fn detect_html_encoding(payload: &[u8]) -> &'static Encoding {
    let head = &payload[..payload.len().min(SNIFF_WINDOW)];
    let head_str = String::from_utf8_lossy(head);

    for pattern in [&*META_CHARSET, &*META_CONTENT_TYPE] {
        if let Some(label) = pattern.captures(&head_str).and_then(|c| c.get(1)) {
            if let Some(encoding) = Encoding::for_label(label.as_str().as_bytes()) {
                return encoding;
            }
        }
    }

    UTF_8
}

/// Decodes a fetched HTML payload to a UTF-8 string, honoring any charset
/// declared in the document head.
#[must_use]
pub fn decode_html_payload(payload: &[u8]) -> String {
    let encoding = detect_html_encoding(payload);
    if encoding == UTF_8 {
        return String::from_utf8_lossy(payload).into_owned();
    }
    let (decoded, _, _) = encoding.decode(payload);
    decoded.into_owned()
}

/// Decodes an uploaded text file to a UTF-8 string.
///
/// Honors a UTF-8 or UTF-16 byte-order mark when present; otherwise the
/// content is treated as UTF-8 with lossy replacement.
#[must_use]
pub fn decode_text_file(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _, _) = encoding.decode(&bytes[bom_len..]);
        return decoded.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_payload_defaults_to_utf8() {
        let payload = b"<html><body>Hello</body></html>";
        assert_eq!(decode_html_payload(payload), "<html><body>Hello</body></html>");
    }

    #[test]
    fn html_payload_honors_meta_charset() {
        // ISO-8859-1 e-acute (0xE9); encoding_rs maps the label to windows-1252
        let payload = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode_html_payload(payload).contains("Caf\u{e9}"));
    }

    #[test]
    fn html_payload_honors_content_type_charset() {
        let payload = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body>\x93quoted\x94</body></html>";
        let decoded = decode_html_payload(payload);
        assert!(decoded.contains("\u{201C}quoted\u{201D}"));
    }

    #[test]
    fn invalid_bytes_become_replacement_chars_not_errors() {
        let payload = b"<html><body>ok \xFF\xFE still ok</body></html>";
        let decoded = decode_html_payload(payload);
        assert!(decoded.contains("ok"));
        assert!(decoded.contains("still ok"));
    }

    #[test]
    fn text_file_strips_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFplain text";
        assert_eq!(decode_text_file(bytes), "plain text");
    }

    #[test]
    fn text_file_decodes_utf16_le_bom() {
        let bytes = b"\xFF\xFEh\x00i\x00";
        assert_eq!(decode_text_file(bytes), "hi");
    }
}
