//! Charset detection and decoding for fetched feed documents.
//!
//! Feeds are fetched as raw bytes because the charset is unknown until the
//! document is inspected. Some Japanese government feeds are served as
//! Shift_JIS without any usable HTTP hint, so the host suffix is checked
//! before the byte stream itself.

use encoding_rs::{SHIFT_JIS, UTF_8};
use url::Url;

/// Host suffix that forces Shift_JIS regardless of document content.
const SHIFT_JIS_HOST_SUFFIX: &str = ".go.jp";

/// Window scanned for an XML encoding declaration.
const DECLARATION_WINDOW: usize = 200;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    ShiftJis,
}

/// Pick a decoding strategy for a fetched document.
///
/// Checks run in strict priority order, first match wins:
/// 1. source host ends with `.go.jp` -> Shift_JIS
/// 2. UTF-8 byte-order mark -> UTF-8
/// 3. XML declaration naming shift_jis in the first 200 bytes -> Shift_JIS
/// 4. default UTF-8
pub fn detect(bytes: &[u8], source_url: &str) -> Charset {
    if let Ok(url) = Url::parse(source_url) {
        if let Some(host) = url.host_str() {
            if host.ends_with(SHIFT_JIS_HOST_SUFFIX) {
                return Charset::ShiftJis;
            }
        }
    }

    if bytes.starts_with(&UTF8_BOM) {
        return Charset::Utf8;
    }

    let window = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let head = String::from_utf8_lossy(window).to_lowercase();
    if head.contains("encoding=\"shift_jis\"") || head.contains("encoding='shift_jis'") {
        return Charset::ShiftJis;
    }

    Charset::Utf8
}

/// Decode `bytes` with the detected charset. Decoding is lossy: undecodable
/// sequences become replacement characters rather than failing the feed.
pub fn decode(bytes: &[u8], charset: Charset) -> String {
    let encoding = match charset {
        Charset::Utf8 => UTF_8,
        Charset::ShiftJis => SHIFT_JIS,
    };
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_jp_host_forces_shift_jis() {
        let bytes = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss/>".as_bytes();
        assert_eq!(
            detect(bytes, "https://www.mhlw.go.jp/rss/news.xml"),
            Charset::ShiftJis
        );
    }

    #[test]
    fn test_bom_wins_over_declaration() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"Shift_JIS\"?>");
        assert_eq!(detect(&bytes, "https://example.com/feed"), Charset::Utf8);
    }

    #[test]
    fn test_declaration_double_quoted() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"Shift_JIS\"?><rss version=\"2.0\"/>";
        assert_eq!(detect(bytes, "https://example.com/feed"), Charset::ShiftJis);
    }

    #[test]
    fn test_declaration_single_quoted() {
        let bytes = b"<?xml version='1.0' encoding='shift_jis'?><rss version='2.0'/>";
        assert_eq!(detect(bytes, "https://example.com/feed"), Charset::ShiftJis);
    }

    #[test]
    fn test_declaration_outside_window_ignored() {
        let mut bytes = vec![b' '; DECLARATION_WINDOW];
        bytes.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"Shift_JIS\"?>");
        assert_eq!(detect(&bytes, "https://example.com/feed"), Charset::Utf8);
    }

    #[test]
    fn test_default_is_utf8() {
        assert_eq!(
            detect(b"<rss version=\"2.0\"/>", "https://example.com/feed"),
            Charset::Utf8
        );
        assert_eq!(detect(b"", "not a url"), Charset::Utf8);
    }

    #[test]
    fn test_decode_genuine_shift_jis() {
        // "テスト" in Shift_JIS
        let bytes = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        assert_eq!(decode(&bytes, Charset::ShiftJis), "テスト");
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("<rss/>".as_bytes());
        assert_eq!(decode(&bytes, Charset::Utf8), "<rss/>");
    }
}
