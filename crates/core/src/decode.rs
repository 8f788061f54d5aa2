//! Byte-to-text decoding for plain text and Markdown files.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode raw file bytes to a string.
///
/// Honors UTF-8 and UTF-16 byte order marks, accepts valid UTF-8, and falls
/// back to ISO-8859-1 for anything else, so decoding never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }

    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("Content is not valid UTF-8, decoding as ISO-8859-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text(b"# Title\n\nBody"), "# Title\n\nBody");
        assert_eq!(decode_text("Grüße".as_bytes()), "Grüße");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn test_utf16() {
        assert_eq!(decode_text(b"\xFF\xFEh\x00i\x00"), "hi");
        assert_eq!(decode_text(b"\xFE\xFF\x00h\x00i"), "hi");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in ISO-8859-1
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }

    #[test]
    fn test_empty() {
        assert_eq!(decode_text(b""), "");
    }
}
