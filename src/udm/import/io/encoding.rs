use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use tracing::warn;

/// Byte-order mark written by some editors in front of UTF-8 text.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16BE_BOM: &[u8] = b"\xFE\xFF";

/// Text encodings the reader can tell apart from raw file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Seven-bit text. Decoded as UTF-8.
    Ascii,
    Utf8,
    /// UTF-8 preceded by a byte-order mark that must not reach the header.
    Utf8Sig,
    Utf16Le,
    Utf16Be,
    /// Eight-bit text that is not valid UTF-8.
    Latin1,
}

impl TextEncoding {
    /// Name reported to the user.
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Ascii => "us-ascii",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Latin1 => "iso-8859-1",
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Ascii | TextEncoding::Utf8 | TextEncoding::Utf8Sig => UTF_8,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
            TextEncoding::Latin1 => WINDOWS_1252,
        }
    }

    fn bom_len(self) -> usize {
        match self {
            TextEncoding::Utf8Sig => UTF8_BOM.len(),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
            _ => 0,
        }
    }

    /// Decodes `bytes`, consuming the byte-order mark when the encoding has one.
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        let payload = &bytes[self.bom_len().min(bytes.len())..];
        let (text, had_errors) = self.encoding().decode_without_bom_handling(payload);
        if had_errors {
            warn!(
                encoding = self.label(),
                "input contains byte sequences invalid for the detected encoding"
            );
        }
        text
    }
}

/// Guesses the encoding of `bytes` from their content.
///
/// A plain UTF-8 verdict is upgraded to [`TextEncoding::Utf8Sig`] when the
/// content starts with the UTF-8 byte-order mark.
pub fn detect(bytes: &[u8]) -> TextEncoding {
    let encoding = classify(bytes);
    if encoding == TextEncoding::Utf8 && bytes.starts_with(UTF8_BOM) {
        return TextEncoding::Utf8Sig;
    }
    encoding
}

fn classify(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(UTF16LE_BOM) {
        TextEncoding::Utf16Le
    } else if bytes.starts_with(UTF16BE_BOM) {
        TextEncoding::Utf16Be
    } else if bytes.is_ascii() {
        TextEncoding::Ascii
    } else if std::str::from_utf8(bytes).is_ok() {
        TextEncoding::Utf8
    } else {
        TextEncoding::Latin1
    }
}
