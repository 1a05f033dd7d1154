//! Charset detection and conversion for lyric files
//!
//! A lot of LRC files floating around were saved by Windows players in the
//! local ANSI code page (GBK, Big5, Shift-JIS...). The tokenizer works on
//! UTF-8, so raw bytes are decoded here first.

use std::borrow::Cow;

use encoding_rs::{BIG5, EUC_JP, EUC_KR, Encoding, GBK, SHIFT_JIS, UTF_8, WINDOWS_1252};

/// UTF-8 byte order mark
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Legacy encodings tried when the bytes are not valid UTF-8, most likely first
const FALLBACK_ENCODINGS: &[&Encoding] = &[
    GBK,          // Simplified Chinese
    BIG5,         // Traditional Chinese
    SHIFT_JIS,    // Japanese
    EUC_JP,       // Japanese (alternative)
    EUC_KR,       // Korean
    WINDOWS_1252, // Western European
];

/// Strip a leading UTF-8 BOM, if any
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Guess the charset of a lyric buffer
///
/// Returns `None` when no candidate decodes the bytes cleanly.
pub fn detect_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let bytes = strip_bom(bytes);
    if std::str::from_utf8(bytes).is_ok() {
        return Some(UTF_8);
    }

    FALLBACK_ENCODINGS.iter().copied().find(|encoding| {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
        !had_errors && is_likely_valid_text(&decoded)
    })
}

/// Decode a lyric buffer to UTF-8
///
/// Valid UTF-8 is borrowed as-is. Otherwise the first legacy encoding that
/// decodes without errors wins. If nothing fits, the original bytes are kept
/// through a lossy conversion; the caller never sees an error.
pub fn decode_lyrics(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = strip_bom(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    match detect_encoding(bytes) {
        Some(encoding) => {
            tracing::debug!("Transcoding lyrics from {}", encoding.name());
            let (decoded, _) = encoding.decode_without_bom_handling(bytes);
            Cow::Owned(decoded.into_owned())
        }
        None => {
            tracing::debug!("No charset matched lyric buffer, keeping original bytes");
            String::from_utf8_lossy(bytes)
        }
    }
}

/// Heuristic check that decoded text looks like text
fn is_likely_valid_text(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }

    let suspicious_count = s
        .chars()
        .filter(|c| {
            (*c < ' ' && *c != '\t' && *c != '\n' && *c != '\r')
                || ('\u{E000}'..='\u{F8FF}').contains(c)
                || *c == '\u{FFFD}'
        })
        .count();

    // Allow up to 5% suspicious characters
    let threshold = (s.len() / 20).max(1);
    suspicious_count <= threshold
}
