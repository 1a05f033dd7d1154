//! LRC tokenizer
//!
//! Splits LRC text into a lazy stream of tokens:
//! - `[mm:ss.xx]` style tags become [`Token::Timestamp`]
//! - any other `[key:value]` tag becomes [`Token::Attribute`]
//! - everything else up to the end of the line becomes [`Token::Text`]
//!
//! The tokenizer never fails. Malformed tags degrade to attributes and
//! unclosed brackets are plain text.

use std::fmt::Write;
use std::path::Path;

use super::types::LyricDocument;
use crate::features::lyrics::encoding::{self, UTF8_BOM};

/// A lexical unit of an LRC file
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Lyric text between tags and the line break
    Text(String),
    /// `[key:value]` or `[key]` tag
    Attribute { key: String, value: Option<String> },
    /// `[h:m:s.xx]` tag, in milliseconds
    Timestamp(i64),
}

/// Lazy tokenizer over a UTF-8 lyric buffer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    buffer: String,
    pos: usize,
}

impl Tokenizer {
    /// Create a tokenizer over UTF-8 text
    pub fn new(text: impl Into<String>) -> Self {
        let mut tokenizer = Self {
            buffer: text.into(),
            pos: 0,
        };
        tokenizer.reset();
        tokenizer
    }

    /// Create a tokenizer over raw bytes, transcoding legacy charsets to UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(encoding::decode_lyrics(bytes).into_owned())
    }

    /// Read a whole lyric file and tokenize its content
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        tracing::debug!("Read {} bytes of lyrics from {:?}", bytes.len(), path);
        Ok(Self::from_bytes(&bytes))
    }

    /// Rewind to the beginning of the buffer, skipping a leading BOM
    pub fn reset(&mut self) {
        self.pos = if self.buffer.as_bytes().starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
    }

    /// Return the next token, or `None` once the buffer is exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        let bytes = self.buffer.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        if bytes[self.pos] == b'[' {
            if let Some(close) = find_tag_end(bytes, self.pos) {
                let token = parse_tag(&self.buffer[self.pos + 1..close]);
                self.pos = close + 1;
                return Some(token);
            }
        }

        let start = self.pos;
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .map_or(bytes.len(), |i| start + i);
        let text = self.buffer[start..end].to_string();
        self.pos = skip_line_break(bytes, end);
        Some(Token::Text(text))
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Find the `]` closing the tag opened at `open`, stopping at line breaks
fn find_tag_end(bytes: &[u8], open: usize) -> Option<usize> {
    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        match b {
            b']' => return Some(i),
            b'\r' | b'\n' => return None,
            _ => {}
        }
    }
    None
}

/// Position right after the line terminator at `end` (`\n`, `\r` or `\r\n`)
fn skip_line_break(bytes: &[u8], end: usize) -> usize {
    match bytes.get(end) {
        Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => end + 2,
        Some(b'\r') | Some(b'\n') => end + 1,
        _ => end,
    }
}

/// Classify the interior of a `[...]` tag
fn parse_tag(interior: &str) -> Token {
    if let Some(time) = parse_timestamp(interior) {
        return Token::Timestamp(time);
    }
    match interior.split_once(':') {
        Some((key, value)) => Token::Attribute {
            key: key.to_string(),
            value: Some(value.to_string()),
        },
        None => Token::Attribute {
            key: interior.to_string(),
            value: None,
        },
    }
}

/// Longest accepted timestamp, in milliseconds
pub const MAX_TIMESTAMP_MS: i64 = i32::MAX as i64;

/// Parse `[h:]m:]s[.fraction]` into milliseconds
///
/// Groups are read from the right: seconds (with fraction), minutes, hours.
/// Returns `None` for anything that is not made only of digits, `:` and `.`,
/// that has empty, unparsable or more than three groups, or that lies past
/// [`MAX_TIMESTAMP_MS`].
pub fn parse_timestamp(src: &str) -> Option<i64> {
    if src.is_empty() || !src.bytes().all(|b| b.is_ascii_digit() || b == b':' || b == b'.') {
        return None;
    }

    let mut groups = src.rsplit(':');
    let seconds: f64 = groups.next()?.parse().ok()?;
    let minutes = groups.next().map_or(Some(0), parse_whole)?;
    let hours = groups.next().map_or(Some(0), parse_whole)?;
    if groups.next().is_some() {
        return None;
    }

    let total_minutes = hours.checked_mul(60)?.checked_add(minutes)?;
    let total_ms = ((total_minutes as f64 * 60.0 + seconds) * 1000.0).round();
    if !(0.0..=MAX_TIMESTAMP_MS as f64).contains(&total_ms) {
        return None;
    }
    Some(total_ms as i64)
}

fn parse_whole(group: &str) -> Option<i64> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

/// Write timestamp in LRC format, `[mm:ss.xx]` or `[hh:mm:ss.xx]`
pub fn write_timestamp(result: &mut String, time: i64) {
    let time = time.max(0);
    let centis = time / 10 % 100;
    let sec = time / 1000 % 60;
    let min = time / 60_000 % 60;
    let hour = time / 3_600_000;
    if hour != 0 {
        let _ = write!(result, "[{:02}:{:02}:{:02}.{:02}]", hour, min, sec, centis);
    } else {
        let _ = write!(result, "[{:02}:{:02}.{:02}]", min, sec, centis);
    }
}

/// Render a document back to LRC text
///
/// Attributes come first, one per line, then every lyric line with its raw
/// (offset-free) timestamp.
pub fn stringify_lrc(doc: &LyricDocument) -> String {
    let mut result = String::new();

    for (key, value) in doc.metadata() {
        if value.is_empty() {
            let _ = writeln!(result, "[{}]", key);
        } else {
            let _ = writeln!(result, "[{}:{}]", key, value);
        }
    }

    for line in doc.lines() {
        write_timestamp(&mut result, line.timestamp);
        result.push_str(&line.text);
        result.push('\n');
    }

    result
}
