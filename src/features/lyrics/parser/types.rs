//! Lyric document types
//!
//! A [`LyricDocument`] owns the time-ordered lyric lines of one track, the
//! free-form `[key:value]` metadata and the user adjustable offset.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::lrc::{self, Token, Tokenizer};

/// Metadata key holding the lyric offset in milliseconds
pub const OFFSET_KEY: &str = "offset";

/// Duration assumed for the last line when the track length does not cover it
pub const DEFAULT_LAST_LINE_DURATION: i64 = 5000;

/// Largest offset magnitude kept from a file or an adjustment, in milliseconds
pub const MAX_OFFSET: i64 = i32::MAX as i64;

/// A single timed lyric line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LyricLine {
    /// Start time in milliseconds, before the document offset is applied
    pub timestamp: i64,
    /// Lyric text, possibly empty
    pub text: String,
}

impl LyricLine {
    pub fn new(timestamp: i64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// Whether the line has nothing worth displaying
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Parsed lyrics of one track
///
/// Never empty: a document without any timed line holds a single empty line
/// at 0 ms.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricDocument {
    uri: Option<String>,
    offset: i64,
    metadata: BTreeMap<String, String>,
    items: Vec<LyricLine>,
    duration: u64,
}

impl Default for LyricDocument {
    fn default() -> Self {
        Self::from_tokens(std::iter::empty(), None)
    }
}

impl LyricDocument {
    /// Build a document by replaying tokenizer output
    ///
    /// Consecutive timestamps share the text that follows them. Lines are
    /// stable-sorted by timestamp afterwards, so lines sharing a start time
    /// keep their file order.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>, uri: Option<String>) -> Self {
        let mut doc = Self {
            uri,
            offset: 0,
            metadata: BTreeMap::new(),
            items: Vec::new(),
            duration: 0,
        };
        let mut pending: Vec<i64> = Vec::new();

        for token in tokens {
            match token {
                Token::Timestamp(time) => pending.push(time),
                Token::Text(text) => {
                    for time in pending.drain(..) {
                        doc.items.push(LyricLine::new(time, text.clone()));
                    }
                }
                Token::Attribute { key, value } => {
                    doc.insert_attribute(key, value.unwrap_or_default());
                }
            }
        }
        // Timestamps at the very end of the file have no text
        for time in pending {
            doc.items.push(LyricLine::new(time, String::new()));
        }

        doc.finish();
        doc
    }

    /// Parse LRC text
    pub fn parse(content: &str) -> Self {
        Self::from_tokens(Tokenizer::new(content), None)
    }

    /// Parse raw LRC bytes in any supported charset
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_tokens(Tokenizer::from_bytes(bytes), None)
    }

    /// Load and parse an LRC file; the path becomes the document URI
    pub fn load(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .with_context(|| format!("Failed to read lyrics file {:?}", path))?;
        let doc = Self::from_tokens(tokenizer, Some(path.to_string_lossy().into_owned()));
        tracing::debug!("Parsed {} lyric lines from {:?}", doc.item_count(), path);
        Ok(doc)
    }

    /// Build a document from already structured data, e.g. received over IPC
    pub fn from_attributes_and_lines(
        attributes: impl IntoIterator<Item = (String, String)>,
        lines: impl IntoIterator<Item = LyricLine>,
        uri: Option<String>,
    ) -> Self {
        let mut doc = Self {
            uri,
            offset: 0,
            metadata: BTreeMap::new(),
            items: lines.into_iter().collect(),
            duration: 0,
        };
        for (key, value) in attributes {
            doc.insert_attribute(key, value);
        }
        doc.finish();
        doc
    }

    fn insert_attribute(&mut self, key: String, value: String) {
        if key == OFFSET_KEY {
            self.offset = value
                .trim()
                .parse::<i64>()
                .map_or(0, |offset| offset.clamp(-MAX_OFFSET, MAX_OFFSET));
        }
        self.metadata.insert(key, value);
    }

    fn finish(&mut self) {
        self.items.sort_by_key(|line| line.timestamp);
        if self.items.is_empty() {
            self.items.push(LyricLine::default());
        }
    }

    /// Value of a `[key:value]` attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// All attributes, ordered by key
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Number of lyric lines, always at least 1
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Lyric lines in time order
    pub fn lines(&self) -> &[LyricLine] {
        &self.items
    }

    /// Line by index
    pub fn line(&self, id: usize) -> Option<&LyricLine> {
        self.items.get(id)
    }

    /// Start time of a line with the offset applied
    pub fn effective_timestamp(&self, id: usize) -> Option<i64> {
        self.items
            .get(id)
            .map(|line| line.timestamp.saturating_sub(self.offset))
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Set the offset, clamped to [`MAX_OFFSET`], and mirror it into the
    /// `offset` attribute
    pub fn set_offset(&mut self, offset: i64) {
        let offset = offset.clamp(-MAX_OFFSET, MAX_OFFSET);
        self.offset = offset;
        self.metadata
            .insert(OFFSET_KEY.to_string(), offset.to_string());
    }

    /// Shift the lyrics by `delta` milliseconds
    ///
    /// The stored offset decreases by `delta`: a negative delta makes every
    /// line show up earlier.
    pub fn adjust_offset(&mut self, delta: i64) {
        self.set_offset(self.offset.saturating_sub(delta));
    }

    /// Track length in milliseconds, 0 if unknown
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: u64) {
        self.duration = duration;
    }

    /// Where the lyrics were loaded from, if anywhere
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn set_uri(&mut self, uri: Option<String>) {
        self.uri = uri;
    }

    /// Render back to LRC text
    pub fn to_lrc_string(&self) -> String {
        lrc::stringify_lrc(self)
    }

    /// Write the document as an LRC file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(path, self.to_lrc_string())
            .with_context(|| format!("Failed to write lyrics file {:?}", path))?;
        tracing::debug!("Saved {} lyric lines to {:?}", self.item_count(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[ti:焔の扉][ar:FictionJunction YUUKA]\n\
                          [al:焔の扉]\n\
                          [02:45.59]その日まで\n\
                          [52.78]\n\
                          [03:48][35]焔の扉へ\n\
                          [1:03:56.66][03:14.77]\n\
                          おわり\n";

    fn timestamps(doc: &LyricDocument) -> Vec<i64> {
        doc.lines().iter().map(|l| l.timestamp).collect()
    }

    #[test]
    fn test_empty_document_has_sentinel() {
        let doc = LyricDocument::parse("");
        assert_eq!(doc.item_count(), 1);
        assert_eq!(doc.lines()[0], LyricLine::new(0, ""));

        let doc = LyricDocument::parse("[ti:Only attributes]\n");
        assert_eq!(doc.item_count(), 1);
        assert_eq!(doc.attribute("ti"), Some("Only attributes"));
    }

    #[test]
    fn test_parse_sample() {
        let doc = LyricDocument::parse(SAMPLE);
        assert_eq!(doc.attribute("ar"), Some("FictionJunction YUUKA"));
        assert_eq!(doc.attribute("al"), Some("焔の扉"));
        assert_eq!(
            timestamps(&doc),
            vec![35_000, 52_780, 165_590, 194_770, 228_000, 3_836_660]
        );
        let texts: Vec<&str> = doc.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["焔の扉へ", "", "その日まで", "", "焔の扉へ", ""]);
    }

    #[test]
    fn test_shared_timestamps_share_text() {
        let doc = LyricDocument::parse("[00:01.00][00:05.00]same line\n[00:03.00]middle");
        assert_eq!(timestamps(&doc), vec![1000, 3000, 5000]);
        assert_eq!(doc.lines()[0].text, "same line");
        assert_eq!(doc.lines()[2].text, "same line");
    }

    #[test]
    fn test_trailing_timestamps_get_empty_text() {
        let doc = LyricDocument::parse("[00:01.00]a\n[00:09.00]");
        assert_eq!(doc.item_count(), 2);
        assert_eq!(doc.lines()[1], LyricLine::new(9000, ""));
    }

    #[test]
    fn test_text_without_timestamp_is_ignored() {
        let doc = LyricDocument::parse("just words\n[00:01.00]a\nmore words");
        assert_eq!(doc.item_count(), 1);
        assert_eq!(doc.lines()[0].text, "a");
    }

    #[test]
    fn test_out_of_order_lines_are_sorted_stably() {
        let doc = LyricDocument::parse("[00:03.00]c\n[00:01.00]a1\n[00:01.00]a2\n[00:02.00]b");
        assert_eq!(timestamps(&doc), vec![1000, 1000, 2000, 3000]);
        assert_eq!(doc.lines()[0].text, "a1");
        assert_eq!(doc.lines()[1].text, "a2");
    }

    #[test]
    fn test_offset_attribute() {
        let doc = LyricDocument::parse("[offset:-300]\n[00:01.00]a");
        assert_eq!(doc.offset(), -300);
        assert_eq!(doc.effective_timestamp(0), Some(1300));

        let doc = LyricDocument::parse("[offset: 250 ]\n[00:01.00]a");
        assert_eq!(doc.offset(), 250);

        let doc = LyricDocument::parse("[offset:soon]\n[00:01.00]a");
        assert_eq!(doc.offset(), 0);
        assert_eq!(doc.attribute("offset"), Some("soon"));
    }

    #[test]
    fn test_offset_is_bounded() {
        let doc = LyricDocument::parse("[offset:-9223372036854775808]\n[00:01.00]a");
        assert_eq!(doc.offset(), -MAX_OFFSET);
        assert_eq!(doc.effective_timestamp(0), Some(1000 + MAX_OFFSET));

        let mut doc = LyricDocument::parse("[00:01.00]a");
        doc.adjust_offset(i64::MAX);
        assert_eq!(doc.offset(), -MAX_OFFSET);
        doc.adjust_offset(i64::MIN);
        assert_eq!(doc.offset(), MAX_OFFSET);
        assert_eq!(doc.attribute("offset"), Some("2147483647"));
    }

    #[test]
    fn test_effective_timestamp_saturates() {
        let mut doc = LyricDocument::from_attributes_and_lines(
            [],
            [LyricLine::new(i64::MAX, "late")],
            None,
        );
        doc.set_offset(-1);
        assert_eq!(doc.effective_timestamp(0), Some(i64::MAX));
    }

    #[test]
    fn test_set_offset_round_trip() {
        let mut doc = LyricDocument::parse("[00:01.00]a");
        doc.set_offset(500);
        assert_eq!(doc.offset(), 500);
        assert_eq!(doc.attribute("offset"), Some("500"));
        assert_eq!(doc.effective_timestamp(0), Some(500));
    }

    #[test]
    fn test_adjust_offset() {
        let mut doc = LyricDocument::parse("[00:01.00]a");
        doc.adjust_offset(-200);
        assert_eq!(doc.offset(), 200);
        assert_eq!(doc.effective_timestamp(0), Some(800));
        doc.adjust_offset(300);
        assert_eq!(doc.offset(), -100);
    }

    #[test]
    fn test_attribute_without_value() {
        let doc = LyricDocument::parse("[instrumental]\n[00:01.00]a");
        assert_eq!(doc.attribute("instrumental"), Some(""));
        assert_eq!(doc.attribute("missing"), None);
    }

    #[test]
    fn test_from_attributes_and_lines() {
        let doc = LyricDocument::from_attributes_and_lines(
            [("offset".to_string(), "100".to_string())],
            [LyricLine::new(2000, "b"), LyricLine::new(1000, "a")],
            Some("osdlyrics://memory".to_string()),
        );
        assert_eq!(doc.offset(), 100);
        assert_eq!(timestamps(&doc), vec![1000, 2000]);
        assert_eq!(doc.uri(), Some("osdlyrics://memory"));
    }

    #[test]
    fn test_from_gbk_bytes() {
        let mut bytes = b"[00:01.00]".to_vec();
        bytes.extend_from_slice(&[0xD6, 0xDC, 0xBD, 0xDC, 0xC2, 0xD7]);
        let doc = LyricDocument::from_bytes(&bytes);
        assert_eq!(doc.lines()[0].text, "周杰伦");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("song.lrc");

        let mut doc = LyricDocument::parse("[ar:Artist]\n[00:01.50]one\n[01:02.00]two");
        doc.set_offset(-120);
        doc.save_to_file(&path).unwrap();

        let loaded = LyricDocument::load(&path).unwrap();
        assert_eq!(loaded.lines(), doc.lines());
        assert_eq!(loaded.offset(), -120);
        assert_eq!(loaded.attribute("ar"), Some("Artist"));
        assert_eq!(loaded.uri(), Some(path.to_string_lossy().as_ref()));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LyricDocument::load(&dir.path().join("nope.lrc")).is_err());
    }
}
