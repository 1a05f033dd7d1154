//! Karaoke progress of the active lyric line

use super::cursor::{Cursor, LyricsError};
use super::parser::LyricDocument;

/// Which line is being sung and how far along it is
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LyricProgress {
    /// Index of the active line, `None` when no lyric should be shown
    pub id: Option<usize>,
    /// Text of the active line, empty when inactive
    pub text: String,
    /// Sung fraction of the active line, 0.0 when inactive
    pub percentage: f64,
}

impl LyricProgress {
    /// The "no active lyric" value
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Active line id, or -1 when nothing is active
    pub fn sentinel_id(&self) -> i64 {
        self.id.map_or(-1, |id| id as i64)
    }

    /// Progress at `time` milliseconds into the track
    pub fn at(doc: &LyricDocument, time: i64) -> Result<Self, LyricsError> {
        let cursor = Cursor::from_timestamp(doc, time)?;
        Ok(Self::from_cursor(&cursor, time))
    }

    /// Progress at `time` for a cursor already positioned by the caller
    ///
    /// Nothing is active before the cursor's line starts, nor after the last
    /// line of the document has ended.
    pub fn from_cursor(cursor: &Cursor<'_>, time: i64) -> Self {
        if !cursor.is_valid() || time < cursor.timestamp() {
            return Self::inactive();
        }

        let is_last = cursor.id() + 1 == cursor.document().item_count();
        if is_last && time >= cursor.timestamp().saturating_add(cursor.duration()) {
            return Self::inactive();
        }

        Self {
            id: Some(cursor.id()),
            text: cursor.text().to_string(),
            percentage: cursor.compute_percentage(time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> LyricDocument {
        LyricDocument::parse("[00:01.00]one\n[00:03.00]two\n[00:04.00]three")
    }

    #[test]
    fn test_before_first_line() {
        let progress = LyricProgress::at(&doc(), 999).unwrap();
        assert_eq!(progress, LyricProgress::inactive());
        assert_eq!(progress.sentinel_id(), -1);
        assert!(progress.text.is_empty());
    }

    #[test]
    fn test_active_line() {
        let progress = LyricProgress::at(&doc(), 2000).unwrap();
        assert_eq!(progress.id, Some(0));
        assert_eq!(progress.text, "one");
        assert_eq!(progress.percentage, 0.5);

        let progress = LyricProgress::at(&doc(), 3000).unwrap();
        assert_eq!(progress.sentinel_id(), 1);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn test_last_line_until_track_end() {
        let mut doc = doc();
        doc.set_duration(6000);
        let progress = LyricProgress::at(&doc, 5000).unwrap();
        assert_eq!(progress.id, Some(2));
        assert_eq!(progress.percentage, 0.5);

        assert!(!LyricProgress::at(&doc, 6000).unwrap().is_active());
    }

    #[test]
    fn test_last_line_with_unknown_duration() {
        let doc = doc();
        assert!(LyricProgress::at(&doc, 8999).unwrap().is_active());
        assert!(!LyricProgress::at(&doc, 9000).unwrap().is_active());
    }

    #[test]
    fn test_out_of_range_values_stay_inactive() {
        let doc = LyricDocument::parse("[offset:-1]\n[99999999999999999999]x");
        assert_eq!(doc.item_count(), 1);
        assert_eq!(doc.attribute("99999999999999999999"), Some(""));
        assert!(!LyricProgress::at(&doc, 0).unwrap().is_active());

        let doc = LyricDocument::parse("[offset:-9223372036854775808]\n[00:01.00]a");
        assert!(!LyricProgress::at(&doc, 0).unwrap().is_active());
        assert!(!LyricProgress::at(&doc, i64::MIN).unwrap().is_active());
        assert_eq!(LyricProgress::at(&doc, i64::MAX).unwrap().id, None);
    }

    #[test]
    fn test_offset_shifts_progress() {
        let mut doc = doc();
        doc.set_offset(-500);
        assert!(!LyricProgress::at(&doc, 1499).unwrap().is_active());
        assert_eq!(LyricProgress::at(&doc, 1500).unwrap().id, Some(0));
    }
}
