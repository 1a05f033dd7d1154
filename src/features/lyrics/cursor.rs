//! Cursor over the lines of a [`LyricDocument`]
//!
//! A cursor borrows its document, so it can never outlive a document that
//! has been replaced by newer lyrics.

use super::parser::{DEFAULT_LAST_LINE_DURATION, LyricDocument};

/// Errors raised while navigating lyrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsError {
    /// Binary search bounds did not meet, the lines are not in time order
    SeekDiverged { low: usize, high: usize },
}

impl std::fmt::Display for LyricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LyricsError::SeekDiverged { low, high } => {
                write!(f, "Seek did not converge (low={}, high={})", low, high)
            }
        }
    }
}

impl std::error::Error for LyricsError {}

/// Position of one line within a document
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    doc: &'a LyricDocument,
    id: usize,
}

impl<'a> Cursor<'a> {
    /// Cursor at line `id`, or `None` if out of range
    pub fn from_id(doc: &'a LyricDocument, id: usize) -> Option<Self> {
        (id < doc.item_count()).then_some(Self { doc, id })
    }

    /// Cursor at the last line starting at or before `time`
    ///
    /// `time` is compared against effective (offset-applied) timestamps. When
    /// several lines share a start time the last of them is chosen. A time
    /// before the first line yields the first line.
    pub fn from_timestamp(doc: &'a LyricDocument, time: i64) -> Result<Self, LyricsError> {
        let mut low = 0;
        let mut high = doc.item_count() - 1;
        while low < high {
            let mid = (low + high).div_ceil(2);
            match doc.effective_timestamp(mid) {
                Some(stamp) if stamp <= time => low = mid,
                _ => high = mid - 1,
            }
        }
        if low != high {
            return Err(LyricsError::SeekDiverged { low, high });
        }
        Ok(Self { doc, id: low })
    }

    /// Document this cursor walks
    pub fn document(&self) -> &'a LyricDocument {
        self.doc
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the cursor points at an existing line
    pub fn is_valid(&self) -> bool {
        self.id < self.doc.item_count()
    }

    /// Advance one line
    ///
    /// Returns `false` once the cursor has moved past the last line; it is
    /// then invalid and must not be read.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.id = self.id.saturating_add(1);
        self.is_valid()
    }

    /// Step back one line, `false` if already at the first one
    pub fn prev(&mut self) -> bool {
        if self.id == 0 {
            return false;
        }
        self.id -= 1;
        true
    }

    /// Jump to line `id`, `false` (without moving) if out of range
    pub fn move_to(&mut self, id: usize) -> bool {
        if id >= self.doc.item_count() {
            return false;
        }
        self.id = id;
        true
    }

    /// Start time with the document offset applied, may be negative
    ///
    /// An invalid cursor lies after every line and reports `i64::MAX`.
    pub fn timestamp(&self) -> i64 {
        self.doc.effective_timestamp(self.id).unwrap_or(i64::MAX)
    }

    /// Lyric text of the line
    ///
    /// # Panics
    /// If the cursor is invalid.
    pub fn text(&self) -> &'a str {
        &self.doc.lines()[self.id].text
    }

    /// How long the line lasts, in milliseconds
    ///
    /// Lines last until the next line starts. The last line lasts until the
    /// end of the track, or [`DEFAULT_LAST_LINE_DURATION`] when the track
    /// length is unknown or shorter than the lyrics.
    pub fn duration(&self) -> i64 {
        let lines = self.doc.lines();
        match lines.get(self.id + 1) {
            Some(next) => next.timestamp.saturating_sub(lines[self.id].timestamp),
            None => {
                let track_end = i64::try_from(self.doc.duration()).unwrap_or(i64::MAX);
                let remaining = track_end.saturating_sub(self.timestamp());
                if remaining <= 0 {
                    DEFAULT_LAST_LINE_DURATION
                } else {
                    remaining
                }
            }
        }
    }

    /// Fraction of the line already sung at `time`, in `0.0..=1.0`
    pub fn compute_percentage(&self, time: i64) -> f64 {
        let start = self.timestamp();
        let duration = self.duration();
        if time <= start {
            0.0
        } else if time >= start.saturating_add(duration) {
            1.0
        } else {
            (time - start) as f64 / duration as f64
        }
    }
}
