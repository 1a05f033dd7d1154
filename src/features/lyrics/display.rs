//! One or two line karaoke display state
//!
//! Tracks what an OSD style renderer should paint: the line being sung with
//! its sweep percentage and, in two-line mode, a preview of the next line in
//! the other slot. When playback reaches the previewed line the slots swap
//! roles instead of re-laying out both lines.

use super::cursor::LyricsError;
use super::parser::LyricDocument;
use super::progress::LyricProgress;

/// Default offset change for one scroll-wheel step, in milliseconds
pub const OFFSET_SCROLL_STEP: i64 = 200;

/// Past this fraction of the current line the next one is previewed
const NEXT_LINE_PREVIEW_THRESHOLD: f64 = 0.5;

/// Scroll-wheel direction over the lyrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    /// Offset delta for this direction: up/left delay the lyrics, down/right
    /// bring them forward
    pub fn offset_delta(self, step: i64) -> i64 {
        match self {
            ScrollDirection::Up | ScrollDirection::Left => step,
            ScrollDirection::Down | ScrollDirection::Right => -step,
        }
    }
}

/// One slot of the display
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayLine {
    /// Line shown in this slot, `None` when the slot is empty
    pub id: Option<usize>,
    pub text: String,
    pub percentage: f64,
}

impl DisplayLine {
    fn show(doc: &LyricDocument, id: usize) -> Self {
        Self {
            id: Some(id),
            text: doc.line(id).map(|l| l.text.clone()).unwrap_or_default(),
            percentage: 0.0,
        }
    }
}

/// What the renderer paints on a tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayFrame {
    pub lines: [DisplayLine; 2],
    /// Slot holding the line being sung
    pub current_line: usize,
}

impl DisplayFrame {
    pub fn current(&self) -> &DisplayLine {
        &self.lines[self.current_line]
    }

    /// Slot not being sung: the previous or the upcoming line
    pub fn other(&self) -> &DisplayLine {
        &self.lines[1 - self.current_line]
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.id.is_none())
    }
}

/// Karaoke display state machine
#[derive(Debug, Clone)]
pub struct KaraokeView {
    line_count: usize,
    frame: DisplayFrame,
    shown_id: Option<usize>,
    next_id: Option<usize>,
}

impl KaraokeView {
    /// Create a view showing `line_count` lines, clamped to 1..=2
    pub fn new(line_count: usize) -> Self {
        Self {
            line_count: line_count.clamp(1, 2),
            frame: DisplayFrame::default(),
            shown_id: None,
            next_id: None,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn set_line_count(&mut self, line_count: usize) {
        self.line_count = line_count.clamp(1, 2);
        self.clear();
    }

    pub fn frame(&self) -> &DisplayFrame {
        &self.frame
    }

    /// Forget everything shown, e.g. when the lyrics are replaced
    pub fn clear(&mut self) {
        self.frame = DisplayFrame::default();
        self.shown_id = None;
        self.next_id = None;
    }

    /// Bring the display up to date with playback at `time`
    pub fn update(&mut self, doc: &LyricDocument, time: i64) -> Result<&DisplayFrame, LyricsError> {
        let progress = LyricProgress::at(doc, time)?;
        // Blank lines are never displayed, show the next real one instead
        let shown = progress.id.and_then(|id| first_non_blank(doc, id));

        if self.shown_id != shown {
            let Some(id) = shown else {
                self.clear();
                return Ok(&self.frame);
            };

            if Some(id) != self.next_id {
                self.frame.current_line = 0;
                self.frame.lines[0] = DisplayLine::show(doc, id);
                self.update_next(doc, id);
            } else {
                // The previewed line is now being sung
                let current = self.frame.current_line;
                self.frame.lines[current].percentage = 1.0;
                self.frame.current_line = 1 - current;
            }
            self.shown_id = Some(id);
        }

        if let Some(id) = shown.filter(|&id| progress.id == Some(id)) {
            if progress.percentage > NEXT_LINE_PREVIEW_THRESHOLD {
                self.update_next(doc, id);
            }
            let current = self.frame.current_line;
            self.frame.lines[current].percentage = progress.percentage;
        }

        Ok(&self.frame)
    }

    fn update_next(&mut self, doc: &LyricDocument, current_id: usize) {
        if self.line_count < 2 {
            self.next_id = None;
            return;
        }

        let other = 1 - self.frame.current_line;
        match first_non_blank(doc, current_id + 1) {
            None => {
                if self.next_id.is_none() {
                    return;
                }
                self.next_id = None;
                self.frame.lines[other] = DisplayLine::default();
            }
            Some(next) => {
                if self.next_id == Some(next) {
                    return;
                }
                self.next_id = Some(next);
                self.frame.lines[other] = DisplayLine::show(doc, next);
            }
        }
    }
}

/// First line at or after `from` with displayable text
fn first_non_blank(doc: &LyricDocument, from: usize) -> Option<usize> {
    (from..doc.item_count()).find(|&id| doc.line(id).is_some_and(|line| !line.is_blank()))
}
