//! Lyrics module - parsing and timeline
//!
//! - `parser`: LRC tokenizer and lyric documents
//! - `cursor`: line navigation and seeking
//! - `progress`: active line and karaoke percentage at a playback time
//! - `display`: one or two line OSD state

pub mod cursor;
pub mod display;
pub mod encoding;
pub mod parser;
pub mod progress;

// Re-export commonly used items
pub use cursor::{Cursor, LyricsError};
pub use display::{DisplayFrame, DisplayLine, KaraokeView, OFFSET_SCROLL_STEP, ScrollDirection};
pub use parser::*;
pub use progress::LyricProgress;
