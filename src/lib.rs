//! OSD Lyrics - synchronized LRC lyrics for whatever is playing
//!
//! - `features`: lyrics parsing and display, lyric file lookup, settings
//! - `playback`: playback clock and position smoothing
//! - `player`: the media player boundary
//! - `session`: everything wired together for one watched player

pub mod features;
pub mod playback;
pub mod player;
pub mod session;
