//! Media file discovery
//!
//! Locates lyric files for the playing track from configurable directory and
//! file name patterns.

pub mod lyrics;

pub use lyrics::{find_lyric_file, lyric_save_path};
