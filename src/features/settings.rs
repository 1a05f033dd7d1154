//! Application settings persistence
//!
//! Handles saving and loading user preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Where lyric files are looked up and saved
    #[serde(default)]
    pub lyrics: LyricsSettings,
    /// OSD display settings
    #[serde(default)]
    pub display: DisplaySettings,
    /// Refresh and synchronization timing
    #[serde(default)]
    pub timing: TimingSettings,
}

/// Lyric file lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// Directories to search, in order
    ///
    /// `%` is the directory of the music file, `~/` the home directory.
    pub path_patterns: Vec<String>,
    /// File names to try in each directory, in order
    ///
    /// `%t` title, `%p` artist, `%a` album, `%n` track number, `%f` music
    /// file name without extension, `%%` a literal `%`.
    pub file_patterns: Vec<String>,
    /// Write offset changes back into the lyric file
    pub save_offset_to_file: bool,
}

/// Display-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Number of lines shown at once (1 or 2)
    pub line_count: usize,
    /// Offset change per scroll step, in milliseconds
    pub offset_step_ms: i64,
}

/// Timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Display refresh interval in milliseconds
    pub refresh_interval_ms: u64,
    /// Player polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Tolerated drift between the clock and the player, in milliseconds
    pub accuracy_ms: i64,
}


impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            path_patterns: vec!["~/.lyrics".to_string(), "%".to_string()],
            file_patterns: vec![
                "%p-%t".to_string(),
                "%t-%p".to_string(),
                "%f".to_string(),
                "%t".to_string(),
            ],
            save_offset_to_file: true,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            line_count: 1,
            offset_step_ms: crate::features::lyrics::OFFSET_SCROLL_STEP,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 100,
            poll_interval_ms: 500,
            accuracy_ms: crate::playback::clock::DEFAULT_ACCURACY_MS,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "osdlyrics", "OSD Lyrics")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        Self::file_path()
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        match Self::file_path() {
            Some(path) => self.save_to_file(&path),
            None => Err(SettingsError::Io(
                "Could not determine config directory".to_string(),
            )),
        }
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Settings errors
#[derive(Debug)]
pub enum SettingsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}
