//! Lyric file discovery for the playing track
//!
//! Candidate files are built from every directory pattern combined with
//! every file name pattern, in configuration order. A pattern referring to
//! metadata the track does not have yields no candidate.

use std::path::{Path, PathBuf};

use crate::features::settings::LyricsSettings;
use crate::player::TrackInfo;

const LRC_EXTENSION: &str = ".lrc";

/// Expand a file name pattern such as `%p-%t`
///
/// Unknown `%x` sequences keep the `%` and continue with `x`.
pub fn expand_file_pattern(pattern: &str, track: &TrackInfo) -> Option<String> {
    let mut result = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let Some(spec) = after.chars().next() else {
            result.push('%');
            rest = after;
            break;
        };

        let field = match spec {
            't' => track.title.clone(),
            'p' => track.artist.clone(),
            'a' => track.album.clone(),
            'n' => track.track_number.map(|n| n.to_string()),
            'f' => track.uri.as_deref().and_then(file_stem_from_uri),
            '%' => Some("%".to_string()),
            _ => {
                result.push('%');
                rest = after;
                continue;
            }
        };

        match field {
            Some(value) => result.push_str(&value),
            None => {
                tracing::debug!("Pattern '{}' needs '%{}', which is missing", pattern, spec);
                return None;
            }
        }
        rest = &after[spec.len_utf8()..];
    }

    result.push_str(rest);
    Some(result)
}

/// Expand a directory pattern
///
/// `%` is the directory holding the music file, `~/...` is relative to the
/// home directory and anything else is used as is.
pub fn expand_path_pattern(pattern: &str, track: &TrackInfo) -> Option<PathBuf> {
    if pattern == "%" {
        return music_dir(track.uri.as_deref()?);
    }
    if let Some(relative) = pattern.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(relative));
    }
    Some(PathBuf::from(pattern))
}

/// Full lyric file path for one directory / file name pattern pair
///
/// `.lrc` is appended unless the name already ends with it.
pub fn lrc_pathname(path_pattern: &str, file_pattern: &str, track: &TrackInfo) -> Option<PathBuf> {
    let dir = expand_path_pattern(path_pattern, track)?;
    let mut name = expand_file_pattern(file_pattern, track)?;
    if name.is_empty() {
        return None;
    }
    if !name.to_lowercase().ends_with(LRC_EXTENSION) {
        name.push_str(LRC_EXTENSION);
    }
    Some(dir.join(name))
}

/// Every candidate lyric path for `track`, in lookup order
pub fn candidates<'a>(
    settings: &'a LyricsSettings,
    track: &'a TrackInfo,
) -> impl Iterator<Item = PathBuf> + 'a {
    settings.path_patterns.iter().flat_map(move |path| {
        settings
            .file_patterns
            .iter()
            .filter_map(move |file| lrc_pathname(path, file, track))
    })
}

/// First existing lyric file for `track`
pub fn find_lyric_file(settings: &LyricsSettings, track: &TrackInfo) -> Option<PathBuf> {
    let found = candidates(settings, track).find(|path| path.is_file());
    match &found {
        Some(path) => tracing::debug!("Found lyrics at {:?}", path),
        None => tracing::debug!("No lyric file for {:?}", track.title),
    }
    found
}

/// Where to save lyrics for `track`: the first candidate whose directory
/// exists or can be created
pub fn lyric_save_path(settings: &LyricsSettings, track: &TrackInfo) -> Option<PathBuf> {
    candidates(settings, track).find(|path| match path.parent() {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Cannot use {:?} for lyrics: {}", dir, e);
                false
            }
        },
        None => false,
    })
}

/// Directory of a music file given as a `file://` URI or absolute path
fn music_dir(uri: &str) -> Option<PathBuf> {
    if uri.starts_with('/') {
        return Path::new(uri).parent().map(Path::to_path_buf);
    }
    let encoded = uri.strip_prefix("file://")?;
    let encoded = encoded.split('?').next().unwrap_or(encoded);
    // Split before decoding so an escaped `/` stays part of the file name
    let (dir, _) = encoded.rsplit_once('/')?;
    let dir = if dir.is_empty() { "/" } else { dir };
    urlencoding::decode(dir)
        .ok()
        .map(|dir| PathBuf::from(dir.into_owned()))
}

/// Decoded file name of `uri` without extension, `/` replaced by `_`
fn file_stem_from_uri(uri: &str) -> Option<String> {
    let without_query = uri.rsplit_once('?').map_or(uri, |(path, _)| path);
    let segment = without_query.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let name = urlencoding::decode(segment).ok()?;
    let stem = name.rsplit_once('.').map_or(&*name, |(stem, _)| stem);
    Some(stem.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackInfo {
        TrackInfo {
            title: Some("Title".to_string()),
            artist: Some("Artist".to_string()),
            album: Some("Album".to_string()),
            track_number: Some(7),
            uri: Some("file:///music/My%20Band/01%20Song%2FMix.flac".to_string()),
        }
    }

    #[test]
    fn test_expand_file_pattern() {
        let track = track();
        assert_eq!(expand_file_pattern("%p-%t", &track).as_deref(), Some("Artist-Title"));
        assert_eq!(expand_file_pattern("%a/%n", &track).as_deref(), Some("Album/7"));
        assert_eq!(expand_file_pattern("%f", &track).as_deref(), Some("01 Song_Mix"));
        assert_eq!(expand_file_pattern("100%%", &track).as_deref(), Some("100%"));
        assert_eq!(expand_file_pattern("plain", &track).as_deref(), Some("plain"));
    }

    #[test]
    fn test_unknown_placeholder_is_literal() {
        let track = track();
        assert_eq!(expand_file_pattern("%x%t", &track).as_deref(), Some("%xTitle"));
        assert_eq!(expand_file_pattern("a%", &track).as_deref(), Some("a%"));
    }

    #[test]
    fn test_missing_metadata_fails() {
        let track = TrackInfo {
            title: Some("Title".to_string()),
            ..Default::default()
        };
        assert_eq!(expand_file_pattern("%p-%t", &track), None);
        assert_eq!(expand_file_pattern("%f", &track), None);
        assert_eq!(expand_file_pattern("%t", &track).as_deref(), Some("Title"));
    }

    #[test]
    fn test_expand_path_pattern() {
        let track = track();
        assert_eq!(
            expand_path_pattern("%", &track),
            Some(PathBuf::from("/music/My Band"))
        );
        assert_eq!(
            expand_path_pattern("/srv/lyrics", &track),
            Some(PathBuf::from("/srv/lyrics"))
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path_pattern("~/.lyrics", &track), Some(home.join(".lyrics")));
        }

        let plain = TrackInfo {
            uri: Some("/music/a.mp3".to_string()),
            ..Default::default()
        };
        assert_eq!(expand_path_pattern("%", &plain), Some(PathBuf::from("/music")));
        assert_eq!(expand_path_pattern("%", &TrackInfo::default()), None);
    }

    #[test]
    fn test_lrc_pathname() {
        let track = track();
        assert_eq!(
            lrc_pathname("/srv", "%t", &track),
            Some(PathBuf::from("/srv/Title.lrc"))
        );
        assert_eq!(
            lrc_pathname("/srv", "%t.LRC", &track),
            Some(PathBuf::from("/srv/Title.LRC"))
        );
    }

    #[test]
    fn test_candidates_order() {
        let settings = LyricsSettings {
            path_patterns: vec!["/a".to_string(), "%".to_string()],
            file_patterns: vec!["%p-%t".to_string(), "%t".to_string()],
            save_offset_to_file: true,
        };
        let paths: Vec<PathBuf> = candidates(&settings, &track()).collect();
        assert_eq!(
            paths,
            [
                PathBuf::from("/a/Artist-Title.lrc"),
                PathBuf::from("/a/Title.lrc"),
                PathBuf::from("/music/My Band/Artist-Title.lrc"),
                PathBuf::from("/music/My Band/Title.lrc"),
            ]
        );
    }

    #[test]
    fn test_find_and_save_path() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(second.join("Title.lrc"), "[00:01.00]x").unwrap();

        let settings = LyricsSettings {
            path_patterns: vec![
                first.to_string_lossy().into_owned(),
                second.to_string_lossy().into_owned(),
            ],
            file_patterns: vec!["%p-%t".to_string(), "%t".to_string()],
            save_offset_to_file: true,
        };
        let track = track();

        assert_eq!(find_lyric_file(&settings, &track), Some(second.join("Title.lrc")));
        assert_eq!(
            lyric_save_path(&settings, &track),
            Some(first.join("Artist-Title.lrc"))
        );
        assert!(first.is_dir());
    }
}
