//! Lyrics session for the watched player
//!
//! Ties the pieces together: player reports steer a [`PlaybackClock`], the
//! clock position drives a [`KaraokeView`] over the current lyrics, and
//! offset changes are written back to the lyric file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::features::lyrics::{DisplayFrame, KaraokeView, LyricDocument, ScrollDirection};
use crate::features::media::lyrics::{find_lyric_file, lyric_save_path};
use crate::features::settings::Settings;
use crate::playback::{PlaybackClock, TimeSource};
use crate::player::{PlaybackStatus, PlayerSnapshot, TrackInfo};

pub struct LyricSession<T: TimeSource> {
    settings: Settings,
    clock: PlaybackClock<T>,
    view: KaraokeView,
    lyrics: Option<LyricDocument>,
    track: Option<TrackInfo>,
    duration_ms: Option<u64>,
}

impl<T: TimeSource> LyricSession<T> {
    pub fn new(settings: Settings, time: T) -> Self {
        let mut clock = PlaybackClock::new(time);
        clock.set_accuracy(settings.timing.accuracy_ms);
        let view = KaraokeView::new(settings.display.line_count);
        Self {
            settings,
            clock,
            view,
            lyrics: None,
            track: None,
            duration_ms: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn lyrics(&self) -> Option<&LyricDocument> {
        self.lyrics.as_ref()
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        self.track.as_ref()
    }

    /// Current playback position according to the session clock
    pub fn position(&self) -> i64 {
        self.clock.time()
    }

    /// Replace the lyrics, `None` to show nothing
    pub fn set_lyrics(&mut self, lyrics: Option<LyricDocument>) {
        self.lyrics = lyrics.map(|mut doc| {
            if let Some(duration) = self.duration_ms {
                doc.set_duration(duration);
            }
            tracing::info!(
                "Lyrics set: {} lines from {}",
                doc.item_count(),
                doc.uri().unwrap_or("memory")
            );
            doc
        });
        self.view.clear();
    }

    /// Look up and load the lyric file of `track`
    ///
    /// Returns whether a file was found. Without one the lyrics are cleared.
    pub fn load_for_track(&mut self, track: &TrackInfo) -> Result<bool> {
        let Some(path) = find_lyric_file(&self.settings.lyrics, track) else {
            self.set_lyrics(None);
            return Ok(false);
        };
        let doc = LyricDocument::load(&path)
            .with_context(|| format!("Failed to load lyrics for {:?}", track.title))?;
        self.set_lyrics(Some(doc));
        Ok(true)
    }

    /// Follow a player report
    ///
    /// Returns `true` when the track changed; the lyrics are then cleared and
    /// the caller is expected to load new ones.
    pub fn on_player_snapshot(&mut self, snapshot: &PlayerSnapshot) -> bool {
        let track_changed = snapshot.track != self.track;
        if track_changed {
            tracing::debug!("Track changed to {:?}", snapshot.track);
            self.track = snapshot.track.clone();
            self.set_lyrics(None);
        }

        if snapshot.duration_ms != self.duration_ms {
            self.duration_ms = snapshot.duration_ms;
            if let Some(doc) = &mut self.lyrics {
                doc.set_duration(snapshot.duration_ms.unwrap_or(0));
            }
        }

        match snapshot.status {
            PlaybackStatus::Playing => {
                self.clock.play();
                self.clock.maybe_set_time(snapshot.position_ms);
            }
            PlaybackStatus::Paused => {
                self.clock.pause();
                self.clock.maybe_set_time(snapshot.position_ms);
            }
            PlaybackStatus::Stopped => self.clock.stop(),
        }

        track_changed
    }

    /// Frame to render now, `None` without lyrics
    pub fn tick(&mut self) -> Option<DisplayFrame> {
        let doc = self.lyrics.as_ref()?;
        match self.view.update(doc, self.clock.time()) {
            Ok(frame) => Some(frame.clone()),
            Err(e) => {
                tracing::warn!("Cannot place lyrics: {}", e);
                None
            }
        }
    }

    /// Shift the lyrics by `delta` milliseconds, saving the new offset into
    /// the lyric file when enabled
    ///
    /// Lyrics that did not come from a file are saved to the first usable
    /// lookup location of the current track.
    pub fn adjust_offset(&mut self, delta: i64) -> Result<()> {
        let Some(doc) = &mut self.lyrics else {
            return Ok(());
        };
        doc.adjust_offset(delta);
        tracing::info!("Lyric offset is now {} ms", doc.offset());

        if !self.settings.lyrics.save_offset_to_file {
            return Ok(());
        }
        if doc.uri().is_none() {
            let path = self
                .track
                .as_ref()
                .and_then(|track| lyric_save_path(&self.settings.lyrics, track));
            match path {
                Some(path) => doc.set_uri(Some(path.to_string_lossy().into_owned())),
                None => {
                    tracing::warn!("No location to save lyrics for {:?}", self.track);
                    return Ok(());
                }
            }
        }
        if let Some(uri) = doc.uri() {
            doc.save_to_file(Path::new(uri))
                .context("Failed to save lyric offset")?;
        }
        Ok(())
    }

    /// Scroll-wheel offset nudge
    pub fn scroll(&mut self, direction: ScrollDirection) -> Result<()> {
        self.adjust_offset(direction.offset_delta(self.settings.display.offset_step_ms))
    }
}
