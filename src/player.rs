//! Media player boundary
//!
//! Lyrics follow whatever player is being watched. A [`Player`] only needs
//! to report what it is playing and where it is; the reported position may
//! be coarse and is smoothed by [`SmoothedPlayer`].

use anyhow::Result;

use crate::playback::{ManualTime, PositionReconciler, TimeSource};

/// Playback status as reported by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

/// Metadata of the playing track
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    /// Location of the music file, `file://` URI or plain path
    pub uri: Option<String>,
}

/// One sample of player state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub status: PlaybackStatus,
    /// Position in milliseconds
    pub position_ms: i64,
    /// Track length in milliseconds, `None` if unknown
    pub duration_ms: Option<u64>,
    pub track: Option<TrackInfo>,
}

/// A media player that can be polled
pub trait Player {
    fn name(&self) -> &str;

    /// Current status, position and track
    fn snapshot(&mut self) -> Result<PlayerSnapshot>;
}

/// Player wrapper reporting smoothed positions
pub struct SmoothedPlayer<P, T: TimeSource> {
    inner: P,
    reconciler: PositionReconciler<T>,
}

impl<P: Player, T: TimeSource> SmoothedPlayer<P, T> {
    pub fn new(inner: P, accuracy: i64, time: T) -> Self {
        Self {
            inner,
            reconciler: PositionReconciler::new(accuracy, time),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }
}

impl<P: Player, T: TimeSource> Player for SmoothedPlayer<P, T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn snapshot(&mut self) -> Result<PlayerSnapshot> {
        let mut snapshot = self.inner.snapshot()?;
        snapshot.position_ms = self
            .reconciler
            .smoothed(snapshot.status, snapshot.position_ms);
        Ok(snapshot)
    }
}

/// Player playing one track in real time
///
/// Positions are reported rounded down to `granularity_ms`, the way polled
/// players deliver them. Used by the command line front end and in tests.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer<T: TimeSource = ManualTime> {
    time: T,
    track: TrackInfo,
    duration_ms: u64,
    granularity_ms: i64,
    status: PlaybackStatus,
    position_ms: i64,
    started_at: i64,
}

impl<T: TimeSource> SimulatedPlayer<T> {
    /// A stopped player loaded with `track`
    pub fn new(track: TrackInfo, duration_ms: u64, granularity_ms: i64, time: T) -> Self {
        let started_at = time.now_ms();
        Self {
            time,
            track,
            duration_ms,
            granularity_ms: granularity_ms.max(1),
            status: PlaybackStatus::Stopped,
            position_ms: 0,
            started_at,
        }
    }

    pub fn play(&mut self) {
        if self.status != PlaybackStatus::Playing {
            self.started_at = self.time.now_ms() - self.position_ms;
            self.status = PlaybackStatus::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.position_ms = self.exact_position();
        }
        self.status = PlaybackStatus::Paused;
    }

    pub fn seek(&mut self, position_ms: i64) {
        self.position_ms = position_ms.max(0);
        self.started_at = self.time.now_ms() - self.position_ms;
    }

    /// Whether playback has reached the end of the track
    pub fn is_finished(&self) -> bool {
        self.exact_position() >= i64::try_from(self.duration_ms).unwrap_or(i64::MAX)
    }

    fn exact_position(&self) -> i64 {
        match self.status {
            PlaybackStatus::Playing => self.time.now_ms() - self.started_at,
            PlaybackStatus::Paused => self.position_ms,
            PlaybackStatus::Stopped => 0,
        }
    }
}

impl<T: TimeSource> Player for SimulatedPlayer<T> {
    fn name(&self) -> &str {
        "simulated"
    }

    fn snapshot(&mut self) -> Result<PlayerSnapshot> {
        let end = i64::try_from(self.duration_ms).unwrap_or(i64::MAX);
        if self.status == PlaybackStatus::Playing && self.exact_position() >= end {
            self.status = PlaybackStatus::Stopped;
            self.position_ms = 0;
        }
        let position = self.exact_position().min(end);
        Ok(PlayerSnapshot {
            status: self.status,
            position_ms: position - position % self.granularity_ms,
            duration_ms: Some(self.duration_ms),
            track: Some(self.track.clone()),
        })
    }
}
