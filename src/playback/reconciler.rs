//! Smoothing of coarse player position reports
//!
//! Players are polled every few hundred milliseconds and often report the
//! same position several times in a row. Drawing the karaoke sweep from
//! those raw readings stutters, so while playing the position is
//! extrapolated from the wall clock and re-anchored to the player whenever
//! the two drift apart, or when the player seeks or restarts.

use super::time_source::{MonotonicTime, TimeSource};
use crate::player::PlaybackStatus;

/// Forward jump of a report past the last returned position that is taken
/// as a seek
const FORWARD_JUMP_MS: i64 = 150;

#[derive(Debug, Clone)]
pub struct PositionReconciler<T: TimeSource = MonotonicTime> {
    time: T,
    accuracy: i64,
    /// Reported position at the last re-anchor, negative until the first one
    first_time: i64,
    prev_time: i64,
    last_time: i64,
    begin: i64,
}

impl<T: TimeSource> PositionReconciler<T> {
    /// An uninitialised reconciler, anchored by the first report it sees
    pub fn new(accuracy: i64, time: T) -> Self {
        let begin = time.now_ms();
        Self {
            time,
            accuracy,
            first_time: -1,
            prev_time: -1,
            last_time: -1,
            begin,
        }
    }

    pub fn accuracy(&self) -> i64 {
        self.accuracy
    }

    /// Re-anchor on `time` as a fresh epoch
    pub fn init(&mut self, time: i64) {
        self.first_time = time;
        self.prev_time = time;
        self.last_time = time;
        self.begin = self.time.now_ms();
    }

    /// Smoothed position while the player is playing
    pub fn real_ms(&mut self, time: i64) -> i64 {
        let result = if self.first_time < 0
            || self.prev_time - time > self.accuracy
            || time - self.last_time > FORWARD_JUMP_MS
        {
            tracing::debug!(
                "Re-anchoring position on {} (previous report {})",
                time,
                self.prev_time
            );
            self.init(time);
            time
        } else {
            let real = self.first_time + (self.time.now_ms() - self.begin);
            if real - time > 2 * self.accuracy || time - real > self.accuracy {
                tracing::debug!("Position drifted to {}, player reports {}", real, time);
                self.init(time);
                time
            } else {
                self.prev_time = time;
                real
            }
        };
        self.last_time = result;
        result
    }

    /// Position held steady through small jitter, for paused or stopped
    /// players
    pub fn last_ms(&mut self, time: i64) -> i64 {
        if self.first_time < 0
            || self.last_time - time > self.accuracy
            || time - self.last_time > self.accuracy
        {
            self.init(time);
        }
        self.last_time
    }

    /// Smoothed position for a report taken in `status`
    pub fn smoothed(&mut self, status: PlaybackStatus, time: i64) -> i64 {
        match status {
            PlaybackStatus::Playing => self.real_ms(time),
            PlaybackStatus::Paused | PlaybackStatus::Stopped => self.last_ms(time),
        }
    }
}
