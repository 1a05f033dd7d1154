//! Free-running playback clock
//!
//! Between player reports the clock extrapolates the playback position from
//! the last anchor using a monotonic time source:
//! - Playing: `cached_time + (now - anchor)`
//! - Paused / Stopped: `cached_time`

use super::time_source::{MonotonicTime, TimeSource};

/// Default tolerance of [`PlaybackClock::maybe_set_time`], in milliseconds
pub const DEFAULT_ACCURACY_MS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock<T: TimeSource = MonotonicTime> {
    time: T,
    status: ClockStatus,
    cached_time: i64,
    anchor: i64,
    accuracy: i64,
}

impl<T: TimeSource> PlaybackClock<T> {
    /// A stopped clock at 0
    pub fn new(time: T) -> Self {
        let anchor = time.now_ms();
        Self {
            time,
            status: ClockStatus::Stopped,
            cached_time: 0,
            anchor,
            accuracy: DEFAULT_ACCURACY_MS,
        }
    }

    pub fn status(&self) -> ClockStatus {
        self.status
    }

    /// Start or resume counting from the current position
    ///
    /// Starting from Stopped keeps the cached time; call [`set_time`]
    /// afterwards to start elsewhere.
    ///
    /// [`set_time`]: Self::set_time
    pub fn play(&mut self) {
        if self.status == ClockStatus::Playing {
            return;
        }
        self.anchor = self.time.now_ms();
        self.status = ClockStatus::Playing;
    }

    /// Freeze the clock at its current position
    pub fn pause(&mut self) {
        match self.status {
            ClockStatus::Paused => return,
            ClockStatus::Playing => self.cached_time = self.time(),
            ClockStatus::Stopped => {}
        }
        self.status = ClockStatus::Paused;
    }

    /// Stop and rewind to 0
    pub fn stop(&mut self) {
        self.cached_time = 0;
        self.status = ClockStatus::Stopped;
    }

    /// Jump to `time`, ignored while stopped
    pub fn set_time(&mut self, time: i64) {
        if self.status == ClockStatus::Stopped {
            return;
        }
        self.cached_time = time;
        self.anchor = self.time.now_ms();
    }

    /// Jump to `time` only if it differs from the clock by more than the
    /// accuracy
    ///
    /// Returns whether the clock was adjusted.
    pub fn maybe_set_time(&mut self, time: i64) -> bool {
        if (self.time() - time).abs() > self.accuracy {
            self.set_time(time);
            self.status != ClockStatus::Stopped
        } else {
            false
        }
    }

    /// Current playback position in milliseconds
    pub fn time(&self) -> i64 {
        match self.status {
            ClockStatus::Playing => self.cached_time + (self.time.now_ms() - self.anchor),
            ClockStatus::Paused | ClockStatus::Stopped => self.cached_time,
        }
    }

    pub fn accuracy(&self) -> i64 {
        self.accuracy
    }

    pub fn set_accuracy(&mut self, accuracy: i64) {
        self.accuracy = accuracy;
    }
}

impl Default for PlaybackClock<MonotonicTime> {
    fn default() -> Self {
        Self::new(MonotonicTime::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualTime;

    fn clock() -> (PlaybackClock<ManualTime>, ManualTime) {
        let time = ManualTime::new(10_000);
        (PlaybackClock::new(time.clone()), time)
    }

    #[test]
    fn test_starts_stopped_at_zero() {
        let (clock, time) = clock();
        time.advance(500);
        assert_eq!(clock.status(), ClockStatus::Stopped);
        assert_eq!(clock.time(), 0);
        assert_eq!(clock.accuracy(), DEFAULT_ACCURACY_MS);
    }

    #[test]
    fn test_play_pause() {
        let (mut clock, time) = clock();
        clock.play();
        time.advance(100);
        assert_eq!(clock.time(), 100);

        clock.pause();
        time.advance(1000);
        assert_eq!(clock.time(), 100);
        assert_eq!(clock.status(), ClockStatus::Paused);

        clock.play();
        time.advance(50);
        assert_eq!(clock.time(), 150);
    }

    #[test]
    fn test_play_twice_keeps_anchor() {
        let (mut clock, time) = clock();
        clock.play();
        time.advance(300);
        clock.play();
        time.advance(200);
        assert_eq!(clock.time(), 500);
    }

    #[test]
    fn test_stop_rewinds() {
        let (mut clock, time) = clock();
        clock.play();
        clock.set_time(42_000);
        time.advance(100);
        clock.stop();
        assert_eq!(clock.time(), 0);
        assert_eq!(clock.status(), ClockStatus::Stopped);
    }

    #[test]
    fn test_set_time_ignored_while_stopped() {
        let (mut clock, _time) = clock();
        clock.set_time(5000);
        assert_eq!(clock.time(), 0);

        clock.pause();
        clock.set_time(5000);
        assert_eq!(clock.time(), 5000);
    }

    #[test]
    fn test_play_from_stopped_keeps_cached_time() {
        let (mut clock, time) = clock();
        clock.pause();
        clock.set_time(2000);
        clock.stop();
        clock.play();
        time.advance(10);
        assert_eq!(clock.time(), 10);
    }

    #[test]
    fn test_maybe_set_time() {
        let (mut clock, time) = clock();
        clock.play();
        time.advance(1000);

        // Within accuracy the extrapolation is kept
        assert!(!clock.maybe_set_time(1500));
        assert_eq!(clock.time(), 1000);

        assert!(clock.maybe_set_time(2001));
        assert_eq!(clock.time(), 2001);

        clock.set_accuracy(10);
        assert!(clock.maybe_set_time(1990));
        assert_eq!(clock.time(), 1990);
    }

    #[test]
    fn test_maybe_set_time_while_stopped() {
        let (mut clock, _time) = clock();
        assert!(!clock.maybe_set_time(5000));
        assert_eq!(clock.time(), 0);
    }
}
