//! Playback timing
//!
//! - `time_source`: monotonic millisecond clock, swappable in tests
//! - `clock`: free-running play/pause/stop clock
//! - `reconciler`: smoothing of coarse player position reports

pub mod clock;
pub mod reconciler;
pub mod time_source;

pub use clock::{ClockStatus, PlaybackClock};
pub use reconciler::PositionReconciler;
pub use time_source::{ManualTime, MonotonicTime, TimeSource};
