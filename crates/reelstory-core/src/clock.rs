//! Wall-clock source for event timestamps.
//!
//! Playback timing never reads the wall clock; it is driven by the ticker.

use chrono::{DateTime, Utc};

/// Source of event and story timestamps.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
