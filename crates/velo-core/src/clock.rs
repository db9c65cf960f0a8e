use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic high-resolution clock with a wall-clock anchor.
///
/// `now_ms` values are safe to subtract and compare within one process but
/// carry no epoch guarantee. The epoch offset is sampled exactly once at
/// construction so that `wall_ms` stays consistent with the monotonic
/// timeline even if the system clock is adjusted later.
#[derive(Debug, Clone)]
pub struct Clock {
    origin: Instant,
    epoch_offset_ms: f64,
}

impl Clock {
    pub fn new() -> Self {
        let epoch_offset_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        Self {
            origin: Instant::now(),
            epoch_offset_ms,
        }
    }

    /// Milliseconds since this clock was created, with sub-millisecond
    /// resolution. Monotonically non-decreasing.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    /// Epoch-anchored milliseconds, for response fields that echo server
    /// time to clients.
    pub fn wall_ms(&self) -> f64 {
        self.epoch_offset_ms + self.now_ms()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
