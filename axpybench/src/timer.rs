use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic clock anchored to wall time when the session opens.
///
/// Trace timestamps are reported as offsets from the Unix epoch so events from
/// different steps land on one timeline, but they are measured with `Instant`
/// so they never go backwards.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    origin: Instant,
    origin_wall: Duration,
}

/// A running measurement started by [`Timer::start`].
#[derive(Debug, Clone, Copy)]
pub struct Span {
    started: Instant,
    start: Duration,
}

/// A finished measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub start: Duration,
    pub duration: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_wall: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        }
    }

    pub fn start(&self) -> Span {
        let started = Instant::now();
        Span {
            started,
            start: self.origin_wall + started.duration_since(self.origin),
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Span {
    pub fn stop(self) -> Timing {
        Timing {
            start: self.start,
            duration: self.started.elapsed(),
        }
    }
}
