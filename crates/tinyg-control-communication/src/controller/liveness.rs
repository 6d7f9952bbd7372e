//! Link liveness tracking

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Time of the last successfully decoded frame
#[derive(Debug, Default)]
pub struct Liveness {
    last_frame: Mutex<Option<Instant>>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame received now
    pub fn touch(&self) {
        *self.last_frame.lock() = Some(Instant::now());
    }

    /// Mark the link offline until the next frame
    pub fn clear(&self) {
        *self.last_frame.lock() = None;
    }

    pub fn last_frame(&self) -> Option<Instant> {
        *self.last_frame.lock()
    }

    /// Whether a frame arrived less than `threshold` ago
    pub fn is_online(&self, threshold: Duration) -> bool {
        self.last_frame()
            .is_some_and(|at| at.elapsed() < threshold)
    }
}
