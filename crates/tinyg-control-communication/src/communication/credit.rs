//! Receive-buffer credit
//!
//! Counts how many more lines the device buffer is trusted to accept. The
//! transmit loop takes one unit per written line; the receive loop returns
//! one for each acknowledging footer. The value never leaves
//! `0..=default_credit`.

use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Notify;

#[derive(Debug)]
pub struct CreditCounter {
    available: AtomicU32,
    default_credit: u32,
    notify: Notify,
}

impl CreditCounter {
    /// Counter starting full
    pub fn new(default_credit: u32) -> Self {
        Self {
            available: AtomicU32::new(default_credit),
            default_credit,
            notify: Notify::new(),
        }
    }

    pub fn available(&self) -> u32 {
        self.available.load(Ordering::Acquire)
    }

    pub fn default_credit(&self) -> u32 {
        self.default_credit
    }

    /// Take one unit if at least `threshold` units are free
    pub fn try_acquire(&self, threshold: u32) -> bool {
        let threshold = threshold.max(1);
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current >= threshold).then(|| current - 1)
            })
            .is_ok()
    }

    /// Give one unit back, saturating at the default
    pub fn release(&self) -> bool {
        let released = self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.default_credit).then(|| current + 1)
            })
            .is_ok();
        if released {
            self.notify.notify_one();
        }
        released
    }

    /// Restore the full default credit
    pub fn reset(&self) {
        self.available.store(self.default_credit, Ordering::Release);
        self.notify.notify_one();
    }

    /// Resolves after the next release or reset
    pub async fn changed(&self) {
        self.notify.notified().await;
    }
}
