//! Dual-lane command queue
//!
//! Control/status requests and G-code motion lines wait in separate FIFO
//! lanes. The control lane is served first, but each lane only releases a
//! line while enough credit is free, so a burst of G-code never starves the
//! status requests of buffer room.
//!
//! Flushing clears both lanes and advances a generation counter. Entries
//! carry the generation they were taken in; the transmit loop drops any
//! entry whose generation is stale by the time it gets the port.

use crate::communication::credit::CreditCounter;
use crate::protocol::normalize;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tinyg_control_core::{ControllerError, Result};
use tinyg_control_settings::FlowSettings;
use tokio::sync::Notify;

/// Queue lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Status requests and other JSON commands
    Control,
    /// G-code
    Data,
}

/// Free credit each lane needs before a line is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneThresholds {
    pub control: u32,
    pub data: u32,
}

impl LaneThresholds {
    pub fn for_lane(&self, lane: Lane) -> u32 {
        match lane {
            Lane::Control => self.control,
            Lane::Data => self.data,
        }
    }
}

impl From<&FlowSettings> for LaneThresholds {
    fn from(flow: &FlowSettings) -> Self {
        Self {
            control: flow.control_lane_threshold,
            data: flow.data_lane_threshold,
        }
    }
}

/// Line taken from the queue for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Normalized command text
    pub line: String,
    pub lane: Lane,
    /// Flush generation at the time the entry was taken
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Lanes {
    control: VecDeque<String>,
    data: VecDeque<String>,
}

impl Lanes {
    fn lane_mut(&mut self, lane: Lane) -> &mut VecDeque<String> {
        match lane {
            Lane::Control => &mut self.control,
            Lane::Data => &mut self.data,
        }
    }

    fn len(&self) -> usize {
        self.control.len() + self.data.len()
    }
}

#[derive(Debug)]
pub struct CommandQueue {
    lanes: Mutex<Lanes>,
    capacity: usize,
    generation: AtomicU64,
    notify: Notify,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            lanes: Mutex::new(Lanes::default()),
            capacity,
            generation: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pending lines across both lanes
    pub fn len(&self) -> usize {
        self.lanes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending lines in one lane
    pub fn lane_len(&self, lane: Lane) -> usize {
        self.lanes.lock().lane_mut(lane).len()
    }

    /// Normalize and append a batch to `lane`
    ///
    /// Lines that normalize to nothing are dropped. The batch is accepted
    /// whole or not at all; returns the number of lines queued.
    pub fn enqueue<I, S>(&self, lines: I, lane: Lane) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch: Vec<String> = lines
            .into_iter()
            .map(|line| normalize(line.as_ref()))
            .filter(|line| !line.is_empty())
            .collect();
        if batch.is_empty() {
            return Ok(0);
        }

        let count = batch.len();
        {
            let mut lanes = self.lanes.lock();
            let available = self.capacity.saturating_sub(lanes.len());
            if count > available {
                return Err(ControllerError::QueueFull {
                    capacity: self.capacity,
                    available,
                    requested: count,
                }
                .into());
            }
            lanes.lane_mut(lane).extend(batch);
        }
        self.notify.notify_one();
        Ok(count)
    }

    /// Append `token` unless the same token is already waiting in `lane`
    ///
    /// Returns whether the token was queued.
    pub fn enqueue_coalesced(&self, token: &str, lane: Lane) -> Result<bool> {
        let token = normalize(token);
        if token.is_empty() {
            return Ok(false);
        }
        {
            let mut lanes = self.lanes.lock();
            if lanes.lane_mut(lane).iter().any(|pending| *pending == token) {
                return Ok(false);
            }
            let available = self.capacity.saturating_sub(lanes.len());
            if available == 0 {
                return Err(ControllerError::QueueFull {
                    capacity: self.capacity,
                    available,
                    requested: 1,
                }
                .into());
            }
            lanes.lane_mut(lane).push_back(token);
        }
        self.notify.notify_one();
        Ok(true)
    }

    /// Take the next line whose lane threshold is met, acquiring its credit
    pub fn pop_ready(
        &self,
        credit: &CreditCounter,
        thresholds: LaneThresholds,
    ) -> Option<QueueEntry> {
        let mut lanes = self.lanes.lock();
        for lane in [Lane::Control, Lane::Data] {
            let pending = lanes.lane_mut(lane);
            if pending.is_empty() || !credit.try_acquire(thresholds.for_lane(lane)) {
                continue;
            }
            let line = pending.pop_front()?;
            return Some(QueueEntry {
                line,
                lane,
                generation: self.generation.load(Ordering::Acquire),
            });
        }
        None
    }

    /// Discard everything pending and invalidate entries already taken
    pub fn flush(&self) -> usize {
        let dropped = {
            let mut lanes = self.lanes.lock();
            let dropped = lanes.len();
            lanes.control.clear();
            lanes.data.clear();
            self.generation.fetch_add(1, Ordering::AcqRel);
            dropped
        };
        if dropped > 0 {
            tracing::debug!("Flushed {} queued line(s)", dropped);
        }
        dropped
    }

    /// Whether an entry taken in `generation` may still be sent
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Resolves after the next enqueue
    pub async fn changed(&self) {
        self.notify.notified().await;
    }
}
