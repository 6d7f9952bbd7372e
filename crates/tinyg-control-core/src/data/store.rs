//! Shared machine state store
//!
//! Single writer (the receive loop), any number of readers. Readers always
//! see a state between two merges, never a half-applied frame.

use super::merge::Merge;
use super::modes::CoordinateSystem;
use super::state::MachineState;
use crate::error::{Error, Result};
use parking_lot::RwLock;

/// Read-write locked [`MachineState`]
#[derive(Debug, Default)]
pub struct StateStore {
    state: RwLock<MachineState>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a decoded data section into the current state
    pub fn merge(&self, update: &MachineState) {
        if update.is_empty() {
            return;
        }
        self.state.write().merge_from(update);
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> MachineState {
        self.state.read().clone()
    }

    /// Serialized JSON document of the current state
    pub fn to_json(&self) -> Result<String> {
        let state = self.state.read();
        serde_json::to_string(&*state)
            .map_err(|e| Error::other(format!("Failed to serialize machine state: {}", e)))
    }

    /// Active coordinate system without cloning the whole state
    pub fn coordinate_system(&self) -> Option<CoordinateSystem> {
        self.state.read().coordinate_system()
    }

    /// Forget everything known about the machine
    pub fn reset(&self) {
        *self.state.write() = MachineState::default();
        tracing::debug!("Machine state cleared");
    }
}
