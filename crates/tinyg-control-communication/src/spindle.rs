//! Spindle / VFD side channel
//!
//! A variable frequency drive that follows the G-code stream for `S` and
//! `M3`/`M4`/`M5` words. The transmit loop hands each line to the drive and
//! waits until the drive reports it has applied it before the line goes to
//! the motion controller, so the spindle is up to speed before motion starts.
//!
//! Only the contract lives here; drive implementations are external.

use async_trait::async_trait;
use serde::Serialize;
use tinyg_control_core::Result;

/// Spindle rotation direction as set on the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpindleDirection {
    #[default]
    Stopped,
    Forward,
    Reverse,
}

/// Progress of the line last submitted with [`Spindle::command_waiting`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpindleProgress {
    /// Drive has applied the line
    pub done: bool,
    /// Frequency the drive is running at, in Hz
    pub frequency: f64,
    /// Drive specific status text
    pub status: String,
}

/// Point-in-time readout of the drive
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpindleStatus {
    /// Commanded frequency, Hz
    pub frequency_set: f64,
    /// Actual output frequency, Hz
    pub output_frequency: f64,
    pub output_rpm: f64,
    pub direction: SpindleDirection,
}

#[async_trait]
pub trait Spindle: Send + Sync {
    /// Apply a G-code line without waiting
    async fn command(&self, line: &str) -> Result<()>;

    /// Submit a G-code line whose completion is then tracked by [`Self::processed`]
    async fn command_waiting(&self, line: &str) -> Result<()>;

    /// Completion state of the last waiting command
    async fn processed(&self) -> Result<SpindleProgress>;

    fn output_frequency(&self) -> f64;

    fn frequency_set(&self) -> f64;

    fn output_rpm(&self) -> f64;

    fn direction(&self) -> SpindleDirection;

    /// Release the drive connection
    async fn close(&self) -> Result<()>;

    fn status(&self) -> SpindleStatus {
        SpindleStatus {
            frequency_set: self.frequency_set(),
            output_frequency: self.output_frequency(),
            output_rpm: self.output_rpm(),
            direction: self.direction(),
        }
    }
}
