//! Configuration file handling
//!
//! Configuration is organized into logical sections:
//! - Serial settings (device path, framing, flow control)
//! - Flow settings (receive-buffer credit, lane thresholds, queue capacity)
//! - Poll settings (state refresh intervals)
//! - Timing settings (settle durations, liveness threshold, spindle waits)
//! - Optional spindle/VFD settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tinyg_control_core::{Error, Result};

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Serial flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    None,
    Software,
    /// RTS/CTS
    #[default]
    Hardware,
}

impl std::fmt::Display for FlowControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Software => write!(f, "xon/xoff"),
            Self::Hardware => write!(f, "rts/cts"),
        }
    }
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path (e.g. "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5..=8)
    pub data_bits: u8,
    /// Parity
    pub parity: Parity,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Flow control
    pub flow_control: FlowControl,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: FlowControl::Hardware,
        }
    }
}

/// Flow control settings
///
/// `default_credit` is the number of lines the device buffer is trusted to
/// hold. A lane only sends while at least its threshold of credit is free,
/// which keeps room for status requests during bulk G-code streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Initial and maximum credit
    pub default_credit: u32,
    /// Free credit required before a control/status line is sent
    pub control_lane_threshold: u32,
    /// Free credit required before a G-code line is sent
    pub data_lane_threshold: u32,
    /// Maximum number of pending lines across both lanes
    pub queue_capacity: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            default_credit: 4,
            control_lane_threshold: 2,
            data_lane_threshold: 3,
            queue_capacity: 10000,
        }
    }
}

/// Periodic state refresh settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Run the poller at all
    pub enabled: bool,
    /// Enqueue a full state refresh right after open
    pub refresh_on_open: bool,
    /// Absolute machine position (`{mpo:n}`) interval
    pub machine_position_ms: u64,
    /// Working position (`{pos:n}`) interval
    pub working_position_ms: u64,
    /// Active coordinate system offset interval
    pub coordinate_offset_ms: u64,
    /// Full status report (`{sr:n}`) interval
    pub full_status_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_on_open: true,
            machine_position_ms: 5000,
            working_position_ms: 5000,
            coordinate_offset_ms: 7000,
            full_status_ms: 5000,
        }
    }
}

impl PollSettings {
    pub fn machine_position_interval(&self) -> Duration {
        Duration::from_millis(self.machine_position_ms)
    }

    pub fn working_position_interval(&self) -> Duration {
        Duration::from_millis(self.working_position_ms)
    }

    pub fn coordinate_offset_interval(&self) -> Duration {
        Duration::from_millis(self.coordinate_offset_ms)
    }

    pub fn full_status_interval(&self) -> Duration {
        Duration::from_millis(self.full_status_ms)
    }
}

/// Timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Pause after the flush and alarm clear writes before credit is restored
    pub flush_settle_ms: u64,
    /// Pause after a hardware reset before the queue is flushed
    pub reset_settle_ms: u64,
    /// Link counts as online while the last frame is younger than this
    pub online_threshold_ms: u64,
    /// Spindle completion polling interval
    pub spindle_poll_ms: u64,
    /// Upper bound for one spindle rendezvous
    pub spindle_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            flush_settle_ms: 0,
            reset_settle_ms: 5000,
            online_threshold_ms: 1000,
            spindle_poll_ms: 5,
            spindle_timeout_ms: 10000,
        }
    }
}

impl TimingSettings {
    pub fn flush_settle(&self) -> Duration {
        Duration::from_millis(self.flush_settle_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn online_threshold(&self) -> Duration {
        Duration::from_millis(self.online_threshold_ms)
    }

    pub fn spindle_poll(&self) -> Duration {
        Duration::from_millis(self.spindle_poll_ms)
    }

    pub fn spindle_timeout(&self) -> Duration {
        Duration::from_millis(self.spindle_timeout_ms)
    }
}

/// Spindle/VFD driver settings, handed to the spindle implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpindleSettings {
    /// VFD serial device
    pub port: String,
    /// Maximum allowed spindle speed
    pub max_rpm: u16,
    /// RPM to Hz conversion factor, usually determined experimentally
    pub rpm_to_hz: f64,
    /// VFD status readout interval
    pub poll_interval_ms: u64,
}

impl Default for SpindleSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB1".to_string(),
            max_rpm: 11520,
            rpm_to_hz: 3.47222,
            poll_interval_ms: 750,
        }
    }
}

/// Complete configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialSettings,
    pub flow: FlowSettings,
    pub polling: PollSettings,
    pub timing: TimingSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spindle: Option<SpindleSettings>,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform default location (`<config dir>/tinyg-control/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tinyg-control").join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::other(format!("Failed to create config directory: {}", e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            return Err(Error::other("Serial port must not be empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(Error::other("Baud rate must be > 0"));
        }
        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(Error::other(format!(
                "Invalid data bits: {}",
                self.serial.data_bits
            )));
        }
        if !(1..=2).contains(&self.serial.stop_bits) {
            return Err(Error::other(format!(
                "Invalid stop bits: {}",
                self.serial.stop_bits
            )));
        }

        let flow = &self.flow;
        if flow.default_credit == 0 {
            return Err(Error::other("Default credit must be > 0"));
        }
        for (name, threshold) in [
            ("Control lane", flow.control_lane_threshold),
            ("Data lane", flow.data_lane_threshold),
        ] {
            if threshold == 0 || threshold > flow.default_credit {
                return Err(Error::other(format!(
                    "{} threshold must be between 1 and the default credit ({}), got {}",
                    name, flow.default_credit, threshold
                )));
            }
        }
        if flow.queue_capacity == 0 {
            return Err(Error::other("Queue capacity must be > 0"));
        }

        let polling = &self.polling;
        if polling.machine_position_ms == 0
            || polling.working_position_ms == 0
            || polling.coordinate_offset_ms == 0
            || polling.full_status_ms == 0
        {
            return Err(Error::other("Poll intervals must be > 0"));
        }

        if self.timing.online_threshold_ms == 0 {
            return Err(Error::other("Online threshold must be > 0"));
        }
        if self.timing.spindle_poll_ms == 0 {
            return Err(Error::other("Spindle poll interval must be > 0"));
        }

        if let Some(spindle) = &self.spindle {
            if spindle.max_rpm == 0 {
                return Err(Error::other("Spindle max RPM must be > 0"));
            }
            if spindle.rpm_to_hz <= 0.0 {
                return Err(Error::other("Spindle RPM to Hz factor must be > 0"));
            }
        }

        Ok(())
    }
}
