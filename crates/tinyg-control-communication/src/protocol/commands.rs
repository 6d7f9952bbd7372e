//! TinyG command vocabulary
//!
//! Single-byte realtime commands bypass the planner and are written straight
//! to the port. JSON request tokens (`{key:n}`) ask the firmware to report a
//! value and travel through the command queue like any other line.

use std::fmt;
use tinyg_control_core::CoordinateSystem;

/// Feed hold
pub const FEED_HOLD: u8 = b'!';
/// Cycle start / resume after hold
pub const FEED_RESUME: u8 = b'~';
/// Hardware reset (^X)
pub const RESET: u8 = 0x18;
/// Flush planner and serial buffers (^D)
pub const FLUSH: u8 = 0x04;
/// Feed hold immediately followed by a queue flush
pub const HOLD_FLUSH: &str = "!%";
/// Clear alarm state
pub const CLEAR_ALARMS: &str = "{clr:n}";
/// Stop command handed to the spindle when the link opens
pub const SPINDLE_STOP: &str = "S0 M5";

/// Status request understood by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Full status report `{sr:n}`
    StatusReport,
    /// Working position `{pos:n}`
    WorkingPosition,
    /// Absolute machine position `{mpo:n}`
    MachinePosition,
    /// Coordinate system offsets `{g54:n}`..`{g59:n}`
    OffsetG54,
    OffsetG55,
    OffsetG56,
    OffsetG57,
    OffsetG58,
    OffsetG59,
    /// Additional G92 offset
    OffsetG92,
    /// G28 saved position
    SavedPositionG28,
    /// G30 saved position
    SavedPositionG30,
    FirmwareVersion,
    HardwareVersion,
    HardwarePlatform,
    ExceptionReport,
    QueueReport,
    RxBufferReport,
    /// Query receive mode `{rxm:n}`
    RxMode,
    /// Switch the firmware to line mode `{rxm:1}`
    LineMode,
}

impl Request {
    /// Wire text of the request
    pub fn token(self) -> &'static str {
        match self {
            Self::StatusReport => "{sr:n}",
            Self::WorkingPosition => "{pos:n}",
            Self::MachinePosition => "{mpo:n}",
            Self::OffsetG54 => "{g54:n}",
            Self::OffsetG55 => "{g55:n}",
            Self::OffsetG56 => "{g56:n}",
            Self::OffsetG57 => "{g57:n}",
            Self::OffsetG58 => "{g58:n}",
            Self::OffsetG59 => "{g59:n}",
            Self::OffsetG92 => "{g92:n}",
            Self::SavedPositionG28 => "{g28:n}",
            Self::SavedPositionG30 => "{g30:n}",
            Self::FirmwareVersion => "{fv:n}",
            Self::HardwareVersion => "{hv:n}",
            Self::HardwarePlatform => "{hp:n}",
            Self::ExceptionReport => "{ex:n}",
            Self::QueueReport => "{qr:n}",
            Self::RxBufferReport => "{rx:n}",
            Self::RxMode => "{rxm:n}",
            Self::LineMode => "{rxm:1}",
        }
    }

    /// Offset request for a coordinate system
    ///
    /// G53 is machine coordinates and has no offset table.
    pub fn offset_for(system: CoordinateSystem) -> Option<Self> {
        match system {
            CoordinateSystem::G54 => Some(Self::OffsetG54),
            CoordinateSystem::G55 => Some(Self::OffsetG55),
            CoordinateSystem::G56 => Some(Self::OffsetG56),
            CoordinateSystem::G57 => Some(Self::OffsetG57),
            CoordinateSystem::G58 => Some(Self::OffsetG58),
            CoordinateSystem::G59 => Some(Self::OffsetG59),
            CoordinateSystem::G53 | CoordinateSystem::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Requests issued for a complete state refresh, in send order
pub const REFRESH_SEQUENCE: [Request; 20] = [
    Request::LineMode,
    Request::StatusReport,
    Request::FirmwareVersion,
    Request::HardwarePlatform,
    Request::HardwareVersion,
    Request::OffsetG54,
    Request::OffsetG55,
    Request::OffsetG56,
    Request::OffsetG57,
    Request::OffsetG58,
    Request::OffsetG59,
    Request::OffsetG92,
    Request::SavedPositionG28,
    Request::SavedPositionG30,
    Request::ExceptionReport,
    Request::QueueReport,
    Request::RxBufferReport,
    Request::RxMode,
    Request::WorkingPosition,
    Request::MachinePosition,
];
