//! Machine state reconstructed from TinyG responses
//!
//! The same structures describe the data section (`"r"`) of an inbound frame
//! and the accumulated snapshot. Field names follow the firmware keys so a
//! frame can be decoded straight into them, and the exported document reads
//! like a full TinyG response with nothing left out.

use super::merge::{merge_nested, merge_value, Merge};
use super::modes::{
    CoordinateSystem, DistanceMode, FeedRateMode, MachineStatus, MotionMode, PathMode,
    PlaneSelect, RxMode, UnitsMode,
};
use serde::{Deserialize, Serialize};

/// Per-axis values of a position or offset table.
///
/// Used for `mpo`, `pos`, `g28`, `g30`, `g54`..`g59` and `g92`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
}

impl AxisTable {
    /// Create a table with the three linear axes set
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            ..Default::default()
        }
    }
}

impl Merge for AxisTable {
    fn merge_from(&mut self, update: &Self) {
        merge_value(&mut self.x, &update.x);
        merge_value(&mut self.y, &update.y);
        merge_value(&mut self.z, &update.z);
        merge_value(&mut self.a, &update.a);
        merge_value(&mut self.b, &update.b);
        merge_value(&mut self.c, &update.c);
    }
}

/// Status report (`sr`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// G-code line number currently executing
    #[serde(rename = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(rename = "vel", default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(rename = "feed", default, skip_serializing_if = "Option::is_none")]
    pub feed_rate: Option<f64>,
    #[serde(rename = "stat", default, skip_serializing_if = "Option::is_none")]
    pub machine_status: Option<MachineStatus>,
    #[serde(rename = "unit", default, skip_serializing_if = "Option::is_none")]
    pub units_mode: Option<UnitsMode>,
    #[serde(rename = "coor", default, skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(rename = "momo", default, skip_serializing_if = "Option::is_none")]
    pub motion_mode: Option<MotionMode>,
    #[serde(rename = "plan", default, skip_serializing_if = "Option::is_none")]
    pub plane_select: Option<PlaneSelect>,
    #[serde(rename = "path", default, skip_serializing_if = "Option::is_none")]
    pub path_mode: Option<PathMode>,
    #[serde(rename = "dist", default, skip_serializing_if = "Option::is_none")]
    pub distance_mode: Option<DistanceMode>,
    #[serde(rename = "frmo", default, skip_serializing_if = "Option::is_none")]
    pub feed_rate_mode: Option<FeedRateMode>,
    #[serde(rename = "admo", default, skip_serializing_if = "Option::is_none")]
    pub arc_distance_mode: Option<i64>,
    #[serde(rename = "posx", default, skip_serializing_if = "Option::is_none")]
    pub working_position_x: Option<f64>,
    #[serde(rename = "posy", default, skip_serializing_if = "Option::is_none")]
    pub working_position_y: Option<f64>,
    #[serde(rename = "posz", default, skip_serializing_if = "Option::is_none")]
    pub working_position_z: Option<f64>,
    #[serde(rename = "posa", default, skip_serializing_if = "Option::is_none")]
    pub working_position_a: Option<f64>,
}

impl Merge for StatusReport {
    fn merge_from(&mut self, update: &Self) {
        merge_value(&mut self.line_number, &update.line_number);
        merge_value(&mut self.velocity, &update.velocity);
        merge_value(&mut self.feed_rate, &update.feed_rate);
        merge_value(&mut self.machine_status, &update.machine_status);
        merge_value(&mut self.units_mode, &update.units_mode);
        merge_value(&mut self.coordinate_system, &update.coordinate_system);
        merge_value(&mut self.motion_mode, &update.motion_mode);
        merge_value(&mut self.plane_select, &update.plane_select);
        merge_value(&mut self.path_mode, &update.path_mode);
        merge_value(&mut self.distance_mode, &update.distance_mode);
        merge_value(&mut self.feed_rate_mode, &update.feed_rate_mode);
        merge_value(&mut self.arc_distance_mode, &update.arc_distance_mode);
        merge_value(&mut self.working_position_x, &update.working_position_x);
        merge_value(&mut self.working_position_y, &update.working_position_y);
        merge_value(&mut self.working_position_z, &update.working_position_z);
        merge_value(&mut self.working_position_a, &update.working_position_a);
    }
}

/// Aggregate machine state
///
/// Doubles as the data section of a decoded response: every field is
/// optional because the firmware only reports what was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    #[serde(rename = "fv", default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<f64>,
    #[serde(rename = "hp", default, skip_serializing_if = "Option::is_none")]
    pub hardware_platform: Option<i64>,
    #[serde(rename = "hv", default, skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<i64>,
    #[serde(rename = "sr", default, skip_serializing_if = "Option::is_none")]
    pub status_report: Option<StatusReport>,
    #[serde(rename = "ex", default, skip_serializing_if = "Option::is_none")]
    pub exception_report: Option<i64>,
    #[serde(rename = "qr", default, skip_serializing_if = "Option::is_none")]
    pub queue_report: Option<i64>,
    #[serde(rename = "rx", default, skip_serializing_if = "Option::is_none")]
    pub rx_buffer_report: Option<i64>,
    #[serde(rename = "mpo", default, skip_serializing_if = "Option::is_none")]
    pub machine_position: Option<AxisTable>,
    #[serde(rename = "pos", default, skip_serializing_if = "Option::is_none")]
    pub working_position: Option<AxisTable>,
    #[serde(rename = "g28", default, skip_serializing_if = "Option::is_none")]
    pub saved_position_g28: Option<AxisTable>,
    #[serde(rename = "g30", default, skip_serializing_if = "Option::is_none")]
    pub saved_position_g30: Option<AxisTable>,
    #[serde(rename = "g54", default, skip_serializing_if = "Option::is_none")]
    pub offset_g54: Option<AxisTable>,
    #[serde(rename = "g55", default, skip_serializing_if = "Option::is_none")]
    pub offset_g55: Option<AxisTable>,
    #[serde(rename = "g56", default, skip_serializing_if = "Option::is_none")]
    pub offset_g56: Option<AxisTable>,
    #[serde(rename = "g57", default, skip_serializing_if = "Option::is_none")]
    pub offset_g57: Option<AxisTable>,
    #[serde(rename = "g58", default, skip_serializing_if = "Option::is_none")]
    pub offset_g58: Option<AxisTable>,
    #[serde(rename = "g59", default, skip_serializing_if = "Option::is_none")]
    pub offset_g59: Option<AxisTable>,
    #[serde(rename = "g92", default, skip_serializing_if = "Option::is_none")]
    pub offset_g92: Option<AxisTable>,
    #[serde(rename = "rxm", default, skip_serializing_if = "Option::is_none")]
    pub rx_mode: Option<RxMode>,
}

impl MachineState {
    /// Active coordinate system, if a status report has reported one
    pub fn coordinate_system(&self) -> Option<CoordinateSystem> {
        self.status_report
            .as_ref()
            .and_then(|sr| sr.coordinate_system)
    }

    /// Machine execution state, if known
    pub fn machine_status(&self) -> Option<MachineStatus> {
        self.status_report.as_ref().and_then(|sr| sr.machine_status)
    }

    /// Offset table of a work coordinate system (`None` for G53 or unknown codes)
    pub fn offset(&self, system: CoordinateSystem) -> Option<&AxisTable> {
        match system {
            CoordinateSystem::G54 => self.offset_g54.as_ref(),
            CoordinateSystem::G55 => self.offset_g55.as_ref(),
            CoordinateSystem::G56 => self.offset_g56.as_ref(),
            CoordinateSystem::G57 => self.offset_g57.as_ref(),
            CoordinateSystem::G58 => self.offset_g58.as_ref(),
            CoordinateSystem::G59 => self.offset_g59.as_ref(),
            CoordinateSystem::G53 | CoordinateSystem::Unknown(_) => None,
        }
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Merge for MachineState {
    fn merge_from(&mut self, update: &Self) {
        merge_value(&mut self.firmware_version, &update.firmware_version);
        merge_value(&mut self.hardware_platform, &update.hardware_platform);
        merge_value(&mut self.hardware_version, &update.hardware_version);
        merge_nested(&mut self.status_report, &update.status_report);
        merge_value(&mut self.exception_report, &update.exception_report);
        merge_value(&mut self.queue_report, &update.queue_report);
        merge_value(&mut self.rx_buffer_report, &update.rx_buffer_report);
        merge_nested(&mut self.machine_position, &update.machine_position);
        merge_nested(&mut self.working_position, &update.working_position);
        merge_nested(&mut self.saved_position_g28, &update.saved_position_g28);
        merge_nested(&mut self.saved_position_g30, &update.saved_position_g30);
        merge_nested(&mut self.offset_g54, &update.offset_g54);
        merge_nested(&mut self.offset_g55, &update.offset_g55);
        merge_nested(&mut self.offset_g56, &update.offset_g56);
        merge_nested(&mut self.offset_g57, &update.offset_g57);
        merge_nested(&mut self.offset_g58, &update.offset_g58);
        merge_nested(&mut self.offset_g59, &update.offset_g59);
        merge_nested(&mut self.offset_g92, &update.offset_g92);
        merge_value(&mut self.rx_mode, &update.rx_mode);
    }
}
