//! Status codes carried in the response footer
//!
//! The second footer element reports how the firmware handled the line that
//! triggered the response. Codes are grouped in ranges; only the ones worth
//! naming in a log line are listed here.

use serde::{Deserialize, Serialize};

/// Range a status code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCodeClass {
    /// 0
    Ok,
    /// 1..=19 system and comms status
    System,
    /// 20..=89 internal system errors
    Internal,
    /// 90..=99 assertion failures
    Assertion,
    /// 100..=129 generic data input errors
    Input,
    /// 130..=199 G-code errors and warnings
    Gcode,
    /// 200..=255 machine errors (limits, homing, probing)
    Machine,
    /// Anything above
    Reserved,
}

/// Firmware status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const NOOP: StatusCode = StatusCode(3);
    pub const BUFFER_FULL: StatusCode = StatusCode(13);
    pub const ALARMED: StatusCode = StatusCode(27);
    pub const JSON_SYNTAX_ERROR: StatusCode = StatusCode(111);
    pub const MACHINE_ALARMED: StatusCode = StatusCode(203);

    /// True for codes that do not report a problem
    pub fn is_ok(self) -> bool {
        matches!(self.0, 0 | 3 | 4)
    }

    /// Range of the code
    pub fn class(self) -> StatusCodeClass {
        match self.0 {
            0 => StatusCodeClass::Ok,
            1..=19 => StatusCodeClass::System,
            20..=89 => StatusCodeClass::Internal,
            90..=99 => StatusCodeClass::Assertion,
            100..=129 => StatusCodeClass::Input,
            130..=199 => StatusCodeClass::Gcode,
            200..=255 => StatusCodeClass::Machine,
            _ => StatusCodeClass::Reserved,
        }
    }

    /// Short firmware name of well-known codes
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "OK",
            1 => "ERROR",
            2 => "EAGAIN",
            3 => "NOOP",
            4 => "COMPLETE",
            5 => "TERMINATE",
            6 => "RESET",
            7 => "EOL",
            8 => "EOF",
            12 => "BUFFER_EMPTY",
            13 => "BUFFER_FULL",
            14 => "BUFFER_FULL_FATAL",
            15 => "INITIALIZING",
            20 => "INTERNAL_ERROR",
            21 => "INTERNAL_RANGE_ERROR",
            22 => "FLOATING_POINT_ERROR",
            23 => "DIVIDE_BY_ZERO",
            27 => "ALARMED",
            28 => "FAILED_TO_GET_PLANNER_BUFFER",
            29 => "GENERIC_EXCEPTION_REPORT",
            35 => "BAD_STATUS_REPORT_SETTING",
            97 => "STACK_OVERFLOW",
            98 => "MEMORY_FAULT",
            100 => "UNRECOGNIZED_NAME",
            101 => "INVALID_OR_MALFORMED_COMMAND",
            102 => "BAD_NUMBER_FORMAT",
            103 => "UNSUPPORTED_TYPE",
            104 => "PARAMETER_IS_READ_ONLY",
            105 => "PARAMETER_CANNOT_BE_READ",
            106 => "COMMAND_NOT_ACCEPTED",
            107 => "INPUT_EXCEEDS_MAX_LENGTH",
            108 => "INPUT_LESS_THAN_MIN_VALUE",
            109 => "INPUT_EXCEEDS_MAX_VALUE",
            110 => "INPUT_VALUE_RANGE_ERROR",
            111 => "JSON_SYNTAX_ERROR",
            112 => "JSON_TOO_MANY_PAIRS",
            113 => "JSON_TOO_LONG",
            130 => "GCODE_GENERIC_INPUT_ERROR",
            131 => "GCODE_COMMAND_UNSUPPORTED",
            132 => "MCODE_COMMAND_UNSUPPORTED",
            133 => "GCODE_MODAL_GROUP_VIOLATION",
            134 => "GCODE_AXIS_IS_MISSING",
            142 => "GCODE_FEEDRATE_NOT_SPECIFIED",
            149 => "SPINDLE_SPEED_BELOW_MINIMUM",
            150 => "SPINDLE_SPEED_MAX_EXCEEDED",
            153 => "SPINDLE_MUST_BE_OFF",
            154 => "SPINDLE_MUST_BE_TURNING",
            155 => "ARC_SPECIFICATION_ERROR",
            200 => "GENERIC_ERROR",
            201 => "MINIMUM_LENGTH_MOVE",
            202 => "MINIMUM_TIME_MOVE",
            203 => "MACHINE_ALARMED",
            204 => "LIMIT_SWITCH_HIT",
            205 => "PLANNER_FAILED_TO_CONVERGE",
            220 => "SOFT_LIMIT_EXCEEDED",
            221..=232 => "SOFT_LIMIT_EXCEEDED_AXIS",
            240 => "HOMING_CYCLE_FAILED",
            241..=247 => "HOMING_ERROR",
            250 => "PROBE_CYCLE_FAILED",
            251 => "PROBE_ENDPOINT",
            252 => "JOGGING_CYCLE_FAILED",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "status {}", self.0),
        }
    }
}
