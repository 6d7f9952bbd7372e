//! Integer-coded modes reported in TinyG status reports
//!
//! Every mode travels as a small integer on the wire. Any other integer,
//! including codes a newer firmware may add, is kept as `Unknown(code)`
//! instead of failing the whole frame.

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i64", into = "i64")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Code not known to this version
            Unknown(i64),
        }

        impl From<i64> for $name {
            fn from(code: i64) -> Self {
                match code {
                    $( $code => Self::$variant, )+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                match value {
                    $( $name::$variant => $code, )+
                    $name::Unknown(other) => other,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( Self::$variant => f.write_str($label), )+
                    Self::Unknown(code) => write!(f, "Unknown({})", code),
                }
            }
        }
    };
}

wire_enum! {
    /// Machine execution state (`stat`)
    MachineStatus {
        /// Machine is initializing
        Initializing = 0 => "Initializing",
        /// Ready for use
        Ready = 1 => "Ready",
        /// Machine in alarm state
        Alarm = 2 => "Alarm",
        /// Program stop (M0, M1, M60)
        ProgramStop = 3 => "Program Stop",
        /// Program end (M2, M30)
        ProgramEnd = 4 => "Program End",
        /// Motion running
        Run = 5 => "Run",
        /// Motion holding
        Hold = 6 => "Hold",
        /// Probe cycle active
        Probe = 7 => "Probe",
        /// Machine running a cycle
        Cycle = 8 => "Cycle",
        /// Homing cycle active
        Homing = 9 => "Homing",
        /// Jogging cycle active
        Jog = 10 => "Jog",
        /// Interlock active
        Interlock = 11 => "Interlock",
        /// Machine shut down
        Shutdown = 12 => "Shutdown",
        /// Panic, reset required
        Panic = 13 => "Panic",
    }
}

wire_enum! {
    /// Units mode (`unit`)
    UnitsMode {
        /// G20
        Inches = 0 => "G20",
        /// G21
        Millimeters = 1 => "G21",
    }
}

wire_enum! {
    /// Active coordinate system (`coor`)
    CoordinateSystem {
        /// G53 machine coordinates
        G53 = 0 => "G53",
        /// G54
        G54 = 1 => "G54",
        /// G55
        G55 = 2 => "G55",
        /// G56
        G56 = 3 => "G56",
        /// G57
        G57 = 4 => "G57",
        /// G58
        G58 = 5 => "G58",
        /// G59
        G59 = 6 => "G59",
    }
}

wire_enum! {
    /// Motion mode (`momo`)
    MotionMode {
        /// G0 traverse
        Traverse = 0 => "G0",
        /// G1 straight feed
        StraightFeed = 1 => "G1",
        /// G2 clockwise arc
        CwArc = 2 => "G2",
        /// G3 counter-clockwise arc
        CcwArc = 3 => "G3",
        /// G80 motion mode cancel
        Cancel = 4 => "G80",
    }
}

wire_enum! {
    /// Plane selection (`plan`)
    PlaneSelect {
        /// G17
        Xy = 0 => "G17",
        /// G18
        Xz = 1 => "G18",
        /// G19
        Yz = 2 => "G19",
    }
}

wire_enum! {
    /// Path control mode (`path`)
    PathMode {
        /// G61.1
        ExactStop = 0 => "G61.1",
        /// G61
        ExactPath = 1 => "G61",
        /// G64
        Continuous = 2 => "G64",
    }
}

wire_enum! {
    /// Distance mode (`dist`)
    DistanceMode {
        /// G90
        Absolute = 0 => "G90",
        /// G91
        Incremental = 1 => "G91",
    }
}

wire_enum! {
    /// Feed rate mode (`frmo`)
    FeedRateMode {
        /// G94
        UnitsPerMinute = 0 => "G94",
        /// G93
        InverseTime = 1 => "G93",
    }
}

wire_enum! {
    /// Serial receive mode (`rxm`)
    RxMode {
        /// Character mode
        Character = 0 => "Character",
        /// Line mode
        Line = 1 => "Line",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_system_codes() {
        assert_eq!(CoordinateSystem::from(1), CoordinateSystem::G54);
        assert_eq!(CoordinateSystem::from(6), CoordinateSystem::G59);
        assert_eq!(i64::from(CoordinateSystem::G56), 3);
        assert_eq!(CoordinateSystem::G57.to_string(), "G57");
    }

    #[test]
    fn test_unknown_code_is_kept() {
        let status: MachineStatus = serde_json::from_str("42").unwrap();
        assert_eq!(status, MachineStatus::Unknown(42));
        assert_eq!(serde_json::to_string(&status).unwrap(), "42");
        assert_eq!(status.to_string(), "Unknown(42)");
    }

    #[test]
    fn test_out_of_range_codes_are_kept() {
        let status: MachineStatus = serde_json::from_str("300").unwrap();
        assert_eq!(status, MachineStatus::Unknown(300));
        let units: UnitsMode = serde_json::from_str("-1").unwrap();
        assert_eq!(units, UnitsMode::Unknown(-1));
        assert_eq!(serde_json::to_string(&status).unwrap(), "300");
    }

    #[test]
    fn test_status_serializes_as_code() {
        assert_eq!(serde_json::to_string(&MachineStatus::Run).unwrap(), "5");
        let mode: RxMode = serde_json::from_str("1").unwrap();
        assert_eq!(mode, RxMode::Line);
    }
}
