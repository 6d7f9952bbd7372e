//! Machine state data model
//!
//! - [`MachineState`]: everything the firmware has reported so far
//! - [`Merge`]: overwrite-if-present folding of partial updates
//! - [`StateStore`]: the lock-guarded snapshot shared with callers
//! - [`StatusCode`]: footer status classification

pub mod merge;
pub mod modes;
pub mod state;
pub mod status_code;
pub mod store;

pub use merge::{merge_nested, merge_value, Merge};
pub use modes::{
    CoordinateSystem, DistanceMode, FeedRateMode, MachineStatus, MotionMode, PathMode,
    PlaneSelect, RxMode, UnitsMode,
};
pub use state::{AxisTable, MachineState, StatusReport};
pub use status_code::{StatusCode, StatusCodeClass};
pub use store::StateStore;
