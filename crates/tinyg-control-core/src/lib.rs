//! # tinyg-control core
//!
//! Core types shared by the tinyg-control crates.
//! Provides the machine state model reconstructed from TinyG responses,
//! the merge rules that fold partial updates into it, and the error types
//! used across the workspace.

pub mod data;
pub mod error;

pub use data::{
    AxisTable, CoordinateSystem, DistanceMode, FeedRateMode, Merge, MachineState, MachineStatus,
    MotionMode, PathMode, PlaneSelect, RxMode, StateStore, StatusCode, StatusCodeClass,
    StatusReport, UnitsMode,
};

pub use error::{ConnectionError, ControllerError, Error, ProtocolError, Result};
