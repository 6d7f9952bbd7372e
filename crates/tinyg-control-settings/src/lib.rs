//! Configuration for tinyg-control
//!
//! Every tuning value of the link engine (serial parameters, flow-control
//! credit and lane thresholds, poll intervals, settle durations) lives here
//! so it can be overridden from a `.toml` or `.json` file.

pub mod config;

pub use config::{
    Config, FlowControl, FlowSettings, Parity, PollSettings, SerialSettings, SpindleSettings,
    TimingSettings,
};
