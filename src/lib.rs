//! # tinyg-control
//!
//! Drives a TinyG CNC motion controller over its serial link and keeps a
//! merged picture of the machine state from the firmware's JSON responses.
//!
//! ## Architecture
//!
//! 1. **tinyg-control-core** - machine state model, merge rules, errors
//! 2. **tinyg-control-settings** - configuration files and validation
//! 3. **tinyg-control-communication** - codec, command queue, credit flow
//!    control, receive/transmit loops, poller and the lifecycle controller
//! 4. **tinyg-control** - logging setup and a small interactive shell

pub mod shell;

pub use tinyg_control_communication::{
    list_ports, Connector, Lane, LinkPhase, SerialConnector, Spindle, SpindleStatus,
    TinyGController,
};
pub use tinyg_control_core::{
    ConnectionError, ControllerError, Error, MachineState, ProtocolError, Result, StateStore,
};
pub use tinyg_control_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - `RUST_LOG` filter support, `info` when unset
/// - Pretty console output on stderr, or JSON lines when
///   `TINYG_LOG_FORMAT=json`
///
/// Logs go to stderr so the shell output on stdout stays readable.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TINYG_LOG_FORMAT").is_ok_and(|format| format == "json");

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
