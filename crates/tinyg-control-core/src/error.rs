//! Error handling for tinyg-control
//!
//! Provides the error types for every layer of the link engine:
//! - Controller errors (lifecycle and queue related)
//! - Connection errors (transport open/write failures)
//! - Protocol errors (inbound frames that cannot be decoded)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Controller error type
///
/// Represents errors raised by the lifecycle controller and its command queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Controller is not open
    #[error("Controller not connected")]
    NotConnected,

    /// The command queue cannot take the whole batch
    #[error("Command queue full: {requested} line(s) requested, {available} of {capacity} slots free")]
    QueueFull {
        /// Total queue capacity.
        capacity: usize,
        /// Free slots at the time of the request.
        available: usize,
        /// Number of lines in the rejected batch.
        requested: usize,
    },

    /// Spindle driver failed
    #[error("Spindle error: {reason}")]
    Spindle {
        /// The reason reported by the spindle driver.
        reason: String,
    },
}

/// Connection error type
///
/// Represents errors related to the byte stream towards the device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Writing to the device failed
    #[error("Write to device failed: {reason}")]
    WriteFailed {
        /// The reason for the write failure.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

/// Protocol error type
///
/// Raised by the frame codec. Never fatal for the receive loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line is not a valid response frame
    #[error("Malformed frame '{line}': {reason}")]
    MalformedFrame {
        /// The offending line (lossy UTF-8).
        line: String,
        /// Decoder message.
        reason: String,
    },

    /// Empty line
    #[error("Empty frame")]
    EmptyFrame,
}

/// Main error type for tinyg-control
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a controller error
    pub fn is_controller_error(&self) -> bool {
        matches!(self, Error::Controller(_))
    }

    /// Check if this is a protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if the command queue rejected a batch
    pub fn is_queue_full(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::QueueFull { .. }))
    }

    /// Check if the controller was not open
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::NotConnected))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
