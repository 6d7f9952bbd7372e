//! # tinyg-control communication
//!
//! Serial link engine for TinyG motion controllers: frame codec, dual-lane
//! credit-gated command queue, receive/transmit loops, status poller and the
//! [`TinyGController`] lifecycle that ties them together.

pub mod communication;
pub mod controller;
pub mod protocol;
pub mod spindle;

pub use communication::{
    list_ports, BoxedStream, ByteStream, CommandQueue, Connector, CreditCounter, Lane,
    LaneThresholds, QueueEntry, SerialConnector, SerialPortInfo,
};
pub use controller::{LinkPhase, TinyGController};
pub use protocol::{decode, encode, normalize, Footer, LineFramer, Request, Response};
pub use spindle::{Spindle, SpindleDirection, SpindleProgress, SpindleStatus};
