//! Transport and flow control
//!
//! - `serial`: byte stream abstraction and the serial connector
//! - `queue`: dual-lane command queue
//! - `credit`: receive-buffer credit shared by the receive and transmit loops

pub mod credit;
pub mod queue;
pub mod serial;

pub use credit::CreditCounter;
pub use queue::{CommandQueue, Lane, LaneThresholds, QueueEntry};
pub use serial::{list_ports, BoxedStream, ByteStream, Connector, SerialConnector, SerialPortInfo};
