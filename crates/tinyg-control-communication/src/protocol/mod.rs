//! TinyG wire protocol
//!
//! - `codec`: response decoding, command encoding, line normalization
//! - `commands`: realtime bytes and JSON request tokens
//! - `framer`: newline reassembly of inbound bytes

pub mod codec;
pub mod commands;
pub mod framer;

pub use codec::{decode, encode, normalize, Footer, Response};
pub use commands::{Request, REFRESH_SEQUENCE};
pub use framer::LineFramer;
