//! I/O operations that drive taps against real HTTP bodies.
//!
//! This module contains the effectful side of the crate: the HTTP client
//! abstraction and the transfer front end that wires a tap between the
//! caller and the transport-layer body stream.

mod http;
mod transfer;

pub use http::{BoxStream, HttpClient};
pub use transfer::Transfer;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
