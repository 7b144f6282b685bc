//! Progress-observing byte stream taps for download and upload instrumentation.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and progress types
//! - [`tap`] - Pure stream decorators that count bytes as they pass through
//! - [`effects`] - I/O operations with trait abstraction
//!
//! # Key Features
//!
//! - **Pass-Through**: Taps delegate reads and writes verbatim; payload bytes
//!   and completion semantics of the wrapped stream are never altered
//! - **One Session Per Tap**: Each tap instance is bound to a single transfer
//!   and owns its own counters; no shared mutable state between taps
//! - **Explicit Completion**: Write-side completion with an unknown length is
//!   driven by [`WriteTap::finish`], never by a byte-count equality that may
//!   never trigger
//! - **Mechanism-Only**: No policy; retry, caching and authentication belong
//!   to the surrounding transport

mod data;
mod effects;
mod error;
mod tap;

pub use data::{Timeouts, TransferOptions, TransferProgress};
pub use effects::{BoxStream, HttpClient, Transfer};
pub use tap::{FinishError, ProgressObserver, ReadTap, StreamTap, WriteTap, copy};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{Result, TransferError};
