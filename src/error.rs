//! Error types for byte-tap.
//!
//! Taps themselves never wrap errors: a failing read or write surfaces the
//! wrapped stream's own error unchanged so the tap stays a drop-in
//! substitute. [`TransferError`] is the error type of the effects layer
//! that drives taps against real HTTP bodies.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransferError>;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {code} for {url}")]
    Status { code: u16, url: String },
}
