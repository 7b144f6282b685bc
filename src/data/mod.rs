//! Immutable data types for transfer instrumentation.
//!
//! This module contains the progress snapshot passed to observers and the
//! configuration types for the effects layer. These types are immutable and
//! designed to be passed between functions without mutation.

pub mod options;
pub mod progress;

pub use options::{Timeouts, TransferOptions};
pub use progress::TransferProgress;
