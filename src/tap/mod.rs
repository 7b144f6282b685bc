//! Stream decorators that observe bytes passing through without altering them.
//!
//! A tap holds (not extends) the wrapped stream, implements the same read or
//! write capability, and reports cumulative progress to a caller-supplied
//! [`ProgressObserver`] on every successful chunk. One tap instance is bound
//! to exactly one transfer: the driving loop is single-threaded per instance,
//! so no internal locking is needed.

mod read;
mod stream;
mod write;

use std::io::{self, Read, Write};

use crate::data::TransferProgress;

pub use read::ReadTap;
pub use stream::StreamTap;
pub use write::{FinishError, WriteTap};

/// The capability notified of transfer progress.
///
/// Invoked synchronously on the execution context driving the transfer, once
/// per successful chunk operation, including a final call where
/// [`TransferProgress::done`] is true. The contract makes no concurrency
/// guarantee beyond "called from whichever context drives the underlying
/// stream"; drivers that move across threads must bring a `Send` observer.
///
/// Any closure taking `&TransferProgress` is an observer:
///
/// ```
/// use byte_tap::ReadTap;
///
/// let observer = |progress: &byte_tap::TransferProgress| {
///     println!("{} bytes", progress.bytes_transferred);
/// };
/// let tap = ReadTap::new(&b"payload"[..], Some(7), observer);
/// # let _ = tap;
/// ```
pub trait ProgressObserver {
    fn update(&mut self, progress: &TransferProgress);
}

impl<F: FnMut(&TransferProgress)> ProgressObserver for F {
    fn update(&mut self, progress: &TransferProgress) {
        self(progress)
    }
}

/// Copy a reader to a writer, reporting progress through `observer`.
///
/// Wraps the reader in a [`ReadTap`] and drives [`std::io::copy`], so the
/// observer sees one call per chunk plus the terminal `done = true` call when
/// the reader is exhausted. Returns the number of bytes copied.
pub fn copy<R, W, O>(
    reader: R,
    writer: &mut W,
    total_bytes: Option<u64>,
    observer: O,
) -> io::Result<u64>
where
    R: Read,
    W: Write,
    O: ProgressObserver,
{
    let mut tapped = ReadTap::new(reader, total_bytes, observer);
    io::copy(&mut tapped, writer)
}

/// Counter state shared by all tap flavors.
///
/// Owns the per-session invariants: counts never decrease, the observer is
/// never called for a failing chunk, and never again after `done = true` or
/// an error has been seen.
pub(crate) struct Session<O> {
    observer: O,
    bytes_transferred: u64,
    total_bytes: Option<u64>,
    done_reported: bool,
    failed: bool,
}

impl<O: ProgressObserver> Session<O> {
    pub(crate) fn new(total_bytes: Option<u64>, observer: O) -> Self {
        Self {
            observer,
            bytes_transferred: 0,
            total_bytes,
            done_reported: false,
            failed: false,
        }
    }

    pub(crate) fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub(crate) fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Record a successful chunk of `n` bytes and report `done = false`.
    pub(crate) fn record(&mut self, n: u64) {
        if self.done_reported || self.failed {
            return;
        }
        self.bytes_transferred += n;
        self.report(false);
    }

    /// Record a successful chunk of `n` bytes, reporting `done = true` on
    /// the call that reaches a known total.
    ///
    /// With an unknown total this never reports completion; only an explicit
    /// [`Session::complete`] does.
    pub(crate) fn record_toward_total(&mut self, n: u64) {
        if self.done_reported || self.failed {
            return;
        }
        self.bytes_transferred += n;
        let done = self.total_bytes == Some(self.bytes_transferred);
        self.report(done);
        if done {
            self.done_reported = true;
        }
    }

    /// Report the terminal `done = true` call, exactly once.
    pub(crate) fn complete(&mut self) {
        if self.done_reported || self.failed {
            return;
        }
        self.report(true);
        self.done_reported = true;
    }

    /// Poison the session after an error from the wrapped stream. No
    /// progress is reported for the failing chunk or any call after it.
    pub(crate) fn fail(&mut self) {
        self.failed = true;
    }

    fn report(&mut self, done: bool) {
        self.observer.update(&TransferProgress {
            bytes_transferred: self.bytes_transferred,
            total_bytes: self.total_bytes,
            done,
        });
    }
}
