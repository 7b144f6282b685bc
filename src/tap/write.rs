use std::fmt;
use std::io::{self, Write};

use super::{ProgressObserver, Session};

/// Error returned by [`WriteTap::finish`] when the final flush fails.
///
/// Follows the [`std::io::BufWriter::into_inner`] convention: the wrapped
/// writer is handed back alongside the flush error instead of being
/// dropped with buffered state unrecoverable.
#[derive(Debug)]
pub struct FinishError<W>(W, io::Error);

impl<W> FinishError<W> {
    /// The flush error that caused `finish` to fail.
    pub fn error(&self) -> &io::Error {
        &self.1
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.0
    }

    /// Split into the wrapped writer and the flush error.
    pub fn into_parts(self) -> (W, io::Error) {
        (self.0, self.1)
    }
}

impl<W> fmt::Display for FinishError<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to flush on finish: {}", self.1)
    }
}

impl<W: fmt::Debug> std::error::Error for FinishError<W> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.1)
    }
}

/// Write-side tap: wraps a byte sink and reports upload progress.
///
/// Delegates every write to the wrapped sink first; counters update and the
/// observer fires only after the sink confirms the bytes (write-then-report
/// ordering). With a declared total, the write that reaches it carries the
/// single `done = true` call. With an unknown total, completion is never
/// derived from a byte-count equality; only [`WriteTap::finish`] reports it.
///
/// The tap never auto-flushes mid-stream. Callers must call `finish` (which
/// flushes) after the last write so buffered bytes are not silently retained.
pub struct WriteTap<W, O> {
    inner: W,
    session: Session<O>,
}

impl<W, O: ProgressObserver> WriteTap<W, O> {
    /// Create a tap around `inner` for a single transfer session.
    ///
    /// `total_bytes` is the declared content length of the payload,
    /// resolved once here and cached for the whole session, or `None` when
    /// the payload length is unknown up front.
    pub fn new(inner: W, total_bytes: Option<u64>, observer: O) -> Self {
        Self {
            inner,
            session: Session::new(total_bytes, observer),
        }
    }

    /// Cumulative bytes the sink has confirmed so far.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.session.bytes_transferred()
    }

    /// The declared total captured at construction.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.session.total_bytes()
    }

    /// Unwrap the tap without completing the session. No terminal observer
    /// call is made and the sink is not flushed.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write, O: ProgressObserver> WriteTap<W, O> {
    /// Flush the wrapped sink and report the terminal `done = true` call,
    /// returning the inner writer.
    ///
    /// The terminal call is made exactly once per session: if a declared
    /// total was already reached (and reported) by a write, `finish` only
    /// flushes. This is the required completion signal when the total is
    /// unknown.
    ///
    /// A flush failure returns the writer inside [`FinishError`] so
    /// buffered state stays recoverable; no terminal call is reported.
    pub fn finish(mut self) -> Result<W, FinishError<W>> {
        if let Err(e) = self.inner.flush() {
            self.session.fail();
            return Err(FinishError(self.inner, e));
        }
        self.session.complete();
        Ok(self.inner)
    }
}

impl<W: Write, O: ProgressObserver> Write for WriteTap<W, O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.inner.write(buf) {
            Ok(n) => n,
            Err(e) => {
                self.session.fail();
                return Err(e);
            }
        };

        if n > 0 {
            // Only bytes the sink actually accepted count as progress.
            self.session.record_toward_total(n as u64);
        }

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.flush() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session.fail();
                Err(e)
            }
        }
    }
}
