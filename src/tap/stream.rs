use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use super::{ProgressObserver, Session};

/// Async chunk-stream tap: wraps an HTTP body stream and reports progress.
///
/// The same decorator concept as [`ReadTap`](super::ReadTap) specialized to
/// the `Result<Bytes, E>` chunk streams that HTTP clients expose for
/// response and request bodies. Chunks and errors pass through verbatim;
/// the end of the stream triggers the single terminal `done = true` call.
///
/// The driving task is the execution context of the observer contract; a
/// tap instance serves exactly one body.
pub struct StreamTap<S, O> {
    inner: S,
    session: Session<O>,
    finished: bool,
}

impl<S, O: ProgressObserver> StreamTap<S, O> {
    /// Create a tap around `inner` for a single transfer session.
    pub fn new(inner: S, total_bytes: Option<u64>, observer: O) -> Self {
        Self {
            inner,
            session: Session::new(total_bytes, observer),
            finished: false,
        }
    }

    /// Cumulative bytes yielded so far.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.session.bytes_transferred()
    }

    /// The declared total captured at construction.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.session.total_bytes()
    }
}

impl<S, E, O> Stream for StreamTap<S, O>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    O: ProgressObserver + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        // Streams are not guaranteed fused: once the inner stream ended,
        // stay ended instead of polling it again.
        if this.finished {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.session.record(chunk.len() as u64);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.session.fail();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                this.session.complete();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        self.inner.size_hint()
    }
}
