use std::io::{self, Read};

use super::{ProgressObserver, Session};

/// Read-side tap: wraps a byte source and reports download progress.
///
/// Delegates every read to the wrapped source verbatim; the returned count
/// and buffer contents pass through untouched. A read of `Ok(0)` against a
/// non-empty buffer is the end-of-stream marker and triggers the single
/// terminal `done = true` observer call. Errors propagate unchanged with no
/// observer call for the failing chunk.
///
/// The declared total is captured once at construction and never re-queried.
pub struct ReadTap<R, O> {
    inner: R,
    session: Session<O>,
}

impl<R, O: ProgressObserver> ReadTap<R, O> {
    /// Create a tap around `inner` for a single transfer session.
    ///
    /// `total_bytes` is the declared length of the payload, or `None` when
    /// the source cannot report one (e.g. chunked transfer).
    pub fn new(inner: R, total_bytes: Option<u64>, observer: O) -> Self {
        Self {
            inner,
            session: Session::new(total_bytes, observer),
        }
    }

    /// Cumulative bytes read so far.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.session.bytes_transferred()
    }

    /// The declared total captured at construction.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.session.total_bytes()
    }

    /// Unwrap the tap, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, O: ProgressObserver> Read for ReadTap<R, O> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match self.inner.read(buf) {
            Ok(n) => n,
            Err(e) => {
                self.session.fail();
                return Err(e);
            }
        };

        if n == 0 {
            // A zero-length destination buffer is not end-of-stream.
            if !buf.is_empty() {
                self.session.complete();
            }
        } else {
            self.session.record(n as u64);
        }

        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(u64, Option<u64>, bool)>>>;

    fn recording_observer() -> (Calls, impl FnMut(&crate::TransferProgress)) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let observer = move |progress: &crate::TransferProgress| {
            sink.lock().unwrap().push((
                progress.bytes_transferred,
                progress.total_bytes,
                progress.done,
            ));
        };
        (calls, observer)
    }

    /// Delivers each queued chunk in one read, then end-of-stream.
    struct ChunkedReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ChunkedReader {
        fn new(sizes: &[usize]) -> Self {
            Self {
                chunks: sizes.iter().map(|&n| vec![0xAB; n]).collect(),
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if buf.is_empty() {
                return Ok(0);
            }
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    /// Fails exactly one read call, then recovers.
    struct IntermittentReader {
        inner: ChunkedReader,
        calls: usize,
        fail_on_call: usize,
    }

    impl Read for IntermittentReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls == self.fail_on_call {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            self.inner.read(buf)
        }
    }

    /// Delivers queued chunks, then fails with the given error kind.
    struct FailingReader {
        inner: ChunkedReader,
        remaining_ok: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining_ok == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.remaining_ok -= 1;
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_chunk_sequence_and_terminal_call() {
        let (calls, observer) = recording_observer();
        let source = ChunkedReader::new(&[40, 35, 25]);
        let mut tap = ReadTap::new(source, Some(100), observer);

        let mut buf = [0u8; 64];
        while tap.read(&mut buf).unwrap() > 0 {}

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                (40, Some(100), false),
                (75, Some(100), false),
                (100, Some(100), false),
                (100, Some(100), true),
            ]
        );
    }

    #[test]
    fn test_unknown_total_propagated_unchanged() {
        let (calls, observer) = recording_observer();
        let source = ChunkedReader::new(&[40, 35, 25]);
        let mut tap = ReadTap::new(source, None, observer);

        let mut buf = [0u8; 64];
        while tap.read(&mut buf).unwrap() > 0 {}

        let calls = calls.lock().unwrap();
        assert!(calls.iter().all(|(_, total, _)| total.is_none()));
        assert_eq!(calls.last(), Some(&(100, None, true)));
    }

    #[test]
    fn test_done_reported_exactly_once() {
        let (calls, observer) = recording_observer();
        let source = ChunkedReader::new(&[10]);
        let mut tap = ReadTap::new(source, Some(10), observer);

        let mut buf = [0u8; 64];
        while tap.read(&mut buf).unwrap() > 0 {}
        // Reads after end-of-stream delegate but do not report again.
        assert_eq!(tap.read(&mut buf).unwrap(), 0);
        assert_eq!(tap.read(&mut buf).unwrap(), 0);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|(_, _, done)| *done).count(), 1);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_counts_are_monotonic() {
        let (calls, observer) = recording_observer();
        let mut tap = ReadTap::new(ChunkedReader::new(&[7, 13, 1, 42]), None, observer);

        let mut buf = [0u8; 64];
        while tap.read(&mut buf).unwrap() > 0 {}

        let calls = calls.lock().unwrap();
        for pair in calls.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
    }

    #[test]
    fn test_error_reports_nothing_for_failing_chunk() {
        let (calls, observer) = recording_observer();
        let source = FailingReader {
            inner: ChunkedReader::new(&[40, 35]),
            remaining_ok: 2,
        };
        let mut tap = ReadTap::new(source, Some(100), observer);

        let mut buf = [0u8; 64];
        assert_eq!(tap.read(&mut buf).unwrap(), 40);
        assert_eq!(tap.read(&mut buf).unwrap(), 35);
        let err = tap.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);

        // Two successful chunks, no call for the failing one.
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_no_reports_after_error_even_if_reads_recover() {
        let (calls, observer) = recording_observer();
        let source = IntermittentReader {
            inner: ChunkedReader::new(&[8, 24]),
            calls: 0,
            fail_on_call: 2,
        };
        let mut tap = ReadTap::new(source, Some(32), observer);

        let mut buf = [0u8; 64];
        assert_eq!(tap.read(&mut buf).unwrap(), 8);
        assert!(tap.read(&mut buf).is_err());
        // The source recovers and keeps delivering bytes to the caller,
        // including end-of-stream, but the session stays silent.
        assert_eq!(tap.read(&mut buf).unwrap(), 24);
        assert_eq!(tap.read(&mut buf).unwrap(), 0);

        assert_eq!(*calls.lock().unwrap(), vec![(8, Some(32), false)]);
    }

    #[test]
    fn test_zero_length_buffer_is_not_end_of_stream() {
        let (calls, observer) = recording_observer();
        let mut tap = ReadTap::new(ChunkedReader::new(&[5]), Some(5), observer);

        let mut empty = [0u8; 0];
        assert_eq!(tap.read(&mut empty).unwrap(), 0);
        assert!(calls.lock().unwrap().is_empty());

        let mut buf = [0u8; 16];
        assert_eq!(tap.read(&mut buf).unwrap(), 5);
        assert_eq!(tap.read(&mut buf).unwrap(), 0);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(5, Some(5), false), (5, Some(5), true)]
        );
    }

    #[test]
    fn test_payload_passes_through_verbatim() {
        let data = b"the quick brown fox";
        let mut tap = ReadTap::new(&data[..], Some(data.len() as u64), |_: &crate::TransferProgress| {});

        let mut out = Vec::new();
        tap.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(tap.bytes_transferred(), data.len() as u64);
    }

    #[test]
    fn test_into_inner() {
        let tap = ReadTap::new(&b"abc"[..], Some(3), |_: &crate::TransferProgress| {});
        assert_eq!(tap.into_inner(), b"abc");
    }
}
