/// A snapshot of one transfer session, passed by reference to progress
/// observers on every successful chunk operation.
///
/// Counters are owned by the tap that produced the snapshot and never shared
/// across taps; `bytes_transferred` is monotonically non-decreasing within
/// one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Cumulative bytes moved through the tap so far.
    pub bytes_transferred: u64,

    /// Total expected bytes, if declared by the body producer.
    ///
    /// This is `None` when the source cannot report a length in advance
    /// (e.g. chunked transfer encoding). It is captured once at tap
    /// construction and never re-queried per chunk.
    pub total_bytes: Option<u64>,

    /// True exactly once per session: on the read that observes
    /// end-of-stream, on the write that reaches a known total, or on an
    /// explicit finish signal.
    pub done: bool,
}

impl TransferProgress {
    /// Calculate the percentage of completion.
    ///
    /// Returns `None` if `total_bytes` is unknown, so callers cannot divide
    /// by a length that was never declared.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                // For empty payloads, report 100% at completion, 0% otherwise
                if self.done { 100.0 } else { 0.0 }
            } else {
                (self.bytes_transferred as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns `true` if the session has reported its terminal call.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}
