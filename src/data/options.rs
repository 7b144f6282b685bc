use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::progress::TransferProgress;

/// Timeout configuration for the underlying HTTP transport.
///
/// Timeouts are the transport's responsibility, not the tap's: an expired
/// timeout surfaces to a tap only as an ordinary I/O error on the wrapped
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Maximum time to establish a connection.
    pub connect: Duration,

    /// Maximum idle time between received chunks.
    pub read: Duration,

    /// Optional deadline for the whole request, including the body.
    ///
    /// Default: `None`, so long downloads are not cut off mid-stream.
    pub total: Option<Duration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(10),
            total: None,
        }
    }
}

/// Configuration for transfer operations.
///
/// # Examples
///
/// ```
/// use byte_tap::TransferOptions;
/// use std::sync::Arc;
///
/// let options = TransferOptions::default()
///     .header("Authorization", "Bearer token")
///     .on_progress(Arc::new(|progress| {
///         if let Some(pct) = progress.percentage() {
///             println!("{:.1}%", pct);
///         }
///     }));
/// ```
#[derive(Clone, Default)]
pub struct TransferOptions {
    /// Custom HTTP headers to include with requests.
    ///
    /// Repeated header names are allowed and sent as separate header lines.
    pub headers: Arc<[(String, String)]>,

    /// Transport timeout configuration.
    pub timeouts: Timeouts,

    /// Progress callback invoked once per chunk moved through the body tap,
    /// including a final call with `done = true`.
    ///
    /// The callback receives a reference to avoid cloning on every
    /// invocation. Default: None.
    pub on_progress: Option<Arc<dyn Fn(&TransferProgress) + Send + Sync>>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("headers", &self.headers)
            .field("timeouts", &self.timeouts)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl TransferOptions {
    /// Add a single custom HTTP header.
    ///
    /// Adding the same name twice sends both values.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((name.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// Set multiple custom HTTP headers at once, replacing any existing ones.
    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Arc::from(headers);
        self
    }

    /// Set the transport timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn on_progress(
        mut self,
        on_progress: Arc<dyn Fn(&TransferProgress) + Send + Sync>,
    ) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_header_names_are_kept() {
        let options = TransferOptions::default()
            .header("Accept", "text/plain")
            .header("Accept", "application/json");

        let values: Vec<_> = options
            .headers
            .iter()
            .filter(|(name, _)| name == "Accept")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(values, vec!["text/plain", "application/json"]);
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(10));
        assert_eq!(timeouts.read, Duration::from_secs(10));
        assert_eq!(timeouts.total, None);
    }
}
