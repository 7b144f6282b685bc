use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::data::{TransferOptions, TransferProgress};
use crate::effects::http::{BoxStream, HttpClient};
use crate::error::{Result, TransferError};
use crate::tap::{ProgressObserver, StreamTap};

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Adapts the optional shared progress callback from [`TransferOptions`]
/// to the per-session observer a tap owns.
struct CallbackObserver(Option<Arc<dyn Fn(&TransferProgress) + Send + Sync>>);

impl ProgressObserver for CallbackObserver {
    fn update(&mut self, progress: &TransferProgress) {
        if let Some(callback) = &self.0 {
            callback(progress);
        }
    }
}

/// Front end that wires a progress tap between the caller and the
/// transport-layer body stream.
///
/// One `Transfer` can issue many transfers; each one constructs its own tap
/// with its own counters, so concurrent transfers never share state.
pub struct Transfer<C: HttpClient> {
    client: C,
    options: TransferOptions,
}

impl<C: HttpClient> Transfer<C> {
    /// Create a transfer front end over the provided HTTP client.
    pub fn new(client: C, options: TransferOptions) -> Self {
        Self { client, options }
    }

    /// Download `url` to `destination`, reporting progress per chunk.
    ///
    /// The response body is pulled through a [`StreamTap`] carrying the
    /// declared Content-Length (or `None` for chunked responses), so the
    /// configured callback sees every chunk plus the terminal
    /// `done = true` call. The body streams into a staging file next to
    /// `destination` which is renamed into place only after the whole body
    /// arrived and was flushed; a failed transfer leaves nothing at the
    /// final path. Returns the number of bytes written.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let started = Instant::now();
        debug!(url, "starting download");

        let (total_bytes, body) = self
            .client
            .get(url, &self.options.headers)
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let mut tapped = StreamTap::new(body, total_bytes, self.observer());
        let staging = staging_path(destination);

        let result = write_stream_to(&mut tapped, &staging).await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, destination).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        let bytes = tapped.bytes_transferred();
        debug!(
            url,
            bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "download complete"
        );
        Ok(bytes)
    }

    /// Upload the file at `source` to `url`, reporting progress per chunk.
    ///
    /// The file is streamed through a [`StreamTap`] as the request body with
    /// its length declared from file metadata. Fails with
    /// [`TransferError::Status`] on a non-success response.
    pub async fn upload(&self, url: &str, source: &Path) -> Result<()> {
        let started = Instant::now();
        let length = tokio::fs::metadata(source).await?.len();
        debug!(url, bytes = length, "starting upload");

        let file = tokio::fs::File::open(source).await?;
        let chunks: BoxStream<'static, io::Result<Bytes>> = Box::pin(file_chunks(file));
        let tapped = StreamTap::new(chunks, Some(length), self.observer());

        let status = self
            .client
            .put(url, &self.options.headers, Some(length), Box::pin(tapped))
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(TransferError::Status {
                code: status,
                url: url.to_string(),
            });
        }

        debug!(
            url,
            bytes = length,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upload complete"
        );
        Ok(())
    }

    fn observer(&self) -> CallbackObserver {
        CallbackObserver(self.options.on_progress.clone())
    }
}

#[cfg(feature = "reqwest")]
impl Transfer<crate::effects::http::ReqwestClient> {
    /// Create a transfer front end backed by reqwest, configured from the
    /// options' timeouts.
    pub fn with_reqwest(options: TransferOptions) -> Result<Self> {
        let client = crate::effects::http::ReqwestClient::new(&options.timeouts)?;
        Ok(Self::new(client, options))
    }
}

/// Staging path for an in-flight download, next to the final destination so
/// the rename stays on one filesystem.
fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    destination.with_file_name(name)
}

/// Drain a chunk stream into a file, flushing before returning.
async fn write_stream_to<S, E>(stream: &mut S, path: &Path) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error,
{
    let mut file = tokio::fs::File::create(path).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransferError::Network(e.to_string()))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Read a file as a chunk stream for use as a request body.
fn file_chunks(file: tokio::fs::File) -> impl Stream<Item = io::Result<Bytes>> + Send {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            buf.truncate(n);
            Ok(Some((Bytes::from(buf), file)))
        }
    })
}
