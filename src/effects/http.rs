use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP request and response bodies.
///
/// The stream yields `Result<Bytes, E>` where E is the error type of the
/// side producing the bytes.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// This trait provides the minimal interface the transfer layer needs:
/// "give me a body stream with a declared or unknown length" and "send this
/// body stream". Implementations own redirect following, TLS, connection
/// pooling and timeout enforcement; those concerns surface here only as
/// errors.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + 'static;

    /// Open a GET request and return the declared Content-Length (if any)
    /// together with the response body as a stream.
    ///
    /// The length is `None` when the server does not declare one (e.g.
    /// chunked transfer encoding).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server responds with a
    /// non-success status.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<
        Output = Result<
            (Option<u64>, BoxStream<'static, Result<Bytes, Self::Error>>),
            Self::Error,
        >,
    > + Send;

    /// Send `body` as a PUT request body and return the response status
    /// code.
    ///
    /// `content_length` is forwarded as the declared length when known;
    /// with `None` the body goes out chunked.
    fn put(
        &self,
        url: &str,
        headers: &[(String, String)],
        content_length: Option<u64>,
        body: BoxStream<'static, io::Result<Bytes>>,
    ) -> impl Future<Output = Result<u16, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::Timeouts;
    use crate::error::TransferError;

    /// Production HTTP client implementation using reqwest.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a client configured with the given transport timeouts.
        pub fn new(timeouts: &Timeouts) -> Result<Self, TransferError> {
            let mut builder = reqwest::Client::builder()
                .connect_timeout(timeouts.connect)
                .read_timeout(timeouts.read);

            if let Some(total) = timeouts.total {
                builder = builder.timeout(total);
            }

            let client = builder
                .build()
                .map_err(|e| TransferError::Network(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<(Option<u64>, BoxStream<'static, Result<Bytes, Self::Error>>), Self::Error>
        {
            let mut request = self.client.get(url);

            for (name, value) in headers {
                request = request.header(name, value);
            }

            let response = request.send().await?.error_for_status()?;
            let content_length = response.content_length();
            let stream = response.bytes_stream();

            Ok((content_length, Box::pin(stream)))
        }

        async fn put(
            &self,
            url: &str,
            headers: &[(String, String)],
            content_length: Option<u64>,
            body: BoxStream<'static, io::Result<Bytes>>,
        ) -> Result<u16, Self::Error> {
            let mut request = self.client.put(url);

            for (name, value) in headers {
                request = request.header(name, value);
            }

            if let Some(length) = content_length {
                request = request.header(reqwest::header::CONTENT_LENGTH, length);
            }

            let response = request.body(reqwest::Body::wrap_stream(body)).send().await?;
            Ok(response.status().as_u16())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
