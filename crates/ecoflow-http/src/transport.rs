//! The transport boundary.
//!
//! [`HttpTransport`] is everything the client needs from the network: send a
//! fully signed, buffered request and hand back a buffered response. The
//! default implementation wraps a [`reqwest::Client`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::BoxError;

/// Future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<http::Response<Bytes>, BoxError>> + Send + 'a>>;

/// Trait that an HTTP backend must implement to carry signed requests.
///
/// Errors are returned to the caller of
/// [`Client::execute`](crate::Client::execute) untouched.
pub trait HttpTransport: Send + Sync + 'static {
    /// Send a request and wait for the complete response.
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture<'_>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture<'_> {
        (**self).send(request)
    }
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing `reqwest` client, keeping its timeouts and TLS setup.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture<'_> {
        Box::pin(async move {
            let request = reqwest::Request::try_from(request)?;
            let response = self.client.execute(request).await?;

            let status = response.status();
            let version = response.version();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            let mut out = http::Response::new(body);
            *out.status_mut() = status;
            *out.version_mut() = version;
            *out.headers_mut() = headers;
            Ok(out)
        })
    }
}
