//! Error types for the EcoFlow HTTP client.

use ecoflow_auth::AuthError;

/// Boxed error used at the transport and body boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`Client`](crate::Client).
///
/// Everything except [`ClientError::Transport`] is raised before the request
/// reaches the network.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured host is not a valid URL.
    #[error("build request url: parse {url:?}: {source}")]
    ParseUrl {
        /// The host as configured.
        url: String,
        /// The URL parser's diagnostic.
        #[source]
        source: url::ParseError,
    },

    /// The configured host cannot carry a path (e.g. `mailto:`).
    #[error("build request url: {url:?} cannot be used as a base URL")]
    CannotBeABase {
        /// The host as configured.
        url: String,
    },

    /// The joined URL is not a valid request URI.
    #[error("build request url: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The request could not be assembled.
    #[error("build request: {0}")]
    Request(#[from] http::Error),

    /// A JSON payload could not be serialized.
    #[error("encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request body could not be read.
    #[error("parse request parameters: read request body: {0}")]
    ReadBody(#[source] BoxError),

    /// The canonical parameters could not be derived.
    #[error("parse request parameters: {0}")]
    Params(#[source] AuthError),

    /// The signature could not be computed or attached.
    #[error("calculate signature: {0}")]
    Signature(#[source] AuthError),

    /// The transport failed to deliver the request.
    #[error(transparent)]
    Transport(BoxError),

    /// The response body is not the expected JSON.
    #[error("decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}
