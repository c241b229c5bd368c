//! Error types for request canonicalization and signing.

/// Errors raised while deriving canonical parameters or signing them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request declares a JSON body but carries none.
    #[error("invalid request: must contain a non-nil body since content-type is JSON")]
    MissingBody,

    /// The JSON body could not be parsed as an object.
    #[error("parse JSON request body: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// A query component decodes to bytes that are not UTF-8.
    #[error("parse query string: component {0:?} is not valid UTF-8")]
    InvalidQuery(String),

    /// The HMAC primitive rejected its input.
    #[error("hash payload: {0}")]
    Hash(String),

    /// A signature header value contains bytes not allowed in HTTP headers.
    #[error("invalid value for header {name}: {source}")]
    InvalidHeaderValue {
        /// The header being attached.
        name: &'static str,
        /// The underlying `http` error.
        #[source]
        source: http::header::InvalidHeaderValue,
    },
}
