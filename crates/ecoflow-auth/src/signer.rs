//! HMAC-SHA256 request signing.
//!
//! The string to sign is the canonical parameter list followed by three auth
//! fields, all joined with `&`:
//!
//! ```text
//! <canonical params>&accessKey=<ak>&nonce=<nonce>&timestamp=<epoch ms>
//! ```
//!
//! The auth fields are appended after the sorted parameters and are not sorted
//! into them. The signature is the lowercase hex HMAC-SHA256 of that string,
//! keyed by the secret key.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, KeyInit, Mac};
use http::{HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::param;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Exclusive upper bound for generated nonces.
pub const MAX_NONCE: u32 = 999_999;

/// Payload field carrying the access key.
pub const PARAM_ACCESS_KEY: &str = "accessKey";
/// Payload field carrying the nonce.
pub const PARAM_NONCE: &str = "nonce";
/// Payload field carrying the timestamp.
pub const PARAM_TIMESTAMP: &str = "timestamp";

/// Header carrying the access key.
pub const HEADER_ACCESS_KEY: HeaderName = HeaderName::from_static("accesskey");
/// Header carrying the nonce.
pub const HEADER_NONCE: HeaderName = HeaderName::from_static("nonce");
/// Header carrying the timestamp.
pub const HEADER_TIMESTAMP: HeaderName = HeaderName::from_static("timestamp");
/// Header carrying the hex signature.
pub const HEADER_SIGN: HeaderName = HeaderName::from_static("sign");

/// Source of per-request nonces.
pub trait NonceGenerator: Send + Sync + fmt::Debug {
    /// Produce the nonce for the next request, as a decimal string.
    fn next_nonce(&self) -> String;
}

/// Uniformly random nonces in `[0, MAX_NONCE)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl NonceGenerator for RandomNonce {
    fn next_nonce(&self) -> String {
        rand::random_range(0..MAX_NONCE).to_string()
    }
}

/// Always returns the same nonce.
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceGenerator for FixedNonce {
    fn next_nonce(&self) -> String {
        self.0.clone()
    }
}

/// Source of request timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Milliseconds since the Unix epoch, UTC.
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// The outcome of signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Lowercase hex HMAC-SHA256 digest.
    pub hash: String,
    /// Nonce included in the signed payload.
    pub nonce: String,
    /// Epoch-millisecond timestamp included in the signed payload.
    pub timestamp: String,
}

impl Signature {
    /// Append the four signature headers to `headers`.
    ///
    /// Existing values are kept; the new ones are added after them. Nothing is
    /// appended unless every value is a valid header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if any value cannot be sent
    /// as an HTTP header.
    pub fn apply_headers(
        &self,
        access_key: &str,
        headers: &mut HeaderMap,
    ) -> Result<(), AuthError> {
        let values = [
            (HEADER_ACCESS_KEY, PARAM_ACCESS_KEY, access_key),
            (HEADER_NONCE, PARAM_NONCE, self.nonce.as_str()),
            (HEADER_TIMESTAMP, PARAM_TIMESTAMP, self.timestamp.as_str()),
            (HEADER_SIGN, "sign", self.hash.as_str()),
        ]
        .into_iter()
        .map(|(header, name, value)| {
            HeaderValue::from_str(value)
                .map(|v| (header, v))
                .map_err(|source| AuthError::InvalidHeaderValue { name, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

        for (header, value) in values {
            headers.append(header, value);
        }
        Ok(())
    }
}

/// Signs canonical parameter lists with one set of credentials.
#[derive(Clone)]
pub struct Signer {
    access_key: String,
    secret_key: String,
    nonce: Arc<dyn NonceGenerator>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("nonce", &self.nonce)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Signer {
    /// Create a signer using random nonces and the system clock.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            nonce: Arc::new(RandomNonce),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the nonce source.
    #[must_use]
    pub fn with_nonce_generator(mut self, nonce: impl NonceGenerator + 'static) -> Self {
        self.nonce = Arc::new(nonce);
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The access key this signer signs for.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Sign a sorted canonical parameter list.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] if the HMAC cannot be computed.
    pub fn sign(&self, params: &[String]) -> Result<Signature, AuthError> {
        let nonce = self.nonce.next_nonce();
        let timestamp = self.clock.now_millis().to_string();

        let payload = build_payload(params, &self.access_key, &nonce, &timestamp);

        debug!(
            access_key = %self.access_key,
            nonce = %nonce,
            timestamp = %timestamp,
            params = params.len(),
            "Signing request"
        );

        let hash = compute_signature(&self.secret_key, &payload)?;

        Ok(Signature {
            hash,
            nonce,
            timestamp,
        })
    }
}

/// Build the string to sign.
///
/// # Examples
///
/// ```
/// use ecoflow_auth::signer::build_payload;
///
/// let payload = build_payload(&["sn=R331".to_owned()], "ak", "42", "1700000000000");
/// assert_eq!(payload, "sn=R331&accessKey=ak&nonce=42&timestamp=1700000000000");
/// ```
#[must_use]
pub fn build_payload(
    params: &[String],
    access_key: &str,
    nonce: &str,
    timestamp: &str,
) -> String {
    params
        .iter()
        .cloned()
        .chain([
            param(PARAM_ACCESS_KEY, access_key),
            param(PARAM_NONCE, nonce),
            param(PARAM_TIMESTAMP, timestamp),
        ])
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret_key`.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if the HMAC cannot be initialized.
pub fn compute_signature(secret_key: &str, payload: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recompute a signature from its inputs and compare it in constant time.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if the HMAC cannot be computed.
pub fn verify_signature(
    params: &[String],
    access_key: &str,
    secret_key: &str,
    nonce: &str,
    timestamp: &str,
    provided: &str,
) -> Result<bool, AuthError> {
    let payload = build_payload(params, access_key, nonce, timestamp);
    let expected = compute_signature(secret_key, &payload)?;
    Ok(expected.as_bytes().ct_eq(provided.as_bytes()).into())
}
