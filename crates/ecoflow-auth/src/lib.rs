//! Parameter canonicalization and request signing for the EcoFlow OpenPlatform API.
//!
//! Every request sent to the OpenPlatform API carries four extra headers:
//! `accessKey`, `nonce`, `timestamp` and `sign`. The signature is an
//! HMAC-SHA256 over the request's canonical parameters followed by the three
//! auth fields.
//!
//! # Usage
//!
//! ```rust
//! use ecoflow_auth::canonical::canonical_params;
//! use ecoflow_auth::signer::Signer;
//!
//! let request = http::Request::builder()
//!     .uri("https://api-e.ecoflow.com/iot-open/sign/device/quota/all?sn=R331")
//!     .body(())
//!     .unwrap();
//! let (mut parts, ()) = request.into_parts();
//!
//! let params = canonical_params(&parts, None).unwrap();
//! let signature = Signer::new("access", "secret").sign(&params).unwrap();
//! signature.apply_headers("access", &mut parts.headers).unwrap();
//!
//! assert!(parts.headers.contains_key("sign"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical parameter list from a query string or JSON body
//! - [`error`] - Canonicalization and signing error types
//! - [`signer`] - Payload assembly, HMAC-SHA256 signing and signature headers

pub mod canonical;
pub mod error;
pub mod signer;

pub use canonical::{ascii_compare, canonical_params, canonical_string};
pub use error::AuthError;
pub use signer::{
    Clock, FixedClock, FixedNonce, NonceGenerator, RandomNonce, Signature, Signer, SystemClock,
    verify_signature,
};
