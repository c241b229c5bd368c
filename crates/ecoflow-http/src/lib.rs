//! Signed HTTP client for the EcoFlow OpenPlatform API.
//!
//! [`Client`] builds requests against a configured host, signs them with
//! [`ecoflow_auth`] and hands them to an [`HttpTransport`]:
//!
//! ```text
//! request -> canonical params -> signature -> headers -> transport
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use ecoflow_core::ClientConfig;
//! use ecoflow_http::Client;
//!
//! # async fn run() -> Result<(), ecoflow_http::ClientError> {
//! let client = Client::from_config(ClientConfig::new(
//!     "https://api-e.ecoflow.com",
//!     "access-key",
//!     "secret-key",
//! ));
//! let devices = client.list_devices().await?;
//! println!("{:?}", devices.data);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`api`] - Typed device endpoints and the response envelope
//! - [`client`] - Request construction, signing and dispatch
//! - [`error`] - Client error type
//! - [`transport`] - Transport trait and the `reqwest` implementation

pub mod api;
pub mod client;
pub mod error;
pub mod transport;

pub use api::ApiResponse;
pub use client::{Client, RequestBody};
pub use error::{BoxError, ClientError};
pub use transport::{HttpTransport, ReqwestTransport, TransportFuture};
