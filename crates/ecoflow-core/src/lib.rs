//! Core configuration and error types for the EcoFlow OpenPlatform client.
//!
//! This crate holds the pieces shared by the signing layer, the HTTP client
//! and the command-line front end: the per-client credential configuration
//! and the error type raised while assembling it.

mod config;
mod error;

pub use config::{ClientConfig, DEFAULT_HOST};
pub use error::{CoreError, CoreResult};
