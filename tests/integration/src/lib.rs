//! Integration tests against the live EcoFlow OpenPlatform API.
//!
//! These tests need real credentials and are marked `#[ignore]` so they don't
//! run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! ECOFLOW_ACCESS_KEY=... ECOFLOW_SECRET_KEY=... TEST_DEVICE_SN=... \
//!     cargo test -p ecoflow-integration -- --ignored
//! ```

use std::sync::Once;

use ecoflow_core::ClientConfig;
use ecoflow_http::{ApiResponse, Client};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

fn required_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("must set {name} env var"))
}

/// Create a client from the `ECOFLOW_*` environment variables.
#[must_use]
pub fn test_client() -> Client {
    init_tracing();

    let config = ClientConfig::from_env().unwrap_or_else(|e| panic!("{e}"));
    Client::from_config(config)
}

/// Serial number of the device the quota tests run against.
#[must_use]
pub fn test_device_sn() -> String {
    required_env("TEST_DEVICE_SN")
}

/// Assert that the API accepted the request.
pub fn assert_success<T: std::fmt::Debug>(response: &ApiResponse<T>) {
    assert!(
        response.is_success(),
        "API returned code {}: {} ({response:?})",
        response.code,
        response.message
    );
}

#[cfg(test)]
mod test_devices;
#[cfg(test)]
mod test_quota;
