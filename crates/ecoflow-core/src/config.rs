//! Client configuration.
//!
//! A [`ClientConfig`] is owned by a single client instance. Loading it from
//! the environment is a convenience for binaries and test harnesses; the
//! signing layer only ever sees the values handed to it.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Public EcoFlow OpenPlatform endpoint (Europe).
pub const DEFAULT_HOST: &str = "https://api-e.ecoflow.com";

/// Credentials and target host for one API client.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the OpenPlatform API, e.g. `https://api-e.ecoflow.com`.
    pub host: String,
    /// Access key issued to the application.
    pub access_key: String,
    /// Secret key issued to the application.
    pub secret_key: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration from its three parts.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `ECOFLOW_HOST` | [`DEFAULT_HOST`] |
    /// | `ECOFLOW_ACCESS_KEY` | *(required)* |
    /// | `ECOFLOW_SECRET_KEY` | *(required)* |
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ECOFLOW_HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let access_key = required(&lookup, "ECOFLOW_ACCESS_KEY")?;
        let secret_key = required(&lookup, "ECOFLOW_SECRET_KEY")?;

        Ok(Self {
            host,
            access_key,
            secret_key,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> CoreResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if v.trim().is_empty() => {
            Err(CoreError::Config(format!("{name} must not be empty")))
        }
        Some(v) => Ok(v),
        None => Err(CoreError::MissingEnv(name)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_should_default_host_when_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("ECOFLOW_ACCESS_KEY", "ak"),
            ("ECOFLOW_SECRET_KEY", "sk"),
        ]))
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.secret_key, "sk");
    }

    #[test]
    fn test_should_reject_missing_access_key() {
        let err = ClientConfig::from_lookup(lookup_from(&[("ECOFLOW_SECRET_KEY", "sk")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingEnv("ECOFLOW_ACCESS_KEY")));
    }

    #[test]
    fn test_should_reject_blank_secret_key() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            ("ECOFLOW_ACCESS_KEY", "ak"),
            ("ECOFLOW_SECRET_KEY", "  "),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: ECOFLOW_SECRET_KEY must not be empty"
        );
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let config = ClientConfig::new(DEFAULT_HOST, "ak", "super-secret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("ak"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_should_deserialize_camel_case_fields() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"host":"https://api-a.ecoflow.com","accessKey":"ak","secretKey":"sk"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ClientConfig::new("https://api-a.ecoflow.com", "ak", "sk")
        );
    }
}
