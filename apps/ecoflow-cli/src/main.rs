//! EcoFlow CLI - signed calls against the EcoFlow OpenPlatform API.
//!
//! # Usage
//!
//! ```text
//! ecoflow devices
//! ecoflow quota --sn R331ZEB4ZE8N0042
//! ecoflow quota --sn R331ZEB4ZE8N0042 --quota inv.cfgAcEnabled --quota inv.cfgAcXboost
//! ecoflow set --sn R331ZEB4ZE8N0042 --params '{"cmdSet":32,"id":66,"enabled":1,"xboost":1}'
//! ecoflow request GET /iot-open/sign/device/quota/all --query sn=R331ZEB4ZE8N0042
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ECOFLOW_HOST` | `https://api-e.ecoflow.com` | API base URL |
//! | `ECOFLOW_ACCESS_KEY` | *(required)* | Application access key |
//! | `ECOFLOW_SECRET_KEY` | *(required)* | Application secret key |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use ecoflow_core::{ClientConfig, DEFAULT_HOST};
use ecoflow_http::{ApiResponse, Client, RequestBody};
use http::Method;
use http::header::{CONTENT_TYPE, HeaderValue};
use http_body_util::Full;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signed command-line access to the EcoFlow OpenPlatform API
#[derive(Debug, Parser)]
#[command(name = "ecoflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "ECOFLOW_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Application access key
    #[arg(long, env = "ECOFLOW_ACCESS_KEY", hide_env_values = true)]
    access_key: String,

    /// Application secret key
    #[arg(long, env = "ECOFLOW_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Log level filter
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the devices bound to the account
    Devices,

    /// Read device quotas (all of them unless --quota is given)
    Quota {
        /// Device serial number
        #[arg(long)]
        sn: String,

        /// Quota name to read; may be repeated
        #[arg(long = "quota")]
        quotas: Vec<String>,
    },

    /// Set device quotas
    Set {
        /// Device serial number
        #[arg(long)]
        sn: String,

        /// Command parameters as a JSON object
        #[arg(long, value_parser = parse_json)]
        params: Value,
    },

    /// Send an arbitrary signed request
    Request {
        /// HTTP method
        #[arg(value_parser = parse_method)]
        method: Method,

        /// Path relative to the host
        path: String,

        /// Query parameter as key=value; may be repeated
        #[arg(long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// JSON request body
        #[arg(long, value_parser = parse_json)]
        json: Option<Value>,
    },
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `--log-level`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method {s:?}: {e}"))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

fn print_envelope(response: &ApiResponse<Value>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.is_success() {
        bail!("API returned code {}: {}", response.code, response.message);
    }
    Ok(())
}

async fn send_raw(
    client: &Client,
    method: Method,
    path: &str,
    query: &[(String, String)],
    json: Option<&Value>,
) -> Result<()> {
    let query: Vec<(&str, &str)> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let body = json
        .map(serde_json::to_vec)
        .transpose()?
        .map(|b| Full::new(Bytes::from(b)));
    let has_json = body.is_some();

    let mut request = client.new_request_with_query::<RequestBody>(method, path, &query, body)?;
    if has_json {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let response = client.execute(request).await?;
    info!(status = %response.status(), "request completed");

    match serde_json::from_slice::<Value>(response.body()) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", String::from_utf8_lossy(response.body())),
    }

    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    let config = ClientConfig::new(cli.host, cli.access_key, cli.secret_key);
    info!(host = %config.host, "using EcoFlow OpenPlatform");
    let client = Client::from_config(config);

    match cli.command {
        Commands::Devices => print_envelope(&client.list_devices().await?),
        Commands::Quota { sn, quotas } if quotas.is_empty() => {
            print_envelope(&client.get_all_quotas(&sn).await?)
        }
        Commands::Quota { sn, quotas } => {
            let quotas: Vec<&str> = quotas.iter().map(String::as_str).collect();
            print_envelope(&client.get_quotas(&sn, &quotas).await?)
        }
        Commands::Set { sn, params } => print_envelope(&client.set_quota(&sn, params).await?),
        Commands::Request {
            method,
            path,
            query,
            json,
        } => send_raw(&client, method, &path, &query, json.as_ref()).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_should_have_valid_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_should_parse_key_value_pairs() {
        assert_eq!(
            parse_key_value("sn=R331=x").unwrap(),
            ("sn".to_owned(), "R331=x".to_owned())
        );
        assert!(parse_key_value("sn").is_err());
    }

    #[test]
    fn test_should_parse_method_case_insensitively() {
        assert_eq!(parse_method("put").unwrap(), Method::PUT);
    }

    #[test]
    fn test_should_parse_request_subcommand() {
        let cli = Cli::try_parse_from([
            "ecoflow",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
            "request",
            "get",
            "/iot-open/sign/device/quota/all",
            "--query",
            "sn=R331",
        ])
        .unwrap();

        let Commands::Request { method, query, json, .. } = cli.command else {
            panic!("expected request subcommand");
        };
        assert_eq!(method, Method::GET);
        assert_eq!(query, vec![("sn".to_owned(), "R331".to_owned())]);
        assert!(json.is_none());
    }

    #[test]
    fn test_should_reject_invalid_json_params() {
        let result = Cli::try_parse_from([
            "ecoflow",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
            "set",
            "--sn",
            "R331",
            "--params",
            "{oops",
        ]);
        assert!(result.is_err());
    }
}
