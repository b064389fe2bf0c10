//! Server configuration.
//!
//! Every option can be given as a flag or as an environment variable. A
//! `.env` file in the working directory is loaded before parsing.
//!
//! # Environment Variables
//!
//! - `EVM_PRIVATE_KEY` - Hex EVM private key
//! - `SVM_PRIVATE_KEY` - Base58 Solana keypair
//! - `RESOURCE_SERVER_URL` - Base URL of the paid resource server
//! - `ENDPOINT_PATH` - Path of the resource on that server
//! - `REQUEST_TIMEOUT_MS` - Per-attempt timeout (default: `30000`)
//! - `MAX_PAYMENT_AMOUNT` - Highest amount paid per request, in atomic units
//! - `PREFERRED_NETWORK` - `evm` or `svm`, tried first when both are offered
//! - `RUST_LOG` - Log filter (default: `info`)

use std::fmt;
use std::time::Duration;

use alloy_primitives::U256;
use clap::Parser;
use url::Url;
use w402::NetworkFamily;

use crate::error::StartupError;

/// Command line and environment configuration.
#[derive(Clone, Parser)]
#[command(name = "w402-mcp", version, about)]
pub struct Config {
    /// Hex EVM private key, with or without `0x`.
    #[arg(long, env = "EVM_PRIVATE_KEY", hide_env_values = true)]
    pub evm_private_key: Option<String>,

    /// Base58-encoded 64-byte Solana keypair.
    #[arg(long, env = "SVM_PRIVATE_KEY", hide_env_values = true)]
    pub svm_private_key: Option<String>,

    /// Base URL of the resource server.
    #[arg(long, env = "RESOURCE_SERVER_URL")]
    pub resource_server_url: Url,

    /// Path of the paid endpoint on the resource server.
    #[arg(long, env = "ENDPOINT_PATH")]
    pub endpoint_path: String,

    /// Timeout of each upstream attempt, in milliseconds.
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Highest amount to pay for one request, in the asset's atomic units.
    #[arg(long, env = "MAX_PAYMENT_AMOUNT", value_parser = parse_amount)]
    pub max_payment_amount: Option<U256>,

    /// Network family to prefer when a challenge offers several.
    #[arg(long, env = "PREFERRED_NETWORK")]
    pub preferred_network: Option<NetworkFamily>,
}

fn parse_amount(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("`{s}` is not a non-negative integer"));
    }
    U256::from_str_radix(s, 10).map_err(|e| e.to_string())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("evm_private_key", &redact(&self.evm_private_key))
            .field("svm_private_key", &redact(&self.svm_private_key))
            .field("resource_server_url", &self.resource_server_url.as_str())
            .field("endpoint_path", &self.endpoint_path)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_payment_amount", &self.max_payment_amount)
            .field("preferred_network", &self.preferred_network)
            .finish()
    }
}

impl Config {
    /// Loads `.env` if present, then parses flags and environment.
    ///
    /// Exits the process with usage help on invalid input, like any clap CLI.
    #[must_use]
    pub fn load() -> Self {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    /// Returns the per-attempt request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the base URL without a trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.resource_server_url.as_str().trim_end_matches('/')
    }

    /// Returns the endpoint path with a leading `/`.
    #[must_use]
    pub fn path(&self) -> String {
        let path = self.endpoint_path.trim();
        if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        }
    }

    /// Returns the full URL of the paid endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::EndpointUrl`] if base and path do not form a
    /// valid URL.
    pub fn endpoint_url(&self) -> Result<Url, StartupError> {
        let joined = format!("{}{}", self.base_url(), self.path());
        Url::parse(&joined).map_err(|source| StartupError::EndpointUrl {
            url: joined,
            source,
        })
    }
}
