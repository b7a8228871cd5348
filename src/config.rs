// src/config.rs

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use validator::Validate;

/// Explorer JSON-RPC endpoint for the V1 devnet API.
pub const DEVNET_V1_EXPLORER_RPC_URL: &str = "https://explorer.rpc.v1.pod.network";

/// Network launch: Feb 1st 2025 00:00:00 UTC, as seconds since the Unix epoch.
const NETWORK_LAUNCH_UNIX_SECS: i64 = 1_738_368_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown devnet config version '{0}'")]
    UnknownVersion(String),
    #[error("no explorer endpoint configured for version {0}")]
    MissingEndpoint(ProtocolVersion),
}

/// Selects which explorer endpoint a tool call is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[default]
    V1,
}

impl ProtocolVersion {
    pub const ALL: &'static [ProtocolVersion] = &[ProtocolVersion::V1];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "V1",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolVersion::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownVersion(s.to_string()))
    }
}

/// Read-only table of explorer endpoints plus the protocol-wide constants
/// shared by the tools. Built once at startup and handed to the explorer
/// client; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    endpoints: HashMap<ProtocolVersion, Url>,
    launch_timestamp: DateTime<Utc>,
}

impl NetworkConfig {
    /// Lower pagination bound for receipt listings.
    pub const MIN_TRANSACTIONS: u64 = 6;
    /// Upper pagination bound for receipt listings.
    pub const MAX_TRANSACTIONS: u64 = 100;
    /// 24 hours in seconds.
    pub const HOURS_24: i64 = 24 * 60 * 60;

    /// The public devnet table.
    pub fn devnet() -> Self {
        let mut endpoints = HashMap::new();
        if let Ok(url) = Url::parse(DEVNET_V1_EXPLORER_RPC_URL) {
            endpoints.insert(ProtocolVersion::V1, url);
        }
        Self {
            endpoints,
            launch_timestamp: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(NETWORK_LAUNCH_UNIX_SECS),
        }
    }

    /// A table with no endpoints. Mostly useful for tests.
    pub fn empty() -> Self {
        Self {
            endpoints: HashMap::new(),
            ..Self::devnet()
        }
    }

    pub fn with_endpoint(mut self, version: ProtocolVersion, url: Url) -> Self {
        self.endpoints.insert(version, url);
        self
    }

    pub fn with_launch_timestamp(mut self, launch: DateTime<Utc>) -> Self {
        self.launch_timestamp = launch;
        self
    }

    pub fn resolve_endpoint(&self, version: ProtocolVersion) -> Result<&Url, ConfigError> {
        self.endpoints
            .get(&version)
            .ok_or(ConfigError::MissingEndpoint(version))
    }

    /// Earliest instant the network accepts in queries.
    pub fn launch_timestamp(&self) -> DateTime<Utc> {
        self.launch_timestamp
    }

    /// Caps a requested page size at the protocol maximum.
    pub fn clamp_page_size(limit: u64) -> u64 {
        limit.min(Self::MAX_TRANSACTIONS)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

// Process configuration, loaded once at startup from the environment (.env supported).
#[derive(Clone, Debug, Validate)]
pub struct Config {
    // Server settings
    #[validate(range(min = 1))]
    pub port: u16,

    /// Overrides the V1 explorer endpoint, e.g. to point at a local proxy.
    #[validate(url)]
    pub explorer_rpc_url_v1: Option<String>,

    /// Timeout applied to every outbound explorer call.
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            explorer_rpc_url_v1: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let config = Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            explorer_rpc_url_v1: env::var("EXPLORER_RPC_URL_V1").ok(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Builds the endpoint table, applying any configured overrides.
    pub fn network_config(&self) -> Result<NetworkConfig> {
        let mut network = NetworkConfig::devnet();
        if let Some(raw) = &self.explorer_rpc_url_v1 {
            let url = Url::parse(raw).context("EXPLORER_RPC_URL_V1 must be a valid URL")?;
            network = network.with_endpoint(ProtocolVersion::V1, url);
        }
        Ok(network)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_resolves_to_devnet_explorer() {
        let network = NetworkConfig::devnet();
        let first = network.resolve_endpoint(ProtocolVersion::V1).unwrap().clone();
        let second = network.resolve_endpoint(ProtocolVersion::V1).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "https://explorer.rpc.v1.pod.network/");
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let network = NetworkConfig::empty();
        assert_eq!(
            network.resolve_endpoint(ProtocolVersion::V1),
            Err(ConfigError::MissingEndpoint(ProtocolVersion::V1))
        );
    }

    #[test]
    fn version_tags_parse_strictly() {
        assert_eq!("V1".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V1));
        assert!("v1".parse::<ProtocolVersion>().is_err());
        assert!("V2".parse::<ProtocolVersion>().is_err());
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::V1);
    }

    #[test]
    fn launch_timestamp_is_feb_first_2025() {
        let launch = NetworkConfig::devnet().launch_timestamp();
        assert_eq!(launch.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn constants_match_protocol() {
        assert_eq!(NetworkConfig::HOURS_24, 86_400);
        assert_eq!(NetworkConfig::MIN_TRANSACTIONS, 6);
        assert_eq!(NetworkConfig::clamp_page_size(500), NetworkConfig::MAX_TRANSACTIONS);
        assert_eq!(NetworkConfig::clamp_page_size(1), 1);
    }

    #[test]
    fn explorer_override_replaces_v1() {
        let config = Config {
            explorer_rpc_url_v1: Some("http://127.0.0.1:9000/rpc".into()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        let network = config.network_config().unwrap();
        assert_eq!(
            network.resolve_endpoint(ProtocolVersion::V1).unwrap().as_str(),
            "http://127.0.0.1:9000/rpc"
        );
    }

    #[test]
    fn invalid_settings_fail_validation() {
        let config = Config {
            explorer_rpc_url_v1: Some("not a url".into()),
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
