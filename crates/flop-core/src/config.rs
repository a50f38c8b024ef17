//! flop.toml configuration parser with environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "flop.toml";
/// Settlement service used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";

pub const ENV_ENDPOINT: &str = "FLOP_BRIDGE_ENDPOINT";
pub const ENV_FLOP_DEPOSIT: &str = "FLOP_DEPOSIT_ADDRESS";
pub const ENV_WFLOP_DEPOSIT: &str = "WFLOP_DEPOSIT_ADDRESS";
pub const ENV_WALLET_RPC: &str = "FLOP_WALLET_RPC";
pub const ENV_REQUEST_TIMEOUT: &str = "FLOP_REQUEST_TIMEOUT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid duration for {field}: {value}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("unsupported {field} url (expected http:// or https://): {value}")]
    UnsupportedScheme { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub bridge: BridgeSection,
    pub deposit: DepositAddresses,
    pub wallet: WalletSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Base URL of the settlement service.
    pub endpoint: String,
    /// e.g. "30s". Unset means no client-side timeout.
    pub request_timeout: Option<String>,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
        }
    }
}

/// Where users send tokens before claiming a swap. Never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositAddresses {
    /// FLOP deposit address (FLOP → WFLOP).
    pub flop: Option<String>,
    /// WFLOP burn address (WFLOP → FLOP).
    pub wflop: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSection {
    /// JSON-RPC endpoint answering `eth_requestAccounts`.
    pub rpc_url: Option<String>,
}

impl BridgeConfig {
    /// Load configuration: defaults, then the TOML file, then environment.
    ///
    /// An explicit `path` must exist. Without one, `flop.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        if config.deposit.flop.is_none() {
            warn!("no FLOP deposit address configured ({ENV_FLOP_DEPOSIT})");
        }
        if config.deposit.wflop.is_none() {
            warn!("no WFLOP burn address configured ({ENV_WFLOP_DEPOSIT})");
        }
        debug!(endpoint = %config.bridge.endpoint, wallet = ?config.wallet.rpc_url, "configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.bridge.endpoint = endpoint;
        }
        if let Some(timeout) = get(ENV_REQUEST_TIMEOUT) {
            self.bridge.request_timeout = Some(timeout);
        }
        if let Some(flop) = get(ENV_FLOP_DEPOSIT) {
            self.deposit.flop = Some(flop);
        }
        if let Some(wflop) = get(ENV_WFLOP_DEPOSIT) {
            self.deposit.wflop = Some(wflop);
        }
        if let Some(rpc) = get(ENV_WALLET_RPC) {
            self.wallet.rpc_url = Some(rpc);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_scheme("bridge.endpoint", &self.bridge.endpoint)?;
        if let Some(rpc) = &self.wallet.rpc_url {
            check_scheme("wallet.rpc_url", rpc)?;
        }
        self.request_timeout()?;
        Ok(())
    }

    /// Parsed `bridge.request_timeout`.
    pub fn request_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match &self.bridge.request_timeout {
            None => Ok(None),
            // A zero timeout would fail every request before it is sent.
            Some(raw) => parse_duration(raw)
                .filter(|d| !d.is_zero())
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidDuration {
                    field: "bridge.request_timeout",
                    value: raw.clone(),
                }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn check_scheme(field: &'static str, url: &str) -> Result<(), ConfigError> {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedScheme {
            field,
            value: url.to_string(),
        })
    }
}

/// Parse a duration string like "5s", "500ms", "1m", or bare seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
