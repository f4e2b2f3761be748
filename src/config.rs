// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Values are
//! trimmed and empty strings count as unset.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CONTRACT_ADDRESS` | Scholar profile contract | Unset (submission blocked) |
//! | `RPC_URL` | EVM JSON-RPC endpoint | Sepolia public RPC |
//! | `PINATA_API_KEY` | Pinata API key | Unset (attachments rejected) |
//! | `PINATA_SECRET_KEY` | Pinata secret key | Unset (attachments rejected) |
//! | `PINATA_API_URL` | Pinata API base | `https://api.pinata.cloud` |
//! | `PINATA_GATEWAY_URL` | IPFS gateway base | `https://gateway.pinata.cloud` |
//! | `FHE_RELAYER_URL` | FHE gateway base | Zama Sepolia relayer |
//! | `FHE_INIT_ATTEMPTS` | Initialization attempts | `3` |
//! | `FHE_INIT_BACKOFF_MS` | First retry delay, doubled per attempt | `500` |
//! | `WALLET_PRIVATE_KEY` | Hex signing key for the connected account | Unset (disconnected) |
//! | `CONFIRMATION_TIMEOUT_SECS` | Receipt wait limit | `120` |
//! | `CONFIRMATION_POLL_SECS` | Receipt poll interval | `3` |
//! | `SESSION_IDLE_TTL_SECS` | Idle time before a session is ended | `1800` |
//! | `SESSION_SWEEP_SECS` | Interval between idle-session sweeps | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::blockchain::{NetworkConfig, SEPOLIA};
use crate::encryption::RetryPolicy;
use crate::error::ScholarError;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const PINATA_API_KEY_ENV: &str = "PINATA_API_KEY";
pub const PINATA_SECRET_KEY_ENV: &str = "PINATA_SECRET_KEY";
pub const PINATA_API_URL_ENV: &str = "PINATA_API_URL";
pub const PINATA_GATEWAY_URL_ENV: &str = "PINATA_GATEWAY_URL";
pub const FHE_RELAYER_URL_ENV: &str = "FHE_RELAYER_URL";
pub const FHE_INIT_ATTEMPTS_ENV: &str = "FHE_INIT_ATTEMPTS";
pub const FHE_INIT_BACKOFF_MS_ENV: &str = "FHE_INIT_BACKOFF_MS";
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";
pub const CONFIRMATION_TIMEOUT_SECS_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const CONFIRMATION_POLL_SECS_ENV: &str = "CONFIRMATION_POLL_SECS";
pub const SESSION_IDLE_TTL_SECS_ENV: &str = "SESSION_IDLE_TTL_SECS";
pub const SESSION_SWEEP_SECS_ENV: &str = "SESSION_SWEEP_SECS";

/// Environment variable selecting `json` or `pretty` log output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
pub const DEFAULT_FHE_RELAYER_URL: &str = "https://relayer.testnet.zama.cloud";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_FHE_INIT_ATTEMPTS: u32 = 3;
const DEFAULT_FHE_INIT_BACKOFF_MS: u64 = 500;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONFIRMATION_POLL_SECS: u64 = 3;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 1800;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

/// Pinata API key pair.
#[derive(Clone)]
pub struct PinataCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for PinataCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataCredentials")
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Fully resolved service configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub network: NetworkConfig,
    pub rpc_url: String,
    /// Raw value; validated per submission by [`resolve_contract_address`].
    pub contract_address: Option<String>,
    pub pinata: Option<PinataCredentials>,
    pub pinata_api_url: String,
    pub pinata_gateway_url: String,
    pub relayer_url: String,
    pub init_retry: RetryPolicy,
    pub wallet_private_key: Option<String>,
    pub confirmation_timeout: Duration,
    pub confirmation_poll_interval: Duration,
    /// Sessions untouched for this long are ended by the sweeper.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("network", &self.network.name)
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("pinata", &self.pinata)
            .field("relayer_url", &self.relayer_url)
            .field("wallet_configured", &self.wallet_private_key.is_some())
            .field("session_idle_ttl", &self.session_idle_ttl)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| normalize(lookup(name));

        let pinata = match (get(PINATA_API_KEY_ENV), get(PINATA_SECRET_KEY_ENV)) {
            (Some(api_key), Some(secret_key)) => Some(PinataCredentials {
                api_key,
                secret_key,
            }),
            _ => None,
        };

        let backoff_ms = parse_or(get(FHE_INIT_BACKOFF_MS_ENV), DEFAULT_FHE_INIT_BACKOFF_MS);

        Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get(PORT_ENV), DEFAULT_PORT),
            network: SEPOLIA,
            rpc_url: get(RPC_URL_ENV).unwrap_or_else(|| SEPOLIA.rpc_url.to_string()),
            contract_address: get(CONTRACT_ADDRESS_ENV),
            pinata,
            pinata_api_url: get(PINATA_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_PINATA_API_URL.to_string()),
            pinata_gateway_url: get(PINATA_GATEWAY_URL_ENV)
                .unwrap_or_else(|| DEFAULT_PINATA_GATEWAY_URL.to_string()),
            relayer_url: get(FHE_RELAYER_URL_ENV)
                .unwrap_or_else(|| DEFAULT_FHE_RELAYER_URL.to_string()),
            init_retry: RetryPolicy::new(
                parse_or(get(FHE_INIT_ATTEMPTS_ENV), DEFAULT_FHE_INIT_ATTEMPTS),
                Duration::from_millis(backoff_ms),
            ),
            wallet_private_key: get(WALLET_PRIVATE_KEY_ENV),
            confirmation_timeout: Duration::from_secs(parse_or(
                get(CONFIRMATION_TIMEOUT_SECS_ENV),
                DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            )),
            confirmation_poll_interval: Duration::from_secs(parse_or(
                get(CONFIRMATION_POLL_SECS_ENV),
                DEFAULT_CONFIRMATION_POLL_SECS,
            )),
            session_idle_ttl: Duration::from_secs(parse_or(
                get(SESSION_IDLE_TTL_SECS_ENV),
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )),
            session_sweep_interval: Duration::from_secs(
                parse_or(get(SESSION_SWEEP_SECS_ENV), DEFAULT_SESSION_SWEEP_SECS).max(1),
            ),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Validate the configured contract address.
///
/// Unset, empty, malformed and zero addresses are all rejected so that no
/// encryption or upload work starts against a contract that cannot exist.
pub fn resolve_contract_address(raw: Option<&str>) -> Result<Address, ScholarError> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
        ScholarError::Configuration(format!(
            "Contract address not configured. Please set {CONTRACT_ADDRESS_ENV} in your environment."
        ))
    })?;

    let address = Address::from_str(value).map_err(|e| {
        ScholarError::Configuration(format!("Invalid contract address `{value}`: {e}"))
    })?;

    if address.is_zero() {
        return Err(ScholarError::Configuration(format!(
            "Contract address not configured. Please set {CONTRACT_ADDRESS_ENV} in your environment."
        )));
    }

    Ok(address)
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
