//! Domain types and validators for Fleet configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "owner",
    "gateway.kind",
    "gateway.endpoint",
    "gateway.token",
    "gateway.timeout_secs",
    "reconcile.max_attempts",
    "reconcile.poll_interval_secs",
];
pub const VALID_GATEWAY_KINDS: &[&str] = &["http", "simulated"];

/// Default retry ceiling: with the default interval, about eight minutes of polling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_ATTEMPTS_LIMIT: u64 = 10_000;
const POLL_INTERVAL_LIMIT: u64 = 3_600;
const TIMEOUT_LIMIT: u64 = 600;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.fleet/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FleetConfig {
    /// Owner tag used to scope listings; defaults to the login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub gateway: GatewayConfig,
    pub reconcile: ReconcileConfig,
}

/// Which control-plane adapter to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    #[default]
    Http,
    Simulated,
}

/// Control-plane connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    pub endpoint: String,
    /// Bearer token. Prefer `FLEET_TOKEN` over storing it here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::Http,
            endpoint: "http://127.0.0.1:8420".to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reconciliation policy: how many polls, how far apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub max_attempts: u32,
    pub poll_interval_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl ReconcileConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.to_string(),
        }
        .into()
    };
    match key {
        "gateway.kind" if !VALID_GATEWAY_KINDS.contains(&value) => {
            Err(invalid(&VALID_GATEWAY_KINDS.join(", ")))
        }
        "gateway.endpoint"
            if !(value.starts_with("http://") || value.starts_with("https://")) =>
        {
            Err(invalid("an http:// or https:// URL"))
        }
        "owner" | "gateway.token" if value.trim().is_empty() => Err(invalid("a non-empty string")),
        "gateway.timeout_secs" => bounded(value, TIMEOUT_LIMIT).ok_or_else(|| invalid("1-600")),
        "reconcile.max_attempts" => {
            bounded(value, MAX_ATTEMPTS_LIMIT).ok_or_else(|| invalid("1-10000"))
        }
        "reconcile.poll_interval_secs" => {
            bounded(value, POLL_INTERVAL_LIMIT).ok_or_else(|| invalid("1-3600"))
        }
        _ => Ok(()),
    }
}

fn bounded(value: &str, max: u64) -> Option<()> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| (1..=max).contains(n))
        .map(|_| ())
}

impl FleetConfig {
    /// Validate and assign one dotted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "owner" => self.owner = Some(value.to_string()),
            "gateway.kind" => {
                self.gateway.kind = if value == "simulated" {
                    GatewayKind::Simulated
                } else {
                    GatewayKind::Http
                };
            }
            "gateway.endpoint" => self.gateway.endpoint = value.trim_end_matches('/').to_string(),
            "gateway.token" => self.gateway.token = Some(value.to_string()),
            "gateway.timeout_secs" => self.gateway.timeout_secs = value.parse()?,
            "reconcile.max_attempts" => self.reconcile.max_attempts = value.parse()?,
            "reconcile.poll_interval_secs" => self.reconcile.poll_interval_secs = value.parse()?,
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
