//! # Ledger Configuration
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Malformed values are an error, never silently replaced.
//!
//! | Variable                    | Default       |
//! |-----------------------------|---------------|
//! | `KAHERA_DB_PATH`            | `./kahera.db` |
//! | `KAHERA_MAX_CONNECTIONS`    | `5`           |
//! | `KAHERA_RESTOCK_ON_REFUND`  | `never`       |
//! | `KAHERA_UTC_OFFSET_MINUTES` | `480`         |
//! | `KAHERA_CURRENCY`           | `PHP`         |

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use kahera_core::time::tenant_offset;
use kahera_core::DEFAULT_UTC_OFFSET_MINUTES;
use kahera_db::DbConfig;

/// Whether a refund puts goods back on the shelf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockPolicy {
    /// Refunds are money-only; returned goods are written off.
    #[default]
    Never,

    /// When a refund brings the transaction to `refunded`, every line
    /// item's quantity is returned to its product.
    OnFullRefund,
}

impl FromStr for RestockPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" | "off" | "false" => Ok(RestockPolicy::Never),
            "full_refund" | "on_full_refund" => Ok(RestockPolicy::OnFullRefund),
            _ => Err(()),
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    pub max_connections: u32,

    pub restock_policy: RestockPolicy,

    /// Offset used to read naive client timestamps and render local times.
    pub utc_offset: FixedOffset,

    /// ISO 4217 code stamped on reports.
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            database_path: PathBuf::from("./kahera.db"),
            max_connections: 5,
            restock_policy: RestockPolicy::Never,
            utc_offset: tenant_offset(DEFAULT_UTC_OFFSET_MINUTES).unwrap_or(Utc.fix()),
            currency: "PHP".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LedgerConfig::default();

        let database_path = lookup("KAHERA_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections = match lookup("KAHERA_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::invalid("KAHERA_MAX_CONNECTIONS", &raw))?,
            None => defaults.max_connections,
        };

        let restock_policy = match lookup("KAHERA_RESTOCK_ON_REFUND") {
            Some(raw) => raw
                .parse::<RestockPolicy>()
                .map_err(|_| ConfigError::invalid("KAHERA_RESTOCK_ON_REFUND", &raw))?,
            None => defaults.restock_policy,
        };

        let utc_offset = match lookup("KAHERA_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(|minutes| tenant_offset(minutes).ok())
                .ok_or_else(|| ConfigError::invalid("KAHERA_UTC_OFFSET_MINUTES", &raw))?,
            None => defaults.utc_offset,
        };

        let currency = match lookup("KAHERA_CURRENCY") {
            Some(raw) => {
                let code = raw.trim().to_ascii_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigError::invalid("KAHERA_CURRENCY", &raw));
                }
                code
            }
            None => defaults.currency,
        };

        Ok(LedgerConfig {
            database_path,
            max_connections,
            restock_policy,
            utc_offset,
            currency,
        })
    }

    /// The pool configuration for this ledger.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
