//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STORE_HOST` - Bind address (default: 127.0.0.1)
//! - `STORE_PORT` - Listen port (default: 3000)
//! - `STORE_MAILBOX_SIZE` - Per-actor mailbox capacity (default: 100)
//! - `STORE_STORAGE_TIMEOUT_MS` - Bound on every actor round-trip (default: 2000)
//! - `STORE_INVOICE_DIR` - Invoice archive directory (default: invoices)
//! - `STORE_REFUND_WINDOW_DAYS` - Days a delivered line stays refundable (default: 30)
//! - `STORE_REFUND_WINDOW_ANCHOR` - `purchase` or `delivery` (default: purchase)
//! - `STORE_DELIVERY_SIMULATION_SECS` - Enables the delivery simulator at this interval
//! - `STORE_NOTIFY_FROM` - Sender address for customer emails (default: orders@localhost)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which date opens the refund window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundAnchor {
    PurchaseDate,
    DeliveryDate,
}

impl FromStr for RefundAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(Self::PurchaseDate),
            "delivery" => Ok(Self::DeliveryDate),
            other => Err(format!("expected `purchase` or `delivery`, got `{other}`")),
        }
    }
}

/// How long after the anchor date a line may be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundPolicy {
    pub window_days: u32,
    pub anchor: RefundAnchor,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            window_days: 30,
            anchor: RefundAnchor::PurchaseDate,
        }
    }
}

impl RefundPolicy {
    /// Picks the anchor out of the two candidate dates. `None` when the
    /// anchor date is not known (e.g. delivered without a timestamp).
    pub fn anchor_date(
        &self,
        purchase_date: DateTime<Utc>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        match self.anchor {
            RefundAnchor::PurchaseDate => Some(purchase_date),
            RefundAnchor::DeliveryDate => delivered_at,
        }
    }

    pub fn is_open(&self, anchor: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now <= anchor + chrono::Duration::days(i64::from(self.window_days))
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: IpAddr,
    pub port: u16,
    pub mailbox_size: usize,
    pub storage_timeout: Duration,
    pub invoice_dir: PathBuf,
    pub refund_policy: RefundPolicy,
    pub delivery_simulation: Option<Duration>,
    pub notify_from: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            mailbox_size: 100,
            storage_timeout: Duration::from_millis(2000),
            invoice_dir: PathBuf::from("invoices"),
            refund_policy: RefundPolicy::default(),
            delivery_simulation: None,
            notify_from: "orders@localhost".to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let timeout_ms: u64 = parse_or("STORE_STORAGE_TIMEOUT_MS", 2000)?;
        let simulation_secs: Option<u64> = parse_optional("STORE_DELIVERY_SIMULATION_SECS")?;

        Ok(Self {
            host: parse_or("STORE_HOST", defaults.host)?,
            port: parse_or("STORE_PORT", defaults.port)?,
            mailbox_size: parse_or("STORE_MAILBOX_SIZE", defaults.mailbox_size)?,
            storage_timeout: Duration::from_millis(timeout_ms),
            invoice_dir: get_optional_env("STORE_INVOICE_DIR").map_or(defaults.invoice_dir, PathBuf::from),
            refund_policy: RefundPolicy {
                window_days: parse_or("STORE_REFUND_WINDOW_DAYS", defaults.refund_policy.window_days)?,
                anchor: parse_or("STORE_REFUND_WINDOW_ANCHOR", defaults.refund_policy.anchor)?,
            },
            delivery_simulation: simulation_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            notify_from: get_optional_env("STORE_NOTIFY_FROM").unwrap_or(defaults.notify_from),
        })
    }

    /// Returns the socket address for binding the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_optional<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(key)?.unwrap_or(default))
}
