//! Environment-driven application configuration.
//!
//! All knobs come from environment variables so deployments configure the
//! process the same way containers usually do. Parsing is separated from
//! `std::env` through a lookup closure, keeping the logic testable without
//! mutating process state.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{AttendanceConfig, CapacityPolicy};

/// Configuration errors raised during startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
    /// A variable is present but unparsable.
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Fully parsed application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_max_size: u32,
    /// Whether session cookies require HTTPS.
    pub cookie_secure: bool,
    /// Attendance service tuning (capacity policy, timeout, retries).
    pub attendance: AttendanceConfig,
    /// Deadline for proximity storage calls.
    pub storage_timeout: Duration,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let bind_addr = parse_or_default(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let pool_max_size =
            parse_or_default(&lookup, "DB_POOL_MAX_SIZE", Some(DEFAULT_POOL_MAX_SIZE))?;
        let cookie_secure = match lookup("SESSION_COOKIE_SECURE").as_deref() {
            None => true,
            Some("0") => false,
            Some(_) => true,
        };

        let capacity_policy = match lookup("ATTENDANCE_CAPACITY_POLICY") {
            None => CapacityPolicy::default(),
            Some(raw) => {
                CapacityPolicy::parse(&raw).ok_or(ConfigError::Invalid {
                    name: "ATTENDANCE_CAPACITY_POLICY",
                    value: raw,
                })?
            }
        };
        let storage_timeout_ms: u64 = parse_or_default(
            &lookup,
            "STORAGE_TIMEOUT_MS",
            Some(DEFAULT_STORAGE_TIMEOUT_MS),
        )?;
        let max_attempts: u32 = parse_or_default(
            &lookup,
            "ATTENDANCE_MAX_ATTEMPTS",
            Some(AttendanceConfig::default().max_attempts),
        )?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "ATTENDANCE_MAX_ATTEMPTS",
                value: "0".to_owned(),
            });
        }

        let storage_timeout = Duration::from_millis(storage_timeout_ms);
        Ok(Self {
            bind_addr,
            database_url,
            pool_max_size,
            cookie_secure,
            attendance: AttendanceConfig {
                capacity_policy,
                storage_timeout,
                max_attempts,
            },
            storage_timeout,
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        None => default.ok_or(ConfigError::Missing { name }),
    }
}
