//! Configuration loader for the `climate-compliance` report service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};
use chrono_tz::Tz;

/// Reference timezone used when `REPORT_TIMEZONE` is not set.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Port the HTTP server binds on all interfaces.
    pub http_port: u16,

    /// Timezone in which report date ranges are interpreted.
    pub timezone: Tz,

    /// Intervals longer than this many minutes count as missing data.
    pub gap_threshold_minutes: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `HTTP_PORT` – listen port (default: 8080)
/// - `REPORT_TIMEZONE` – IANA zone name (default: `America/New_York`)
/// - `GAP_THRESHOLD_MINUTES` – large-gap threshold (default: 15)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let http_port = parse_env_u32!("HTTP_PORT", 8080);
    let gap_threshold_minutes = parse_env_u32!("GAP_THRESHOLD_MINUTES", 15);

    let http_port = u16::try_from(http_port)
        .map_err(|_| anyhow!("Invalid HTTP_PORT: {} is out of range", http_port))?;

    let tz_name = env::var("REPORT_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
    let timezone = parse_timezone(&tz_name)?;

    Ok(Config {
        db_url,
        db_pool_max,
        http_port,
        timezone,
        gap_threshold_minutes,
    })
}

/// Parse an IANA timezone name such as `America/Chicago`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    // ---
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("Invalid REPORT_TIMEZONE '{}': {}", name, e))
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL          : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX           : {}", self.db_pool_max);
        tracing::info!("  HTTP_PORT             : {}", self.http_port);
        tracing::info!("  REPORT_TIMEZONE       : {}", self.timezone.name());
        tracing::info!("  GAP_THRESHOLD_MINUTES : {}", self.gap_threshold_minutes);
    }

    /// Database URL with the password portion replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                // `postgres://host@...` has its only colon in the scheme
                if !self.db_url[colon_pos..].starts_with("://") {
                    return format!(
                        "{}:****{}",
                        &self.db_url[..colon_pos],
                        &self.db_url[at_pos..]
                    );
                }
            }
        }
        self.db_url.clone()
    }
}
