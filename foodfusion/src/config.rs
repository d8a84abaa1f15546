//! Application configuration read from `FOODFUSION_*` environment variables.
//!
//! | Variable                              | Default                          |
//! | ------------------------------------- | -------------------------------- |
//! | `FOODFUSION_DATABASE_URL`             | `sqlite://foodfusion.db?mode=rwc` |
//! | `FOODFUSION_BIND_ADDR`                | `0.0.0.0:8000`                   |
//! | `FOODFUSION_JWT_SECRET`               | none, required to serve          |
//! | `FOODFUSION_JWT_ISSUER`               | `foodfusion`                     |
//! | `FOODFUSION_JWT_TTL_SECONDS`          | `86400`                          |
//! | `FOODFUSION_LOGIN_GUARD_ENABLED`      | `true`                           |
//! | `FOODFUSION_LOGIN_FAILURE_THRESHOLD`  | `3`                              |
//! | `FOODFUSION_LOGIN_BLOCK_SECONDS`      | `60`                             |

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use foodfusion_core::{GuardConfig, JwtConfig, token::DEFAULT_ISSUER};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://foodfusion.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: Option<String>,
    pub jwt_issuer: String,
    pub jwt_ttl: Duration,
    pub guard: GuardConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GuardConfig::default();

        let enabled = parse_or(&lookup, "FOODFUSION_LOGIN_GUARD_ENABLED", true)?;
        let failure_threshold = parse_or(
            &lookup,
            "FOODFUSION_LOGIN_FAILURE_THRESHOLD",
            defaults.failure_threshold,
        )?;
        let block_duration = seconds_or(
            &lookup,
            "FOODFUSION_LOGIN_BLOCK_SECONDS",
            defaults.block_duration,
        )?;

        let guard = GuardConfig {
            enabled,
            ..defaults
        }
        .with_failure_threshold(failure_threshold)
        .with_block_duration(block_duration);
        guard
            .validate()
            .map_err(|e| ConfigError::Rejected(e.to_string()))?;

        let bind_addr = lookup("FOODFUSION_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "FOODFUSION_BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let jwt_ttl = seconds_or(&lookup, "FOODFUSION_JWT_TTL_SECONDS", Duration::days(1))?;

        Ok(Self {
            database_url: lookup("FOODFUSION_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            jwt_secret: lookup("FOODFUSION_JWT_SECRET").filter(|s| !s.is_empty()),
            jwt_issuer: lookup("FOODFUSION_JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            jwt_ttl,
            guard,
        })
    }

    /// JWT settings for serving. Fails when no secret is configured.
    pub fn jwt_config(&self) -> Result<JwtConfig, ConfigError> {
        let secret = self
            .jwt_secret
            .as_ref()
            .ok_or(ConfigError::Missing("FOODFUSION_JWT_SECRET"))?;

        let config = JwtConfig::new_hs256(secret.as_bytes())
            .with_issuer(self.jwt_issuer.clone())
            .with_ttl(self.jwt_ttl);
        config
            .validate()
            .map_err(|e| ConfigError::Rejected(e.to_string()))?;
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// A whole number of seconds, rejected when chrono cannot represent it.
fn seconds_or<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or(ConfigError::Invalid { name, value })
}
