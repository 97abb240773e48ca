//! Runtime configuration.
//!
//! Values come from environment variables, then CLI flag overrides applied
//! by the binary, then cross-field validation. The DSN is required; the
//! read-only envelope defaults to on and is only ever disabled for
//! integration tests.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is required (set via env var or --database-url flag)")]
    MissingDatabaseUrl,

    #[error("invalid {name} value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("HTTP_BEARER_TOKEN is required when transport is \"http\"")]
    MissingBearerToken,

    #[error("POOL_MIN_CONNS ({min}) must not exceed POOL_MAX_CONNS ({max})")]
    PoolBounds { min: u32, max: u32 },
}

/// Transport at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(format!("must be \"stdio\" or \"http\", got {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub read_only: bool,
    pub max_rows: u32,
    pub query_timeout: Duration,

    /// Schema allow-list; empty means all non-system schemas.
    pub schemas: Vec<String>,
    pub policy_file: Option<String>,

    pub log_level: String,

    pub transport: Transport,
    pub http_addr: String,
    pub http_bearer_token: String,

    pub pool_max_conns: u32,
    pub pool_min_conns: u32,
    pub pool_max_conn_lifetime: Duration,

    /// NDJSON audit log path; `None` disables auditing.
    pub audit_log: Option<String>,

    pub dry_run: bool,
    pub explain_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            read_only: true,
            max_rows: 100,
            query_timeout: Duration::from_secs(10),
            schemas: Vec::new(),
            policy_file: None,
            log_level: "info".to_string(),
            transport: Transport::Stdio,
            http_addr: "0.0.0.0:8080".to_string(),
            http_bearer_token: String::new(),
            pool_max_conns: 5,
            pool_min_conns: 1,
            pool_max_conn_lifetime: Duration::from_secs(30 * 60),
            audit_log: None,
            dry_run: false,
            explain_only: false,
        }
    }
}

impl Config {
    /// Builds a config from environment variables on top of the defaults.
    /// CLI overrides and [`Config::validate`] run afterwards in the binary.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Config::default();

        if let Ok(v) = env::var("DATABASE_URL") {
            cfg.database_url = v;
        }
        if let Some(v) = read_env("READ_ONLY") {
            cfg.read_only = parse_bool("READ_ONLY", &v)?;
        }
        if let Some(v) = read_env("MAX_ROWS") {
            cfg.max_rows = parse_positive("MAX_ROWS", &v)?;
        }
        if let Some(v) = read_env("QUERY_TIMEOUT") {
            cfg.query_timeout = Duration::from_secs(parse_positive("QUERY_TIMEOUT", &v)? as u64);
        }
        if let Some(v) = read_env("LOG_LEVEL") {
            cfg.log_level = parse_log_level(&v)?;
        }
        if let Some(v) = read_env("SCHEMAS") {
            cfg.schemas = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = read_env("POLICY_FILE") {
            cfg.policy_file = Some(v);
        }
        if let Some(v) = read_env("TRANSPORT") {
            cfg.transport = v.parse().map_err(|reason| ConfigError::InvalidValue {
                name: "TRANSPORT",
                value: v.clone(),
                reason,
            })?;
        }
        if let Some(v) = read_env("HTTP_ADDR") {
            cfg.http_addr = v;
        }
        if let Ok(v) = env::var("HTTP_BEARER_TOKEN") {
            cfg.http_bearer_token = v;
        }
        if let Some(v) = read_env("POOL_MAX_CONNS") {
            cfg.pool_max_conns = parse_positive("POOL_MAX_CONNS", &v)?;
        }
        if let Some(v) = read_env("POOL_MIN_CONNS") {
            cfg.pool_min_conns =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "POOL_MIN_CONNS",
                    value: v.clone(),
                    reason: "must be a non-negative integer".to_string(),
                })?;
        }
        if let Some(v) = read_env("POOL_MAX_CONN_LIFETIME_SECS") {
            cfg.pool_max_conn_lifetime =
                Duration::from_secs(parse_positive("POOL_MAX_CONN_LIFETIME_SECS", &v)? as u64);
        }
        if let Some(v) = read_env("AUDIT_LOG") {
            cfg.audit_log = Some(v);
        }

        Ok(cfg)
    }

    /// Cross-field validation of the final, override-applied config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.transport == Transport::Http && self.http_bearer_token.is_empty() {
            return Err(ConfigError::MissingBearerToken);
        }
        if self.pool_min_conns > self.pool_max_conns {
            return Err(ConfigError::PoolBounds {
                min: self.pool_min_conns,
                max: self.pool_max_conns,
            });
        }
        if self.max_rows == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_ROWS",
                value: "0".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "must be true or false".to_string(),
        }),
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

fn parse_log_level(value: &str) -> Result<String, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
        "warning" => Ok("warn".to_string()),
        _ => Err(ConfigError::InvalidValue {
            name: "LOG_LEVEL",
            value: value.to_string(),
            reason: "must be trace, debug, info, warn, or error".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            database_url: "postgres://localhost/db".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_are_safe() {
        let cfg = Config::default();
        assert!(cfg.read_only);
        assert_eq!(cfg.max_rows, 100);
        assert_eq!(cfg.query_timeout, Duration::from_secs(10));
        assert_eq!(cfg.transport, Transport::Stdio);
        assert_eq!(cfg.pool_max_conns, 5);
    }

    #[test]
    fn missing_dsn_fails_validation() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn http_transport_requires_a_token() {
        let mut cfg = valid();
        cfg.transport = Transport::Http;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingBearerToken)
        ));
        cfg.http_bearer_token = "sekrit".to_string();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn pool_floor_must_not_exceed_cap() {
        let mut cfg = valid();
        cfg.pool_min_conns = 10;
        cfg.pool_max_conns = 5;
        assert!(matches!(cfg.validate(), Err(ConfigError::PoolBounds { .. })));
    }

    #[test]
    fn transport_parsing_is_closed() {
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!("http".parse::<Transport>().unwrap(), Transport::Http);
        assert!("grpc".parse::<Transport>().is_err());
    }

    #[test]
    fn log_level_accepts_warning_alias() {
        assert_eq!(parse_log_level("WARNING").unwrap(), "warn");
        assert!(parse_log_level("loud").is_err());
    }
}
