//! Configuration management for the registration server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Registration-surface tunables
    pub registrations: RegistrationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Registration-surface tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Default number of most-recent registrations in analytics payloads
    pub recent_limit: usize,
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("TURNSTILE_HOST", "0.0.0.0".to_string()),
                port: env_or("TURNSTILE_PORT", 8080),
                log_level: env_or("TURNSTILE_LOG_LEVEL", "info".to_string()),
            },
            registrations: RegistrationConfig {
                recent_limit: env_or("TURNSTILE_ANALYTICS_RECENT_LIMIT", 10),
            },
        }
    }
}
