//! Server configuration loaded via OrthoConfig.
//!
//! Every value may be supplied as a `COURSEWORK_*` environment variable or a
//! command-line flag. Optional values fall back to the defaults below through
//! accessor methods so the raw struct mirrors exactly what was provided.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_DEPENDENCY_TIMEOUT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Raised when a configured value cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The bind address is not a socket address.
    #[error("invalid bind address '{value}': expected host:port")]
    InvalidBindAddr { value: String },
    /// The pool size or timeout is zero.
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Application settings for the coursework server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURSEWORK")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Upper bound on any single store call, in milliseconds.
    pub dependency_timeout_ms: Option<u64>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` attribute.
    ///
    /// Kept as text so an unset variable stays `None`; boolean flags on the
    /// command-line parser default to `false`.
    pub cookie_secure: Option<String>,
    /// `SameSite` policy for session cookies: Strict, Lax or None.
    pub same_site: Option<String>,
    /// Permit a generated session key when the key file is unreadable.
    pub allow_ephemeral_session: Option<String>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| ConfigError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Configured pool size.
    pub fn pool_max_size(&self) -> Result<u32, ConfigError> {
        match self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE) {
            0 => Err(ConfigError::Zero {
                name: "pool_max_size",
            }),
            size => Ok(size),
        }
    }

    /// Timeout applied to every store call.
    pub fn dependency_timeout(&self) -> Result<Duration, ConfigError> {
        match self.dependency_timeout_ms {
            None => Ok(DEFAULT_DEPENDENCY_TIMEOUT),
            Some(0) => Err(ConfigError::Zero {
                name: "dependency_timeout_ms",
            }),
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }

    /// Path of the session key file.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Database URL with blank values treated as absent.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
