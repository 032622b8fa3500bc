//! Session cookie settings derived from [`AppSettings`].
//!
//! Debug builds tolerate missing or malformed toggles and fall back to safe
//! defaults with a warning. Release builds require every toggle to be set
//! explicitly and refuse ephemeral keys.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

use crate::config::AppSettings;

const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const COOKIE_SECURE_NAME: &str = "COURSEWORK_COOKIE_SECURE";
const SAME_SITE_NAME: &str = "COURSEWORK_SAME_SITE";
const ALLOW_EPHEMERAL_NAME: &str = "COURSEWORK_ALLOW_EPHEMERAL_SESSION";
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";
const FLAG_EXPECTED: &str = "true|false";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Truncated SHA-256 fingerprint of the signing key for startup logs.
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A toggle required in release builds is missing.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A toggle is present but holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure` is rejected in release builds.
    #[error("COURSEWORK_SAME_SITE=None requires COURSEWORK_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    /// Release builds must not fall back to generated keys.
    #[error("COURSEWORK_ALLOW_EPHEMERAL_SESSION must be false in release builds")]
    EphemeralNotAllowed,
}

/// Validate the session toggles in `settings` for the given build mode.
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = cookie_secure(settings, mode)?;
    let same_site = same_site(settings, mode, cookie_secure)?;
    let allow_ephemeral = allow_ephemeral(settings, mode)?;
    let key = session_key(settings.session_key_file(), mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn debug_or_error<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: impl FnOnce(),
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean toggle. Unset or malformed values fall back in debug
/// builds and are errors in release builds.
fn flag(
    raw: Option<&str>,
    name: &'static str,
    mode: BuildMode,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = raw else {
        return debug_or_error(mode, fallback, SessionConfigError::Missing { name }, || {
            warn!("{name} not set; defaulting to {fallback}");
        });
    };
    match parse_flag(value) {
        Some(parsed) => Ok(parsed),
        None => debug_or_error(
            mode,
            fallback,
            SessionConfigError::Invalid {
                name,
                value: value.to_owned(),
                expected: FLAG_EXPECTED,
            },
            || warn!(value, "invalid {name}; defaulting to {fallback}"),
        ),
    }
}

fn cookie_secure(settings: &AppSettings, mode: BuildMode) -> Result<bool, SessionConfigError> {
    flag(
        settings.cookie_secure.as_deref(),
        COOKIE_SECURE_NAME,
        mode,
        true,
    )
}

fn same_site(
    settings: &AppSettings,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = settings.same_site.as_deref() else {
        return debug_or_error(
            mode,
            default_same_site,
            SessionConfigError::Missing {
                name: SAME_SITE_NAME,
            },
            || warn!("{SAME_SITE_NAME} not set; using default"),
        );
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => debug_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SameSite=None without Secure; browsers may reject the cookie"),
        ),
        _ => debug_or_error(
            mode,
            default_same_site,
            SessionConfigError::Invalid {
                name: SAME_SITE_NAME,
                value: value.to_owned(),
                expected: SAME_SITE_EXPECTED,
            },
            || warn!(value, "invalid {SAME_SITE_NAME}; using default"),
        ),
    }
}

fn allow_ephemeral(settings: &AppSettings, mode: BuildMode) -> Result<bool, SessionConfigError> {
    let allowed = flag(
        settings.allow_ephemeral_session.as_deref(),
        ALLOW_EPHEMERAL_NAME,
        mode,
        false,
    )?;
    if allowed && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    Ok(allowed)
}

fn session_key(
    path: PathBuf,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}

/// First eight bytes of the SHA-256 of the key's signing half, hex encoded.
///
/// Lets operators tell which key is active without exposing it.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
