//! Identity service configuration.
//!
//! The signing key and base URL are passed in explicitly; nothing is read
//! from process-wide settings after construction.

use chrono::Duration;
use std::fmt;
use thiserror::Error;

/// Minimum signing key length in bytes (the HS256 block of entropy).
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Configuration loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// A value failed validation.
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Configuration for [`TokenCodec`](crate::token::TokenCodec) and
/// [`IdentityService`](crate::service::IdentityService).
#[derive(Clone)]
pub struct IdentityConfig {
    /// Secret used to sign and verify every token.
    pub signing_key: Vec<u8>,

    /// Base URL for generated links (e.g., "https://app.example.com").
    ///
    /// Links are formatted as `{base_url}/activation/{token}`,
    /// `{base_url}/validate_email/{token}` and `{base_url}/reset_password/{token}`.
    pub base_url: String,

    /// Site name used in message subjects.
    ///
    /// Default: "Account"
    pub site_title: String,

    /// Lifetime of minted tokens. `None` issues tokens without `exp`.
    ///
    /// Default: `None`
    pub token_ttl: Option<Duration>,

    /// Let inactive accounts log in.
    ///
    /// Default: false
    pub allow_inactive_login: bool,
}

impl IdentityConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `signing_key` - Token signing secret (at least 32 bytes)
    /// * `base_url` - Base URL for your application (e.g., "https://app.example.com")
    #[must_use]
    pub fn new(signing_key: impl Into<Vec<u8>>, base_url: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            base_url: base_url.into(),
            site_title: "Account".to_string(),
            token_ttl: None,
            allow_inactive_login: false,
        }
    }

    /// Set the site title.
    #[must_use]
    pub fn with_site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    /// Set token time-to-live.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Allow or refuse logins for inactive accounts.
    #[must_use]
    pub const fn with_inactive_login(mut self, allow: bool) -> Self {
        self.allow_inactive_login = allow;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Load configuration from environment variables.
    ///
    /// - `IDENTITY_SIGNING_KEY` (required)
    /// - `IDENTITY_BASE_URL` (required)
    /// - `IDENTITY_SITE_TITLE` (optional)
    /// - `IDENTITY_TOKEN_TTL_MINUTES` (optional)
    /// - `IDENTITY_ALLOW_INACTIVE_LOGIN` (optional, "true"/"false")
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let signing_key = std::env::var("IDENTITY_SIGNING_KEY")
            .map_err(|_| ConfigError::EnvVarNotSet("IDENTITY_SIGNING_KEY".to_string()))?;
        let base_url = std::env::var("IDENTITY_BASE_URL")
            .map_err(|_| ConfigError::EnvVarNotSet("IDENTITY_BASE_URL".to_string()))?;

        let mut config = Self::new(signing_key.into_bytes(), base_url);

        if let Ok(title) = std::env::var("IDENTITY_SITE_TITLE") {
            config.site_title = title;
        }

        if let Ok(minutes) = std::env::var("IDENTITY_TOKEN_TTL_MINUTES") {
            config.token_ttl = Some(parse_ttl_minutes(&minutes)?);
        }

        if let Ok(flag) = std::env::var("IDENTITY_ALLOW_INACTIVE_LOGIN") {
            config.allow_inactive_login = flag.parse().map_err(|e| ConfigError::Invalid {
                field: "allow_inactive_login",
                reason: format!("{e}"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the key is too short, the base URL is not http(s),
    /// or the token TTL is shorter than one second.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                field: "signing_key",
                reason: format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            });
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }

        if let Some(ttl) = self.token_ttl {
            // Token timestamps have whole-second resolution.
            if ttl < Duration::seconds(1) {
                return Err(ConfigError::Invalid {
                    field: "token_ttl",
                    reason: "must be at least one second".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Parse a TTL given in whole minutes.
fn parse_ttl_minutes(value: &str) -> Result<Duration, ConfigError> {
    let minutes: i64 = value.trim().parse().map_err(|e| ConfigError::Invalid {
        field: "token_ttl",
        reason: format!("{e}"),
    })?;
    Duration::try_minutes(minutes).ok_or_else(|| ConfigError::Invalid {
        field: "token_ttl",
        reason: format!("{minutes} minutes is out of range"),
    })
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("signing_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("site_title", &self.site_title)
            .field("token_ttl", &self.token_ttl)
            .field("allow_inactive_login", &self.allow_inactive_login)
            .finish()
    }
}
