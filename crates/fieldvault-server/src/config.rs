//! Configuration loading and validation for the field-encryption service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if the encryption key is missing or any
//! value is invalid.

use anyhow::{Context, Result};
use fieldvault::CipherKey;
use serde::Deserialize;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Secret the field key is derived from. **Required** unless the legacy
    /// `BHCARE_ENCRYPTION_KEY` is set.
    #[serde(default)]
    pub data_encryption_key: Option<String>,

    /// Legacy name of the secret, consulted when `DATA_ENCRYPTION_KEY` is
    /// absent or blank.
    #[serde(default)]
    pub bhcare_encryption_key: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Header carrying the authenticated subject, set by the gateway.
    #[serde(default = "default_caller_header")]
    pub caller_header_name: String,

    /// Header carrying the caller's comma-separated roles.
    #[serde(default = "default_roles_header")]
    pub roles_header_name: String,

    /// OTLP collector endpoint. Spans are not exported when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_caller_header() -> String {
    "X-Authenticated-User".into()
}
fn default_roles_header() -> String {
    "X-Authenticated-Roles".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The configured secret, preferring `DATA_ENCRYPTION_KEY`.
    fn secret(&self) -> Option<&str> {
        [&self.data_encryption_key, &self.bhcare_encryption_key]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// Derive the field-encryption key from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns an error if neither key variable holds a non-blank value.
    pub fn cipher_key(&self) -> Result<CipherKey> {
        let secret = self.secret().unwrap_or_default();
        CipherKey::from_secret(secret)
            .context("DATA_ENCRYPTION_KEY (or BHCARE_ENCRYPTION_KEY) is required")
    }

    /// The OTLP endpoint, if one is configured.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otel_exporter_otlp_endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.secret().is_none() {
            anyhow::bail!("DATA_ENCRYPTION_KEY (or BHCARE_ENCRYPTION_KEY) is required and must not be empty");
        }
        ensure_non_empty(&self.caller_header_name, "CALLER_HEADER_NAME")?;
        ensure_non_empty(&self.roles_header_name, "ROLES_HEADER_NAME")?;
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("data_encryption_key", &redact(&self.data_encryption_key))
            .field("bhcare_encryption_key", &redact(&self.bhcare_encryption_key))
            .field("listen_port", &self.listen_port)
            .field("caller_header_name", &self.caller_header_name)
            .field("roles_header_name", &self.roles_header_name)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
