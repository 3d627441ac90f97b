//! Engine settings.
//!
//! Settings load from a TOML or JSON file, then take `PROTEUS_*`
//! environment overrides, and are validated before use:
//!
//! ```toml
//! [pipeline]
//! mock = { dynamic = true }
//! errors = true
//!
//! [forwarder]
//! timeout_secs = 10
//!
//! [logging]
//! level = "debug"
//! json_format = false
//! ```

use std::path::{Path, PathBuf};

use proteus_contract::HttpConfig;
use proteus_core::Mode;
use proteus_forwarder::ForwarderOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::logging::LogConfig;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is neither `toml` nor `json`.
    #[error("unsupported settings format: {0}")]
    UnsupportedFormat(String),

    /// The TOML is malformed.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON is malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings are inconsistent.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Result type for settings loading.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Everything needed to run the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pipeline configuration.
    pub pipeline: HttpConfig,
    /// Upstream client options.
    pub forwarder: ForwarderOptions,
    /// Logging configuration.
    pub logging: LogConfig,
}

impl Settings {
    /// Load settings from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            _ => Err(SettingsError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Load, override from the environment and validate.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let settings = Self::from_file(path)?.with_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides.
    ///
    /// Variables are prefixed with `PROTEUS_` and use uppercase `snake_case`.
    /// Values that do not parse are ignored.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by `var`, as [`Settings::with_env_overrides`]
    /// does with the process environment.
    #[must_use]
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| var(key).and_then(|v| v.parse::<bool>().ok());

        if let Some(upstream) = var("PROTEUS_UPSTREAM").and_then(|v| Url::parse(&v).ok()) {
            self.pipeline.mode = Mode::Proxy { upstream };
        }

        if let Some(proxy) = var("PROTEUS_UPSTREAM_PROXY").and_then(|v| Url::parse(&v).ok()) {
            self.pipeline.base.upstream_proxy = Some(proxy);
        }

        if let Some(errors) = flag("PROTEUS_ERRORS") {
            self.pipeline.base.errors = errors;
        }
        if let Some(enabled) = flag("PROTEUS_VALIDATE_REQUEST") {
            self.pipeline.base.validate_request = enabled;
        }
        if let Some(enabled) = flag("PROTEUS_VALIDATE_RESPONSE") {
            self.pipeline.base.validate_response = enabled;
        }
        if let Some(enabled) = flag("PROTEUS_CHECK_SECURITY") {
            self.pipeline.base.check_security = enabled;
        }

        if let Some(dynamic) = flag("PROTEUS_DYNAMIC") {
            if let Mode::Mock(options) = &mut self.pipeline.mode {
                options.dynamic = dynamic;
            }
        }

        if let Some(secs) = var("PROTEUS_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.forwarder.timeout_secs = secs;
        }

        if let Some(level) = var("PROTEUS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = flag("PROTEUS_LOG_JSON") {
            self.logging.json_format = json;
        }

        self
    }

    /// Validate the settings.
    pub fn validate(&self) -> SettingsResult<()> {
        if let Mode::Proxy { upstream } = &self.pipeline.mode {
            if !matches!(upstream.scheme(), "http" | "https") {
                return Err(SettingsError::Invalid(format!(
                    "upstream must be an http or https URL, got {upstream}"
                )));
            }
        } else if self.pipeline.base.upstream_proxy.is_some() {
            return Err(SettingsError::Invalid(
                "upstream_proxy is only valid in proxy mode".to_string(),
            ));
        }

        self.forwarder
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        self.logging
            .filter()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        Ok(())
    }
}
