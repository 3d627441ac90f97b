//! Pipeline configuration.
//!
//! [`Config`] is a sum type over the two response strategies. On the wire it
//! keeps the familiar flat shape, discriminated by the `mock` field:
//!
//! ```json
//! { "mock": { "dynamic": false }, "validateRequest": true }
//! { "mock": false, "upstream": "https://api.example.com", "errors": true }
//! ```
//!
//! A mock options object together with an `upstream`, or `mock: false`
//! without one, is rejected while deserializing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// Feature toggles shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseOptions {
    /// Run the security validator.
    pub check_security: bool,
    /// Run the input validator.
    pub validate_request: bool,
    /// Run the output validator.
    pub validate_response: bool,
    /// Promote failed validations to terminating errors.
    pub errors: bool,
    /// Proxy to route upstream traffic through (proxy mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_proxy: Option<Url>,
}

impl Default for BaseOptions {
    fn default() -> Self {
        Self {
            check_security: true,
            validate_request: true,
            validate_response: true,
            errors: false,
            upstream_proxy: None,
        }
    }
}

/// Response strategy selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode<M> {
    /// Synthesize responses from the contract.
    Mock(M),
    /// Forward requests to a real upstream.
    Proxy {
        /// Base URL of the upstream service.
        upstream: Url,
    },
}

/// Configuration of one pipeline invocation.
///
/// # Example
///
/// ```
/// use proteus_core::{Config, Mode};
///
/// let config: Config<serde_json::Value> = Config::proxy("http://localhost:3000".parse().unwrap())
///     .errors(true);
///
/// assert!(matches!(config.mode, Mode::Proxy { .. }));
/// assert!(config.base.errors);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config<M> {
    /// Which response strategy runs.
    pub mode: Mode<M>,
    /// Feature toggles.
    pub base: BaseOptions,
}

impl<M> Config<M> {
    /// Creates a mock-mode configuration with default toggles.
    pub fn mock(options: M) -> Self {
        Self {
            mode: Mode::Mock(options),
            base: BaseOptions::default(),
        }
    }

    /// Creates a proxy-mode configuration with default toggles.
    pub fn proxy(upstream: Url) -> Self {
        Self {
            mode: Mode::Proxy { upstream },
            base: BaseOptions::default(),
        }
    }

    /// Enables or disables security validation.
    pub fn check_security(mut self, enabled: bool) -> Self {
        self.base.check_security = enabled;
        self
    }

    /// Enables or disables request validation.
    pub fn validate_request(mut self, enabled: bool) -> Self {
        self.base.validate_request = enabled;
        self
    }

    /// Enables or disables response validation.
    pub fn validate_response(mut self, enabled: bool) -> Self {
        self.base.validate_response = enabled;
        self
    }

    /// Enables or disables promotion of validation failures to errors.
    pub fn errors(mut self, enabled: bool) -> Self {
        self.base.errors = enabled;
        self
    }

    /// Sets the upstream proxy.
    pub fn upstream_proxy(mut self, proxy: Url) -> Self {
        self.base.upstream_proxy = Some(proxy);
        self
    }

    /// Returns `true` in mock mode.
    pub fn is_mock(&self) -> bool {
        matches!(self.mode, Mode::Mock(_))
    }
}

impl<M: Default> Default for Config<M> {
    /// Mock mode with default mock options, every validation enabled, no promotion.
    fn default() -> Self {
        Self::mock(M::default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MockField<M> {
    Disabled(bool),
    Enabled(M),
}

#[derive(Deserialize)]
struct RawConfig<M> {
    mock: MockField<M>,
    #[serde(default)]
    upstream: Option<Url>,
    #[serde(flatten)]
    base: BaseOptions,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MockFieldRef<'a, M> {
    Disabled(bool),
    Enabled(&'a M),
}

#[derive(Serialize)]
struct RawConfigRef<'a, M> {
    mock: MockFieldRef<'a, M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream: Option<&'a Url>,
    #[serde(flatten)]
    base: &'a BaseOptions,
}

impl<'de, M: Deserialize<'de>> Deserialize<'de> for Config<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = RawConfig::<M>::deserialize(deserializer)?;
        let mode = match (raw.mock, raw.upstream) {
            (MockField::Enabled(options), None) => Mode::Mock(options),
            (MockField::Enabled(_), Some(_)) => {
                return Err(D::Error::custom("`upstream` is only valid when `mock` is false"));
            }
            (MockField::Disabled(false), Some(upstream)) => Mode::Proxy { upstream },
            (MockField::Disabled(false), None) => {
                return Err(D::Error::custom("`mock: false` requires an `upstream` URL"));
            }
            (MockField::Disabled(true), _) => {
                return Err(D::Error::custom("`mock` must be an options object or false"));
            }
        };

        Ok(Self {
            mode,
            base: raw.base,
        })
    }
}

impl<M: Serialize> Serialize for Config<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match &self.mode {
            Mode::Mock(options) => RawConfigRef {
                mock: MockFieldRef::Enabled(options),
                upstream: None,
                base: &self.base,
            },
            Mode::Proxy { upstream } => RawConfigRef {
                mock: MockFieldRef::Disabled(false),
                upstream: Some(upstream),
                base: &self.base,
            },
        };
        raw.serialize(serializer)
    }
}
