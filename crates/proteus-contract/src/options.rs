//! Mock options and the HTTP pipeline configuration.

use proteus_core::Config;
use serde::{Deserialize, Serialize};

/// Options of the HTTP mock generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpMockOptions {
    /// Response code to produce instead of the negotiated one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Named example to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_key: Option<String>,
    /// Generate random schema-conformant payloads.
    pub dynamic: bool,
    /// Acceptable media types, overriding the `accept` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<String>>,
}

impl HttpMockOptions {
    /// Requests a specific response code.
    #[must_use]
    pub fn code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    /// Requests a named example.
    #[must_use]
    pub fn example_key(mut self, key: impl Into<String>) -> Self {
        self.example_key = Some(key.into());
        self
    }

    /// Enables dynamic payload generation.
    #[must_use]
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Restricts the acceptable media types.
    #[must_use]
    pub fn media_types<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_types = Some(media_types.into_iter().map(Into::into).collect());
        self
    }
}

/// Pipeline configuration for HTTP.
pub type HttpConfig = Config<HttpMockOptions>;
