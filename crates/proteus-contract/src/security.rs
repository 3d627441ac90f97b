//! Security schemes.

use serde::{Deserialize, Serialize};

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// A request header.
    Header,
    /// A query parameter.
    Query,
    /// A cookie.
    Cookie,
}

/// The `scheme` of an HTTP authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthScheme {
    /// `Authorization: Basic <base64(user:password)>`.
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// `Authorization: Digest ...`.
    Digest,
}

/// A security scheme a request may satisfy.
///
/// Operations declare their security as a list of alternatives, each a list
/// of schemes that must all be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SecurityScheme {
    /// An API key in a header, query parameter or cookie.
    ApiKey {
        /// Name of the header, parameter or cookie.
        name: String,
        /// Where the key is carried.
        #[serde(rename = "in")]
        location: ApiKeyLocation,
    },
    /// HTTP authentication.
    Http {
        /// The authentication scheme.
        scheme: HttpAuthScheme,
    },
    /// OAuth2, presented as a bearer token.
    #[serde(rename = "oauth2")]
    OAuth2,
    /// OpenID Connect, presented as a bearer token.
    OpenIdConnect,
}

impl SecurityScheme {
    /// An API key header.
    pub fn api_key_header(name: impl Into<String>) -> Self {
        Self::ApiKey {
            name: name.into(),
            location: ApiKeyLocation::Header,
        }
    }

    /// HTTP basic authentication.
    pub fn basic() -> Self {
        Self::Http {
            scheme: HttpAuthScheme::Basic,
        }
    }

    /// HTTP bearer authentication.
    pub fn bearer() -> Self {
        Self::Http {
            scheme: HttpAuthScheme::Bearer,
        }
    }

    /// The `WWW-Authenticate` challenge advertised when this scheme is not
    /// satisfied.
    pub fn challenge(&self) -> String {
        match self {
            Self::ApiKey { name, location } => {
                let location = match location {
                    ApiKeyLocation::Header => "header",
                    ApiKeyLocation::Query => "query",
                    ApiKeyLocation::Cookie => "cookie",
                };
                format!("ApiKey in=\"{location}\", name=\"{name}\"")
            }
            Self::Http {
                scheme: HttpAuthScheme::Basic,
            } => "Basic realm=\"*\"".to_string(),
            Self::Http {
                scheme: HttpAuthScheme::Digest,
            } => "Digest realm=\"*\", nonce=\"proteus\"".to_string(),
            Self::Http {
                scheme: HttpAuthScheme::Bearer,
            }
            | Self::OAuth2
            | Self::OpenIdConnect => "Bearer".to_string(),
        }
    }
}
