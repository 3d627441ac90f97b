//! # Proteus Contract
//!
//! The HTTP data model of the Proteus pipeline: operations (the resources
//! requests are routed to), the request and response elements, security
//! schemes, path templates and the problem templates raised by the HTTP
//! components.
//!
//! Operations arrive already parsed and dereferenced. They deserialize from
//! JSON and can be assembled in code with [`HttpOperation::builder`].

#![doc(html_root_url = "https://docs.rs/proteus-contract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod message;
mod operation;
mod options;
mod path;
pub mod problems;
mod security;

pub use message::{
    is_json_media_type, media_type_essence, HttpRequest, HttpResponse, HttpUrl, QueryValue,
};
pub use operation::{
    Example, HttpBody, HttpOperation, HttpParam, HttpRequestContract, HttpResponseContract,
    MediaContent, OperationBuilder, Server,
};
pub use options::{HttpConfig, HttpMockOptions};
pub use path::{PathMatch, PathTemplate, Segment};
pub use security::{ApiKeyLocation, HttpAuthScheme, SecurityScheme};

/// Serializes [`http::Method`] as a string, accepting any case on input.
pub(crate) mod method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&method.as_str().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.to_ascii_uppercase().parse().map_err(serde::de::Error::custom)
    }
}
