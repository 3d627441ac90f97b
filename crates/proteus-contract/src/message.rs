//! HTTP request and response elements flowing through the pipeline.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query parameter value: repeated keys collapse into a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// A single occurrence.
    One(String),
    /// Repeated occurrences, in order.
    Many(Vec<String>),
}

impl QueryValue {
    /// Returns every value, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// The URL of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpUrl {
    /// Scheme and authority the request was sent to, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request path, without query string.
    pub path: String,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, QueryValue>,
}

impl HttpUrl {
    /// Returns the query as flat `(key, value)` pairs.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .flat_map(|(key, value)| value.values().into_iter().map(move |v| (key.as_str(), v)))
            .collect()
    }
}

/// An incoming HTTP request.
///
/// # Example
///
/// ```
/// use proteus_contract::HttpRequest;
/// use http::Method;
///
/// let request = HttpRequest::new(Method::GET, "/pets/1")
///     .with_header("Accept", "application/json")
///     .with_query("tag", "cat");
///
/// assert_eq!(request.header("accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method.
    #[serde(with = "crate::method_serde")]
    pub method: Method,
    /// Target URL.
    pub url: HttpUrl,
    /// Headers as received.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Decoded body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a request without headers, query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            url: HttpUrl {
                base_url: None,
                path: path.into(),
                query: IndexMap::new(),
            },
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.url.base_url = Some(base_url.into());
        self
    }

    /// Adds a query value. Repeating a key collects the values into a list.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        match self.url.query.get_mut(&key) {
            None => {
                self.url.query.insert(key, QueryValue::One(value));
            }
            Some(slot) => {
                let mut values = match std::mem::replace(slot, QueryValue::Many(Vec::new())) {
                    QueryValue::One(first) => vec![first],
                    QueryValue::Many(values) => values,
                };
                values.push(value);
                *slot = QueryValue::Many(values);
            }
        }
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Parses the `cookie` header into name/value pairs.
    pub fn cookies(&self) -> IndexMap<String, String> {
        self.header("cookie")
            .map(|raw| {
                raw.split(';')
                    .filter_map(|pair| {
                        let (name, value) = pair.split_once('=')?;
                        Some((name.trim().to_string(), value.trim().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// An HTTP response, mocked or forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Status code.
    pub status_code: u16,
    /// Headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Decoded body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Creates a response without headers or body.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns the media type of the `content-type` header, without parameters.
    pub fn media_type(&self) -> Option<&str> {
        self.header("content-type").map(media_type_essence)
    }
}

fn find_header<'h>(headers: &'h IndexMap<String, String>, name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Strips parameters and whitespace from a media type.
pub fn media_type_essence(value: &str) -> &str {
    value.split(';').next().unwrap_or(value).trim()
}

/// Returns `true` for `application/json` and `+json` media types.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type_essence(media_type).to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
