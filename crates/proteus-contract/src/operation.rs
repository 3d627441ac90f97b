//! HTTP operations, the resources the pipeline routes to.
//!
//! # Example
//!
//! ```
//! use proteus_contract::{HttpOperation, HttpParam, HttpResponseContract, MediaContent};
//! use http::Method;
//! use serde_json::json;
//!
//! let operation = HttpOperation::builder("getPet")
//!     .method(Method::GET)
//!     .path("/pets/{petId}")
//!     .path_param(HttpParam::new("petId").schema(json!({"type": "integer"})))
//!     .response(
//!         HttpResponseContract::new("200").content(
//!             MediaContent::new("application/json")
//!                 .example("cat", json!({"id": 1, "name": "Tom"})),
//!         ),
//!     )
//!     .build();
//!
//! assert_eq!(operation.path().as_str(), "/pets/{petId}");
//! assert!(operation.find_response(200).is_some());
//! ```

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::PathTemplate;
use crate::security::SecurityScheme;

/// A declared parameter or header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpParam {
    /// Parameter name. Header names compare case-insensitively.
    pub name: String,
    /// Must be present.
    #[serde(default)]
    pub required: bool,
    /// Still accepted, but discouraged.
    #[serde(default)]
    pub deprecated: bool,
    /// JSON Schema of the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl HttpParam {
    /// Creates an optional parameter without schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            deprecated: false,
            schema: None,
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the parameter as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Sets the value schema.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A named example payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Example name.
    pub key: String,
    /// Example payload.
    pub value: Value,
}

/// The content of one media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    /// Media type, e.g. `application/json`.
    pub media_type: String,
    /// JSON Schema of the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Named examples, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

impl MediaContent {
    /// Creates a content entry without schema or examples.
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            schema: None,
            examples: Vec::new(),
        }
    }

    /// Sets the payload schema.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Adds a named example.
    #[must_use]
    pub fn example(mut self, key: impl Into<String>, value: Value) -> Self {
        self.examples.push(Example {
            key: key.into(),
            value,
        });
        self
    }

    /// Looks up an example by name.
    pub fn find_example(&self, key: &str) -> Option<&Example> {
        self.examples.iter().find(|example| example.key == key)
    }
}

/// A request body contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpBody {
    /// A body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Accepted media types.
    #[serde(default)]
    pub contents: Vec<MediaContent>,
}

/// The request side of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequestContract {
    /// Path parameters.
    pub path: Vec<HttpParam>,
    /// Query parameters.
    pub query: Vec<HttpParam>,
    /// Headers.
    pub headers: Vec<HttpParam>,
    /// Cookies.
    pub cookie: Vec<HttpParam>,
    /// Body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<HttpBody>,
}

/// One declared response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponseContract {
    /// `"200"`, `"2XX"` or `"default"`.
    pub code: String,
    /// Response headers.
    #[serde(default)]
    pub headers: Vec<HttpParam>,
    /// Media contents. Empty for responses without a body.
    #[serde(default)]
    pub contents: Vec<MediaContent>,
}

impl HttpResponseContract {
    /// Creates a response without headers or contents.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            headers: Vec::new(),
            contents: Vec::new(),
        }
    }

    /// Adds a response header.
    #[must_use]
    pub fn header(mut self, header: HttpParam) -> Self {
        self.headers.push(header);
        self
    }

    /// Adds a media content.
    #[must_use]
    pub fn content(mut self, content: MediaContent) -> Self {
        self.contents.push(content);
        self
    }

    /// Returns the exact status code, if the code is not a range or `default`.
    pub fn exact_status(&self) -> Option<u16> {
        self.code.parse().ok()
    }

    /// Returns `true` when the code is a range such as `4XX` or `4xx`.
    pub fn is_range(&self) -> bool {
        let bytes = self.code.as_bytes();
        bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1..].eq_ignore_ascii_case(b"XX")
    }

    /// Returns `true` for the `default` response.
    pub fn is_default(&self) -> bool {
        self.code.eq_ignore_ascii_case("default")
    }

    /// Returns `true` when the range code covers `status`.
    pub fn covers(&self, status: u16) -> bool {
        self.is_range() && self.code[..1] == (status / 100).to_string()
    }

    /// Looks up a media content by exact media type.
    pub fn find_content(&self, media_type: &str) -> Option<&MediaContent> {
        self.contents
            .iter()
            .find(|content| content.media_type.eq_ignore_ascii_case(media_type))
    }
}

/// A server an operation is reachable on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// URL, possibly with `{variable}` placeholders.
    pub url: String,
}

/// An HTTP operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpOperation {
    id: String,
    #[serde(with = "crate::method_serde")]
    method: Method,
    path: PathTemplate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    servers: Vec<Server>,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    request: HttpRequestContract,
    #[serde(default)]
    responses: Vec<HttpResponseContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    security: Vec<Vec<SecurityScheme>>,
}

impl HttpOperation {
    /// Creates an operation builder.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(id)
    }

    /// Returns the operation ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// Returns the declared servers.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Returns whether the operation is deprecated.
    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    /// Returns the request contract.
    pub fn request(&self) -> &HttpRequestContract {
        &self.request
    }

    /// Returns the declared responses.
    pub fn responses(&self) -> &[HttpResponseContract] {
        &self.responses
    }

    /// Returns the security alternatives.
    pub fn security(&self) -> &[Vec<SecurityScheme>] {
        &self.security
    }

    /// Returns the response declared under exactly this code.
    pub fn response(&self, code: &str) -> Option<&HttpResponseContract> {
        self.responses
            .iter()
            .find(|response| response.code.eq_ignore_ascii_case(code))
    }

    /// Returns the response describing `status`: an exact code first, then
    /// a matching range, then `default`.
    pub fn find_response(&self, status: u16) -> Option<&HttpResponseContract> {
        self.responses
            .iter()
            .find(|response| response.exact_status() == Some(status))
            .or_else(|| self.responses.iter().find(|response| response.covers(status)))
            .or_else(|| self.responses.iter().find(|response| response.is_default()))
    }

    /// Returns the lowest declared success response, falling back to a `2XX`
    /// range and then `default`.
    pub fn success_response(&self) -> Option<&HttpResponseContract> {
        self.responses
            .iter()
            .filter(|response| response.exact_status().is_some_and(|s| (200..300).contains(&s)))
            .min_by_key(|response| response.exact_status())
            .or_else(|| self.responses.iter().find(|response| response.covers(200)))
            .or_else(|| self.responses.iter().find(|response| response.is_default()))
    }
}

/// Builder for [`HttpOperation`].
#[derive(Debug)]
pub struct OperationBuilder {
    operation: HttpOperation,
}

impl OperationBuilder {
    /// Creates a builder for a `GET /` operation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            operation: HttpOperation {
                id: id.into(),
                method: Method::GET,
                path: PathTemplate::parse("/"),
                servers: Vec::new(),
                deprecated: false,
                request: HttpRequestContract::default(),
                responses: Vec::new(),
                security: Vec::new(),
            },
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.operation.method = method;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.operation.path = PathTemplate::parse(path);
        self
    }

    /// Adds a server URL.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.operation.servers.push(Server { url: url.into() });
        self
    }

    /// Marks the operation as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.operation.deprecated = true;
        self
    }

    /// Declares a path parameter.
    #[must_use]
    pub fn path_param(mut self, param: HttpParam) -> Self {
        self.operation.request.path.push(param);
        self
    }

    /// Declares a query parameter.
    #[must_use]
    pub fn query_param(mut self, param: HttpParam) -> Self {
        self.operation.request.query.push(param);
        self
    }

    /// Declares a request header.
    #[must_use]
    pub fn header(mut self, param: HttpParam) -> Self {
        self.operation.request.headers.push(param);
        self
    }

    /// Declares a cookie.
    #[must_use]
    pub fn cookie(mut self, param: HttpParam) -> Self {
        self.operation.request.cookie.push(param);
        self
    }

    /// Declares the request body.
    #[must_use]
    pub fn body(
        mut self,
        required: bool,
        contents: impl IntoIterator<Item = MediaContent>,
    ) -> Self {
        self.operation.request.body = Some(HttpBody {
            required,
            contents: contents.into_iter().collect(),
        });
        self
    }

    /// Declares a response.
    #[must_use]
    pub fn response(mut self, response: HttpResponseContract) -> Self {
        self.operation.responses.push(response);
        self
    }

    /// Adds a security alternative: every scheme in `schemes` must be met.
    #[must_use]
    pub fn security(mut self, schemes: impl IntoIterator<Item = SecurityScheme>) -> Self {
        self.operation.security.push(schemes.into_iter().collect());
        self
    }

    /// Builds the operation.
    #[must_use]
    pub fn build(self) -> HttpOperation {
        self.operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses(codes: &[&str]) -> HttpOperation {
        codes
            .iter()
            .fold(HttpOperation::builder("op"), |builder, code| {
                builder.response(HttpResponseContract::new(*code))
            })
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let operation = HttpOperation::builder("root").build();
        assert_eq!(operation.method(), &Method::GET);
        assert_eq!(operation.path().as_str(), "/");
        assert!(!operation.deprecated());
        assert!(operation.security().is_empty());
    }

    #[test]
    fn test_find_response_precedence() {
        let operation = responses(&["default", "4XX", "404"]);
        assert_eq!(operation.find_response(404).unwrap().code, "404");
        assert_eq!(operation.find_response(400).unwrap().code, "4XX");
        assert_eq!(operation.find_response(500).unwrap().code, "default");
        assert!(responses(&["200"]).find_response(500).is_none());
    }

    #[test]
    fn test_success_response_prefers_lowest_exact() {
        assert_eq!(responses(&["default", "204", "201"]).success_response().unwrap().code, "201");
        assert_eq!(responses(&["default", "2xx"]).success_response().unwrap().code, "2xx");
        assert_eq!(responses(&["404", "default"]).success_response().unwrap().code, "default");
        assert!(responses(&["404"]).success_response().is_none());
    }

    #[test]
    fn test_deserialize_operation() {
        let operation: HttpOperation = serde_json::from_value(json!({
            "id": "createPet",
            "method": "post",
            "path": "/pets",
            "request": {
                "body": {
                    "required": true,
                    "contents": [{"mediaType": "application/json", "schema": {"type": "object"}}]
                }
            },
            "responses": [{"code": "201"}],
            "security": [[{"type": "http", "scheme": "bearer"}]]
        }))
        .unwrap();

        assert_eq!(operation.method(), &Method::POST);
        assert!(operation.request().body.as_ref().unwrap().required);
        assert_eq!(operation.security()[0][0], SecurityScheme::bearer());
    }

    #[test]
    fn test_find_example() {
        let content = MediaContent::new("application/json")
            .example("cat", json!({"name": "Tom"}))
            .example("dog", json!({"name": "Rex"}));
        assert_eq!(content.find_example("dog").unwrap().value["name"], "Rex");
        assert!(content.find_example("bird").is_none());
    }
}
