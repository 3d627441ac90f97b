//! # Proteus Router
//!
//! Resolves an [`HttpRequest`](proteus_contract::HttpRequest) to the
//! [`HttpOperation`](proteus_contract::HttpOperation) it targets.
//!
//! Resolution is pure. It fails with a `NO_ROUTE` pipeline error when the
//! resource set is empty (`NO_RESOURCE_PROVIDED_ERROR`), when no path matches
//! (`NO_PATH_MATCHED_ERROR`), when no declared server matches the request's
//! base URL (`NO_SERVER_MATCHED_ERROR`), or when the path matches but the
//! method does not (`NO_METHOD_MATCHED_ERROR`, with the allowed methods).
//!
//! ```
//! use http::Method;
//! use proteus_contract::{fixtures, HttpRequest};
//!
//! let operations = fixtures::pet_store();
//! let request = HttpRequest::new(Method::GET, "/pets/7");
//! let route = proteus_router::resolve(&operations, &request).unwrap();
//!
//! assert_eq!(route.operation.id(), "getPet");
//! assert_eq!(route.params["petId"], "7");
//! ```

#![doc(html_root_url = "https://docs.rs/proteus-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod router;
mod server;

pub use router::{resolve, route, specificity, Route};
