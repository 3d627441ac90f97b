//! # Proteus Mocker
//!
//! Produces HTTP responses from a contract operation alone.
//!
//! The mocker picks the response to produce from the request's validation
//! outcome, the configured [`HttpMockOptions`] and the client's `prefer`
//! header, negotiates the media type against `accept`, and fills the body
//! from a named example, the first example, or the schema.
//!
//! Payloads are either static ([`sample`]) or random but schema-conformant
//! ([`dynamic`]).
//!
//! ```
//! use http::Method;
//! use proteus_contract::{fixtures, HttpMockOptions, HttpRequest};
//! use proteus_core::{Context, Input};
//!
//! let operation = fixtures::pet_store_operation("getPet").unwrap();
//! let input = Input::new(HttpRequest::new(Method::GET, "/pets/1"));
//!
//! let ctx = Context::detached();
//! let response = proteus_mocker::mock(&ctx, &operation, &input, &HttpMockOptions::default())
//!     .unwrap();
//! assert_eq!(response.status_code, 200);
//! ```
//!
//! [`HttpMockOptions`]: proteus_contract::HttpMockOptions

#![doc(html_root_url = "https://docs.rs/proteus-mocker/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod generate;
mod mocker;
mod negotiate;
mod prefer;

pub use generate::{dynamic, sample};
pub use mocker::{mock, mock_with_rng};
pub use prefer::Preferences;
