//! # Proteus Validator
//!
//! Checks HTTP elements against a contract operation. The three validators
//! share one shape: they return the element untouched when it conforms, or a
//! non-empty list of diagnostics describing why it does not. They never fail
//! in any other way, and they never decide whether a failure is fatal; that
//! is the pipeline's job.
//!
//! - [`validate_input`] - parameters, headers, cookies and body
//! - [`validate_security`] - credentials against the security alternatives
//! - [`validate_output`] - status, media type, headers and body of a response
//!
//! Schemas are JSON Schema (draft 2020-12), checked with `jsonschema`.
//!
//! ```
//! use http::Method;
//! use proteus_contract::{fixtures, HttpRequest};
//!
//! let operation = fixtures::pet_store_operation("getPet").unwrap();
//! let request = HttpRequest::new(Method::GET, "/pets/not-a-number");
//!
//! let diagnostics = proteus_validator::validate_input(&operation, &request).unwrap_err();
//! assert_eq!(diagnostics.first().path, vec!["path", "petId"]);
//! ```

#![doc(html_root_url = "https://docs.rs/proteus-validator/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod input;
mod output;
mod schema;
mod security;

pub use input::validate_input;
pub use output::validate_output;
pub use security::validate_security;
