//! # Proteus
//!
//! **Contract-driven HTTP mocking and validating proxy engine**
//!
//! Proteus answers HTTP requests on behalf of an API described by a set of
//! operations:
//!
//! - **Mock mode** - synthesizes responses from the declared examples and
//!   schemas, statically or with random schema-conformant data
//! - **Proxy mode** - forwards requests to a real upstream
//!
//! Either way, requests and responses are validated against the contract,
//! and failures are reported as diagnostics or, with `errors` enabled, as
//! RFC 7807 problems.
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use proteus::{fixtures, HttpConfig, HttpEngine, HttpRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = HttpEngine::new().unwrap();
//! let config = HttpConfig::default().errors(true);
//!
//! let error = engine
//!     .request(HttpRequest::new(Method::POST, "/pets"), &fixtures::pet_store(), Some(&config))
//!     .await
//!     .unwrap_err();
//! assert_eq!(error.status(), 422);
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Route → Input validation → Security validation → Mock | Forward
//!                                                                    ↓
//!                        Output envelope ← Output validation ←───────┘
//! ```

#![doc(html_root_url = "https://docs.rs/proteus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod components;
mod engine;
pub mod logging;
pub mod settings;

// Re-export the pipeline core
pub use proteus_core as core;

// Re-export the HTTP data model
pub use proteus_contract as contract;

// Re-export the HTTP components
pub use proteus_forwarder as forwarder;
pub use proteus_mocker as mocker;
pub use proteus_router as router;
pub use proteus_validator as validator;

pub use components::HttpComponents;
pub use engine::HttpEngine;
pub use proteus_contract::{
    fixtures, HttpConfig, HttpMockOptions, HttpOperation, HttpRequest, HttpResponse,
};
pub use proteus_core::{
    Context, ErrorKind, Output, PipelineError, PipelineResult, ProblemDescription,
};
pub use settings::{Settings, SettingsError};
