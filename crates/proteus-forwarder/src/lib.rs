//! # Proteus Forwarder
//!
//! Proxy-mode response strategy: forwards an HTTP request to a real upstream
//! and decodes its response into an [`HttpResponse`].
//!
//! - The upstream URL is `{upstream}{path}?{query}`.
//! - Hop-by-hop headers, `host` and `content-length` are not forwarded.
//! - String bodies are sent as-is, other bodies as JSON.
//! - An upstream proxy, when configured, carries every request.
//!
//! Failures are pipeline errors of kind `TRANSPORT`: `UPSTREAM_UNREACHABLE`,
//! `UPSTREAM_TIMEOUT`, `UPSTREAM_MALFORMED_RESPONSE` and `REQUEST_CANCELLED`.
//!
//! [`HttpResponse`]: proteus_contract::HttpResponse

#![doc(html_root_url = "https://docs.rs/proteus-forwarder/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod forwarder;
pub mod headers;

pub use error::{ForwarderError, ForwarderResult};
pub use forwarder::{Forwarder, ForwarderOptions};
