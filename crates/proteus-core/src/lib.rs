//! # Proteus Core
//!
//! Protocol-agnostic request pipeline of the Proteus contract engine.
//!
//! This crate provides the vocabulary shared by every other crate:
//!
//! - [`Diagnostic`] / [`Diagnostics`] - validation findings; a failed step is
//!   always a non-empty list
//! - [`PipelineError`] / [`ProblemDescription`] - terminating errors and their
//!   RFC 7807 rendering
//! - [`Input`] / [`Output`] - envelopes carrying accumulated diagnostics
//! - [`Config`] - mock or proxy mode plus validation toggles
//! - [`Context`] - per-invocation logging span and cancellation signal
//! - [`Components`] / [`Pipeline`] - the pluggable stages and their orchestrator

#![doc(html_root_url = "https://docs.rs/proteus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod components;
mod config;
mod context;
mod diagnostic;
mod envelope;
mod error;
mod pipeline;

pub use components::{BoxFuture, Components, Responder, Validated};
pub use config::{BaseOptions, Config, Mode};
pub use context::{CancelHandle, Context};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use envelope::{Input, Output, OutputValidations};
pub use error::{
    ErrorKind, PipelineError, PipelineResult, ProblemDescription, ProblemTemplate, ERRORS_BASE_URL,
    UNAUTHORIZED, UNKNOWN, UNPROCESSABLE_ENTITY, VIOLATIONS,
};
pub use pipeline::Pipeline;
