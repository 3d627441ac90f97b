//! Error types for the forwarder.

use thiserror::Error;

/// Errors raised while setting up a [`Forwarder`](crate::Forwarder).
///
/// Failures of an individual forward are pipeline errors of kind
/// `TRANSPORT`, not `ForwarderError`s.
#[derive(Debug, Error)]
pub enum ForwarderError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The options are unusable.
    #[error("invalid forwarder options: {message}")]
    Options {
        /// Error message.
        message: String,
    },
}

/// Result type for forwarder setup.
pub type ForwarderResult<T> = Result<T, ForwarderError>;
