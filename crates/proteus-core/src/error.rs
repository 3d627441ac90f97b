//! Pipeline error types.
//!
//! Every terminating failure of the pipeline is a [`PipelineError`]. An error
//! carries an [`ErrorKind`] that callers branch on, and the fields of the
//! problem description it is rendered to at the system boundary.
//!
//! # Problem descriptions
//!
//! | `ErrorKind` | Typical codes | Status |
//! |---|---|---|
//! | `NoRoute` | `NO_PATH_MATCHED_ERROR`, `NO_METHOD_MATCHED_ERROR` | 404, 405 |
//! | `Validation` | `UNPROCESSABLE_ENTITY`, `VIOLATIONS` | 422, 500 |
//! | `Security` | `UNAUTHORIZED` | 401 |
//! | `Transport` | `UPSTREAM_UNREACHABLE`, `UPSTREAM_TIMEOUT` | 502, 504 |
//! | `MockGeneration` | `NOT_FOUND`, `NOT_ACCEPTABLE` | 404, 406 |
//! | `Unknown` | `UNKNOWN` | 500 |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::diagnostic::Diagnostics;

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Base URL of problem type identifiers.
pub const ERRORS_BASE_URL: &str = "https://proteus.dev/errors";

/// Kinds of pipeline-terminating errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No resource matches the input.
    NoRoute,
    /// Request or response validation failed under promotion.
    Validation,
    /// Security validation failed under promotion.
    Security,
    /// The upstream could not be reached or answered with garbage.
    Transport,
    /// No example or schema satisfies the requested mock parameters.
    MockGeneration,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Returns the stable identifier of this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoRoute => "NO_ROUTE",
            Self::Validation => "VALIDATION",
            Self::Security => "SECURITY",
            Self::Transport => "TRANSPORT",
            Self::MockGeneration => "MOCK_GENERATION",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable problem description without the per-occurrence detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemTemplate {
    /// Stable type code, appended to [`ERRORS_BASE_URL`].
    pub code: &'static str,
    /// Short human-readable summary.
    pub title: &'static str,
    /// HTTP status.
    pub status: u16,
}

/// The request failed input validation.
pub const UNPROCESSABLE_ENTITY: ProblemTemplate = ProblemTemplate {
    code: "UNPROCESSABLE_ENTITY",
    title: "Invalid request",
    status: 422,
};

/// The request failed security validation.
pub const UNAUTHORIZED: ProblemTemplate = ProblemTemplate {
    code: "UNAUTHORIZED",
    title: "Invalid security scheme used",
    status: 401,
};

/// The produced response violates its contract.
pub const VIOLATIONS: ProblemTemplate = ProblemTemplate {
    code: "VIOLATIONS",
    title: "Request/Response not valid",
    status: 500,
};

/// Fallback for errors without a recognised kind.
pub const UNKNOWN: ProblemTemplate = ProblemTemplate {
    code: "UNKNOWN",
    title: "Unexpected error",
    status: 500,
};

const RESERVED_FIELDS: [&str; 4] = ["type", "title", "status", "detail"];

/// A pipeline-terminating error.
///
/// # Example
///
/// ```
/// use proteus_core::{ErrorKind, PipelineError, UNPROCESSABLE_ENTITY};
///
/// let error = PipelineError::from_template(
///     ErrorKind::Validation,
///     UNPROCESSABLE_ENTITY,
///     "query.limit must be an integer",
/// );
///
/// let problem = error.to_problem();
/// assert_eq!(problem.problem_type, "https://proteus.dev/errors#UNPROCESSABLE_ENTITY");
/// assert_eq!(problem.status, 422);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{title}")]
pub struct PipelineError {
    kind: ErrorKind,
    code: String,
    title: String,
    status: u16,
    detail: String,
    additional: Map<String, Value>,
}

impl PipelineError {
    /// Creates an error with explicit fields.
    pub fn new(
        kind: ErrorKind,
        code: impl Into<String>,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            title: title.into(),
            status,
            detail: detail.into(),
            additional: Map::new(),
        }
    }

    /// Creates an error from a template and a per-occurrence detail.
    pub fn from_template(
        kind: ErrorKind,
        template: ProblemTemplate,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(kind, template.code, template.title, template.status, detail)
    }

    /// Creates a routing error.
    pub fn no_route(template: ProblemTemplate, detail: impl Into<String>) -> Self {
        Self::from_template(ErrorKind::NoRoute, template, detail)
    }

    /// Creates a validation error.
    pub fn validation(template: ProblemTemplate, detail: impl Into<String>) -> Self {
        Self::from_template(ErrorKind::Validation, template, detail)
    }

    /// Creates a security error.
    pub fn security(template: ProblemTemplate, detail: impl Into<String>) -> Self {
        Self::from_template(ErrorKind::Security, template, detail)
    }

    /// Creates a transport error.
    pub fn transport(template: ProblemTemplate, detail: impl Into<String>) -> Self {
        Self::from_template(ErrorKind::Transport, template, detail)
    }

    /// Creates a mock generation error.
    pub fn mock_generation(template: ProblemTemplate, detail: impl Into<String>) -> Self {
        Self::from_template(ErrorKind::MockGeneration, template, detail)
    }

    /// Creates an error of unknown kind from a message.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, UNKNOWN.code, message, UNKNOWN.status, "")
    }

    /// Attaches an additional problem field.
    ///
    /// Keys that collide with the standard problem fields are ignored.
    pub fn with_additional(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !RESERVED_FIELDS.contains(&key.as_str()) {
            self.additional.insert(key, value);
        }
        self
    }

    /// Attaches diagnostics under the `validation` field.
    pub fn with_validation(self, diagnostics: &Diagnostics) -> Self {
        let value = serde_json::to_value(diagnostics).unwrap_or(Value::Null);
        self.with_additional("validation", value)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the stable type code (e.g. `NO_PATH_MATCHED_ERROR`).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the per-occurrence detail.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the additional problem fields.
    pub fn additional(&self) -> &Map<String, Value> {
        &self.additional
    }

    /// Returns the full problem type URI.
    pub fn problem_type(&self) -> String {
        format!("{ERRORS_BASE_URL}#{}", self.code)
    }

    /// Renders this error as a problem description.
    pub fn to_problem(&self) -> ProblemDescription {
        ProblemDescription::from(self)
    }
}

/// RFC 7807 problem description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescription {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short summary.
    pub title: String,
    /// HTTP status.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(default)]
    pub detail: String,
    /// Extension members.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl ProblemDescription {
    /// Maps any error to a problem description.
    ///
    /// Pipeline errors keep their type, status and extension members. Any
    /// other error becomes an `UNKNOWN` problem with status 500, titled with
    /// the error's message.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        match error.downcast_ref::<PipelineError>() {
            Some(pipeline_error) => Self::from(pipeline_error),
            None => Self {
                problem_type: format!("{ERRORS_BASE_URL}#{}", UNKNOWN.code),
                title: error.to_string(),
                status: UNKNOWN.status,
                detail: String::new(),
                additional: Map::new(),
            },
        }
    }

    /// Serializes this problem to a JSON value.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<&PipelineError> for ProblemDescription {
    fn from(error: &PipelineError) -> Self {
        Self {
            problem_type: error.problem_type(),
            title: error.title.clone(),
            status: error.status,
            detail: error.detail.clone(),
            additional: error.additional.clone(),
        }
    }
}

impl From<PipelineError> for ProblemDescription {
    fn from(error: PipelineError) -> Self {
        Self::from(&error)
    }
}
