//! Problem templates raised by the HTTP components.
//!
//! The pipeline's own templates (`UNPROCESSABLE_ENTITY`, `UNAUTHORIZED`,
//! `VIOLATIONS`, `UNKNOWN`) live in `proteus-core` and are re-exported here.

use proteus_core::ProblemTemplate;

pub use proteus_core::{UNAUTHORIZED, UNKNOWN, UNPROCESSABLE_ENTITY, VIOLATIONS};

// Routing

/// The resource set was empty.
pub const NO_RESOURCE_PROVIDED_ERROR: ProblemTemplate = ProblemTemplate {
    code: "NO_RESOURCE_PROVIDED_ERROR",
    title: "Route not resolved, no resource provided",
    status: 404,
};

/// No resource path matched the request path.
pub const NO_PATH_MATCHED_ERROR: ProblemTemplate = ProblemTemplate {
    code: "NO_PATH_MATCHED_ERROR",
    title: "Route not resolved, no path matched",
    status: 404,
};

/// A path matched, but not with the request method.
pub const NO_METHOD_MATCHED_ERROR: ProblemTemplate = ProblemTemplate {
    code: "NO_METHOD_MATCHED_ERROR",
    title: "Route resolved, but no method matched",
    status: 405,
};

/// None of the declared servers matched the request base URL.
pub const NO_SERVER_MATCHED_ERROR: ProblemTemplate = ProblemTemplate {
    code: "NO_SERVER_MATCHED_ERROR",
    title: "Route not resolved, no server matched",
    status: 404,
};

// Mocking

/// The requested response code or example is not declared.
pub const NOT_FOUND: ProblemTemplate = ProblemTemplate {
    code: "NOT_FOUND",
    title: "The server cannot find the requested content",
    status: 404,
};

/// No declared media type is acceptable to the client.
pub const NOT_ACCEPTABLE: ProblemTemplate = ProblemTemplate {
    code: "NOT_ACCEPTABLE",
    title: "The server cannot produce a representation for your accept header",
    status: 406,
};

/// The operation declares neither a success nor a default response.
pub const NO_SUCCESS_RESPONSE_DEFINED: ProblemTemplate = ProblemTemplate {
    code: "NO_SUCCESS_RESPONSE_DEFINED",
    title: "No success response defined",
    status: 500,
};

// Forwarding

/// The upstream could not be reached.
pub const UPSTREAM_UNREACHABLE: ProblemTemplate = ProblemTemplate {
    code: "UPSTREAM_UNREACHABLE",
    title: "Upstream server unreachable",
    status: 502,
};

/// The upstream did not answer in time.
pub const UPSTREAM_TIMEOUT: ProblemTemplate = ProblemTemplate {
    code: "UPSTREAM_TIMEOUT",
    title: "Upstream server timed out",
    status: 504,
};

/// The upstream answered with a body that could not be decoded.
pub const UPSTREAM_MALFORMED_RESPONSE: ProblemTemplate = ProblemTemplate {
    code: "UPSTREAM_MALFORMED_RESPONSE",
    title: "Upstream server sent a malformed response",
    status: 502,
};

/// The invocation was cancelled while waiting for the upstream.
pub const REQUEST_CANCELLED: ProblemTemplate = ProblemTemplate {
    code: "REQUEST_CANCELLED",
    title: "Request cancelled",
    status: 503,
};
