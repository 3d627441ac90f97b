//! Operation resolution from HTTP requests.

use std::cmp::Ordering;

use indexmap::IndexMap;
use proteus_contract::problems::{
    NO_METHOD_MATCHED_ERROR, NO_PATH_MATCHED_ERROR, NO_RESOURCE_PROVIDED_ERROR,
    NO_SERVER_MATCHED_ERROR,
};
use proteus_contract::{HttpOperation, HttpRequest, PathTemplate, Segment};
use proteus_core::{PipelineError, PipelineResult};
use serde_json::Value;
use tracing::debug;

use crate::server;

/// A resolved operation and the path parameters extracted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<'r> {
    /// The matched operation.
    pub operation: &'r HttpOperation,
    /// Percent-decoded path parameters.
    pub params: IndexMap<String, String>,
}

/// Resolves the operation targeted by `request`.
///
/// Among the operations whose path matches, an exact (parameter-free) path
/// wins; otherwise the path with a literal segment at the first position
/// where the candidates differ wins. Equally specific candidates resolve to
/// the first declared.
pub fn resolve<'r>(
    resources: &'r [HttpOperation],
    request: &HttpRequest,
) -> PipelineResult<Route<'r>> {
    if resources.is_empty() {
        return Err(PipelineError::no_route(
            NO_RESOURCE_PROVIDED_ERROR,
            "The current document does not have any resources to match with",
        ));
    }

    let path = request.url.path.as_str();
    let matched: Vec<Route<'r>> = resources
        .iter()
        .filter_map(|operation| {
            operation.path().matches(path).map(|found| Route {
                operation,
                params: found.params,
            })
        })
        .collect();

    if matched.is_empty() {
        debug!(http.path = path, "no path matched");
        return Err(PipelineError::no_route(
            NO_PATH_MATCHED_ERROR,
            format!("The route {path} is not declared by any resource"),
        ));
    }

    let matched = match request.url.base_url.as_deref() {
        Some(base_url) => {
            let served: Vec<Route<'r>> = matched
                .into_iter()
                .filter(|route| {
                    route.operation.servers().is_empty()
                        || server::matches_any(route.operation.servers(), base_url)
                })
                .collect();
            if served.is_empty() {
                debug!(base_url, "no server matched");
                return Err(PipelineError::no_route(
                    NO_SERVER_MATCHED_ERROR,
                    format!(
                        "The server url {base_url} hasn't been matched \
                         with any of the provided servers"
                    ),
                ));
            }
            served
        }
        None => matched,
    };

    let mut allow: Vec<&str> = Vec::new();
    for route in &matched {
        let method = route.operation.method().as_str();
        if !allow.contains(&method) {
            allow.push(method);
        }
    }

    let best = matched
        .into_iter()
        .filter(|route| route.operation.method() == request.method)
        .min_by(|a, b| specificity(a.operation.path(), b.operation.path()));

    let Some(route) = best else {
        debug!(http.method = %request.method, http.path = path, ?allow, "no method matched");
        return Err(PipelineError::no_route(
            NO_METHOD_MATCHED_ERROR,
            format!(
                "The route {path} has been matched, but it does not have \"{}\" method defined",
                request.method
            ),
        )
        .with_additional(
            "allow",
            Value::Array(allow.into_iter().map(|m| Value::String(m.to_string())).collect()),
        ));
    };

    debug!(
        operation_id = route.operation.id(),
        http.method = %request.method,
        http.path = path,
        "route resolved"
    );
    Ok(route)
}

/// Resolves the operation targeted by `request`, discarding the parameters.
pub fn route<'r>(
    resources: &'r [HttpOperation],
    request: &HttpRequest,
) -> PipelineResult<&'r HttpOperation> {
    resolve(resources, request).map(|route| route.operation)
}

/// Orders templates of equal length by specificity, most specific first.
///
/// Literal segments sort before parameters at the first differing position,
/// so an exact template sorts before every parameterized one.
pub fn specificity(a: &PathTemplate, b: &PathTemplate) -> Ordering {
    let rank = |segment: &Segment| u8::from(!segment.is_literal());
    a.segments()
        .iter()
        .map(rank)
        .cmp(b.segments().iter().map(rank))
}
