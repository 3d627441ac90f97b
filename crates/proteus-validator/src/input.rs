//! Request validation.

use proteus_contract::{
    is_json_media_type, media_type_essence, HttpOperation, HttpParam, HttpRequest,
};
use proteus_core::{Diagnostic, Diagnostics, Validated};
use serde_json::Value;
use tracing::debug;

use crate::schema;

/// Validates a request against the operation's request contract.
///
/// Checks, in order: path parameters, query parameters, headers, cookies and
/// the body. Deprecated parameters that are present yield warnings.
pub fn validate_input<'e>(
    operation: &HttpOperation,
    request: &'e HttpRequest,
) -> Validated<'e, HttpRequest> {
    let contract = operation.request();
    let mut found = Vec::new();

    let path_params = operation
        .path()
        .matches(&request.url.path)
        .map(|matched| matched.params)
        .unwrap_or_default();
    for param in &contract.path {
        let value = path_params.get(&param.name).map(String::as_str);
        check_param(&mut found, "path", param, value.into_iter().collect());
    }

    for param in &contract.query {
        let values = request
            .url
            .query
            .get(&param.name)
            .map(|value| value.values())
            .unwrap_or_default();
        check_param(&mut found, "query", param, values);
    }

    for param in &contract.headers {
        check_param(&mut found, "header", param, request.header(&param.name).into_iter().collect());
    }

    let cookies = request.cookies();
    for param in &contract.cookie {
        let value = cookies.get(&param.name).map(String::as_str);
        check_param(&mut found, "cookie", param, value.into_iter().collect());
    }

    check_body(&mut found, operation, request);

    debug!(
        operation_id = operation.id(),
        diagnostics = found.len(),
        "request validated"
    );
    Diagnostics::check(request, found)
}

fn check_param(found: &mut Vec<Diagnostic>, location: &str, param: &HttpParam, values: Vec<&str>) {
    if values.is_empty() {
        if param.required {
            found.push(
                Diagnostic::error(
                    "required",
                    format!("must have required property '{}'", param.name),
                )
                    .at([location, param.name.as_str()]),
            );
        }
        return;
    }

    if param.deprecated {
        found.push(
            Diagnostic::warning(
                "deprecated",
                format!("{location} parameter '{}' is deprecated", param.name),
            )
                .at([location, param.name.as_str()]),
        );
    }

    if let Some(param_schema) = &param.schema {
        let value = schema::coerce(&values, Some(param_schema));
        found.extend(schema::check(param_schema, &value, &[location, param.name.as_str()]));
    }
}

fn check_body(found: &mut Vec<Diagnostic>, operation: &HttpOperation, request: &HttpRequest) {
    let Some(contract) = &operation.request().body else {
        return;
    };

    let body = match &request.body {
        None | Some(Value::Null) => {
            if contract.required {
                found.push(
                    Diagnostic::error("required", "Body parameter is required").at(["body"]),
                );
            }
            return;
        }
        Some(body) => body,
    };

    if contract.contents.is_empty() {
        return;
    }

    let media_type = request.header("content-type").map_or_else(
        || match body {
            Value::String(_) => "text/plain",
            _ => "application/json",
        },
        media_type_essence,
    );

    let Some(content) = contract
        .contents
        .iter()
        .find(|content| media_type_accepts(&content.media_type, media_type))
    else {
        let supported: Vec<&str> =
            contract.contents.iter().map(|c| c.media_type.as_str()).collect();
        found.push(
            Diagnostic::error(
                "415",
                format!(
                    "Supported content types: {}, got {media_type}",
                    supported.join(", ")
                ),
            )
            .at(["body"]),
        );
        return;
    };

    if let Some(body_schema) = &content.schema {
        if is_json_media_type(media_type) {
            found.extend(schema::check(body_schema, body, &["body"]));
        }
    }
}

/// Returns `true` when the declared media range admits `actual`.
pub(crate) fn media_type_accepts(declared: &str, actual: &str) -> bool {
    let declared = media_type_essence(declared);
    if declared == "*/*" || declared.eq_ignore_ascii_case(actual) {
        return true;
    }
    match declared.strip_suffix("/*") {
        Some(kind) => actual
            .split('/')
            .next()
            .is_some_and(|actual_kind| actual_kind.eq_ignore_ascii_case(kind)),
        None => false,
    }
}
