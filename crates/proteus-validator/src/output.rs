//! Response validation.

use proteus_contract::{is_json_media_type, HttpOperation, HttpResponse, HttpResponseContract};
use proteus_core::{Diagnostic, Diagnostics, Validated};
use serde_json::Value;
use tracing::debug;

use crate::input::media_type_accepts;
use crate::schema;

/// Validates a response against the operation's declared responses.
///
/// The status code must be declared (exactly, by range or as `default`).
/// Against the matching response the media type, the required headers and
/// the body schema are then checked.
pub fn validate_output<'e>(
    operation: &HttpOperation,
    response: &'e HttpResponse,
) -> Validated<'e, HttpResponse> {
    let mut found = Vec::new();

    match operation.find_response(response.status_code) {
        Some(contract) => {
            check_headers(&mut found, contract, response);
            check_body(&mut found, contract, response);
        }
        None => {
            let declared: Vec<&str> =
                operation.responses().iter().map(|r| r.code.as_str()).collect();
            found.push(
                Diagnostic::error(
                    "status",
                    format!(
                        "Unable to match the returned status code {} \
                         with those defined in the document: {}",
                        response.status_code,
                        declared.join(",")
                    ),
                )
                .at(["status"]),
            );
        }
    }

    debug!(
        operation_id = operation.id(),
        status = response.status_code,
        diagnostics = found.len(),
        "response validated"
    );
    Diagnostics::check(response, found)
}

fn check_headers(
    found: &mut Vec<Diagnostic>,
    contract: &HttpResponseContract,
    response: &HttpResponse,
) {
    for header in &contract.headers {
        match response.header(&header.name) {
            None if header.required => found.push(
                Diagnostic::error(
                    "required",
                    format!("must have required property '{}'", header.name),
                )
                    .at(["header", header.name.as_str()]),
            ),
            None => {}
            Some(value) => {
                if let Some(header_schema) = &header.schema {
                    let value = schema::coerce(&[value], Some(header_schema));
                    let location = ["header", header.name.as_str()];
                    found.extend(schema::check(header_schema, &value, &location));
                }
            }
        }
    }
}

fn check_body(
    found: &mut Vec<Diagnostic>,
    contract: &HttpResponseContract,
    response: &HttpResponse,
) {
    if contract.contents.is_empty() {
        return;
    }

    let Some(media_type) = response.media_type() else {
        if response.body.as_ref().is_some_and(|body| !body.is_null()) {
            found.push(
                Diagnostic::warning(
                    "content-type",
                    "The response carries a body but no content-type",
                )
                    .at(["header", "content-type"]),
            );
        }
        return;
    };

    let Some(content) = contract
        .contents
        .iter()
        .find(|content| media_type_accepts(&content.media_type, media_type))
    else {
        let declared: Vec<&str> = contract.contents.iter().map(|c| c.media_type.as_str()).collect();
        found.push(
            Diagnostic::error(
                "content-type",
                format!(
                    "The received media type \"{media_type}\" does not match the declared ones: {}",
                    declared.join(", ")
                ),
            )
            .at(["header", "content-type"]),
        );
        return;
    };

    if let (Some(body_schema), true) = (&content.schema, is_json_media_type(media_type)) {
        let body = response.body.as_ref().unwrap_or(&Value::Null);
        found.extend(schema::check(body_schema, body, &["body"]));
    }
}
