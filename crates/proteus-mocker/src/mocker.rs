//! The mock response strategy.

use proteus_contract::problems::NOT_FOUND;
use proteus_contract::{
    HttpMockOptions, HttpOperation, HttpParam, HttpRequest, HttpResponse, MediaContent,
};
use proteus_core::{Context, Input, PipelineError, PipelineResult};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use crate::generate;
use crate::negotiate::{challenges, select_content, select_response, Selected};
use crate::prefer::Preferences;

/// Synthesizes a response for `input` from `operation`.
///
/// The `prefer` header of the request overrides `options` for this call.
/// Randomness is only drawn when dynamic generation is enabled.
pub fn mock(
    ctx: &Context,
    operation: &HttpOperation,
    input: &Input<HttpRequest>,
    options: &HttpMockOptions,
) -> PipelineResult<HttpResponse> {
    mock_with_rng(ctx, operation, input, options, &mut rand::thread_rng())
}

/// Like [`mock`], drawing dynamic values from `rng`.
pub fn mock_with_rng<R: Rng>(
    ctx: &Context,
    operation: &HttpOperation,
    input: &Input<HttpRequest>,
    options: &HttpMockOptions,
    rng: &mut R,
) -> PipelineResult<HttpResponse> {
    let request = input.data();
    let options = Preferences::from_request(request).apply(options);

    let selected = select_response(operation, input.validations(), options.code)?;
    let (status, contract) = match selected {
        Selected::Declared { status, contract } => (status, contract),
        Selected::Synthesized(response) => {
            info!(
                parent: ctx.span(),
                operation_id = operation.id(),
                status = response.status_code,
                "undeclared rejection response produced"
            );
            return Ok(mark_deprecated(operation, response));
        }
    };
    let content = select_content(
        contract,
        options.media_types.as_deref(),
        request.header("accept"),
    )?;

    let mut response = HttpResponse::new(status);
    for header in &contract.headers {
        response
            .headers
            .insert(header.name.clone(), header_value(header, options.dynamic, rng));
    }

    if let Some(content) = content {
        response
            .headers
            .insert("content-type".to_string(), content.media_type.clone());
        response.body = payload(content, &options, rng)?;
    }

    if status == 401 {
        let challenges = challenges(input.validations());
        if !challenges.is_empty() {
            response.headers.insert("www-authenticate".to_string(), challenges);
        }
    }

    debug!(
        parent: ctx.span(),
        operation_id = operation.id(),
        media_type = content.map(|c| c.media_type.as_str()),
        dynamic = options.dynamic,
        "mock payload generated"
    );
    info!(
        parent: ctx.span(),
        operation_id = operation.id(),
        status = response.status_code,
        "mock response produced"
    );
    Ok(mark_deprecated(operation, response))
}

fn mark_deprecated(operation: &HttpOperation, mut response: HttpResponse) -> HttpResponse {
    if operation.deprecated() {
        response.headers.insert("deprecation".to_string(), "true".to_string());
    }
    response
}

fn payload<R: Rng>(
    content: &MediaContent,
    options: &HttpMockOptions,
    rng: &mut R,
) -> PipelineResult<Option<Value>> {
    if let Some(key) = &options.example_key {
        return content
            .find_example(key)
            .map(|example| Some(example.value.clone()))
            .ok_or_else(|| {
                PipelineError::mock_generation(
                    NOT_FOUND,
                    format!(
                        "Response for contentType: {} and exampleKey: {key} does not exist",
                        content.media_type
                    ),
                )
            });
    }

    let body = match (&content.schema, options.dynamic) {
        (Some(schema), true) => Some(generate::dynamic(schema, rng)),
        _ => content
            .examples
            .first()
            .map(|example| example.value.clone())
            .or_else(|| content.schema.as_ref().map(generate::sample)),
    };
    Ok(body)
}

fn header_value<R: Rng>(header: &HttpParam, dynamic: bool, rng: &mut R) -> String {
    let value = match (&header.schema, dynamic) {
        (Some(schema), true) => generate::dynamic(schema, rng),
        (Some(schema), false) => generate::sample(schema),
        (None, _) => Value::String(String::new()),
    };
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
