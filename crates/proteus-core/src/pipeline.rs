//! The request pipeline.
//!
//! Every invocation runs the same fixed sequence, stopping at the first
//! error:
//!
//! 1. **Route** - resolve the targeted resource
//! 2. **Input validation** - when `validate_request` is set
//! 3. **Security validation** - when `check_security` is set
//! 4. **Respond** - mock or forward, per the configured mode
//! 5. **Output validation** - when `validate_response` is set
//! 6. **Assemble** - build the [`Output`] envelope
//!
//! Validation failures are accumulated as diagnostics unless `errors` is set,
//! in which case a failure carrying at least one error-severity diagnostic
//! terminates the run. Errors raised by any stage are returned unchanged.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::components::{Components, Responder};
use crate::config::Config;
use crate::context::Context;
use crate::diagnostic::Diagnostics;
use crate::envelope::{Input, Output};
use crate::error::{PipelineError, PipelineResult, UNAUTHORIZED, UNPROCESSABLE_ENTITY, VIOLATIONS};

/// Which validator produced a set of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Input,
    Security,
    Output,
}

impl Stage {
    const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Security => "security",
            Self::Output => "output",
        }
    }

    fn promote(self, diagnostics: &Diagnostics) -> PipelineError {
        match self {
            Self::Input => PipelineError::validation(
                UNPROCESSABLE_ENTITY,
                format!("Your request is not valid: {diagnostics}"),
            )
            .with_validation(diagnostics),
            Self::Security => {
                let challenges: Vec<&str> = diagnostics
                    .iter()
                    .flat_map(|d| d.tags.iter().map(String::as_str))
                    .collect();
                let error = PipelineError::security(
                    UNAUTHORIZED,
                    "Your request does not fulfil the security requirements",
                )
                .with_validation(diagnostics);
                if challenges.is_empty() {
                    error
                } else {
                    error.with_additional(
                        "headers",
                        json!({ "www-authenticate": challenges.join(", ") }),
                    )
                }
            }
            Self::Output => PipelineError::validation(
                VIOLATIONS,
                format!("Response not valid: {diagnostics}"),
            )
            .with_validation(diagnostics),
        }
    }
}

/// The request pipeline over a set of [`Components`].
///
/// The pipeline holds no per-request state: it can be shared between tasks
/// and invoked concurrently.
///
/// # Example
///
/// ```ignore
/// use proteus_core::{Context, Pipeline};
///
/// let pipeline = Pipeline::new(components);
/// let output = pipeline.request(&Context::detached(), request, &resources, None).await?;
/// assert!(output.validations().input.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline<C> {
    components: C,
}

impl<C: Components> Pipeline<C> {
    /// Creates a pipeline.
    pub fn new(components: C) -> Self {
        Self { components }
    }

    /// Returns the components.
    pub fn components(&self) -> &C {
        &self.components
    }

    /// Processes one request.
    ///
    /// A missing `config` falls back to [`Config::default`].
    pub async fn request(
        &self,
        ctx: &Context,
        data: C::Input,
        resources: &[C::Resource],
        config: Option<&Config<C::MockOptions>>,
    ) -> PipelineResult<Output<C::Output>>
    where
        C::MockOptions: Default,
    {
        let fallback;
        let config = match config {
            Some(config) => config,
            None => {
                fallback = Config::default();
                &fallback
            }
        };

        let resource = self.components.route(resources, &data).map_err(|error| {
            debug!(parent: ctx.span(), code = error.code(), "routing failed");
            error
        })?;

        let mut input = Input::new(data);

        if config.base.validate_request {
            let outcome = self
                .components
                .validate_input(resource, input.data())
                .map(|_| ());
            if let Some(diagnostics) = settle(ctx, Stage::Input, outcome, config.base.errors)? {
                input.record(diagnostics);
            }
        }

        if config.base.check_security {
            let outcome = self
                .components
                .validate_security(resource, input.data())
                .map(|_| ());
            if let Some(diagnostics) = settle(ctx, Stage::Security, outcome, config.base.errors)? {
                input.record(diagnostics);
            }
        }

        let responder = Responder::select(config);
        debug!(parent: ctx.span(), strategy = responder.name(), "producing response");
        let output = responder
            .respond(&self.components, ctx, resource, &input)
            .await
            .map_err(|error| {
                warn!(
                    parent: ctx.span(),
                    code = error.code(),
                    status = error.status(),
                    "response strategy failed"
                );
                error
            })?;

        let mut output_validations = Vec::new();
        if config.base.validate_response {
            let outcome = self
                .components
                .validate_output(resource, &output)
                .map(|_| ());
            if let Some(diagnostics) = settle(ctx, Stage::Output, outcome, config.base.errors)? {
                output_validations.extend(diagnostics);
            }
        }

        let (_, input_validations) = input.into_parts();
        info!(
            parent: ctx.span(),
            input_diagnostics = input_validations.len(),
            output_diagnostics = output_validations.len(),
            "request processed"
        );
        Ok(Output::assemble(output, input_validations, output_validations))
    }
}

/// Accumulates or promotes the outcome of one validation stage.
///
/// Returns the diagnostics to record, if any.
fn settle(
    ctx: &Context,
    stage: Stage,
    outcome: Result<(), Diagnostics>,
    promote: bool,
) -> PipelineResult<Option<Diagnostics>> {
    let Err(diagnostics) = outcome else {
        return Ok(None);
    };

    if promote && diagnostics.has_errors() {
        warn!(
            parent: ctx.span(),
            stage = stage.name(),
            diagnostics = diagnostics.len(),
            "validation failed, promoting to error"
        );
        return Err(stage.promote(&diagnostics));
    }

    debug!(
        parent: ctx.span(),
        stage = stage.name(),
        diagnostics = diagnostics.len(),
        "validation diagnostics recorded"
    );
    Ok(Some(diagnostics))
}
