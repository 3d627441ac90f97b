//! The HTTP binding of the pipeline components.

use proteus_contract::{HttpMockOptions, HttpOperation, HttpRequest, HttpResponse};
use proteus_core::{BoxFuture, Components, Context, Input, PipelineResult, Validated};
use proteus_forwarder::{Forwarder, ForwarderOptions, ForwarderResult};
use url::Url;

/// Routes, validates, mocks and forwards HTTP elements against
/// [`HttpOperation`]s.
#[derive(Debug, Clone)]
pub struct HttpComponents {
    forwarder: Forwarder,
}

impl HttpComponents {
    /// Creates the components with a forwarder built from `options`.
    pub fn new(options: ForwarderOptions) -> ForwarderResult<Self> {
        Ok(Self {
            forwarder: Forwarder::new(options)?,
        })
    }

    /// Returns the forwarder used in proxy mode.
    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }
}

impl Components for HttpComponents {
    type Resource = HttpOperation;
    type Input = HttpRequest;
    type Output = HttpResponse;
    type MockOptions = HttpMockOptions;

    fn route<'r>(
        &self,
        resources: &'r [HttpOperation],
        input: &HttpRequest,
    ) -> PipelineResult<&'r HttpOperation> {
        proteus_router::route(resources, input)
    }

    fn validate_input<'e>(
        &self,
        resource: &HttpOperation,
        element: &'e HttpRequest,
    ) -> Validated<'e, HttpRequest> {
        proteus_validator::validate_input(resource, element)
    }

    fn validate_security<'e>(
        &self,
        resource: &HttpOperation,
        element: &'e HttpRequest,
    ) -> Validated<'e, HttpRequest> {
        proteus_validator::validate_security(resource, element)
    }

    fn validate_output<'e>(
        &self,
        resource: &HttpOperation,
        element: &'e HttpResponse,
    ) -> Validated<'e, HttpResponse> {
        proteus_validator::validate_output(resource, element)
    }

    fn mock(
        &self,
        ctx: &Context,
        resource: &HttpOperation,
        input: &Input<HttpRequest>,
        options: &HttpMockOptions,
    ) -> PipelineResult<HttpResponse> {
        proteus_mocker::mock(ctx, resource, input, options)
    }

    fn forward<'a>(
        &'a self,
        ctx: &'a Context,
        input: &'a Input<HttpRequest>,
        base_url: &'a Url,
        upstream_proxy: Option<&'a Url>,
        resource: Option<&'a HttpOperation>,
    ) -> BoxFuture<'a, PipelineResult<HttpResponse>> {
        Box::pin(self.forwarder.forward(ctx, input, base_url, upstream_proxy, resource))
    }
}
