//! The HTTP entry point.

use proteus_contract::{HttpConfig, HttpOperation, HttpRequest, HttpResponse};
use proteus_core::{Context, Output, Pipeline, PipelineResult};
use proteus_forwarder::{ForwarderOptions, ForwarderResult};
use tracing::info_span;

use crate::components::HttpComponents;
use crate::settings::Settings;

/// Processes HTTP requests against a set of operations.
///
/// The engine is stateless between requests; share it freely.
///
/// # Example
///
/// ```
/// use http::Method;
/// use proteus::{fixtures, HttpEngine, HttpRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let engine = HttpEngine::new().unwrap();
/// let output = engine
///     .request(HttpRequest::new(Method::GET, "/pets/1"), &fixtures::pet_store(), None)
///     .await
///     .unwrap();
/// assert_eq!(output.output().status_code, 200);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpEngine {
    pipeline: Pipeline<HttpComponents>,
}

impl HttpEngine {
    /// Creates an engine with default forwarder options.
    pub fn new() -> ForwarderResult<Self> {
        Self::with_forwarder(ForwarderOptions::default())
    }

    /// Creates an engine forwarding with `options`.
    pub fn with_forwarder(options: ForwarderOptions) -> ForwarderResult<Self> {
        Ok(Self {
            pipeline: Pipeline::new(HttpComponents::new(options)?),
        })
    }

    /// Creates an engine from loaded settings.
    pub fn from_settings(settings: &Settings) -> ForwarderResult<Self> {
        Self::with_forwarder(settings.forwarder.clone())
    }

    /// Returns the components.
    pub fn components(&self) -> &HttpComponents {
        self.pipeline.components()
    }

    /// Processes `input` in a fresh `proteus.request` span.
    ///
    /// A missing `config` runs the default static mock with every validation
    /// enabled and no promotion.
    pub async fn request(
        &self,
        input: HttpRequest,
        resources: &[HttpOperation],
        config: Option<&HttpConfig>,
    ) -> PipelineResult<Output<HttpResponse>> {
        let span = info_span!(
            "proteus.request",
            http.method = %input.method,
            http.path = %input.url.path
        );
        self.request_in(&Context::new(span), input, resources, config).await
    }

    /// Processes `input` within the caller's context.
    ///
    /// Use this to attach a cancellation signal or a parent span.
    pub async fn request_in(
        &self,
        ctx: &Context,
        input: HttpRequest,
        resources: &[HttpOperation],
        config: Option<&HttpConfig>,
    ) -> PipelineResult<Output<HttpResponse>> {
        self.pipeline.request(ctx, input, resources, config).await
    }
}
