//! Pluggable pipeline components.
//!
//! A protocol binding implements [`Components`] once; the [`Pipeline`]
//! sequences the calls. The two response strategies sit behind
//! [`Responder`], selected from the configuration's [`Mode`].
//!
//! [`Pipeline`]: crate::Pipeline

use std::future::Future;
use std::pin::Pin;

use url::Url;

use crate::config::{Config, Mode};
use crate::context::Context;
use crate::diagnostic::Diagnostics;
use crate::envelope::Input;
use crate::error::PipelineResult;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a validator: the element itself, or the reasons it failed.
pub type Validated<'e, E> = Result<&'e E, Diagnostics>;

/// The protocol-specific building blocks of the pipeline.
///
/// Routing, validation and mocking are synchronous; only forwarding may
/// suspend.
pub trait Components: Send + Sync {
    /// Contract of one operation.
    type Resource: Send + Sync;
    /// Request element.
    type Input: Send + Sync;
    /// Response element.
    type Output: Send;
    /// Mock-mode options.
    type MockOptions: Send + Sync;

    /// Selects the resource targeted by the input.
    fn route<'r>(
        &self,
        resources: &'r [Self::Resource],
        input: &Self::Input,
    ) -> PipelineResult<&'r Self::Resource>;

    /// Checks the request element against the resource's request contract.
    fn validate_input<'e>(
        &self,
        resource: &Self::Resource,
        element: &'e Self::Input,
    ) -> Validated<'e, Self::Input>;

    /// Checks credentials against the resource's security requirements.
    fn validate_security<'e>(
        &self,
        resource: &Self::Resource,
        element: &'e Self::Input,
    ) -> Validated<'e, Self::Input>;

    /// Checks the produced response against the resource's response contract.
    fn validate_output<'e>(
        &self,
        resource: &Self::Resource,
        element: &'e Self::Output,
    ) -> Validated<'e, Self::Output>;

    /// Synthesizes a response from the contract.
    fn mock(
        &self,
        ctx: &Context,
        resource: &Self::Resource,
        input: &Input<Self::Input>,
        options: &Self::MockOptions,
    ) -> PipelineResult<Self::Output>;

    /// Forwards the request to the upstream at `base_url`.
    fn forward<'a>(
        &'a self,
        ctx: &'a Context,
        input: &'a Input<Self::Input>,
        base_url: &'a Url,
        upstream_proxy: Option<&'a Url>,
        resource: Option<&'a Self::Resource>,
    ) -> BoxFuture<'a, PipelineResult<Self::Output>>;
}

/// The strategy producing the response of one invocation.
#[derive(Debug)]
pub enum Responder<'c, M> {
    /// Synthesize from the contract.
    Mock(&'c M),
    /// Forward to the upstream.
    Forward {
        /// Upstream base URL.
        upstream: &'c Url,
        /// Optional proxy in front of the upstream.
        upstream_proxy: Option<&'c Url>,
    },
}

impl<'c, M> Responder<'c, M> {
    /// Selects the strategy from the configuration discriminant.
    pub fn select(config: &'c Config<M>) -> Self {
        match &config.mode {
            Mode::Mock(options) => Self::Mock(options),
            Mode::Proxy { upstream } => Self::Forward {
                upstream,
                upstream_proxy: config.base.upstream_proxy.as_ref(),
            },
        }
    }

    /// Returns the strategy name, for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mock(_) => "mock",
            Self::Forward { .. } => "forward",
        }
    }

    /// Produces the response.
    pub async fn respond<C>(
        &self,
        components: &C,
        ctx: &Context,
        resource: &C::Resource,
        input: &Input<C::Input>,
    ) -> PipelineResult<C::Output>
    where
        C: Components<MockOptions = M>,
    {
        match *self {
            Self::Mock(options) => components.mock(ctx, resource, input, options),
            Self::Forward {
                upstream,
                upstream_proxy,
            } => {
                components
                    .forward(ctx, input, upstream, upstream_proxy, Some(resource))
                    .await
            }
        }
    }
}
