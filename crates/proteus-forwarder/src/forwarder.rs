//! HTTP client forwarding requests to the upstream.

use std::time::Duration;

use proteus_contract::problems::{
    REQUEST_CANCELLED, UPSTREAM_MALFORMED_RESPONSE, UPSTREAM_TIMEOUT, UPSTREAM_UNREACHABLE,
};
use proteus_contract::{is_json_media_type, HttpOperation, HttpRequest, HttpResponse};
use proteus_core::{Context, Input, PipelineError, PipelineResult};
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ForwarderError, ForwarderResult};
use crate::headers::{downstream_headers, forward_upstream};

/// Options of the forwarder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwarderOptions {
    /// Timeout for one upstream exchange, in seconds.
    pub timeout_secs: u64,
    /// Maximum idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_max_idle_per_host: 100,
        }
    }
}

impl ForwarderOptions {
    /// Returns the timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the options.
    pub fn validate(&self) -> ForwarderResult<()> {
        if self.timeout_secs == 0 {
            return Err(ForwarderError::Options {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Forwards requests to an upstream service.
///
/// The direct client is shared across calls; requests routed through an
/// upstream proxy get a client of their own.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    options: ForwarderOptions,
}

impl Forwarder {
    /// Create a new forwarder.
    pub fn new(options: ForwarderOptions) -> ForwarderResult<Self> {
        options.validate()?;
        let client = client_builder(&options).build()?;
        Ok(Self { client, options })
    }

    /// Get the options.
    pub fn options(&self) -> &ForwarderOptions {
        &self.options
    }

    /// Forward `input` to the upstream at `base_url`.
    ///
    /// Resolves to `REQUEST_CANCELLED` as soon as the context is cancelled.
    pub async fn forward(
        &self,
        ctx: &Context,
        input: &Input<HttpRequest>,
        base_url: &Url,
        upstream_proxy: Option<&Url>,
        resource: Option<&HttpOperation>,
    ) -> PipelineResult<HttpResponse> {
        if ctx.is_cancelled() {
            return Err(cancelled());
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                warn!(parent: ctx.span(), "forward cancelled");
                Err(cancelled())
            }
            result = self.exchange(ctx, input.data(), base_url, upstream_proxy, resource) => result,
        }
    }

    async fn exchange(
        &self,
        ctx: &Context,
        request: &HttpRequest,
        base_url: &Url,
        upstream_proxy: Option<&Url>,
        resource: Option<&HttpOperation>,
    ) -> PipelineResult<HttpResponse> {
        let url = upstream_url(base_url, request)?;
        let client = match upstream_proxy {
            None => self.client.clone(),
            Some(proxy) => proxied_client(&self.options, proxy)?,
        };

        let mut builder = client.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            if forward_upstream(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        match &request.body {
            None => {}
            Some(Value::String(raw)) => builder = builder.body(raw.clone()),
            Some(body) => {
                let bytes = serde_json::to_vec(body).map_err(|e| {
                    PipelineError::unknown(format!("failed to serialize request body: {e}"))
                })?;
                if request.header("content-type").is_none() {
                    builder = builder.header("content-type", "application/json");
                }
                builder = builder.body(bytes);
            }
        }

        debug!(
            parent: ctx.span(),
            http.method = %request.method,
            upstream = %url,
            proxied = upstream_proxy.is_some(),
            "forwarding request"
        );

        let response = builder.send().await.map_err(|e| transport_error(&e, &url))?;

        let status = response.status().as_u16();
        let headers = downstream_headers(response.headers());

        let bytes = response.bytes().await.map_err(|e| transport_error(&e, &url))?;
        let body = decode_body(headers.get("content-type").map(String::as_str), &bytes)?;

        let mut forwarded = HttpResponse::new(status);
        forwarded.headers = headers;
        forwarded.body = body;
        if resource.is_some_and(HttpOperation::deprecated) {
            forwarded
                .headers
                .insert("deprecation".to_string(), "true".to_string());
        }

        info!(parent: ctx.span(), upstream = %url, status, "upstream responded");
        Ok(forwarded)
    }
}

fn client_builder(options: &ForwarderOptions) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(options.timeout())
        .pool_max_idle_per_host(options.pool_max_idle_per_host)
}

fn proxied_client(options: &ForwarderOptions, proxy: &Url) -> PipelineResult<Client> {
    Proxy::all(proxy.as_str())
        .and_then(|proxy| client_builder(options).proxy(proxy).build())
        .map_err(|e| {
            PipelineError::transport(
                UPSTREAM_UNREACHABLE,
                format!("Unable to use upstream proxy {proxy}: {e}"),
            )
        })
}

/// Joins the request path and query onto the upstream base URL.
pub(crate) fn upstream_url(base_url: &Url, request: &HttpRequest) -> PipelineResult<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}{}", request.url.path)).map_err(|e| {
        PipelineError::transport(
            UPSTREAM_UNREACHABLE,
            format!("Unable to build the upstream URL from {base_url}: {e}"),
        )
    })?;

    let pairs = request.url.query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> PipelineResult<Option<Value>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if content_type.is_some_and(is_json_media_type) {
        return serde_json::from_slice(bytes).map(Some).map_err(|e| {
            PipelineError::transport(
                UPSTREAM_MALFORMED_RESPONSE,
                format!("The upstream response body is not valid JSON: {e}"),
            )
        });
    }
    Ok(Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

fn transport_error(error: &reqwest::Error, url: &Url) -> PipelineError {
    if error.is_timeout() {
        PipelineError::transport(
            UPSTREAM_TIMEOUT,
            format!("The upstream {url} did not respond in time"),
        )
    } else {
        PipelineError::transport(
            UPSTREAM_UNREACHABLE,
            format!("Unable to reach the upstream {url}: {error}"),
        )
    }
}

fn cancelled() -> PipelineError {
    PipelineError::transport(
        REQUEST_CANCELLED,
        "The request was cancelled before the upstream responded",
    )
}
