//! Pipeline ordering, accumulation and promotion tests.
//!
//! These tests drive the pipeline with in-memory components so that every
//! stage outcome can be forced independently.

use std::sync::Mutex;

use proptest::prelude::*;
use proteus_core::{
    BoxFuture, Components, Config, Context, Diagnostic, Diagnostics, ErrorKind, Input,
    PipelineError, PipelineResult, ProblemTemplate, Validated,
};
use url::Url;

#[derive(Debug, Clone)]
struct Resource {
    target: &'static str,
    needs_key: bool,
    status: u16,
}

#[derive(Debug, Clone)]
struct Request {
    target: &'static str,
    input: Quality,
    key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quality {
    Valid,
    WarningOnly,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Response {
    status: u16,
    strategy: &'static str,
}

#[derive(Debug, Default)]
struct MockOptions {
    status: Option<u16>,
}

#[derive(Debug)]
struct Fake {
    output: Quality,
    upstream_up: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl Fake {
    fn new() -> Self {
        Self {
            output: Quality::Valid,
            upstream_up: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_output(mut self, output: Quality) -> Self {
        self.output = output;
        self
    }

    fn with_upstream_down(mut self) -> Self {
        self.upstream_up = false;
        self
    }

    fn log(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

fn findings(quality: Quality, code: &str) -> Vec<Diagnostic> {
    match quality {
        Quality::Valid => Vec::new(),
        Quality::WarningOnly => vec![Diagnostic::warning(code, "discouraged")],
        Quality::Invalid => vec![Diagnostic::error(code, "broken")],
    }
}

impl Components for Fake {
    type Resource = Resource;
    type Input = Request;
    type Output = Response;
    type MockOptions = MockOptions;

    fn route<'r>(
        &self,
        resources: &'r [Resource],
        input: &Request,
    ) -> PipelineResult<&'r Resource> {
        self.log("route");
        resources
            .iter()
            .find(|r| r.target == input.target)
            .ok_or_else(|| {
                PipelineError::no_route(
                    ProblemTemplate {
                        code: "NO_PATH_MATCHED_ERROR",
                        title: "Route not resolved, no path matched",
                        status: 404,
                    },
                    format!("no resource for {}", input.target),
                )
            })
    }

    fn validate_input<'e>(
        &self,
        _resource: &Resource,
        element: &'e Request,
    ) -> Validated<'e, Request> {
        self.log("input");
        Diagnostics::check(element, findings(element.input, "input"))
    }

    fn validate_security<'e>(
        &self,
        resource: &Resource,
        element: &'e Request,
    ) -> Validated<'e, Request> {
        self.log("security");
        let mut found = Vec::new();
        if resource.needs_key && element.key.is_none() {
            found.push(Diagnostic::error("401", "missing api key").with_tag("Bearer"));
        }
        Diagnostics::check(element, found)
    }

    fn validate_output<'e>(
        &self,
        _resource: &Resource,
        element: &'e Response,
    ) -> Validated<'e, Response> {
        self.log("output");
        Diagnostics::check(element, findings(self.output, "output"))
    }

    fn mock(
        &self,
        _ctx: &Context,
        resource: &Resource,
        input: &Input<Request>,
        options: &MockOptions,
    ) -> PipelineResult<Response> {
        self.log("mock");
        let status = if input.has_errors() {
            422
        } else {
            options.status.unwrap_or(resource.status)
        };
        Ok(Response {
            status,
            strategy: "mock",
        })
    }

    fn forward<'a>(
        &'a self,
        _ctx: &'a Context,
        _input: &'a Input<Request>,
        _base_url: &'a Url,
        _upstream_proxy: Option<&'a Url>,
        resource: Option<&'a Resource>,
    ) -> BoxFuture<'a, PipelineResult<Response>> {
        Box::pin(async move {
            self.log("forward");
            if !self.upstream_up {
                return Err(PipelineError::transport(
                    ProblemTemplate {
                        code: "UPSTREAM_UNREACHABLE",
                        title: "Upstream unreachable",
                        status: 502,
                    },
                    "connection refused",
                ));
            }
            Ok(Response {
                status: resource.map_or(200, |r| r.status),
                strategy: "forward",
            })
        })
    }
}

fn pets() -> Vec<Resource> {
    vec![
        Resource {
            target: "GET /pets/{id}",
            needs_key: false,
            status: 200,
        },
        Resource {
            target: "POST /pets",
            needs_key: true,
            status: 201,
        },
    ]
}

fn request(target: &'static str) -> Request {
    Request {
        target,
        input: Quality::Valid,
        key: None,
    }
}

fn proxy_config() -> Config<MockOptions> {
    Config::proxy(Url::parse("http://localhost:4010").unwrap())
}

#[tokio::test]
async fn test_no_route_fails_without_output() {
    let fake = Fake::new();
    let pipeline = proteus_core::Pipeline::new(fake);

    let error = pipeline
        .request(&Context::detached(), request("DELETE /pets"), &pets(), None)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NoRoute);
    assert_eq!(pipeline.components().calls(), vec!["route"]);
}

#[tokio::test]
async fn test_default_config_mocks_with_all_validations() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());

    let output = pipeline
        .request(&Context::detached(), request("GET /pets/{id}"), &pets(), None)
        .await
        .unwrap();

    assert_eq!(output.output().status, 200);
    assert_eq!(output.output().strategy, "mock");
    assert!(output.validations().input.is_empty());
    assert!(output.validations().output.is_empty());
    assert_eq!(
        pipeline.components().calls(),
        vec!["route", "input", "security", "mock", "output"]
    );
}

#[tokio::test]
async fn test_disabled_stages_are_skipped() {
    let pipeline = proteus_core::Pipeline::new(Fake::new().with_output(Quality::Invalid));
    let config = Config::mock(MockOptions::default())
        .validate_request(false)
        .check_security(false)
        .validate_response(false);

    let mut bad = request("POST /pets");
    bad.input = Quality::Invalid;

    let output = pipeline
        .request(&Context::detached(), bad, &pets(), Some(&config))
        .await
        .unwrap();

    assert!(output.validations().input.is_empty());
    assert!(output.validations().output.is_empty());
    assert_eq!(pipeline.components().calls(), vec!["route", "mock"]);
}

#[tokio::test]
async fn test_input_diagnostics_precede_security_diagnostics() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let mut bad = request("POST /pets");
    bad.input = Quality::Invalid;

    let output = pipeline
        .request(&Context::detached(), bad, &pets(), None)
        .await
        .unwrap();

    let codes: Vec<&str> = output
        .validations()
        .input
        .iter()
        .map(|d| d.code.as_str())
        .collect();
    assert_eq!(codes, vec!["input", "401"]);
    assert_eq!(output.output().status, 422);
}

#[tokio::test]
async fn test_input_failure_is_promoted_with_errors_flag() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let config = Config::mock(MockOptions::default()).errors(true);
    let mut bad = request("GET /pets/{id}");
    bad.input = Quality::Invalid;

    let error = pipeline
        .request(&Context::detached(), bad, &pets(), Some(&config))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.code(), "UNPROCESSABLE_ENTITY");
    assert_eq!(error.status(), 422);
    assert_eq!(error.additional()["validation"][0]["code"], "input");
    assert_eq!(pipeline.components().calls(), vec!["route", "input"]);
}

#[tokio::test]
async fn test_warning_only_failure_is_never_promoted() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let config = Config::mock(MockOptions::default()).errors(true);
    let mut noisy = request("GET /pets/{id}");
    noisy.input = Quality::WarningOnly;

    let output = pipeline
        .request(&Context::detached(), noisy, &pets(), Some(&config))
        .await
        .unwrap();

    assert_eq!(output.validations().input.len(), 1);
    assert_eq!(output.output().status, 200);
}

#[tokio::test]
async fn test_security_failure_is_promoted_to_unauthorized() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let config = Config::mock(MockOptions::default()).errors(true);

    let error = pipeline
        .request(&Context::detached(), request("POST /pets"), &pets(), Some(&config))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Security);
    assert_eq!(error.status(), 401);

    let problem = error.to_problem();
    assert_eq!(problem.problem_type, "https://proteus.dev/errors#UNAUTHORIZED");
    assert_eq!(problem.additional["headers"]["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn test_output_failure_accumulates_on_output_side_only() {
    let pipeline = proteus_core::Pipeline::new(Fake::new().with_output(Quality::Invalid));
    let mut bad = request("GET /pets/{id}");
    bad.input = Quality::Invalid;

    let output = pipeline
        .request(&Context::detached(), bad, &pets(), None)
        .await
        .unwrap();

    assert!(output.validations().input.iter().all(|d| d.code == "input"));
    assert!(output.validations().output.iter().all(|d| d.code == "output"));
    assert_eq!(output.validations().output.len(), 1);
}

#[tokio::test]
async fn test_output_failure_is_promoted_to_violations() {
    let pipeline = proteus_core::Pipeline::new(Fake::new().with_output(Quality::Invalid));
    let config = Config::mock(MockOptions::default()).errors(true);

    let error = pipeline
        .request(&Context::detached(), request("GET /pets/{id}"), &pets(), Some(&config))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.code(), "VIOLATIONS");
    assert_eq!(error.status(), 500);
}

#[tokio::test]
async fn test_proxy_mode_forwards_with_resource() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let config = proxy_config().check_security(false);

    let output = pipeline
        .request(&Context::detached(), request("POST /pets"), &pets(), Some(&config))
        .await
        .unwrap();

    assert_eq!(output.output().strategy, "forward");
    assert_eq!(output.output().status, 201);
    assert!(!pipeline.components().calls().contains(&"mock"));
}

#[tokio::test]
async fn test_transport_failure_terminates() {
    let pipeline = proteus_core::Pipeline::new(Fake::new().with_upstream_down());

    let error = pipeline
        .request(&Context::detached(), request("GET /pets/{id}"), &pets(), Some(&proxy_config()))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(error.to_problem().status >= 500);
    assert!(!pipeline.components().calls().contains(&"output"));
}

#[tokio::test]
async fn test_mock_mode_is_idempotent() {
    let pipeline = proteus_core::Pipeline::new(Fake::new());
    let config = Config::mock(MockOptions { status: Some(204) });

    let first = pipeline
        .request(&Context::detached(), request("GET /pets/{id}"), &pets(), Some(&config))
        .await
        .unwrap();
    let second = pipeline
        .request(&Context::detached(), request("GET /pets/{id}"), &pets(), Some(&config))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first.validations()).unwrap(),
        serde_json::to_string(&second.validations()).unwrap()
    );
    assert_eq!(first.output(), second.output());
}

fn quality() -> impl Strategy<Value = Quality> {
    prop_oneof![
        Just(Quality::Valid),
        Just(Quality::WarningOnly),
        Just(Quality::Invalid)
    ]
}

proptest! {
    #[test]
    fn prop_promotion_law(
        input in quality(),
        output in quality(),
        errors in any::<bool>(),
        key in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let pipeline = proteus_core::Pipeline::new(Fake::new().with_output(output));
        let config = Config::mock(MockOptions::default()).errors(errors);
        let req = Request {
            target: "POST /pets",
            input,
            key: key.then_some("secret"),
        };

        let outcome =
            runtime.block_on(pipeline.request(&Context::detached(), req, &pets(), Some(&config)));

        let input_fails = input == Quality::Invalid;
        let security_fails = !key;
        let output_fails = output == Quality::Invalid;

        match outcome {
            Ok(envelope) => {
                prop_assert!(!errors || !(input_fails || security_fails || output_fails));
                let recorded = &envelope.validations().input;
                let input_recorded = recorded.iter().any(|d| d.code == "input" && d.is_error());
                prop_assert_eq!(input_fails, input_recorded);
                prop_assert_eq!(security_fails, recorded.iter().any(|d| d.code == "401"));
                prop_assert!(recorded.iter().all(|d| d.code != "output"));
                prop_assert!(envelope.validations().output.iter().all(|d| d.code == "output"));
            }
            Err(error) => {
                prop_assert!(errors);
                let expected = if input_fails {
                    ErrorKind::Validation
                } else if security_fails {
                    ErrorKind::Security
                } else {
                    prop_assert!(output_fails);
                    ErrorKind::Validation
                };
                prop_assert_eq!(error.kind(), expected);
            }
        }
    }
}
