//! End-to-end behaviour of the HTTP engine.

use http::Method;
use proteus::contract::{HttpParam, HttpResponseContract, MediaContent, SecurityScheme};
use proteus::core::Config;
use proteus::{
    fixtures, Context, ErrorKind, HttpConfig, HttpEngine, HttpMockOptions, HttpOperation,
    HttpRequest,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Span;
use url::Url;

fn engine() -> HttpEngine {
    HttpEngine::new().unwrap()
}

/// `GET /secrets`, guarded by an API key, with a declared 401 response.
fn secrets() -> Vec<HttpOperation> {
    vec![HttpOperation::builder("listSecrets")
        .method(Method::GET)
        .path("/secrets")
        .query_param(HttpParam::new("limit").schema(json!({"type": "integer"})))
        .security([SecurityScheme::api_key_header("x-api-key")])
        .response(
            HttpResponseContract::new("200").content(
                MediaContent::new("application/json")
                    .schema(json!({"type": "array", "items": {"type": "string"}})),
            ),
        )
        .response(HttpResponseContract::new("401"))
        .build()]
}

#[tokio::test]
async fn test_mock_uses_the_default_example() {
    let config = HttpConfig::mock(HttpMockOptions::default());
    let output = engine()
        .request(HttpRequest::new(Method::GET, "/pets/1"), &fixtures::pet_store(), Some(&config))
        .await
        .unwrap();

    assert_eq!(output.output().status_code, 200);
    assert_eq!(output.output().body, Some(json!({"id": 1, "name": "Tom", "tag": "cat"})));
    assert!(output.validations().input.is_empty());
    assert!(output.validations().output.is_empty());
}

#[tokio::test]
async fn test_no_route_for_method() {
    let resources: Vec<HttpOperation> = fixtures::pet_store()
        .into_iter()
        .filter(|operation| operation.method() != Method::GET)
        .collect();

    let error = engine()
        .request(HttpRequest::new(Method::GET, "/pets/1"), &resources, None)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NoRoute);
    assert_eq!(error.status(), 405);
}

#[tokio::test]
async fn test_missing_api_key_is_reported() {
    let request = HttpRequest::new(Method::GET, "/secrets");
    let output = engine().request(request, &secrets(), None).await.unwrap();

    assert_eq!(output.output().status_code, 401);
    assert_eq!(
        output.output().header("www-authenticate"),
        Some("ApiKey in=\"header\", name=\"x-api-key\"")
    );
    let input = &output.validations().input;
    assert_eq!(input.len(), 1);
    assert_eq!(input[0].code, "401");
    assert!(output.validations().output.is_empty());
}

#[tokio::test]
async fn test_missing_api_key_terminates_with_errors() {
    let config = HttpConfig::default().errors(true);
    let error = engine()
        .request(HttpRequest::new(Method::GET, "/secrets"), &secrets(), Some(&config))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Security);
    assert_eq!(error.status(), 401);

    let problem = error.to_problem().to_json();
    assert_eq!(problem["type"], "https://proteus.dev/errors#UNAUTHORIZED");
    assert_eq!(problem["headers"]["www-authenticate"], "ApiKey in=\"header\", name=\"x-api-key\"");
}

#[tokio::test]
async fn test_missing_api_key_without_declared_unauthorized_response() {
    let mut resources = secrets();
    resources[0] = HttpOperation::builder("listSecrets")
        .method(Method::GET)
        .path("/secrets")
        .security([SecurityScheme::api_key_header("x-api-key")])
        .response(resources[0].responses()[0].clone())
        .build();

    let output = engine()
        .request(HttpRequest::new(Method::GET, "/secrets"), &resources, None)
        .await
        .unwrap();

    assert_eq!(output.output().status_code, 401);
    assert_eq!(
        output.output().header("www-authenticate"),
        Some("ApiKey in=\"header\", name=\"x-api-key\"")
    );
    assert!(output.output().body.is_none());
    let input = &output.validations().input;
    assert_eq!(input.len(), 1);
    assert_eq!(input[0].code, "401");
    assert_eq!(output.validations().output[0].code, "status");
}

#[tokio::test]
async fn test_invalid_request_without_declared_error_response() {
    let output = engine()
        .request(HttpRequest::new(Method::GET, "/pets/abc"), &fixtures::pet_store(), None)
        .await
        .unwrap();

    assert_eq!(output.output().status_code, 422);
    assert_eq!(output.output().header("content-type"), Some("application/problem+json"));
    let body = output.output().body.as_ref().unwrap();
    assert_eq!(body["type"], "https://proteus.dev/errors#UNPROCESSABLE_ENTITY");
    assert_eq!(body["validation"][0]["path"], json!(["path", "petId"]));
    assert_eq!(output.validations().input[0].path, vec!["path", "petId"]);

    let config = HttpConfig::default().errors(true);
    let error = engine()
        .request(HttpRequest::new(Method::GET, "/pets/abc"), &fixtures::pet_store(), Some(&config))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.status(), 422);
}

#[tokio::test]
async fn test_valid_key_passes() {
    let request = HttpRequest::new(Method::GET, "/secrets").with_header("X-Api-Key", "k");
    let output = engine().request(request, &secrets(), None).await.unwrap();

    assert_eq!(output.output().status_code, 200);
    assert!(output.validations().input.is_empty());
}

#[tokio::test]
async fn test_input_diagnostics_precede_security_diagnostics() {
    let request = HttpRequest::new(Method::GET, "/secrets").with_query("limit", "many");
    let output = engine().request(request, &secrets(), None).await.unwrap();

    let input = &output.validations().input;
    assert!(input.len() >= 2);
    assert_ne!(input[0].code, "401");
    assert_eq!(input[0].path, vec!["query", "limit"]);
    assert_eq!(input[input.len() - 1].code, "401");
}

#[tokio::test]
async fn test_invalid_request_promotion() {
    let request = || {
        HttpRequest::new(Method::POST, "/pets")
            .with_header("x-api-key", "k")
            .with_body(json!({"name": ""}))
    };

    let output = engine().request(request(), &fixtures::pet_store(), None).await.unwrap();
    assert_eq!(output.output().status_code, 422);
    assert!(!output.validations().input.is_empty());

    let config = HttpConfig::default().errors(true);
    let error = engine()
        .request(request(), &fixtures::pet_store(), Some(&config))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.code(), "UNPROCESSABLE_ENTITY");
    assert_eq!(error.additional()["validation"][0]["path"], json!(["body", "name"]));
}

#[tokio::test]
async fn test_static_mock_is_idempotent() {
    let engine = engine();
    let resources = fixtures::pet_store();
    let request = HttpRequest::new(Method::GET, "/pets").with_query("sort", "name");

    let first = engine.request(request.clone(), &resources, None).await.unwrap();
    let second = engine.request(request, &resources, None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = HttpConfig::proxy(Url::parse(&format!("http://{addr}")).unwrap());
    let error = engine()
        .request(HttpRequest::new(Method::GET, "/pets/1"), &fixtures::pet_store(), Some(&config))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(error.to_problem().status >= 500);
}

#[tokio::test]
async fn test_proxied_response_is_validated() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0_u8; 4096];
        let _ = stream.read(&mut buf).await.unwrap();
        let body = r#"{"id":0}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    let config: HttpConfig = Config::proxy(upstream);
    let output = engine()
        .request(HttpRequest::new(Method::GET, "/pets/1"), &fixtures::pet_store(), Some(&config))
        .await
        .unwrap();

    assert_eq!(output.output().status_code, 200);
    assert!(output.validations().input.is_empty());
    let codes: Vec<&str> = output.validations().output.iter().map(|d| d.code.as_str()).collect();
    assert!(codes.contains(&"minimum"));
    assert!(codes.contains(&"required"));
}

#[tokio::test]
async fn test_cancelled_context_stops_forwarding() {
    let config = HttpConfig::proxy(Url::parse("http://127.0.0.1:9").unwrap());
    let (ctx, handle) = Context::cancellable(Span::none());
    handle.cancel();

    let error = engine()
        .request_in(
            &ctx,
            HttpRequest::new(Method::GET, "/pets/1"),
            &fixtures::pet_store(),
            Some(&config),
        )
        .await
        .unwrap_err();

    assert_eq!(error.code(), "REQUEST_CANCELLED");
    assert_eq!(error.kind(), ErrorKind::Transport);
}
