//! Forwarding against an in-process upstream.

use std::time::Duration;

use http::Method;
use proteus_contract::fixtures::pet_store_operation;
use proteus_contract::HttpRequest;
use proteus_core::{Context, ErrorKind, Input};
use proteus_forwarder::{Forwarder, ForwarderOptions};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::Span;
use url::Url;

/// Serves one connection with `response`, reporting the raw request received.
async fn upstream(response: &'static str) -> (Url, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if request_complete(&received) {
                break;
            }
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&received).into_owned());
    });

    (Url::parse(&format!("http://{addr}")).unwrap(), rx)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    body.len() >= length
}

fn forwarder() -> Forwarder {
    Forwarder::new(ForwarderOptions::default()).unwrap()
}

#[tokio::test]
async fn test_forwards_request_and_decodes_json() {
    let (base, received) = upstream(
        "HTTP/1.1 201 Created\r\n\
         content-type: application/json\r\n\
         connection: close\r\n\
         x-upstream: yes\r\n\
         content-length: 26\r\n\r\n\
         {\"id\":7,\"name\":\"Garfield\"}",
    )
    .await;
    let request = HttpRequest::new(Method::POST, "/pets")
        .with_query("notify", "true")
        .with_header("x-api-key", "secret")
        .with_header("connection", "keep-alive")
        .with_body(json!({"name": "Garfield"}));

    let response = forwarder()
        .forward(&Context::detached(), &Input::new(request), &base, None, None)
        .await
        .unwrap();

    assert_eq!(response.status_code, 201);
    assert_eq!(response.body, Some(json!({"id": 7, "name": "Garfield"})));
    assert_eq!(response.header("x-upstream"), Some("yes"));
    assert!(response.header("connection").is_none());
    assert!(response.header("content-length").is_none());

    let raw = received.await.unwrap().to_ascii_lowercase();
    assert!(raw.starts_with("post /pets?notify=true http/1.1"));
    assert!(raw.contains("x-api-key: secret"));
    assert!(raw.contains("content-type: application/json"));
    assert!(!raw.contains("keep-alive"));
    assert!(raw.ends_with("{\"name\":\"garfield\"}"));
}

#[tokio::test]
async fn test_repeated_upstream_headers_are_kept() {
    let (base, _received) = upstream(
        "HTTP/1.1 204 No Content\r\n\
         set-cookie: session=1; HttpOnly\r\n\
         set-cookie: theme=dark\r\n\
         content-length: 0\r\n\r\n",
    )
    .await;

    let response = forwarder()
        .forward(
            &Context::detached(),
            &Input::new(HttpRequest::new(Method::GET, "/pets")),
            &base,
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.status_code, 204);
    assert_eq!(response.header("set-cookie"), Some("session=1; HttpOnly, theme=dark"));
    assert!(response.body.is_none());
}

#[tokio::test]
async fn test_text_body_and_deprecated_resource() {
    let (base, _received) = upstream(
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 5\r\n\r\nhello",
    )
    .await;
    let operation = pet_store_operation("deletePet").unwrap();

    let response = forwarder()
        .forward(
            &Context::detached(),
            &Input::new(HttpRequest::new(Method::DELETE, "/pets/1")),
            &base,
            None,
            Some(&operation),
        )
        .await
        .unwrap();

    assert_eq!(response.body, Some(json!("hello")));
    assert_eq!(response.header("deprecation"), Some("true"));
}

#[tokio::test]
async fn test_malformed_json_is_a_transport_error() {
    let (base, _received) = upstream(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 4\r\n\r\n{bad",
    )
    .await;

    let error = forwarder()
        .forward(
            &Context::detached(),
            &Input::new(HttpRequest::new(Method::GET, "/pets")),
            &base,
            None,
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.code(), "UPSTREAM_MALFORMED_RESPONSE");
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = Url::parse(&format!("http://{addr}")).unwrap();

    let error = forwarder()
        .forward(
            &Context::detached(),
            &Input::new(HttpRequest::new(Method::GET, "/pets")),
            &base,
            None,
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.code(), "UPSTREAM_UNREACHABLE");
    assert!(error.status() >= 500);
}

#[tokio::test]
async fn test_cancellation_interrupts_a_stalled_upstream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let (ctx, handle) = Context::cancellable(Span::none());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let error = tokio::time::timeout(
        Duration::from_secs(5),
        forwarder().forward(
            &ctx,
            &Input::new(HttpRequest::new(Method::GET, "/slow")),
            &base,
            None,
            None,
        ),
    )
    .await
    .unwrap()
    .unwrap_err();
    canceller.await.unwrap();

    assert_eq!(error.code(), "REQUEST_CANCELLED");
    assert_eq!(error.status(), 503);
    assert_eq!(error.kind(), ErrorKind::Transport);
}
