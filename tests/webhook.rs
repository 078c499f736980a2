//! Integration tests for webhook delivery against an in-process receiver.

#![allow(dependency_on_unit_never_type_fallback)]

mod common;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use panics::{Options, Reporter, WebhookOptions};
use tower::ServiceExt;

fn webhook_reporter(url: &str, channel: &str, log_directory: &str) -> Reporter {
    let mut options = Options {
        environment: "test".into(),
        log_directory: log_directory.into(),
        webhook: WebhookOptions {
            url: url.into(),
            channel: channel.into(),
        },
        ..Options::default()
    };
    options.tags.insert("tier".into(), "gold".into());
    options.tags.insert("region".into(), "us".into());
    Reporter::new(options)
}

#[tokio::test]
async fn capture_posts_json_without_trace() {
    let mut receiver = common::start_receiver(StatusCode::OK).await;
    let reporter = webhook_reporter(&receiver.url, "#alerts", "");

    reporter.capture("boom", &["line1", "line2"]);

    let (headers, payload) = receiver.next().await;
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(
        payload,
        serde_json::json!({
            "text": "[test] *boom* | `region: us` | `tier: gold` ```line1\n\nline2```",
            "attachments": [{"text": "", "mrkdwn_in": ["text"]}],
            "channel": "#alerts",
        })
    );
}

#[tokio::test]
async fn panic_report_carries_dump_and_trace() {
    let mut receiver = common::start_receiver(StatusCode::OK).await;
    let reporter = webhook_reporter(&receiver.url, "", "");
    let app = Router::new().route(
        "/orders",
        post(reporter.wrap(|_req: Request| async { panic!("nil pointer") })),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .body(Body::from("qty=2"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let (_, payload) = receiver.next().await;
    let text = payload["text"].as_str().unwrap();
    assert!(text.starts_with("[test] *nil pointer* | `region: us` | `tier: gold`"));
    assert!(text.contains("```POST /orders HTTP/1.1\r\n"));
    assert!(text.ends_with("qty=2```"));

    let trace = payload["attachments"][0]["text"].as_str().unwrap();
    assert!(trace.starts_with("```panicked at "));
    assert!(trace.len() > "``````".len());
    assert!(payload.get("channel").is_none());
}

#[tokio::test]
async fn rejected_webhook_does_not_block_file_sink() {
    let mut receiver = common::start_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
    let dir = tempfile::tempdir().unwrap();
    let reporter = webhook_reporter(&receiver.url, "", &dir.path().display().to_string());

    reporter.send("db-timeout", &["query took too long"]).await;

    // The receiver saw the attempt and answered 500; the file still got its entry.
    let _ = receiver.next().await;
    let log = std::fs::read_to_string(dir.path().join("panics.log")).unwrap();
    assert!(log.starts_with("[test] *db-timeout*"));
}

#[tokio::test]
async fn unreachable_webhook_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}/hook");
    let reporter = webhook_reporter(&url, "", &dir.path().display().to_string());

    reporter.send("offline", &["no listener"]).await;

    let log = std::fs::read_to_string(dir.path().join("panics.log")).unwrap();
    assert!(log.contains("*offline*"));
}
