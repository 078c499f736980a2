//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use panics::{Options, Reporter};
use serde_json::Value;
use tokio::sync::mpsc;

/// Reporter writing to `<dir>/panics.log` only.
pub fn file_reporter(dir: &Path) -> Reporter {
    Reporter::new(Options {
        environment: "test".into(),
        log_directory: dir.display().to_string(),
        ..Options::default()
    })
}

/// Sinks run on detached tasks; poll the log until `needle` shows up
/// `count` times or give up after five seconds.
pub async fn wait_for_log(dir: &Path, needle: &str, count: usize) -> String {
    let path = dir.join("panics.log");
    for _ in 0..100 {
        if let Ok(content) = tokio::fs::read_to_string(&path).await {
            if content.matches(needle).count() >= count {
                return content;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{} never contained {needle:?} {count} times", path.display());
}

pub struct Receiver {
    pub url: String,
    pub payloads: mpsc::UnboundedReceiver<(HeaderMap, Value)>,
}

impl Receiver {
    pub async fn next(&mut self) -> (HeaderMap, Value) {
        tokio::time::timeout(Duration::from_secs(5), self.payloads.recv())
            .await
            .expect("webhook was not called in time")
            .expect("receiver closed")
    }
}

/// In-process webhook endpoint answering every POST with `status`.
pub async fn start_receiver(status: StatusCode) -> Receiver {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/hook",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((headers, body));
                (status, "ack")
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Receiver {
        url: format!("http://{addr}/hook"),
        payloads: rx,
    }
}
