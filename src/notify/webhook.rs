//! Remote sink: POST the report to a chat incoming-webhook.
//!
//! The payload is the Slack-compatible shape
//! `{"text", "attachments": [{"text", "mrkdwn_in"}], "channel"}` with the
//! trace in the attachment. The connection-pooled hyper client is built
//! once per reporter and shared by every dispatched task.

use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Method;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;

use crate::error::PanicsError;
use crate::report::FormattedReport;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, Full<Bytes>>;

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_empty(v: &&str) -> bool {
    v.is_empty()
}

#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    pub text: &'a str,
    pub attachments: [Attachment<'a>; 1],
    #[serde(skip_serializing_if = "is_empty")]
    pub channel: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Attachment<'a> {
    pub text: &'a str,
    pub mrkdwn_in: [&'static str; 1],
}

impl<'a> Payload<'a> {
    #[must_use]
    pub fn new(report: &'a FormattedReport, channel: &'a str) -> Self {
        Self {
            text: &report.body,
            attachments: [Attachment {
                text: &report.trace,
                mrkdwn_in: ["text"],
            }],
            channel,
        }
    }
}

pub struct WebhookSink {
    url: String,
    channel: String,
    client: HttpClient,
}

impl WebhookSink {
    #[must_use]
    pub fn new(url: String, channel: String, client: HttpClient) -> Self {
        Self {
            url,
            channel,
            client,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, report: &FormattedReport) -> Result<(), PanicsError> {
        let body = serde_json::to_vec(&Payload::new(report, &self.channel))
            .map_err(|e| PanicsError::HttpRequest { source: Box::new(e) })?;

        let req = hyper::Request::builder()
            .method(Method::POST)
            .uri(self.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| PanicsError::HttpRequest { source: Box::new(e) })?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| PanicsError::HttpRequest { source: Box::new(e) })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.into_body().collect().await {
            Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
            Err(e) => format!("body read error: {e}"),
        };
        Err(PanicsError::WebhookRejected { status, body })
    }
}
