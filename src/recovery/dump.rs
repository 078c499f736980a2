//! Request capture for panic reports.
//!
//! The body has to be read before the handler consumes it, so
//! [`snapshot`] buffers it up front (when its size is known to fit the
//! limit) and hands the handler a replayed copy. The text dump is only
//! rendered if the handler actually panics.
//!
//! A body that fails while being buffered is handed to the handler as a
//! body that yields that same error, so the handler sees the failure it
//! would have seen unwrapped.

use std::fmt::Write;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};
use hyper::body::Frame;

/// Largest body buffered for the dump, in bytes.
pub const DEFAULT_MAX_DUMP_BODY: usize = 1_048_576;

#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// True when the body is not part of the dump: it could exceed the
    /// limit, or reading it failed.
    pub body_skipped: bool,
}

impl RequestSnapshot {
    /// Render in HTTP/1 wire style: request line, headers, blank line, body.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // write! to String is infallible
        let _ = write!(out, "{} {} {:?}\r\n", self.method, self.uri, self.version);
        for (name, value) in &self.headers {
            let _ = write!(
                out,
                "{}: {}\r\n",
                name,
                String::from_utf8_lossy(value.as_bytes())
            );
        }
        out.push_str("\r\n");

        match &self.body {
            Some(body) => out.push_str(&String::from_utf8_lossy(body)),
            None if self.body_skipped => out.push_str("<body not captured>"),
            None => {}
        }
        out
    }
}

/// Buffer the request body if it fits `limit` and return the request
/// rebuilt around the buffered bytes together with its snapshot.
///
/// Never fails: a body that cannot be read is left out of the snapshot
/// and the handler receives its read error instead.
pub async fn snapshot(request: Request, limit: usize) -> (Request, RequestSnapshot) {
    let (parts, body) = request.into_parts();

    let fits = body
        .size_hint()
        .upper()
        .is_some_and(|upper| usize::try_from(upper).is_ok_and(|n| n <= limit));

    let (body, captured) = if fits {
        match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => (Body::from(bytes.clone()), Some(bytes)),
            Err(e) => {
                tracing::debug!(error = %e, "request body could not be buffered for dump");
                (Body::new(ReadFailed(Some(e))), None)
            }
        }
    } else {
        (body, None)
    };
    let body_skipped = captured.is_none();

    let snapshot = RequestSnapshot {
        method: parts.method.clone(),
        uri: parts.uri.clone(),
        version: parts.version,
        headers: parts.headers.clone(),
        body: captured.filter(|b| !b.is_empty()),
        body_skipped,
    };

    (Request::from_parts(parts, body), snapshot)
}

/// Replays a buffering failure: the first frame is the original error.
struct ReadFailed(Option<axum::Error>);

impl HttpBody for ReadFailed {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        Poll::Ready(self.get_mut().0.take().map(Err))
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: Body) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/orders?id=7")
            .header("content-type", "application/json")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn small_body_is_captured_and_replayed() {
        let (request, snap) = snapshot(request(Body::from(r#"{"qty":2}"#)), 1024).await;

        assert_eq!(
            snap.render(),
            "POST /orders?id=7 HTTP/1.1\r\ncontent-type: application/json\r\n\r\n{\"qty\":2}"
        );

        let replayed = axum::body::to_bytes(request.into_body(), 1024).await.unwrap();
        assert_eq!(&replayed[..], br#"{"qty":2}"#);
    }

    #[tokio::test]
    async fn oversized_body_is_left_untouched() {
        let (request, snap) = snapshot(request(Body::from("0123456789")), 4).await;

        assert!(snap.body.is_none());
        assert!(snap.render().ends_with("\r\n\r\n<body not captured>"));

        let passed = axum::body::to_bytes(request.into_body(), 1024).await.unwrap();
        assert_eq!(&passed[..], b"0123456789");
    }

    #[tokio::test]
    async fn read_error_reaches_the_handler() {
        use http_body_util::{Full, Limited};

        let failing = Body::new(Limited::new(Full::new(Bytes::from_static(b"hello")), 2));
        let (request, snap) = snapshot(request(failing), 1024).await;

        assert!(snap.body.is_none());
        assert!(snap.render().ends_with("\r\n\r\n<body not captured>"));
        assert!(axum::body::to_bytes(request.into_body(), 1024).await.is_err());
    }

    #[tokio::test]
    async fn empty_body_renders_headers_only() {
        let (_, snap) = snapshot(request(Body::empty()), 1024).await;
        assert!(snap.render().ends_with("application/json\r\n\r\n"));
    }
}
