//! Tower [`Layer`] wrapping any axum service in the panic boundary.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use super::guard;
use crate::reporter::Reporter;

/// ```no_run
/// use axum::{routing::get, Router};
/// use panics::{Options, RecoveryLayer, Reporter};
///
/// let reporter = Reporter::new(Options::default());
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(RecoveryLayer::new(reporter).max_dump_body(64 * 1024));
/// ```
#[derive(Clone)]
pub struct RecoveryLayer {
    reporter: Reporter,
    max_dump_body: usize,
}

impl RecoveryLayer {
    /// Uses the reporter's [`Options::max_dump_body`](crate::Options::max_dump_body).
    #[must_use]
    pub fn new(reporter: Reporter) -> Self {
        let max_dump_body = reporter.dump_limit();
        Self {
            reporter,
            max_dump_body,
        }
    }

    /// Override the largest request body buffered for the report dump.
    #[must_use]
    pub fn max_dump_body(mut self, limit: usize) -> Self {
        self.max_dump_body = limit;
        self
    }
}

impl<S> Layer<S> for RecoveryLayer {
    type Service = Recovery<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Recovery {
            inner,
            reporter: self.reporter.clone(),
            max_dump_body: self.max_dump_body,
        }
    }
}

#[derive(Clone)]
pub struct Recovery<S> {
    inner: S,
    reporter: Reporter,
    max_dump_body: usize,
}

impl<S> Service<Request> for Recovery<S>
where
    S: Service<Request, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let reporter = self.reporter.clone();
        let limit = self.max_dump_body;

        Box::pin(async move {
            let response = guard(&reporter, request, limit, move |req| {
                let fut = inner.call(req);
                async move {
                    match fut.await {
                        Ok(response) => response.into_response(),
                        Err(never) => match never {},
                    }
                }
            })
            .await;
            Ok(response)
        })
    }
}
