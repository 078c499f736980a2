//! Panic recovery for request handlers.
//!
//! Three entry points share one boundary ([`guard`]):
//!
//! - [`Reporter::wrap`] decorates a single handler.
//! - [`RecoveryLayer`] is a tower layer for `Router::layer`.
//! - [`recover`] is chain-style middleware for
//!   `axum::middleware::from_fn_with_state`.
//!
//! When the inner handler panics, the request is dumped, a report carrying
//! the trace is dispatched, and the caller receives a `500` whose body is
//! the panic message. Handler code never resumes after a panic.

pub mod catch;
pub mod dump;
pub mod layer;

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;

use crate::reporter::Reporter;

pub use catch::{forward_recovered_panics, install_panic_hook, CatchUnwind};
pub use dump::DEFAULT_MAX_DUMP_BODY;
pub use layer::{Recovery, RecoveryLayer};

/// Body used when the panic payload carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A recovered panic: normalized message plus the captured trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panic {
    pub message: String,
    pub trace: String,
}

impl IntoResponse for Panic {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            self.message,
        )
            .into_response()
    }
}

/// Normalize a panic payload: text verbatim, errors by their `Display`,
/// anything else as [`UNKNOWN_ERROR`].
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        e.to_string()
    } else if let Some(e) = payload.downcast_ref::<std::sync::Arc<dyn std::error::Error + Send + Sync>>() {
        e.to_string()
    } else if let Some(e) = payload.downcast_ref::<std::io::Error>() {
        e.to_string()
    } else if let Some(e) = payload.downcast_ref::<std::fmt::Error>() {
        e.to_string()
    } else {
        UNKNOWN_ERROR.to_string()
    }
}

/// Run `handler` behind the panic boundary.
pub async fn guard<F, Fut>(reporter: &Reporter, request: Request, dump_limit: usize, handler: F) -> Response
where
    F: FnOnce(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    let (request, snapshot) = dump::snapshot(request, dump_limit).await;

    match CatchUnwind::new(async move { handler(request).await }).await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                method = %snapshot.method,
                uri = %snapshot.uri,
                error = %panic.message,
                "recovered panic in request handler"
            );
            let dump = snapshot.render();
            let report = reporter.render(&panic.message, Some(&dump), Some(&panic.trace));
            reporter.notifier().dispatch(report);
            panic.into_response()
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

impl Reporter {
    /// Decorate an axum handler taking the whole [`Request`].
    ///
    /// ```no_run
    /// use axum::{extract::Request, routing::post, Router};
    /// use panics::{Options, Reporter};
    ///
    /// let reporter = Reporter::new(Options::default());
    /// let app: Router = Router::new().route(
    ///     "/orders",
    ///     post(reporter.wrap(|_req: Request| async { "ok" })),
    /// );
    /// ```
    pub fn wrap<H, Fut, R>(
        &self,
        handler: H,
    ) -> impl Fn(Request) -> HandlerFuture + Clone + Send + Sync + 'static
    where
        H: Fn(Request) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let reporter = self.clone();
        move |request: Request| -> HandlerFuture {
            let reporter = reporter.clone();
            let handler = handler.clone();
            Box::pin(async move {
                let limit = reporter.dump_limit();
                guard(&reporter, request, limit, move |req| async move {
                    handler(req).await.into_response()
                })
                .await
            })
        }
    }
}

/// Chain-style middleware: recover panics raised anywhere below `next`.
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use panics::{recovery, Options, Reporter};
///
/// let reporter = Reporter::new(Options::default());
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(reporter, recovery::recover));
/// ```
pub async fn recover(State(reporter): State<Reporter>, request: Request, next: Next) -> Response {
    let limit = reporter.dump_limit();
    guard(&reporter, request, limit, move |req| next.run(req)).await
}
