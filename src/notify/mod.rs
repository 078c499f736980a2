//! Fan-out of a formatted report to the configured sinks.
//!
//! [`Notifier::dispatch`] spawns one detached task per enabled sink and
//! returns immediately. Results are logged by [`best_effort`] and never
//! surface to the caller; there is no retry and no join. The webhook and
//! file sinks run independently, so one failing leaves the other alone.
//!
//! [`Notifier::deliver`] is the awaited variant used where the caller must
//! not exit before delivery finishes (the CLI, tests).

pub mod file;
pub mod webhook;

use std::future::Future;
use std::sync::Arc;

use crate::config::model::Options;
use crate::error::PanicsError;
use crate::report::FormattedReport;

use file::FileSink;
use webhook::WebhookSink;

#[derive(Clone, Default)]
pub struct Notifier {
    webhook: Option<Arc<WebhookSink>>,
    file: Option<Arc<FileSink>>,
}

impl Notifier {
    /// Enable each sink whose option is non-empty.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        let webhook = options.webhook_enabled().then(|| {
            Arc::new(WebhookSink::new(
                options.webhook.url.clone(),
                options.webhook.channel.clone(),
                webhook::build_http_client(),
            ))
        });
        let file = options.log_path().map(|path| Arc::new(FileSink::new(path)));
        Self { webhook, file }
    }

    #[must_use]
    pub fn webhook(&self) -> Option<&WebhookSink> {
        self.webhook.as_deref()
    }

    #[must_use]
    pub fn file(&self) -> Option<&FileSink> {
        self.file.as_deref()
    }

    /// Fire-and-forget: spawn each enabled sink and return.
    pub fn dispatch(&self, report: FormattedReport) {
        let report = Arc::new(report);

        if let Some(webhook) = &self.webhook {
            let webhook = Arc::clone(webhook);
            let report = Arc::clone(&report);
            best_effort("webhook", async move { webhook.send(&report).await });
        }

        if let Some(file) = &self.file {
            let file = Arc::clone(file);
            best_effort("file", async move { file.append(&report).await });
        }
    }

    /// Run every enabled sink concurrently and wait for all of them.
    pub async fn deliver(&self, report: &FormattedReport) {
        let webhook = async {
            if let Some(webhook) = &self.webhook {
                log_outcome("webhook", webhook.send(report).await);
            }
        };
        let file = async {
            if let Some(file) = &self.file {
                log_outcome("file", file.append(report).await);
            }
        };
        tokio::join!(webhook, file);
    }
}

/// Spawn `task` detached on the current tokio runtime, logging and
/// discarding its error. Without a runtime the report is dropped.
pub fn best_effort<F>(sink: &'static str, task: F)
where
    F: Future<Output = Result<(), PanicsError>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            // JoinHandle dropped on purpose: the task is detached.
            drop(handle.spawn(async move {
                log_outcome(sink, task.await);
            }));
        }
        Err(_) => {
            tracing::warn!(sink, "no tokio runtime available, panic report dropped");
        }
    }
}

fn log_outcome(sink: &'static str, outcome: Result<(), PanicsError>) {
    match outcome {
        Ok(()) => tracing::debug!(sink, "panic report delivered"),
        Err(e) => tracing::warn!(sink, error = %e, "failed to deliver panic report"),
    }
}
