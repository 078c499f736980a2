//! The shared reporter: configuration plus enabled sinks.
//!
//! A [`Reporter`] is built once from [`Options`] at startup and cloned
//! into every wrapped handler, layer, and capture site. Cloning is an
//! `Arc` bump. Nothing is mutated after construction.

use std::sync::Arc;

use crate::config::model::Options;
use crate::config::validation::validate;
use crate::notify::Notifier;
use crate::recovery::install_panic_hook;
use crate::report::{self, FormattedReport, Report};

struct Inner {
    options: Options,
    tags: String,
    notifier: Notifier,
}

#[derive(Clone)]
pub struct Reporter {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("environment", &self.inner.options.environment)
            .field("webhook", &self.inner.notifier.webhook().is_some())
            .field("file", &self.inner.notifier.file().is_some())
            .finish()
    }
}

impl Reporter {
    /// Build a reporter. Never fails: questionable options are logged and
    /// sinks without a target stay disabled.
    ///
    /// The first call installs a process-wide panic hook. Panics outside a
    /// recovery boundary still reach the hook that was installed before it.
    /// Recovered panics do not, unless
    /// [`forward_recovered_panics(true)`](crate::recovery::forward_recovered_panics)
    /// is set. Hooks installed after this call replace ours, and reports then
    /// carry a backtrace taken where the panic was caught.
    #[must_use]
    pub fn new(options: Options) -> Self {
        if let Err(errors) = validate(&options) {
            for e in &errors {
                tracing::warn!(field = %e.field, problem = %e.message, "questionable panics option");
            }
        }

        install_panic_hook();

        let tags = report::render_tags(&options.tags);
        let notifier = Notifier::from_options(&options);

        tracing::debug!(
            environment = %options.environment,
            webhook = notifier.webhook().is_some(),
            file = notifier.file().is_some(),
            "panic reporter configured"
        );

        Self {
            inner: Arc::new(Inner {
                options,
                tags,
                notifier,
            }),
        }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Request body limit used by every recovery shape built from this reporter.
    #[must_use]
    pub fn dump_limit(&self) -> usize {
        self.inner.options.dump_limit()
    }

    /// Rendered tag string shared by every report.
    #[must_use]
    pub fn tags(&self) -> &str {
        &self.inner.tags
    }

    /// Format a report with this reporter's environment, tags, and custom message.
    #[must_use]
    pub fn render(
        &self,
        message: &str,
        context: Option<&str>,
        stack_trace: Option<&str>,
    ) -> FormattedReport {
        let options = &self.inner.options;
        report::format(&Report {
            environment: &options.environment,
            message,
            tags: &self.inner.tags,
            custom_message: Some(options.custom_message.as_str()),
            context,
            stack_trace,
        })
    }

    fn render_capture<S: AsRef<str>>(&self, label: &str, parts: &[S]) -> FormattedReport {
        let context = report::join_context(parts);
        self.render(label, Some(&context), None)
    }

    /// Report an error without a panic. Returns immediately; delivery
    /// happens on background tasks and failures are only logged.
    pub fn capture<S: AsRef<str>>(&self, label: &str, parts: &[S]) {
        self.inner.notifier.dispatch(self.render_capture(label, parts));
    }

    /// Like [`capture`](Self::capture) but waits for every sink to finish.
    pub async fn send<S: AsRef<str>>(&self, label: &str, parts: &[S]) {
        let report = self.render_capture(label, parts);
        self.inner.notifier.deliver(&report).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> Reporter {
        let mut options = Options {
            environment: "prod".into(),
            custom_message: "ping @oncall".into(),
            ..Options::default()
        };
        options.tags.insert("tier".into(), "gold".into());
        options.tags.insert("region".into(), "us".into());
        Reporter::new(options)
    }

    #[test]
    fn tags_are_rendered_once_in_key_order() {
        assert_eq!(reporter().tags(), "`region: us` | `tier: gold`");
    }

    #[test]
    fn capture_context_joins_parts_without_trace() {
        let report = reporter().render_capture("boom", &["line1", "line2"]);
        assert_eq!(
            report.body,
            "[prod] *boom* | `region: us` | `tier: gold`\nping @oncall ```line1\n\nline2```"
        );
        assert!(report.trace.is_empty());
    }

    #[test]
    fn capture_without_parts_has_no_context_block() {
        let report = reporter().render_capture::<&str>("boom", &[]);
        assert!(!report.body.contains("```"));
    }

    #[test]
    fn reporter_without_sinks_is_inert() {
        let reporter = Reporter::new(Options::default());
        assert!(reporter.notifier().webhook().is_none());
        assert!(reporter.notifier().file().is_none());
        reporter.capture("nothing", &["happens"]);
    }
}
