//! Report construction and text rendering.
//!
//! A [`Report`] is built per occurrence and immediately rendered by
//! [`format`] into a [`FormattedReport`]. Rendering is pure: it never
//! fails and simply omits absent fields, so it can be tested without any
//! sink.
//!
//! Layout of the body:
//!
//! ```text
//! [<environment>] *<message>* | `key: value` | `key: value`
//! <custom message>
//!  ```<request context>```
//! ```
//!
//! The trace is a separate fenced block so the webhook sink can ship it as
//! an attachment.

use std::collections::BTreeMap;

const FENCE: &str = "```";

/// Separator between parts passed to a manual capture.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Render tags as `` `key: value` `` items joined by `" | "`, in key order.
#[must_use]
pub fn render_tags(tags: &BTreeMap<String, String>) -> String {
    tags.iter()
        .map(|(key, value)| format!("`{key}: {value}`"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Join manual capture parts into a single context string.
#[must_use]
pub fn join_context<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report<'a> {
    pub environment: &'a str,
    pub message: &'a str,
    /// Pre-rendered tag string, see [`render_tags`].
    pub tags: &'a str,
    pub custom_message: Option<&'a str>,
    /// Request dump or manual capture text.
    pub context: Option<&'a str>,
    /// `None` when the report was not produced by a panic.
    pub stack_trace: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedReport {
    pub body: String,
    pub trace: String,
}

impl FormattedReport {
    /// One log-file entry: body, trace, CRLF.
    #[must_use]
    pub fn log_entry(&self) -> String {
        format!("{}{}\r\n", self.body, self.trace)
    }
}

#[must_use]
pub fn format(report: &Report<'_>) -> FormattedReport {
    let mut body = format!("[{}] *{}*", report.environment, report.message);

    if !report.tags.is_empty() {
        body.push_str(" | ");
        body.push_str(report.tags);
    }

    if let Some(custom) = report.custom_message.filter(|m| !m.is_empty()) {
        body.push('\n');
        body.push_str(custom);
    }

    if let Some(context) = report.context.filter(|c| !c.is_empty()) {
        body.push(' ');
        body.push_str(FENCE);
        body.push_str(context);
        body.push_str(FENCE);
    }

    let trace = report
        .stack_trace
        .map(|stack| format!("{FENCE}{stack}{FENCE}"))
        .unwrap_or_default();

    FormattedReport { body, trace }
}
