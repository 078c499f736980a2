//! Serde data structures for the reporter configuration.
//!
//! Contains [`Options`] (the root) and [`WebhookOptions`]. Every field is
//! defaulted so a partial file is valid, and an empty string means
//! "disabled" for the sink-enabling fields. Both types derive `Serialize`
//! and `Deserialize` with `deny_unknown_fields` for strict parsing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::recovery::DEFAULT_MAX_DUMP_BODY;

/// File name appended to [`Options::log_directory`].
pub const LOG_FILE_NAME: &str = "panics.log";

fn is_default_webhook(v: &WebhookOptions) -> bool {
    v.url.is_empty() && v.channel.is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Label printed at the head of every report, e.g. `production`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,

    /// Directory holding `panics.log`. Empty disables the file sink.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_directory: String,

    #[serde(default, skip_serializing_if = "is_default_webhook")]
    pub webhook: WebhookOptions,

    /// Static labels rendered after the message. Ordered by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// Appended on its own line to every report when non-empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_message: String,

    /// Largest request body, in bytes, copied into a panic report.
    /// Unset means [`DEFAULT_MAX_DUMP_BODY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dump_body: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookOptions {
    /// Incoming-webhook URL. Empty disables the remote sink.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Channel override sent with the payload when non-empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,
}

impl Options {
    /// Path of the append-only log, or `None` when the file sink is disabled.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        if self.log_directory.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.log_directory).join(LOG_FILE_NAME))
        }
    }

    #[must_use]
    pub fn webhook_enabled(&self) -> bool {
        !self.webhook.url.is_empty()
    }

    #[must_use]
    pub fn dump_limit(&self) -> usize {
        self.max_dump_body.unwrap_or(DEFAULT_MAX_DUMP_BODY)
    }
}
