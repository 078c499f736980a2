//! Panics is a panic-recovery and error-reporting middleware for axum.
//!
//! It recovers panics raised by request handlers, answers the caller with
//! a plain `500`, and reports the occurrence (request dump and stack
//! trace included) to a chat webhook and/or an append-only log file.
//! Errors that are not panics can be reported directly with
//! [`Reporter::capture`].
//!
//! Delivery is best-effort: every sink runs on its own detached task and
//! failures are logged, never returned to the request path.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (capture, validate).
//! - [`config`] -- [`Options`] model, file loading, and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`notify`] -- Webhook and file sinks plus the fire-and-forget dispatcher.
//! - [`recovery`] -- The panic boundary: handler wrapper, tower layer, and
//!   `from_fn` middleware.
//! - [`report`] -- Pure report formatting.
//! - [`reporter`] -- [`Reporter`], the configured, cloneable entry point.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod recovery;
pub mod report;
pub mod reporter;

pub use config::model::{Options, WebhookOptions};
pub use error::PanicsError;
pub use recovery::{Panic, RecoveryLayer};
pub use reporter::Reporter;
