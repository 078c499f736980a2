//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (capture, validate), and their associated argument
//! structs. Every option of `capture` has an environment variable
//! equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "panics",
    version,
    about = "Panic and error reporting to chat webhooks and log files",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        panics capture db-timeout \"query took 12s\" --log-directory ./\n  \
        panics capture deploy-failed -c panics.yaml\n  \
        panics validate panics.yaml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a manual error report and wait for delivery
    Capture(Box<CaptureArgs>),

    /// Validate a config file
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        panics capture boom \"line1\" \"line2\" --log-directory ./\n  \
        panics capture cron-failed -c panics.yaml --tag job=nightly\n  \
        PANICS_WEBHOOK_URL=https://hooks.slack.com/... panics capture oops")]
pub struct CaptureArgs {
    /// Error label shown in bold at the head of the report
    pub label: String,

    /// Context lines, joined with a blank line
    pub parts: Vec<String>,

    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "PANICS_CONFIG")]
    pub config: Option<PathBuf>,

    // -- Options (override the config file) --
    /// Environment label
    #[arg(long, env = "PANICS_ENVIRONMENT", help_heading = "Options")]
    pub environment: Option<String>,

    /// Directory holding panics.log
    #[arg(long, env = "PANICS_LOG_DIRECTORY", help_heading = "Options")]
    pub log_directory: Option<String>,

    /// Incoming-webhook URL
    #[arg(long, env = "PANICS_WEBHOOK_URL", help_heading = "Options")]
    pub webhook_url: Option<String>,

    /// Webhook channel override
    #[arg(long, env = "PANICS_WEBHOOK_CHANNEL", help_heading = "Options")]
    pub webhook_channel: Option<String>,

    /// Static tag, repeatable
    #[arg(long = "tag", value_name = "KEY=VALUE", help_heading = "Options")]
    pub tags: Vec<String>,

    /// Message appended to the report
    #[arg(long, env = "PANICS_CUSTOM_MESSAGE", help_heading = "Options")]
    pub custom_message: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "panics.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
