//! `panics capture`: send a manual report from the shell.
//!
//! Loads options from the config file (if any), applies flag and
//! environment overrides, then delivers the report and waits for the
//! sinks so the process does not exit mid-delivery.

use crate::cli::CaptureArgs;
use crate::config::{self, model::Options, parse_tag};
use crate::error::PanicsError;
use crate::logging;
use crate::reporter::Reporter;

pub async fn execute(args: CaptureArgs) -> Result<(), PanicsError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let mut options = match args.config.as_deref() {
        Some(path) => config::load(path).await?,
        None => Options::default(),
    };
    apply_overrides(&mut options, &args)?;

    if !options.webhook_enabled() && options.log_path().is_none() {
        tracing::warn!("no webhook URL or log directory configured, report goes nowhere");
    }

    let reporter = Reporter::new(options);
    reporter.send(&args.label, &args.parts).await;

    tracing::info!(label = %args.label, "capture finished");
    Ok(())
}

/// Flags and environment variables take precedence over file values.
pub fn apply_overrides(options: &mut Options, args: &CaptureArgs) -> Result<(), PanicsError> {
    if let Some(ref environment) = args.environment {
        options.environment.clone_from(environment);
    }
    if let Some(ref dir) = args.log_directory {
        options.log_directory.clone_from(dir);
    }
    if let Some(ref url) = args.webhook_url {
        options.webhook.url.clone_from(url);
    }
    if let Some(ref channel) = args.webhook_channel {
        options.webhook.channel.clone_from(channel);
    }
    if let Some(ref message) = args.custom_message {
        options.custom_message.clone_from(message);
    }
    for raw in &args.tags {
        let (key, value) = parse_tag(raw)?;
        options.tags.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn capture_args(argv: &[&str]) -> CaptureArgs {
        let cli = Cli::parse_from(["panics", "capture"].into_iter().chain(argv.iter().copied()));
        match cli.command {
            Some(Commands::Capture(args)) => *args,
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn flags_override_file_values() {
        let mut options = Options {
            environment: "from-file".into(),
            log_directory: "/var/log".into(),
            ..Options::default()
        };
        options.tags.insert("tier".into(), "silver".into());

        let args = capture_args(&["boom", "--environment", "cli", "--tag", "tier=gold"]);
        apply_overrides(&mut options, &args).unwrap();

        assert_eq!(options.environment, "cli");
        assert_eq!(options.log_directory, "/var/log");
        assert_eq!(options.tags["tier"], "gold");
    }

    #[test]
    fn malformed_tag_is_rejected() {
        let args = capture_args(&["boom", "--tag", "oops"]);
        let result = apply_overrides(&mut Options::default(), &args);
        assert!(matches!(result, Err(PanicsError::InvalidTag(_))));
    }
}
