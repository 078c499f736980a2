//! Options validation with detailed findings.
//!
//! The [`validate`] function checks [`Options`] for problems that would
//! make a sink silently useless: a malformed webhook URL, a channel with
//! no webhook, empty tag keys, or a log directory that does not exist.
//!
//! Findings never stop the reporter from being built. The CLI turns them
//! into an error; [`Reporter::new`](crate::Reporter::new) only logs them.

use std::path::Path;

use url::Url;

use super::model::Options;
use crate::error::ValidationError;

/// Validate a webhook URL. Returns `Ok(())` or a human-readable error.
pub fn validate_webhook_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(options: &Options) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if options.webhook.url.is_empty() {
        if !options.webhook.channel.is_empty() {
            errors.push(ValidationError {
                field: "webhook.channel".into(),
                message: "channel is set but webhook.url is empty, nothing will be posted".into(),
                suggestion: Some("set webhook.url or remove webhook.channel".into()),
            });
        }
    } else if let Err(msg) = validate_webhook_url(&options.webhook.url) {
        errors.push(ValidationError {
            field: "webhook.url".into(),
            message: msg,
            suggestion: Some("e.g. https://hooks.slack.com/services/T000/B000/XXXX".into()),
        });
    }

    if !options.log_directory.is_empty() && !Path::new(&options.log_directory).is_dir() {
        errors.push(ValidationError {
            field: "log_directory".into(),
            message: format!("'{}' is not an existing directory", options.log_directory),
            suggestion: Some("create it first; panics.log is created but directories are not".into()),
        });
    }

    for key in options.tags.keys() {
        if key.trim().is_empty() {
            errors.push(ValidationError {
                field: "tags".into(),
                message: "tag keys cannot be empty".into(),
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::WebhookOptions;

    #[test]
    fn default_options_are_valid() {
        assert!(validate(&Options::default()).is_ok());
    }

    #[test]
    fn webhook_url_must_be_http() {
        assert!(validate_webhook_url("https://hooks.slack.com/services/x").is_ok());
        assert!(validate_webhook_url("ftp://example.com").is_err());
        assert!(validate_webhook_url("not a url").is_err());
    }

    #[test]
    fn channel_without_url_is_flagged() {
        let options = Options {
            webhook: WebhookOptions {
                url: String::new(),
                channel: "#alerts".into(),
            },
            ..Options::default()
        };
        let errors = validate(&options).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "webhook.channel");
    }

    #[test]
    fn missing_log_directory_is_flagged() {
        let options = Options {
            log_directory: "/definitely/not/a/real/dir".into(),
            ..Options::default()
        };
        let errors = validate(&options).unwrap_err();
        assert_eq!(errors[0].field, "log_directory");
    }

    #[test]
    fn empty_tag_key_is_flagged() {
        let mut options = Options::default();
        options.tags.insert(String::new(), "x".into());
        let errors = validate(&options).unwrap_err();
        assert_eq!(errors[0].field, "tags");
    }

    #[test]
    fn all_findings_are_collected() {
        let mut options = Options {
            log_directory: "/definitely/not/a/real/dir".into(),
            webhook: WebhookOptions {
                url: "nope".into(),
                channel: String::new(),
            },
            ..Options::default()
        };
        options.tags.insert(" ".into(), "x".into());
        assert_eq!(validate(&options).unwrap_err().len(), 3);
    }
}
