//! `panics validate`: check a configuration file for problems.
//!
//! Parses and validates the config file, reporting results in either
//! human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::{self, validation};
use crate::error::PanicsError;

pub async fn execute(args: &ValidateArgs) -> Result<(), PanicsError> {
    let path = &args.config;
    let options = config::load(path).await?;

    if let Err(errors) = validation::validate(&options) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} problems\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(PanicsError::ConfigValidation { errors });
    }

    let webhook = options.webhook_enabled();
    let log_file = options.log_path();

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {} is valid", path.display());
            println!("  environment: {}", display_or_none(&options.environment));
            println!("  webhook:     {}", if webhook { "enabled" } else { "disabled" });
            match log_file {
                Some(ref file) => println!("  log file:    {}", file.display()),
                None => println!("  log file:    disabled"),
            }
            println!("  tags:        {}", options.tags.len());
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "environment": options.environment,
                    "webhook": webhook,
                    "log_file": log_file.map(|p| p.display().to_string()),
                    "tags": options.tags.len(),
                })
            );
        }
    }

    Ok(())
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
