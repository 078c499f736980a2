//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`capture`] or [`validate`]. Each handler lives in
//! its own submodule.

pub mod capture;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::PanicsError;

pub async fn dispatch(cli: Cli) -> Result<(), PanicsError> {
    match cli.command {
        Some(Commands::Capture(args)) => capture::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  panics v{version} \u{2014} panic and error reporting\n\n  \
         No command provided. To get started:\n\n    \
         panics capture <label> [context]...   Send a manual report\n    \
         panics validate panics.yaml           Check a config file\n    \
         panics --help                         See all commands and options\n"
    );
}
