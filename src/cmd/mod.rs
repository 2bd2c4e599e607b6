//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`health`].
//! Each handler lives in its own submodule.

pub mod health;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::GatewayServiceError;

pub async fn dispatch(cli: Cli) -> Result<(), GatewayServiceError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  webhook-gateway v{version}: allow-listed webhook relay\n\n  \
         No command provided. To get started:\n\n    \
         webhook-gateway init                     Generate a starter config\n    \
         webhook-gateway run                      Start (auto-detects ./gateway.yaml)\n    \
         webhook-gateway run -c gateway.toml      Start with a specific config file\n    \
         webhook-gateway --help                   See all commands and options\n"
    );
}
