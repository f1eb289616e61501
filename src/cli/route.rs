//! Route table: dispatches the parsed command tree to its runner.
//!
//! The context carries the process-wide read-mostly state (printer, layered
//! settings, credential store, cancellation token). Mutation of settings
//! and credentials happens only inside the `config` and `auth` runners.

use crate::auth::{self, CredentialStore};
use crate::cancel::CancelToken;
use crate::cli::parse::{BetaAction, Commands};
use crate::config::{self, Settings};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::printer::Printer;
use crate::services;
use std::path::PathBuf;

/// Runtime context for one invocation.
pub struct RunContext {
    pub printer: Printer,
    pub settings: Settings,
    pub credentials: CredentialStore,
    pub cancel: CancelToken,
    pub config_path: PathBuf,
}

impl RunContext {
    pub fn new(
        printer: Printer,
        settings: Settings,
        credentials: CredentialStore,
        cancel: CancelToken,
    ) -> Result<Self, CliError> {
        Ok(Self {
            printer,
            settings,
            credentials,
            cancel,
            config_path: config::default_file_path()?,
        })
    }

    /// Execute one command end-to-end. The returned error kind selects the
    /// process exit code in the binary.
    pub async fn execute(&self, command: Commands, global: &GlobalFlags) -> Result<(), CliError> {
        match command {
            Commands::Volume(volume) => {
                services::volume::commands::run(self, global, volume.action).await
            }
            Commands::Database(database) => {
                services::database::commands::run(self, global, database.action).await
            }
            Commands::Intake(intake) => {
                services::intake::commands::run(self, global, intake.action).await
            }
            // The beta tree reuses the stable leaves; only the mount point
            // differs.
            Commands::Beta(beta) => match beta.action {
                BetaAction::Volume(volume) => {
                    services::volume::commands::run(self, global, volume.action).await
                }
            },
            Commands::Config(config_cmd) => {
                config::commands::run(self, global, config_cmd.action).await
            }
            Commands::Auth(auth_cmd) => auth::commands::run(self, global, auth_cmd.action).await,
        }
    }
}
