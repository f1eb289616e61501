//! Error types for the nimbus CLI.
//!
//! The error kinds form a closed set. Each kind carries the data needed to
//! render a user-facing message; the binary maps the kind to a process exit
//! code via [`CliError::exit_code`].

use thiserror::Error;

/// Exit code for successful invocations.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for command-level failures (remote errors, rejected prompts, ...).
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for usage errors (unknown commands, invalid flags or arguments).
pub const EXIT_USAGE: i32 = 2;
/// Exit code when the invocation was cancelled by a signal.
pub const EXIT_CANCELLED: i32 = 130;

const MISSING_PROJECT_ID: &str = r#"Project ID is required. Set with `config set` or `--project-id`.

You can configure it for all commands by running:
  $ nimbus config set --project-id xxx

or set it through the environment variable [NIMBUS_PROJECT_ID]"#;

const FAILED_AUTH: &str = r#"Authentication failed. Run `auth login`.

You can authenticate with a service account by running:
  $ nimbus auth login --service-account-token xxx"#;

/// Errors surfaced by nimbus commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A project-scoped command was invoked without a project ID.
    #[error("{}", MISSING_PROJECT_ID)]
    MissingProjectId,

    /// A per-flag constraint failed during input-model parsing.
    #[error("Flag `{flag}`: {details}")]
    FlagValidation { flag: String, details: String },

    /// A positional-argument validator failed.
    #[error("Argument `{arg}`: {details}")]
    ArgValidation { arg: String, details: String },

    /// The verb chain did not resolve to a known command.
    #[error("Unknown command: `{token}`")]
    UnknownCommand { token: String },

    /// A partial-update command was invoked with no mutable field.
    #[error("At least one field must be specified to update.")]
    EmptyUpdate,

    /// Flavor validation failed before submit.
    #[error("{details}")]
    InvalidFlavor { details: String },

    /// Storage validation failed before submit.
    #[error("{details}")]
    InvalidStorage { details: String },

    /// Credential acquisition or refresh failed.
    #[error("{}", FAILED_AUTH)]
    Auth,

    /// The control plane answered 403/404 for the scoped project.
    #[error("Project `{label}` not found or inaccessible.")]
    ProjectNotFound { label: String },

    /// Any other non-2xx service response, wrapped with operation context.
    #[error("{context}: {message}")]
    Remote { context: String, message: String },

    /// The user rejected a confirmation prompt (or stdin was not a TTY).
    #[error("Cancelled.")]
    PromptRejected,

    /// The invocation was cancelled by SIGINT/SIGTERM.
    #[error("Cancelled.")]
    Cancelled,

    /// Reading or writing the configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing the credential store failed.
    #[error("Credential storage error: {0}")]
    CredentialStorage(String),
}

impl CliError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingProjectId
            | CliError::FlagValidation { .. }
            | CliError::ArgValidation { .. }
            | CliError::UnknownCommand { .. }
            | CliError::EmptyUpdate => EXIT_USAGE,
            CliError::Cancelled => EXIT_CANCELLED,
            CliError::InvalidFlavor { .. }
            | CliError::InvalidStorage { .. }
            | CliError::Auth
            | CliError::ProjectNotFound { .. }
            | CliError::Remote { .. }
            | CliError::PromptRejected
            | CliError::Config(_)
            | CliError::CredentialStorage(_) => EXIT_FAILURE,
        }
    }

    /// Wrap a remote failure with the operation that was running.
    pub fn remote(context: impl Into<String>, message: impl Into<String>) -> Self {
        CliError::Remote {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Flag validation failure for `flag` with a human-readable detail.
    pub fn flag(flag: impl Into<String>, details: impl Into<String>) -> Self {
        CliError::FlagValidation {
            flag: flag.into(),
            details: details.into(),
        }
    }

    /// Positional-argument validation failure for `arg`.
    pub fn arg(arg: impl Into<String>, details: impl Into<String>) -> Self {
        CliError::ArgValidation {
            arg: arg.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_2() {
        let errors = [
            CliError::MissingProjectId,
            CliError::flag("limit", "must be greater than 0"),
            CliError::arg("VOLUME_ID", "not a valid UUID"),
            CliError::UnknownCommand {
                token: "volmue".to_string(),
            },
            CliError::EmptyUpdate,
        ];
        for e in errors {
            assert_eq!(e.exit_code(), EXIT_USAGE, "{e}");
        }
    }

    #[test]
    fn test_command_failures_exit_1() {
        let errors = [
            CliError::Auth,
            CliError::ProjectNotFound {
                label: "my-project".to_string(),
            },
            CliError::remote("create volume", "internal server error"),
            CliError::PromptRejected,
            CliError::InvalidFlavor {
                details: "no flavor with 3 CPU and 7 GB RAM".to_string(),
            },
        ];
        for e in errors {
            assert_eq!(e.exit_code(), EXIT_FAILURE, "{e}");
        }
    }

    #[test]
    fn test_cancelled_exits_130() {
        assert_eq!(CliError::Cancelled.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn test_prompt_rejection_and_cancellation_share_message() {
        assert_eq!(CliError::PromptRejected.to_string(), "Cancelled.");
        assert_eq!(CliError::Cancelled.to_string(), "Cancelled.");
    }

    #[test]
    fn test_flag_validation_message_shape() {
        let e = CliError::flag("size", "must be a positive integer");
        assert_eq!(e.to_string(), "Flag `size`: must be a positive integer");
    }

    #[test]
    fn test_remote_prepends_operation_context() {
        let e = CliError::remote("wait for volume creation", "volume entered error state");
        assert_eq!(
            e.to_string(),
            "wait for volume creation: volume entered error state"
        );
    }
}
