//! Nimbus CLI binary.
//!
//! Parses argv, resolves configuration, dispatches through the route table,
//! and maps the returned error kind to the process exit code.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use nimbus::auth::CredentialStore;
use nimbus::cancel;
use nimbus::cli::{Cli, RunContext};
use nimbus::config::Settings;
use nimbus::error::{CliError, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
use nimbus::globalflags::GlobalFlags;
use nimbus::printer::Printer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(e),
    };

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            Printer::new().error(&e.to_string());
            return e.exit_code();
        }
    };
    let global = GlobalFlags::resolve(&cli.global, &settings);
    let printer = Printer::with_verbosity(global.verbosity.level());

    let credentials = match CredentialStore::open_default() {
        Ok(credentials) => credentials,
        Err(e) => {
            printer.error(&e.to_string());
            return e.exit_code();
        }
    };
    let cancel = cancel::install();
    let ctx = match RunContext::new(printer.clone(), settings, credentials, cancel) {
        Ok(ctx) => ctx,
        Err(e) => {
            printer.error(&e.to_string());
            return e.exit_code();
        }
    };

    tracing::debug!("nimbus dispatching command");

    // Commands run in their own task so a panic surfaces as a join error
    // here instead of tearing down the process without an exit code.
    let handle = tokio::spawn(async move { ctx.execute(cli.command, &global).await });
    match handle.await {
        Ok(Ok(())) => EXIT_SUCCESS,
        Ok(Err(e)) => {
            tracing::debug!("command failed: {e}");
            printer.error(&e.to_string());
            e.exit_code()
        }
        Err(join_error) => {
            let payload = panic_payload(join_error);
            tracing::error!("command panicked: {payload}");
            let wrapped = CliError::remote("run command", "internal error");
            printer.error(&wrapped.to_string());
            printer.debug(&format!("panic payload: {payload}"));
            EXIT_FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NIMBUS_LOG").unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn panic_payload(join_error: tokio::task::JoinError) -> String {
    match join_error.try_into_panic() {
        Ok(payload) => {
            if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic payload".to_string()
            }
        }
        Err(join_error) => join_error.to_string(),
    }
}

/// Map clap's own errors onto the CLI's exit-code discipline: help and
/// version short-circuit with success, everything else is a usage error.
fn handle_parse_error(e: clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            EXIT_SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            let p = Printer::new();
            match unknown_command_token(&e) {
                Some(token) => {
                    p.error(&CliError::UnknownCommand { token }.to_string());
                    p.error("For usage help, run:\n  $ nimbus --help");
                }
                None => {
                    let _ = e.print();
                }
            }
            EXIT_USAGE
        }
        _ => {
            let _ = e.print();
            EXIT_USAGE
        }
    }
}

fn unknown_command_token(e: &clap::Error) -> Option<String> {
    e.context().find_map(|(kind, value)| match (kind, value) {
        (ContextKind::InvalidSubcommand, ContextValue::String(token)) => Some(token.clone()),
        _ => None,
    })
}
