//! `auth login` and `auth logout`.
//!
//! Interactive OAuth flows are out of scope here; login activates a
//! long-lived service-account token. These are the only writers of the
//! credential store.

use super::store::AuthRecord;
use crate::cli::parse::{AuthAction, AuthLoginArgs};
use crate::cli::route::RunContext;
use crate::error::CliError;
use crate::globalflags::GlobalFlags;

pub async fn run(ctx: &RunContext, _global: &GlobalFlags, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Login(args) => login(ctx, args),
        AuthAction::Logout => logout(ctx),
    }
}

fn login(ctx: &RunContext, args: AuthLoginArgs) -> Result<(), CliError> {
    if args.service_account_token.trim().is_empty() {
        return Err(CliError::flag(
            "service-account-token",
            "must not be empty",
        ));
    }
    let record = AuthRecord::service_account(
        args.service_account_token,
        args.service_account_email.clone(),
    );
    ctx.credentials.save(&record)?;

    let subject = args
        .service_account_email
        .unwrap_or_else(|| "service account".to_string());
    ctx.printer
        .info(&format!("Authenticated as {subject}. Credentials stored."));
    Ok(())
}

fn logout(ctx: &RunContext) -> Result<(), CliError> {
    ctx.credentials.delete()?;
    ctx.printer.info("Removed stored credentials.");
    Ok(())
}
