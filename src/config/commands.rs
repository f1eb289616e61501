//! `config set`, `config unset`, and `config list`.
//!
//! These are the only writers of the configuration file; service commands
//! treat the store as read-only.

use crate::cli::parse::ConfigAction;
use crate::cli::route::RunContext;
use crate::config::{self, ConfigKey, Settings};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::table::Table;

pub async fn run(ctx: &RunContext, global: &GlobalFlags, action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Set { key, value } => set(ctx, &key, &value),
        ConfigAction::Unset { key } => unset(ctx, &key),
        ConfigAction::List => list(ctx, global),
    }
}

fn set(ctx: &RunContext, key: &str, value: &str) -> Result<(), CliError> {
    let key = ConfigKey::parse(key)?;
    key.validate(value)?;

    let mut settings = Settings::load_file_only(&ctx.config_path)?;
    settings.set(key, Some(value.to_string()));
    settings.write_to(&ctx.config_path)?;
    ctx.printer
        .info(&format!("Updated configuration key \"{key}\""));
    Ok(())
}

fn unset(ctx: &RunContext, key: &str) -> Result<(), CliError> {
    let key = ConfigKey::parse(key)?;
    let mut settings = Settings::load_file_only(&ctx.config_path)?;
    settings.set(key, None);
    settings.write_to(&ctx.config_path)?;
    ctx.printer
        .info(&format!("Removed configuration key \"{key}\""));
    Ok(())
}

fn list(ctx: &RunContext, global: &GlobalFlags) -> Result<(), CliError> {
    let file_settings = Settings::load_file_only(&ctx.config_path)?;
    let entries = config::entries(&file_settings, &ctx.settings);

    ctx.printer
        .output_result(global.output_format, &entries, |p| {
            let mut table = Table::new();
            table.set_header(["KEY", "VALUE", "SOURCE"]);
            for entry in &entries {
                table.add_row([
                    entry.key.clone(),
                    entry.value.clone().unwrap_or_else(|| "-".to_string()),
                    entry.source.as_str().to_string(),
                ]);
            }
            table.display(p);
            Ok(())
        })
}
