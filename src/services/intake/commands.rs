//! Intake user commands.

use super::{IntakeClient, UpdateUserPayload};
use crate::cli::parse::{IntakeAction, IntakeUserAction, IntakeUserUpdateArgs};
use crate::cli::route::RunContext;
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::printer::debug;
use crate::prompt;
use crate::validate;
use serde::Serialize;
use std::collections::BTreeMap;

const USER_ID_ARG: &str = "USER_ID";

pub async fn run(ctx: &RunContext, global: &GlobalFlags, action: IntakeAction) -> Result<(), CliError> {
    match action {
        IntakeAction::User(user) => match user.action {
            IntakeUserAction::Update(args) => update(ctx, global, args).await,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateUserInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub user_id: String,
    pub intake_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
}

pub(crate) fn parse_update_input(
    global: &GlobalFlags,
    args: &IntakeUserUpdateArgs,
) -> Result<UpdateUserInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.user_id).map_err(|d| CliError::arg(USER_ID_ARG, d))?;
    validate::validate_uuid(&args.intake_id).map_err(|d| CliError::flag("intake-id", d))?;

    let labels = if args.labels.is_empty() {
        None
    } else {
        Some(validate::parse_labels(&args.labels).map_err(|d| CliError::flag("labels", d))?)
    };
    if args.display_name.is_none() && args.email.is_none() && labels.is_none() {
        return Err(CliError::EmptyUpdate);
    }

    Ok(UpdateUserInput {
        global: global.clone(),
        user_id: args.user_id.clone(),
        intake_id: args.intake_id.clone(),
        display_name: args.display_name.clone(),
        email: args.email.clone(),
        labels,
    })
}

async fn update(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: IntakeUserUpdateArgs,
) -> Result<(), CliError> {
    let model = parse_update_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = IntakeClient::configure(ctx, &model.global).await?;
    prompt::confirm(
        model.global.assume_yes,
        &format!("Are you sure you want to update user {:?}?", model.user_id),
    )?;

    let user = client
        .update_user(&model.global.project_id, &model.intake_id, &model.user_id)
        .payload(UpdateUserPayload {
            display_name: model.display_name.clone(),
            email: model.email.clone(),
            labels: model.labels.clone(),
        })
        .execute()
        .await?;

    ctx.printer
        .output_result(model.global.output_format, &user, |p| {
            p.output(&format!(
                "Updated user {:?} of intake {:?}\n",
                model.user_id, model.intake_id
            ));
            Ok(())
        })
}
