//! Volume commands: input models, request building, wait orchestration,
//! and output. Parsing and payload construction are pure functions; the
//! runners wire them to the client, the prompt, and the wait handler.

use super::{
    create_wait_state, delete_wait_state, CreateVolumePayload, UpdateVolumePayload, Volume,
    VolumeClient, VolumeSource, SOURCE_TYPES,
};
use crate::cli::parse::{
    VolumeAction, VolumeCreateArgs, VolumeDeleteArgs, VolumeDescribeArgs, VolumeListArgs,
    VolumeUpdateArgs,
};
use crate::cli::presentation::volume as presentation;
use crate::cli::route::RunContext;
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::printer::debug;
use crate::printer::Printer;
use crate::prompt;
use crate::services::apply_limit;
use crate::spinner::Spinner;
use crate::validate;
use crate::wait::{self, WaitConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const VOLUME_ID_ARG: &str = "VOLUME_ID";

fn wait_config() -> WaitConfig {
    WaitConfig::new(Duration::from_secs(3), Duration::from_secs(20 * 60))
}

pub async fn run(ctx: &RunContext, global: &GlobalFlags, action: VolumeAction) -> Result<(), CliError> {
    match action {
        VolumeAction::Create(args) => create(ctx, global, args).await,
        VolumeAction::List(args) => list(ctx, global, args).await,
        VolumeAction::Describe(args) => describe(ctx, global, args).await,
        VolumeAction::Update(args) => update(ctx, global, args).await,
        VolumeAction::Delete(args) => delete(ctx, global, args).await,
    }
}

// ============ create ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub availability_zone: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub performance_class: Option<String>,
    pub size: Option<i64>,
    pub source_id: Option<String>,
    pub source_type: Option<String>,
}

pub(crate) fn parse_create_input(
    global: &GlobalFlags,
    args: &VolumeCreateArgs,
) -> Result<CreateInput, CliError> {
    global.require_project_id()?;

    let labels = parse_label_flag(&args.labels)?;
    if let Some(size) = args.size {
        if size < 1 {
            return Err(CliError::flag("size", "must be a positive volume size in GB"));
        }
    }
    if let Some(source_id) = &args.source_id {
        validate::validate_uuid(source_id).map_err(|d| CliError::flag("source-id", d))?;
    }
    if let Some(source_type) = &args.source_type {
        validate::validate_one_of(source_type, &SOURCE_TYPES)
            .map_err(|d| CliError::flag("source-type", d))?;
    }
    match (&args.source_id, &args.source_type) {
        (Some(_), None) => {
            return Err(CliError::flag(
                "source-type",
                "\"source-id\" and \"source-type\" must be provided together",
            ))
        }
        (None, Some(_)) => {
            return Err(CliError::flag(
                "source-id",
                "\"source-id\" and \"source-type\" must be provided together",
            ))
        }
        _ => {}
    }
    if args.size.is_none() && args.source_id.is_none() {
        return Err(CliError::flag(
            "size",
            "either \"size\" or \"source-id\" and \"source-type\" must be provided",
        ));
    }

    Ok(CreateInput {
        global: global.clone(),
        availability_zone: args.availability_zone.clone(),
        name: args.name.clone(),
        description: args.description.clone(),
        labels,
        performance_class: args.performance_class.clone(),
        size: args.size,
        source_id: args.source_id.clone(),
        source_type: args.source_type.clone(),
    })
}

pub(crate) fn build_create_payload(model: &CreateInput) -> CreateVolumePayload {
    let source = match (&model.source_id, &model.source_type) {
        (Some(id), Some(source_type)) => Some(VolumeSource {
            id: id.clone(),
            source_type: source_type.clone(),
        }),
        _ => None,
    };
    CreateVolumePayload {
        availability_zone: model.availability_zone.clone(),
        name: model.name.clone(),
        description: model.description.clone(),
        performance_class: model.performance_class.clone(),
        size: model.size,
        labels: model.labels.clone(),
        source,
    }
}

async fn create(ctx: &RunContext, global: &GlobalFlags, args: VolumeCreateArgs) -> Result<(), CliError> {
    let model = parse_create_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = VolumeClient::configure(ctx, &model.global).await?;
    let project_label = model.global.project_label().to_string();

    prompt::confirm(
        model.global.assume_yes,
        &format!("Are you sure you want to create a volume for project {project_label:?}?"),
    )?;

    let mut volume = client
        .create(&model.global.project_id)
        .payload(build_create_payload(&model))
        .execute()
        .await?;

    if !model.global.async_mode {
        let spinner = Spinner::start(&ctx.printer, "Creating volume");
        let volume_id = volume.id.clone();
        volume = wait::wait_for_state(
            &ctx.cancel,
            wait_config(),
            "wait for volume creation",
            || async {
                Ok(create_wait_state(
                    client.get(&model.global.project_id, &volume_id).await?,
                ))
            },
        )
        .await?;
        spinner.stop();
    }

    output_create_result(&ctx.printer, &model, &project_label, &volume)
}

fn output_create_result(
    p: &Printer,
    model: &CreateInput,
    project_label: &str,
    volume: &Volume,
) -> Result<(), CliError> {
    p.output_result(model.global.output_format, volume, |p| {
        let verb = if model.global.async_mode {
            "Triggered creation of"
        } else {
            "Created"
        };
        p.output(&format!(
            "{verb} volume for project {project_label:?}.\nVolume ID: {}\n",
            volume.id
        ));
        Ok(())
    })
}

// ============ list ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub limit: Option<i64>,
    pub label_selector: Option<String>,
}

pub(crate) fn parse_list_input(
    global: &GlobalFlags,
    args: &VolumeListArgs,
) -> Result<ListInput, CliError> {
    global.require_project_id()?;
    if let Some(limit) = args.limit {
        validate::validate_limit(limit).map_err(|d| CliError::flag("limit", d))?;
    }
    Ok(ListInput {
        global: global.clone(),
        limit: args.limit,
        label_selector: args.label_selector.clone(),
    })
}

async fn list(ctx: &RunContext, global: &GlobalFlags, args: VolumeListArgs) -> Result<(), CliError> {
    let model = parse_list_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = VolumeClient::configure(ctx, &model.global).await?;
    let volumes = client
        .list(&model.global.project_id, model.label_selector.as_deref())
        .await?;
    if volumes.is_empty() {
        ctx.printer.info(&format!(
            "No volumes found for project {:?}",
            model.global.project_label()
        ));
        return Ok(());
    }

    let volumes = apply_limit(volumes, model.limit);
    ctx.printer
        .output_result(model.global.output_format, &volumes, |p| {
            presentation::list_table(&volumes).display(p);
            Ok(())
        })
}

// ============ describe ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub volume_id: String,
}

pub(crate) fn parse_describe_input(
    global: &GlobalFlags,
    args: &VolumeDescribeArgs,
) -> Result<DescribeInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.volume_id).map_err(|d| CliError::arg(VOLUME_ID_ARG, d))?;
    Ok(DescribeInput {
        global: global.clone(),
        volume_id: args.volume_id.clone(),
    })
}

async fn describe(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: VolumeDescribeArgs,
) -> Result<(), CliError> {
    let model = parse_describe_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = VolumeClient::configure(ctx, &model.global).await?;
    let volume = client.get(&model.global.project_id, &model.volume_id).await?;
    ctx.printer
        .output_result(model.global.output_format, &volume, |p| {
            presentation::describe_table(&volume).display(p);
            Ok(())
        })
}

// ============ update ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub volume_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
}

pub(crate) fn parse_update_input(
    global: &GlobalFlags,
    args: &VolumeUpdateArgs,
) -> Result<UpdateInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.volume_id).map_err(|d| CliError::arg(VOLUME_ID_ARG, d))?;
    let labels = parse_label_flag(&args.labels)?;
    if args.name.is_none() && args.description.is_none() && labels.is_none() {
        return Err(CliError::EmptyUpdate);
    }
    Ok(UpdateInput {
        global: global.clone(),
        volume_id: args.volume_id.clone(),
        name: args.name.clone(),
        description: args.description.clone(),
        labels,
    })
}

async fn update(ctx: &RunContext, global: &GlobalFlags, args: VolumeUpdateArgs) -> Result<(), CliError> {
    let model = parse_update_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = VolumeClient::configure(ctx, &model.global).await?;
    prompt::confirm(
        model.global.assume_yes,
        &format!("Are you sure you want to update volume {:?}?", model.volume_id),
    )?;

    let volume = client
        .update(&model.global.project_id, &model.volume_id)
        .payload(UpdateVolumePayload {
            name: model.name.clone(),
            description: model.description.clone(),
            labels: model.labels.clone(),
        })
        .execute()
        .await?;

    // Volume updates apply synchronously; there is no wait loop and
    // `--async` changes nothing here.
    ctx.printer
        .output_result(model.global.output_format, &volume, |p| {
            p.output(&format!("Updated volume {:?}\n", model.volume_id));
            Ok(())
        })
}

// ============ delete ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub volume_id: String,
}

pub(crate) fn parse_delete_input(
    global: &GlobalFlags,
    args: &VolumeDeleteArgs,
) -> Result<DeleteInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.volume_id).map_err(|d| CliError::arg(VOLUME_ID_ARG, d))?;
    Ok(DeleteInput {
        global: global.clone(),
        volume_id: args.volume_id.clone(),
    })
}

async fn delete(ctx: &RunContext, global: &GlobalFlags, args: VolumeDeleteArgs) -> Result<(), CliError> {
    let model = parse_delete_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = VolumeClient::configure(ctx, &model.global).await?;
    prompt::confirm(
        model.global.assume_yes,
        &format!("Are you sure you want to delete volume {:?}?", model.volume_id),
    )?;

    client
        .delete(&model.global.project_id, &model.volume_id)
        .await?;

    if !model.global.async_mode {
        let spinner = Spinner::start(&ctx.printer, "Deleting volume");
        wait::wait_for_state(
            &ctx.cancel,
            wait_config(),
            "wait for volume deletion",
            || async {
                Ok(delete_wait_state(
                    client
                        .get_opt(&model.global.project_id, &model.volume_id)
                        .await?,
                ))
            },
        )
        .await?;
        spinner.stop();
    }

    let verb = if model.global.async_mode {
        "Triggered deletion of"
    } else {
        "Deleted"
    };
    ctx.printer
        .info(&format!("{verb} volume {:?}", model.volume_id));
    Ok(())
}

fn parse_label_flag(pairs: &[String]) -> Result<Option<BTreeMap<String, String>>, CliError> {
    if pairs.is_empty() {
        return Ok(None);
    }
    validate::parse_labels(pairs)
        .map(Some)
        .map_err(|d| CliError::flag("labels", d))
}
