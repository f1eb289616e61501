//! Database instance commands. Flavor and storage constraints are checked
//! against the service offerings before anything is submitted.

use super::{
    delete_wait_state, load_flavor_id, ready_wait_state, validate_flavor_id, validate_storage,
    CreateInstancePayload, DatabaseClient, Instance, Storage, UpdateInstancePayload,
};
use crate::cli::parse::{
    DatabaseAction, DatabaseInstanceAction, DatabaseInstanceCreateArgs, DatabaseInstanceDeleteArgs,
    DatabaseInstanceListArgs, DatabaseInstanceUpdateArgs,
};
use crate::cli::presentation::database as presentation;
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
use std::time::Duration;

const INSTANCE_ID_ARG: &str = "INSTANCE_ID";

fn wait_config() -> WaitConfig {
    WaitConfig::new(Duration::from_secs(10), Duration::from_secs(45 * 60))
}

pub async fn run(ctx: &RunContext, global: &GlobalFlags, action: DatabaseAction) -> Result<(), CliError> {
    match action {
        DatabaseAction::Instance(instance) => match instance.action {
            DatabaseInstanceAction::Create(args) => create(ctx, global, args).await,
            DatabaseInstanceAction::List(args) => list(ctx, global, args).await,
            DatabaseInstanceAction::Update(args) => update(ctx, global, args).await,
            DatabaseInstanceAction::Delete(args) => delete(ctx, global, args).await,
        },
    }
}

/// Flavor selection as given on the command line: an explicit ID, or a
/// cpu/ram pair resolved against the offerings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FlavorInput {
    Id(String),
    Resources { cpu: i64, ram: i64 },
}

fn parse_flavor_input(
    flavor_id: &Option<String>,
    cpu: Option<i64>,
    ram: Option<i64>,
) -> Result<Option<FlavorInput>, CliError> {
    match (flavor_id, cpu, ram) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(CliError::InvalidFlavor {
            details: "provide either \"flavor-id\" or \"cpu\" and \"ram\", not both".to_string(),
        }),
        (Some(id), None, None) => {
            validate::validate_uuid(id).map_err(|d| CliError::flag("flavor-id", d))?;
            Ok(Some(FlavorInput::Id(id.clone())))
        }
        (None, Some(cpu), Some(ram)) => {
            if cpu < 1 {
                return Err(CliError::flag("cpu", "must be a positive CPU count"));
            }
            if ram < 1 {
                return Err(CliError::flag("ram", "must be a positive amount of RAM in GB"));
            }
            Ok(Some(FlavorInput::Resources { cpu, ram }))
        }
        (None, Some(_), None) | (None, None, Some(_)) => Err(CliError::InvalidFlavor {
            details: "\"cpu\" and \"ram\" must be provided together".to_string(),
        }),
        (None, None, None) => Ok(None),
    }
}

fn parse_acl_flag(acl: &[String]) -> Result<Option<Vec<String>>, CliError> {
    if acl.is_empty() {
        return Ok(None);
    }
    for network in acl {
        validate::validate_cidr(network).map_err(|d| CliError::flag("acl", d))?;
    }
    Ok(Some(acl.to_vec()))
}

// ============ create ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub name: String,
    pub flavor: FlavorInput,
    pub storage_class: Option<String>,
    pub storage_size: Option<i64>,
    pub version: Option<String>,
    pub acl: Option<Vec<String>>,
}

pub(crate) fn parse_create_input(
    global: &GlobalFlags,
    args: &DatabaseInstanceCreateArgs,
) -> Result<CreateInput, CliError> {
    global.require_project_id()?;

    let flavor = parse_flavor_input(&args.flavor_id, args.cpu, args.ram)?.ok_or_else(|| {
        CliError::InvalidFlavor {
            details: "provide \"flavor-id\", or \"cpu\" and \"ram\"".to_string(),
        }
    })?;
    if let Some(size) = args.storage_size {
        if size < 1 {
            return Err(CliError::flag(
                "storage-size",
                "must be a positive storage size in GB",
            ));
        }
    }
    if args.storage_class.is_some() != args.storage_size.is_some() {
        return Err(CliError::flag(
            "storage-class",
            "\"storage-class\" and \"storage-size\" must be provided together",
        ));
    }
    let acl = parse_acl_flag(&args.acl)?;

    Ok(CreateInput {
        global: global.clone(),
        name: args.name.clone(),
        flavor,
        storage_class: args.storage_class.clone(),
        storage_size: args.storage_size,
        version: args.version.clone(),
        acl,
    })
}

/// Resolve the flavor selection against the service offerings.
async fn resolve_flavor(
    client: &DatabaseClient,
    project_id: &str,
    flavor: &FlavorInput,
) -> Result<String, CliError> {
    let flavors = client.list_flavors(project_id).await?;
    match flavor {
        FlavorInput::Id(id) => {
            validate_flavor_id(id, &flavors)?;
            Ok(id.clone())
        }
        FlavorInput::Resources { cpu, ram } => load_flavor_id(*cpu, *ram, &flavors),
    }
}

async fn create(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: DatabaseInstanceCreateArgs,
) -> Result<(), CliError> {
    let model = parse_create_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = DatabaseClient::configure(ctx, &model.global).await?;
    let project_label = model.global.project_label().to_string();

    let flavor_id = resolve_flavor(&client, &model.global.project_id, &model.flavor).await?;
    let storage = match (&model.storage_class, model.storage_size) {
        (Some(class), Some(size)) => {
            let storage = Storage {
                class: class.clone(),
                size,
            };
            let offering = client
                .get_storage_offering(&model.global.project_id, &flavor_id)
                .await?;
            validate_storage(&storage, &offering, &flavor_id)?;
            Some(storage)
        }
        _ => None,
    };

    prompt::confirm(
        model.global.assume_yes,
        &format!("Are you sure you want to create an instance for project {project_label:?}?"),
    )?;

    let mut instance = client
        .create(&model.global.project_id)
        .payload(CreateInstancePayload {
            name: model.name.clone(),
            flavor_id,
            version: model.version.clone(),
            storage,
            acl: model.acl.clone(),
        })
        .execute()
        .await?;

    if !model.global.async_mode {
        let spinner = Spinner::start(&ctx.printer, "Creating instance");
        let instance_id = instance.id.clone();
        instance = wait::wait_for_state(
            &ctx.cancel,
            wait_config(),
            "wait for instance creation",
            || async {
                Ok(ready_wait_state(
                    client.get(&model.global.project_id, &instance_id).await?,
                ))
            },
        )
        .await?;
        spinner.stop();
    }

    output_create_result(&ctx.printer, &model, &project_label, &instance)
}

fn output_create_result(
    p: &Printer,
    model: &CreateInput,
    project_label: &str,
    instance: &Instance,
) -> Result<(), CliError> {
    p.output_result(model.global.output_format, instance, |p| {
        let verb = if model.global.async_mode {
            "Triggered creation of"
        } else {
            "Created"
        };
        p.output(&format!(
            "{verb} instance for project {project_label:?}.\nInstance ID: {}\n",
            instance.id
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
}

pub(crate) fn parse_list_input(
    global: &GlobalFlags,
    args: &DatabaseInstanceListArgs,
) -> Result<ListInput, CliError> {
    global.require_project_id()?;
    if let Some(limit) = args.limit {
        validate::validate_limit(limit).map_err(|d| CliError::flag("limit", d))?;
    }
    Ok(ListInput {
        global: global.clone(),
        limit: args.limit,
    })
}

async fn list(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: DatabaseInstanceListArgs,
) -> Result<(), CliError> {
    let model = parse_list_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = DatabaseClient::configure(ctx, &model.global).await?;
    let instances = client.list(&model.global.project_id).await?;
    if instances.is_empty() {
        ctx.printer.info(&format!(
            "No instances found for project {:?}",
            model.global.project_label()
        ));
        return Ok(());
    }

    let instances = apply_limit(instances, model.limit);
    ctx.printer
        .output_result(model.global.output_format, &instances, |p| {
            presentation::list_table(&instances).display(p);
            Ok(())
        })
}

// ============ update ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub instance_id: String,
    pub flavor: Option<FlavorInput>,
    pub version: Option<String>,
    pub acl: Option<Vec<String>>,
}

pub(crate) fn parse_update_input(
    global: &GlobalFlags,
    args: &DatabaseInstanceUpdateArgs,
) -> Result<UpdateInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.instance_id).map_err(|d| CliError::arg(INSTANCE_ID_ARG, d))?;

    let flavor = parse_flavor_input(&args.flavor_id, args.cpu, args.ram)?;
    let acl = parse_acl_flag(&args.acl)?;
    if flavor.is_none() && args.version.is_none() && acl.is_none() {
        return Err(CliError::EmptyUpdate);
    }

    Ok(UpdateInput {
        global: global.clone(),
        instance_id: args.instance_id.clone(),
        flavor,
        version: args.version.clone(),
        acl,
    })
}

async fn update(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: DatabaseInstanceUpdateArgs,
) -> Result<(), CliError> {
    let model = parse_update_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = DatabaseClient::configure(ctx, &model.global).await?;

    let flavor_id = match &model.flavor {
        Some(flavor) => Some(resolve_flavor(&client, &model.global.project_id, flavor).await?),
        None => None,
    };

    prompt::confirm(
        model.global.assume_yes,
        &format!(
            "Are you sure you want to update instance {:?}?",
            model.instance_id
        ),
    )?;

    client
        .update(&model.global.project_id, &model.instance_id)
        .payload(UpdateInstancePayload {
            flavor_id,
            version: model.version.clone(),
            acl: model.acl.clone(),
        })
        .execute()
        .await?;

    if !model.global.async_mode {
        let spinner = Spinner::start(&ctx.printer, "Updating instance");
        wait::wait_for_state(
            &ctx.cancel,
            wait_config(),
            "wait for instance update",
            || async {
                Ok(ready_wait_state(
                    client
                        .get(&model.global.project_id, &model.instance_id)
                        .await?,
                ))
            },
        )
        .await?;
        spinner.stop();
    }

    let verb = if model.global.async_mode {
        "Triggered update of"
    } else {
        "Updated"
    };
    ctx.printer
        .info(&format!("{verb} instance {:?}", model.instance_id));
    Ok(())
}

// ============ delete ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteInput {
    #[serde(flatten)]
    pub global: GlobalFlags,
    pub instance_id: String,
}

pub(crate) fn parse_delete_input(
    global: &GlobalFlags,
    args: &DatabaseInstanceDeleteArgs,
) -> Result<DeleteInput, CliError> {
    global.require_project_id()?;
    validate::validate_uuid(&args.instance_id).map_err(|d| CliError::arg(INSTANCE_ID_ARG, d))?;
    Ok(DeleteInput {
        global: global.clone(),
        instance_id: args.instance_id.clone(),
    })
}

async fn delete(
    ctx: &RunContext,
    global: &GlobalFlags,
    args: DatabaseInstanceDeleteArgs,
) -> Result<(), CliError> {
    let model = parse_delete_input(global, &args)?;
    debug::log_input_model(&ctx.printer, &model);

    let client = DatabaseClient::configure(ctx, &model.global).await?;
    prompt::confirm(
        model.global.assume_yes,
        &format!(
            "Are you sure you want to delete instance {:?}?",
            model.instance_id
        ),
    )?;

    client
        .delete(&model.global.project_id, &model.instance_id)
        .await?;

    if !model.global.async_mode {
        let spinner = Spinner::start(&ctx.printer, "Deleting instance");
        wait::wait_for_state(
            &ctx.cancel,
            wait_config(),
            "wait for instance deletion",
            || async {
                Ok(delete_wait_state(
                    client
                        .get_opt(&model.global.project_id, &model.instance_id)
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
        .info(&format!("{verb} instance {:?}", model.instance_id));
    Ok(())
}
