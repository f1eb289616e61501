//! Managed database service: instance models, REST client, flavor and
//! storage validation, wait predicates.

use crate::cli::route::RunContext;
use crate::client::{self, ApiClient, Service};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::wait::WaitState;
use serde::{Deserialize, Serialize};

pub mod commands;

pub const STATE_READY: &str = "READY";
pub const STATE_FAILED: &str = "FAILED";
pub const STATE_DELETING: &str = "DELETING";

/// A machine flavor the service offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub cpu: i64,
    pub ram: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub class: String,
    pub size: i64,
}

/// Valid storage configurations for one flavor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageOffering {
    #[serde(default)]
    pub classes: Vec<String>,
    pub range: StorageRange,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageRange {
    pub min: i64,
    pub max: i64,
}

/// A managed database instance as the service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<Flavor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateInstancePayload {
    pub name: String,
    pub flavor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<String>>,
}

/// Partial update; absent fields are left unchanged by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateInstancePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ListInstancesResponse {
    #[serde(default)]
    items: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
struct ListFlavorsResponse {
    #[serde(default)]
    flavors: Vec<Flavor>,
}

/// REST client for the database service, region-scoped at construction.
pub struct DatabaseClient {
    api: ApiClient,
}

impl DatabaseClient {
    pub async fn configure(ctx: &RunContext, global: &GlobalFlags) -> Result<Self, CliError> {
        let api = client::configure(
            &ctx.printer,
            &ctx.settings,
            global,
            &ctx.credentials,
            ctx.cancel.clone(),
            Service::Database,
        )
        .await?;
        Ok(Self { api })
    }

    fn instances_path(project_id: &str) -> String {
        format!("/v1/projects/{project_id}/instances")
    }

    fn instance_path(project_id: &str, instance_id: &str) -> String {
        format!("/v1/projects/{project_id}/instances/{instance_id}")
    }

    pub fn create(&self, project_id: &str) -> CreateInstanceRequest<'_> {
        CreateInstanceRequest {
            client: self,
            project_id: project_id.to_string(),
            payload: None,
        }
    }

    pub fn update(&self, project_id: &str, instance_id: &str) -> UpdateInstanceRequest<'_> {
        UpdateInstanceRequest {
            client: self,
            project_id: project_id.to_string(),
            instance_id: instance_id.to_string(),
            payload: None,
        }
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Instance>, CliError> {
        let response: ListInstancesResponse = self
            .api
            .get_json("list instances", &Self::instances_path(project_id))
            .await?;
        Ok(response.items)
    }

    pub async fn get(&self, project_id: &str, instance_id: &str) -> Result<Instance, CliError> {
        self.api
            .get_json("get instance", &Self::instance_path(project_id, instance_id))
            .await
    }

    pub async fn get_opt(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<Option<Instance>, CliError> {
        self.api
            .get_json_opt("get instance", &Self::instance_path(project_id, instance_id))
            .await
    }

    pub async fn delete(&self, project_id: &str, instance_id: &str) -> Result<(), CliError> {
        self.api
            .delete("delete instance", &Self::instance_path(project_id, instance_id))
            .await
    }

    pub async fn list_flavors(&self, project_id: &str) -> Result<Vec<Flavor>, CliError> {
        let response: ListFlavorsResponse = self
            .api
            .get_json(
                "list flavors",
                &format!("/v1/projects/{project_id}/flavors"),
            )
            .await?;
        Ok(response.flavors)
    }

    pub async fn get_storage_offering(
        &self,
        project_id: &str,
        flavor_id: &str,
    ) -> Result<StorageOffering, CliError> {
        self.api
            .get_json(
                "get storage offering",
                &format!("/v1/projects/{project_id}/storages/{flavor_id}"),
            )
            .await
    }
}

pub struct CreateInstanceRequest<'a> {
    client: &'a DatabaseClient,
    project_id: String,
    payload: Option<CreateInstancePayload>,
}

impl CreateInstanceRequest<'_> {
    pub fn payload(mut self, payload: CreateInstancePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub async fn execute(self) -> Result<Instance, CliError> {
        let payload = self
            .payload
            .ok_or_else(|| CliError::remote("create instance", "request payload is not set"))?;
        self.client
            .api
            .post_json(
                "create instance",
                &DatabaseClient::instances_path(&self.project_id),
                &payload,
            )
            .await
    }
}

pub struct UpdateInstanceRequest<'a> {
    client: &'a DatabaseClient,
    project_id: String,
    instance_id: String,
    payload: Option<UpdateInstancePayload>,
}

impl UpdateInstanceRequest<'_> {
    pub fn payload(mut self, payload: UpdateInstancePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub async fn execute(self) -> Result<Instance, CliError> {
        let payload = self
            .payload
            .ok_or_else(|| CliError::remote("update instance", "request payload is not set"))?;
        self.client
            .api
            .patch_json(
                "update instance",
                &DatabaseClient::instance_path(&self.project_id, &self.instance_id),
                &payload,
            )
            .await
    }
}

fn flavor_summary(flavors: &[Flavor]) -> String {
    flavors
        .iter()
        .map(|f| format!("{} ({} CPU, {} GB RAM)", f.id, f.cpu, f.ram))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the flavor matching the requested cpu/ram pair.
pub fn load_flavor_id(cpu: i64, ram: i64, flavors: &[Flavor]) -> Result<String, CliError> {
    flavors
        .iter()
        .find(|f| f.cpu == cpu && f.ram == ram)
        .map(|f| f.id.clone())
        .ok_or_else(|| CliError::InvalidFlavor {
            details: format!(
                "no flavor matches {cpu} CPU and {ram} GB RAM. Available flavors: {}",
                flavor_summary(flavors)
            ),
        })
}

/// Check that a user-provided flavor ID exists in the offerings.
pub fn validate_flavor_id(flavor_id: &str, flavors: &[Flavor]) -> Result<(), CliError> {
    if flavors.iter().any(|f| f.id == flavor_id) {
        return Ok(());
    }
    Err(CliError::InvalidFlavor {
        details: format!(
            "flavor \"{flavor_id}\" does not exist. Available flavors: {}",
            flavor_summary(flavors)
        ),
    })
}

/// Check a storage configuration against the offering for the chosen flavor.
pub fn validate_storage(
    storage: &Storage,
    offering: &StorageOffering,
    flavor_id: &str,
) -> Result<(), CliError> {
    if !offering.classes.iter().any(|c| c == &storage.class) {
        return Err(CliError::InvalidStorage {
            details: format!(
                "storage class \"{}\" is not valid for flavor \"{flavor_id}\". Available classes: {}",
                storage.class,
                offering.classes.join(", ")
            ),
        });
    }
    if storage.size < offering.range.min || storage.size > offering.range.max {
        return Err(CliError::InvalidStorage {
            details: format!(
                "storage size {} GB is outside the range [{}, {}] for flavor \"{flavor_id}\"",
                storage.size, offering.range.min, offering.range.max
            ),
        });
    }
    Ok(())
}

/// Terminal predicate shared by create and update waiters.
pub fn ready_wait_state(instance: Instance) -> WaitState<Instance> {
    match instance.status.as_deref() {
        Some(STATE_READY) => WaitState::Succeeded(instance),
        Some(STATE_FAILED) => WaitState::Failed("instance entered failed state".to_string()),
        Some(STATE_DELETING) => WaitState::Failed("instance is being deleted".to_string()),
        _ => WaitState::Pending,
    }
}

/// Terminal predicate for a delete waiter: gone is the success terminal.
pub fn delete_wait_state(instance: Option<Instance>) -> WaitState<()> {
    match instance {
        None => WaitState::Succeeded(()),
        Some(_) => WaitState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_flavors() -> Vec<Flavor> {
        vec![
            Flavor {
                id: "flavor-small".to_string(),
                cpu: 2,
                ram: 8,
                description: None,
            },
            Flavor {
                id: "flavor-large".to_string(),
                cpu: 8,
                ram: 32,
                description: None,
            },
        ]
    }

    fn fixture_offering() -> StorageOffering {
        StorageOffering {
            classes: vec!["premium".to_string(), "standard".to_string()],
            range: StorageRange { min: 10, max: 500 },
        }
    }

    #[test]
    fn test_load_flavor_id_matches_cpu_and_ram() {
        let id = load_flavor_id(8, 32, &fixture_flavors()).unwrap();
        assert_eq!(id, "flavor-large");
    }

    #[test]
    fn test_load_flavor_id_reports_available_flavors() {
        let err = load_flavor_id(3, 7, &fixture_flavors()).unwrap_err();
        match err {
            CliError::InvalidFlavor { details } => {
                assert!(details.contains("3 CPU and 7 GB RAM"), "{details}");
                assert!(details.contains("flavor-small"), "{details}");
            }
            other => panic!("expected invalid flavor, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_flavor_id() {
        assert!(validate_flavor_id("flavor-small", &fixture_flavors()).is_ok());
        assert!(matches!(
            validate_flavor_id("flavor-tiny", &fixture_flavors()),
            Err(CliError::InvalidFlavor { .. })
        ));
    }

    #[test]
    fn test_validate_storage_class_membership() {
        let storage = Storage {
            class: "ultra".to_string(),
            size: 64,
        };
        assert!(matches!(
            validate_storage(&storage, &fixture_offering(), "flavor-small"),
            Err(CliError::InvalidStorage { .. })
        ));
    }

    #[test]
    fn test_validate_storage_size_range() {
        let offering = fixture_offering();
        for (size, ok) in [(10, true), (500, true), (9, false), (501, false)] {
            let storage = Storage {
                class: "premium".to_string(),
                size,
            };
            assert_eq!(
                validate_storage(&storage, &offering, "flavor-small").is_ok(),
                ok,
                "size {size}"
            );
        }
    }

    #[test]
    fn test_ready_waiter_terminals() {
        let instance = |status: &str| Instance {
            id: "i-1".to_string(),
            name: None,
            status: Some(status.to_string()),
            version: None,
            flavor: None,
            storage: None,
            acl: None,
        };
        assert!(matches!(
            ready_wait_state(instance(STATE_READY)),
            WaitState::Succeeded(_)
        ));
        assert!(matches!(
            ready_wait_state(instance(STATE_FAILED)),
            WaitState::Failed(_)
        ));
        assert!(matches!(
            ready_wait_state(instance("CREATING")),
            WaitState::Pending
        ));
    }

    #[test]
    fn test_delete_waiter_resolves_when_gone() {
        assert!(matches!(delete_wait_state(None), WaitState::Succeeded(())));
    }
}
