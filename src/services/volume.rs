//! Compute volume service: resource models, REST client, wait predicates.

use crate::cli::route::RunContext;
use crate::client::{self, ApiClient, Service};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::wait::WaitState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod commands;

pub const STATE_CREATING: &str = "CREATING";
pub const STATE_AVAILABLE: &str = "AVAILABLE";
pub const STATE_ERROR: &str = "ERROR";
pub const STATE_DELETING: &str = "DELETING";

/// Volume source types accepted by the control plane.
pub const SOURCE_TYPES: [&str; 4] = ["image", "snapshot", "backup", "volume"];

/// A block-storage volume as the service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<VolumeSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateVolumePayload {
    pub availability_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VolumeSource>,
}

/// Partial update; absent fields are left unchanged by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateVolumePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ListVolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

/// REST client for the volume service, region-scoped at construction.
pub struct VolumeClient {
    api: ApiClient,
}

impl VolumeClient {
    pub async fn configure(ctx: &RunContext, global: &GlobalFlags) -> Result<Self, CliError> {
        let api = client::configure(
            &ctx.printer,
            &ctx.settings,
            global,
            &ctx.credentials,
            ctx.cancel.clone(),
            Service::Volume,
        )
        .await?;
        Ok(Self { api })
    }

    fn volumes_path(project_id: &str) -> String {
        format!("/v1/projects/{project_id}/volumes")
    }

    fn volume_path(project_id: &str, volume_id: &str) -> String {
        format!("/v1/projects/{project_id}/volumes/{volume_id}")
    }

    /// Start building a create request; attach the payload, then execute.
    pub fn create(&self, project_id: &str) -> CreateVolumeRequest<'_> {
        CreateVolumeRequest {
            client: self,
            project_id: project_id.to_string(),
            payload: None,
        }
    }

    pub fn update(&self, project_id: &str, volume_id: &str) -> UpdateVolumeRequest<'_> {
        UpdateVolumeRequest {
            client: self,
            project_id: project_id.to_string(),
            volume_id: volume_id.to_string(),
            payload: None,
        }
    }

    pub async fn list(
        &self,
        project_id: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<Volume>, CliError> {
        let mut path = Self::volumes_path(project_id);
        if let Some(selector) = label_selector {
            path = format!("{path}?label_selector={selector}");
        }
        let response: ListVolumesResponse = self.api.get_json("list volumes", &path).await?;
        Ok(response.items)
    }

    pub async fn get(&self, project_id: &str, volume_id: &str) -> Result<Volume, CliError> {
        self.api
            .get_json("get volume", &Self::volume_path(project_id, volume_id))
            .await
    }

    /// Fetch that maps 404 to `None`; the delete waiter polls with this.
    pub async fn get_opt(
        &self,
        project_id: &str,
        volume_id: &str,
    ) -> Result<Option<Volume>, CliError> {
        self.api
            .get_json_opt("get volume", &Self::volume_path(project_id, volume_id))
            .await
    }

    pub async fn delete(&self, project_id: &str, volume_id: &str) -> Result<(), CliError> {
        self.api
            .delete("delete volume", &Self::volume_path(project_id, volume_id))
            .await
    }
}

pub struct CreateVolumeRequest<'a> {
    client: &'a VolumeClient,
    project_id: String,
    payload: Option<CreateVolumePayload>,
}

impl CreateVolumeRequest<'_> {
    pub fn payload(mut self, payload: CreateVolumePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub async fn execute(self) -> Result<Volume, CliError> {
        let payload = self
            .payload
            .ok_or_else(|| CliError::remote("create volume", "request payload is not set"))?;
        self.client
            .api
            .post_json(
                "create volume",
                &VolumeClient::volumes_path(&self.project_id),
                &payload,
            )
            .await
    }
}

pub struct UpdateVolumeRequest<'a> {
    client: &'a VolumeClient,
    project_id: String,
    volume_id: String,
    payload: Option<UpdateVolumePayload>,
}

impl UpdateVolumeRequest<'_> {
    pub fn payload(mut self, payload: UpdateVolumePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub async fn execute(self) -> Result<Volume, CliError> {
        let payload = self
            .payload
            .ok_or_else(|| CliError::remote("update volume", "request payload is not set"))?;
        self.client
            .api
            .patch_json(
                "update volume",
                &VolumeClient::volume_path(&self.project_id, &self.volume_id),
                &payload,
            )
            .await
    }
}

/// Terminal predicate for a create waiter.
///
/// A volume that starts deleting mid-create counts as a failure terminal.
pub fn create_wait_state(volume: Volume) -> WaitState<Volume> {
    match volume.status.as_deref() {
        Some(STATE_AVAILABLE) => WaitState::Succeeded(volume),
        Some(STATE_ERROR) => WaitState::Failed("volume entered error state".to_string()),
        Some(STATE_DELETING) => WaitState::Failed("volume is being deleted".to_string()),
        _ => WaitState::Pending,
    }
}

/// Terminal predicate for a delete waiter: gone is the success terminal.
pub fn delete_wait_state(volume: Option<Volume>) -> WaitState<()> {
    match volume {
        None => WaitState::Succeeded(()),
        Some(_) => WaitState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_with_status(status: Option<&str>) -> Volume {
        Volume {
            id: "v-1".to_string(),
            name: None,
            availability_zone: None,
            description: None,
            performance_class: None,
            size: None,
            status: status.map(String::from),
            labels: None,
            source: None,
        }
    }

    #[test]
    fn test_create_waiter_resolves_on_available() {
        let state = create_wait_state(volume_with_status(Some(STATE_AVAILABLE)));
        assert!(matches!(state, WaitState::Succeeded(v) if v.id == "v-1"));
    }

    #[test]
    fn test_create_waiter_fails_on_error_and_deleting() {
        assert!(matches!(
            create_wait_state(volume_with_status(Some(STATE_ERROR))),
            WaitState::Failed(_)
        ));
        assert!(matches!(
            create_wait_state(volume_with_status(Some(STATE_DELETING))),
            WaitState::Failed(_)
        ));
    }

    #[test]
    fn test_create_waiter_pends_on_creating_or_unknown() {
        assert!(matches!(
            create_wait_state(volume_with_status(Some(STATE_CREATING))),
            WaitState::Pending
        ));
        assert!(matches!(
            create_wait_state(volume_with_status(None)),
            WaitState::Pending
        ));
    }

    #[test]
    fn test_delete_waiter_resolves_when_gone() {
        assert!(matches!(delete_wait_state(None), WaitState::Succeeded(())));
        assert!(matches!(
            delete_wait_state(Some(volume_with_status(Some(STATE_DELETING)))),
            WaitState::Pending
        ));
    }

    #[test]
    fn test_update_payload_serializes_only_present_fields() {
        let payload = UpdateVolumePayload {
            name: Some("volume-2".to_string()),
            description: None,
            labels: None,
        };
        let rendered = serde_json::to_string(&payload).unwrap();
        assert_eq!(rendered, r#"{"name":"volume-2"}"#);
    }

    #[test]
    fn test_source_serializes_with_wire_field_name() {
        let source = VolumeSource {
            id: "s-1".to_string(),
            source_type: "image".to_string(),
        };
        let rendered = serde_json::to_string(&source).unwrap();
        assert_eq!(rendered, r#"{"id":"s-1","type":"image"}"#);
    }
}
