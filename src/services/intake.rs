//! Data-ingestion pipeline service: intake user models and REST client.

use crate::cli::route::RunContext;
use crate::client::{self, ApiClient, Service};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod commands;

/// A user attached to an intake pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Partial update; absent fields are left unchanged by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateUserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// REST client for the intake service.
pub struct IntakeClient {
    api: ApiClient,
}

impl IntakeClient {
    pub async fn configure(ctx: &RunContext, global: &GlobalFlags) -> Result<Self, CliError> {
        let api = client::configure(
            &ctx.printer,
            &ctx.settings,
            global,
            &ctx.credentials,
            ctx.cancel.clone(),
            Service::Intake,
        )
        .await?;
        Ok(Self { api })
    }

    fn user_path(project_id: &str, intake_id: &str, user_id: &str) -> String {
        format!("/v1/projects/{project_id}/intakes/{intake_id}/users/{user_id}")
    }

    pub fn update_user(
        &self,
        project_id: &str,
        intake_id: &str,
        user_id: &str,
    ) -> UpdateUserRequest<'_> {
        UpdateUserRequest {
            client: self,
            project_id: project_id.to_string(),
            intake_id: intake_id.to_string(),
            user_id: user_id.to_string(),
            payload: None,
        }
    }
}

pub struct UpdateUserRequest<'a> {
    client: &'a IntakeClient,
    project_id: String,
    intake_id: String,
    user_id: String,
    payload: Option<UpdateUserPayload>,
}

impl UpdateUserRequest<'_> {
    pub fn payload(mut self, payload: UpdateUserPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub async fn execute(self) -> Result<IntakeUser, CliError> {
        let payload = self
            .payload
            .ok_or_else(|| CliError::remote("update intake user", "request payload is not set"))?;
        self.client
            .api
            .patch_json(
                "update intake user",
                &IntakeClient::user_path(&self.project_id, &self.intake_id, &self.user_id),
                &payload,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_payload_serializes_only_present_fields() {
        let payload = UpdateUserPayload {
            display_name: Some("Jamie".to_string()),
            email: None,
            labels: None,
        };
        let rendered = serde_json::to_string(&payload).unwrap();
        assert_eq!(rendered, r#"{"display_name":"Jamie"}"#);
    }

    #[test]
    fn test_user_path_nests_under_intake() {
        assert_eq!(
            IntakeClient::user_path("p", "i", "u"),
            "/v1/projects/p/intakes/i/users/u"
        );
    }
}
