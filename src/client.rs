//! Authenticated API client factory.
//!
//! One client per service and invocation, carrying the resolved region, the
//! service endpoint (default or operator override), the bearer token, and
//! the debug-capturing hooks. Nothing is cached or retried at this layer.

use crate::auth::{self, CredentialStore};
use crate::cancel::CancelToken;
use crate::config::{ConfigKey, Settings};
use crate::error::CliError;
use crate::globalflags::GlobalFlags;
use crate::printer::{debug, Printer};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The services the core knows how to construct clients for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Volume,
    Database,
    Intake,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Volume => "volume",
            Service::Database => "database",
            Service::Intake => "intake",
        }
    }

    fn endpoint_key(&self) -> ConfigKey {
        match self {
            Service::Volume => ConfigKey::VolumeCustomEndpoint,
            Service::Database => ConfigKey::DatabaseCustomEndpoint,
            Service::Intake => ConfigKey::IntakeCustomEndpoint,
        }
    }

    fn default_endpoint(&self, region: &str) -> String {
        format!("https://{}.api.{}.nimbus.cloud", self.name(), region)
    }
}

/// An authenticated REST client scoped to one service, region and project.
///
/// Region lives on the client; request builders never take one.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    region: String,
    project_label: String,
    printer: Printer,
    cancel: CancelToken,
}

/// Assemble a client for `service` under the active authentication flow.
///
/// User-token sessions past their expiry are refreshed here, before the
/// first request goes out.
pub async fn configure(
    p: &Printer,
    settings: &Settings,
    global: &GlobalFlags,
    store: &CredentialStore,
    cancel: CancelToken,
    service: Service,
) -> Result<ApiClient, CliError> {
    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|_| CliError::Auth)?;
    let token = auth::access_token(p, store, &http).await?;

    let endpoint = match settings.get(service.endpoint_key()) {
        Some(custom) => custom.to_string(),
        None => service.default_endpoint(global.require_region()?),
    };
    let base_url = Url::parse(&endpoint).map_err(|_| CliError::Auth)?;
    p.debug(&format!(
        "configured {} client for endpoint {base_url}",
        service.name()
    ));

    Ok(ApiClient {
        http,
        base_url,
        token,
        region: global.region.clone(),
        project_label: global.project_id.clone(),
        printer: p.clone(),
        cancel,
    })
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: String,
}

/// Error mapping for non-2xx responses.
fn map_status(context: &str, status: StatusCode, body: &[u8], project_label: &str) -> CliError {
    match status {
        StatusCode::UNAUTHORIZED => CliError::Auth,
        StatusCode::FORBIDDEN => CliError::ProjectNotFound {
            label: project_label.to_string(),
        },
        _ => {
            let message = serde_json::from_slice::<RemoteErrorBody>(body)
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            CliError::remote(context, message)
        }
    }
}

fn map_transport_error(context: &str, error: reqwest::Error) -> CliError {
    if error.is_timeout() {
        CliError::remote(context, "request timed out")
    } else if error.is_connect() {
        CliError::remote(context, format!("connection error: {error}"))
    } else {
        CliError::remote(context, format!("HTTP error: {error}"))
    }
}

fn parse_json<T: DeserializeOwned>(context: &str, body: &[u8]) -> Result<T, CliError> {
    serde_json::from_slice(body)
        .map_err(|e| CliError::remote(context, format!("decode response body: {e}")))
}

impl ApiClient {
    pub fn region(&self) -> &str {
        &self.region
    }

    fn url(&self, path: &str) -> Result<Url, CliError> {
        self.base_url
            .join(path)
            .map_err(|e| CliError::remote("build request URL", e.to_string()))
    }

    /// One round trip with debug capture and cancellation on the call.
    async fn send(
        &self,
        context: &str,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, Vec<u8>), CliError> {
        if self.cancel.is_cancelled() {
            return Err(CliError::Cancelled);
        }
        let url = self.url(path)?;
        let mut builder = self
            .http
            .request(method, url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        let mut body_len = 0;
        if let Some(body) = &body {
            body_len = serde_json::to_vec(body).map(|b| b.len()).unwrap_or(0);
            builder = builder.json(body);
        }
        let request = builder
            .build()
            .map_err(|e| CliError::remote(context, format!("build request: {e}")))?;
        debug::log_request(
            &self.printer,
            request.method(),
            request.url(),
            request.headers(),
            body_len,
        );

        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CliError::Cancelled),
            result = self.http.execute(request) => {
                result.map_err(|e| map_transport_error(context, e))?
            }
        };
        let status = response.status();
        let bytes = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CliError::Cancelled),
            result = response.bytes() => {
                result.map_err(|e| map_transport_error(context, e))?
            }
        };
        debug::log_response(&self.printer, status, &url, bytes.len());
        Ok((status, bytes.to_vec()))
    }

    fn check(&self, context: &str, status: StatusCode, body: &[u8]) -> Result<(), CliError> {
        if status.is_success() {
            return Ok(());
        }
        Err(map_status(context, status, body, &self.project_label))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        context: &str,
        path: &str,
    ) -> Result<T, CliError> {
        let (status, body) = self.send(context, Method::GET, path, None).await?;
        self.check(context, status, &body)?;
        parse_json(context, &body)
    }

    /// Like [`get_json`](Self::get_json), but a 404 yields `None`.
    /// Delete waiters poll with this until the resource is gone.
    pub(crate) async fn get_json_opt<T: DeserializeOwned>(
        &self,
        context: &str,
        path: &str,
    ) -> Result<Option<T>, CliError> {
        let (status, body) = self.send(context, Method::GET, path, None).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.check(context, status, &body)?;
        parse_json(context, &body).map(Some)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        context: &str,
        path: &str,
        payload: &B,
    ) -> Result<T, CliError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| CliError::remote(context, format!("serialize request body: {e}")))?;
        let (status, body) = self.send(context, Method::POST, path, Some(body)).await?;
        self.check(context, status, &body)?;
        parse_json(context, &body)
    }

    pub(crate) async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        context: &str,
        path: &str,
        payload: &B,
    ) -> Result<T, CliError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| CliError::remote(context, format!("serialize request body: {e}")))?;
        let (status, body) = self.send(context, Method::PATCH, path, Some(body)).await?;
        self.check(context, status, &body)?;
        parse_json(context, &body)
    }

    pub(crate) async fn delete(&self, context: &str, path: &str) -> Result<(), CliError> {
        let (status, body) = self.send(context, Method::DELETE, path, None).await?;
        self.check(context, status, &body)
    }
}
