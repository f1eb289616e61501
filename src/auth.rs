//! Authentication: credential persistence and bearer-token resolution.
//!
//! Exactly one flow is active per invocation. Service-account tokens are
//! used as-is; user sessions are refreshed against the stored IDP token
//! endpoint when the access token is past its expiry, rotating the stored
//! record opportunistically.

use crate::error::CliError;
use crate::printer::Printer;
use chrono::Utc;
use serde::Deserialize;

pub mod commands;
pub mod store;

pub use store::{AuthFlow, AuthRecord, CredentialStore};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Resolve the bearer token for API calls under the active flow.
pub async fn access_token(
    p: &Printer,
    store: &CredentialStore,
    http: &reqwest::Client,
) -> Result<String, CliError> {
    let record = store.load()?.ok_or(CliError::Auth)?;
    match record.flow {
        AuthFlow::ServiceAccountToken => record.service_account_token.ok_or(CliError::Auth),
        AuthFlow::UserToken => {
            let access = record.access_token.clone().ok_or(CliError::Auth)?;
            if !record.is_session_expired(Utc::now().timestamp()) {
                return Ok(access);
            }
            p.debug("stored access token is past expiry, refreshing session");
            refresh_session(p, store, http, record).await
        }
    }
}

/// Exchange the refresh token for a new session and persist it.
async fn refresh_session(
    p: &Printer,
    store: &CredentialStore,
    http: &reqwest::Client,
    record: AuthRecord,
) -> Result<String, CliError> {
    let endpoint = record.idp_token_endpoint.clone().ok_or(CliError::Auth)?;
    let refresh_token = record.refresh_token.clone().ok_or(CliError::Auth)?;

    let response = http
        .post(endpoint)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ])
        .send()
        .await
        .map_err(|_| CliError::Auth)?;
    if !response.status().is_success() {
        return Err(CliError::Auth);
    }
    let token: TokenResponse = response.json().await.map_err(|_| CliError::Auth)?;

    let mut rotated = record;
    rotated.access_token = Some(token.access_token.clone());
    if let Some(refreshed) = token.refresh_token {
        rotated.refresh_token = Some(refreshed);
    }
    if let Some(expires_in) = token.expires_in {
        rotated.session_expires_at = Some(Utc::now().timestamp() + expires_in);
    }
    // Rotation is opportunistic; a store failure must not fail the command.
    if let Err(e) = store.save(&rotated) {
        p.debug(&format!("persist refreshed session: {e}"));
    }
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_record_is_an_auth_error() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        let result = access_token(&Printer::new(), &store, &reqwest::Client::new()).await;
        assert!(matches!(result, Err(CliError::Auth)));
    }

    #[tokio::test]
    async fn test_service_account_token_is_returned_verbatim() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        store
            .save(&AuthRecord::service_account(
                "sa-token".to_string(),
                Some("robot@example.com".to_string()),
            ))
            .unwrap();
        let token = access_token(&Printer::new(), &store, &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(token, "sa-token");
    }

    #[tokio::test]
    async fn test_unexpired_user_session_skips_refresh() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        let record = AuthRecord {
            flow: AuthFlow::UserToken,
            access_token: Some("user-token".to_string()),
            session_expires_at: Some(Utc::now().timestamp() + 3600),
            ..AuthRecord::default()
        };
        store.save(&record).unwrap();
        let token = access_token(&Printer::new(), &store, &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(token, "user-token");
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_material_fails() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("credentials.json"));
        let record = AuthRecord {
            flow: AuthFlow::UserToken,
            access_token: Some("stale".to_string()),
            session_expires_at: Some(Utc::now().timestamp() - 10),
            ..AuthRecord::default()
        };
        store.save(&record).unwrap();
        let result = access_token(&Printer::new(), &store, &reqwest::Client::new()).await;
        assert!(matches!(result, Err(CliError::Auth)));
    }
}
