//! Credential store: persistent record of authentication material.
//!
//! One JSON file in the configuration directory, created with mode 0600 and
//! replaced atomically. Written on login, read on every client
//! construction, deleted on logout.

use crate::config;
use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CREDENTIAL_FILE_NAME: &str = "credentials.json";

/// Supported authentication flows. Exactly one is active per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFlow {
    UserToken,
    #[default]
    ServiceAccountToken,
}

impl AuthFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFlow::UserToken => "user_token",
            AuthFlow::ServiceAccountToken => "service_account_token",
        }
    }
}

/// Everything the CLI persists about the authenticated principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub flow: AuthFlow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token needs a refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_token_endpoint: Option<String>,
}

impl AuthRecord {
    /// Record for a freshly activated service account.
    pub fn service_account(token: String, email: Option<String>) -> Self {
        Self {
            flow: AuthFlow::ServiceAccountToken,
            service_account_token: Some(token),
            service_account_email: email,
            ..Self::default()
        }
    }

    /// Whether the user session needs a refresh at `now` (unix seconds).
    /// Records without an expiry are treated as expired.
    pub fn is_session_expired(&self, now: i64) -> bool {
        match self.session_expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }
}

/// File-backed credential persistence.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at the platform-conventional location.
    pub fn open_default() -> Result<Self, CliError> {
        Ok(Self::at(config::config_dir()?.join(CREDENTIAL_FILE_NAME)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<AuthRecord>, CliError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CliError::CredentialStorage(format!(
                    "read credential file: {e}"
                )))
            }
        };
        let record = serde_json::from_str(&raw)
            .map_err(|e| CliError::CredentialStorage(format!("parse credential file: {e}")))?;
        Ok(Some(record))
    }

    /// Atomic replace: write a temp file next to the target, fix its
    /// permissions, then rename over the old record.
    pub fn save(&self, record: &AuthRecord) -> Result<(), CliError> {
        let rendered = serde_json::to_string_pretty(record)
            .map_err(|e| CliError::CredentialStorage(format!("serialize credentials: {e}")))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::CredentialStorage(format!("create credential directory: {e}"))
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, rendered)
            .map_err(|e| CliError::CredentialStorage(format!("write credential file: {e}")))?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| CliError::CredentialStorage(format!("replace credential file: {e}")))?;
        Ok(())
    }

    /// Remove the stored record. Succeeds when nothing is stored.
    pub fn delete(&self) -> Result<(), CliError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CliError::CredentialStorage(format!(
                "remove credential file: {e}"
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<(), CliError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| CliError::CredentialStorage(format!("restrict credential file mode: {e}")))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<(), CliError> {
    Ok(())
}
