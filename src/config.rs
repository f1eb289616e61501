//! Process-wide configuration store.
//!
//! Settings layer from defaults, the TOML configuration file, environment
//! variables (`NIMBUS_<KEY_UPPER>`), and finally command-line flags (folded
//! in by [`GlobalFlags::resolve`](crate::globalflags::GlobalFlags::resolve)).
//! The recognized key set is closed; `config set` rejects anything else.

use crate::error::CliError;
use crate::validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub mod commands;

/// Environment variable prefix: `NIMBUS_PROJECT_ID`, `NIMBUS_REGION`, ...
pub const ENV_PREFIX: &str = "NIMBUS";

const CONFIG_FILE_NAME: &str = "settings.toml";

/// The closed set of recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ProjectId,
    Region,
    Verbosity,
    AuthFlow,
    TokenStorage,
    VolumeCustomEndpoint,
    DatabaseCustomEndpoint,
    IntakeCustomEndpoint,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::ProjectId,
        ConfigKey::Region,
        ConfigKey::Verbosity,
        ConfigKey::AuthFlow,
        ConfigKey::TokenStorage,
        ConfigKey::VolumeCustomEndpoint,
        ConfigKey::DatabaseCustomEndpoint,
        ConfigKey::IntakeCustomEndpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ProjectId => "project_id",
            ConfigKey::Region => "region",
            ConfigKey::Verbosity => "verbosity",
            ConfigKey::AuthFlow => "auth_flow",
            ConfigKey::TokenStorage => "token_storage",
            ConfigKey::VolumeCustomEndpoint => "volume_custom_endpoint",
            ConfigKey::DatabaseCustomEndpoint => "database_custom_endpoint",
            ConfigKey::IntakeCustomEndpoint => "intake_custom_endpoint",
        }
    }

    pub fn env_var(&self) -> String {
        format!("{ENV_PREFIX}_{}", self.as_str().to_uppercase())
    }

    /// Resolve a user-provided key name; unknown keys are rejected.
    pub fn parse(name: &str) -> Result<Self, CliError> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == name)
            .ok_or_else(|| CliError::arg("KEY", format!("unknown configuration key \"{name}\"")))
    }

    /// Per-key value validation applied by `config set`.
    pub fn validate(&self, value: &str) -> Result<(), CliError> {
        let detail = match self {
            ConfigKey::ProjectId => validate::validate_uuid(value).err(),
            ConfigKey::Region => validate_region(value).err(),
            ConfigKey::Verbosity => {
                validate::validate_one_of(value, &["error", "warn", "info", "debug"]).err()
            }
            ConfigKey::AuthFlow => {
                validate::validate_one_of(value, &["user_token", "service_account_token"]).err()
            }
            ConfigKey::TokenStorage => validate::validate_one_of(value, &["file"]).err(),
            ConfigKey::VolumeCustomEndpoint
            | ConfigKey::DatabaseCustomEndpoint
            | ConfigKey::IntakeCustomEndpoint => validate_endpoint(value).err(),
        };
        match detail {
            Some(detail) => Err(CliError::arg(
                "VALUE",
                format!("invalid value for \"{}\": {detail}", self.as_str()),
            )),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_region(value: &str) -> Result<(), String> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 4
        && bytes[..2].iter().all(u8::is_ascii_lowercase)
        && bytes[2..].iter().all(u8::is_ascii_digit);
    if well_formed {
        Ok(())
    } else {
        Err(format!("\"{value}\" is not a region code (like \"eu01\")"))
    }
}

fn validate_endpoint(value: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(value).map_err(|_| format!("\"{value}\" is not a valid URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("endpoint scheme must be http or https, got \"{other}\"")),
    }
}

/// Typed view of the configuration store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_custom_endpoint: Option<String>,
}

impl Settings {
    /// Load from the default file location plus environment overrides.
    pub fn load() -> Result<Self, CliError> {
        Self::load_from(&default_file_path()?)
    }

    /// Load from `path` (if present) and apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let mut settings = Self::load_file_only(path)?;
        for key in ConfigKey::ALL {
            if let Ok(value) = std::env::var(key.env_var()) {
                settings.set(key, Some(value));
            }
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    /// The file layer alone, without environment overrides. This is what
    /// `config set` and `config unset` mutate.
    pub fn load_file_only(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let cfg = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()
            .map_err(|e| CliError::Config(format!("read configuration file: {e}")))?;
        cfg.try_deserialize()
            .map_err(|e| CliError::Config(format!("parse configuration file: {e}")))
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ProjectId => self.project_id.as_deref(),
            ConfigKey::Region => self.region.as_deref(),
            ConfigKey::Verbosity => self.verbosity.as_deref(),
            ConfigKey::AuthFlow => self.auth_flow.as_deref(),
            ConfigKey::TokenStorage => self.token_storage.as_deref(),
            ConfigKey::VolumeCustomEndpoint => self.volume_custom_endpoint.as_deref(),
            ConfigKey::DatabaseCustomEndpoint => self.database_custom_endpoint.as_deref(),
            ConfigKey::IntakeCustomEndpoint => self.intake_custom_endpoint.as_deref(),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: Option<String>) {
        let slot = match key {
            ConfigKey::ProjectId => &mut self.project_id,
            ConfigKey::Region => &mut self.region,
            ConfigKey::Verbosity => &mut self.verbosity,
            ConfigKey::AuthFlow => &mut self.auth_flow,
            ConfigKey::TokenStorage => &mut self.token_storage,
            ConfigKey::VolumeCustomEndpoint => &mut self.volume_custom_endpoint,
            ConfigKey::DatabaseCustomEndpoint => &mut self.database_custom_endpoint,
            ConfigKey::IntakeCustomEndpoint => &mut self.intake_custom_endpoint,
        };
        *slot = value;
    }

    /// Persist to `path` with an atomic temp-file-and-rename replace.
    pub fn write_to(&self, path: &Path) -> Result<(), CliError> {
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("serialize configuration: {e}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CliError::Config(format!("create configuration directory: {e}")))?;
        }
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, rendered)
            .map_err(|e| CliError::Config(format!("write configuration file: {e}")))?;
        fs::rename(&tmp, path)
            .map_err(|e| CliError::Config(format!("replace configuration file: {e}")))?;
        Ok(())
    }
}

/// Where a configuration value came from. Flags layer on top at global-flag
/// resolution and never appear in the store itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingSource {
    Default,
    File,
    Environment,
}

impl SettingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingSource::Default => "default",
            SettingSource::File => "file",
            SettingSource::Environment => "environment",
        }
    }
}

/// One row of `config list` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Option<String>,
    pub source: SettingSource,
}

/// Effective (key, value, source) triples over the whole closed key set.
pub fn entries(file_settings: &Settings, effective: &Settings) -> Vec<ConfigEntry> {
    ConfigKey::ALL
        .into_iter()
        .map(|key| {
            let source = if std::env::var(key.env_var()).is_ok() {
                SettingSource::Environment
            } else if file_settings.get(key).is_some() {
                SettingSource::File
            } else {
                SettingSource::Default
            };
            ConfigEntry {
                key: key.as_str().to_string(),
                value: effective.get(key).map(String::from),
                source,
            }
        })
        .collect()
}

/// Platform-conventional configuration directory.
pub fn config_dir() -> Result<PathBuf, CliError> {
    directories::ProjectDirs::from("", "", "nimbus")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| CliError::Config("could not determine a configuration directory".to_string()))
}

/// Default location of the configuration file.
pub fn default_file_path() -> Result<PathBuf, CliError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_parse_round_trips() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::parse(key.as_str()).unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ConfigKey::parse("favourite_color").unwrap_err();
        assert!(matches!(err, CliError::ArgValidation { .. }));
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(ConfigKey::ProjectId.env_var(), "NIMBUS_PROJECT_ID");
        assert_eq!(
            ConfigKey::VolumeCustomEndpoint.env_var(),
            "NIMBUS_VOLUME_CUSTOM_ENDPOINT"
        );
    }

    #[test]
    fn test_value_validation_per_key() {
        assert!(ConfigKey::ProjectId
            .validate("a6b4c2de-39a2-4d3f-b3a1-6e1e7c3a9f10")
            .is_ok());
        assert!(ConfigKey::ProjectId.validate("not-a-uuid").is_err());
        assert!(ConfigKey::Region.validate("eu01").is_ok());
        assert!(ConfigKey::Region.validate("europe").is_err());
        assert!(ConfigKey::Verbosity.validate("debug").is_ok());
        assert!(ConfigKey::Verbosity.validate("loud").is_err());
        assert!(ConfigKey::AuthFlow.validate("service_account_token").is_ok());
        assert!(ConfigKey::TokenStorage.validate("keyring").is_err());
        assert!(ConfigKey::VolumeCustomEndpoint
            .validate("https://volume.example.com")
            .is_ok());
        assert!(ConfigKey::VolumeCustomEndpoint.validate("ftp://x").is_err());
        assert!(ConfigKey::VolumeCustomEndpoint.validate("not a url").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = Settings::default();
        settings.set(ConfigKey::ProjectId, Some("p-1".to_string()));
        settings.set(ConfigKey::Region, Some("eu01".to_string()));
        settings.write_to(&path).unwrap();

        let loaded = Settings::load_file_only(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = Settings::load_file_only(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "project_id = \"p\"\nfavourite_color = \"green\"\n").unwrap();
        assert!(Settings::load_file_only(&path).is_err());
    }

    #[test]
    fn test_unset_clears_value() {
        let mut settings = Settings::default();
        settings.set(ConfigKey::Region, Some("eu01".to_string()));
        settings.set(ConfigKey::Region, None);
        assert_eq!(settings.get(ConfigKey::Region), None);
    }

    #[test]
    fn test_entries_report_sources() {
        let mut file_settings = Settings::default();
        file_settings.set(ConfigKey::Region, Some("eu01".to_string()));
        let rows = entries(&file_settings, &file_settings);
        let region = rows.iter().find(|r| r.key == "region").unwrap();
        assert_eq!(region.source, SettingSource::File);
        assert_eq!(region.value.as_deref(), Some("eu01"));
        let project = rows.iter().find(|r| r.key == "project_id").unwrap();
        assert_eq!(project.source, SettingSource::Default);
        assert_eq!(project.value, None);
    }
}
