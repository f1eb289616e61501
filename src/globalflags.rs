//! Global flags recognized on every command.
//!
//! `GlobalArgs` is the raw clap surface; `GlobalFlags` is the resolved,
//! immutable record every input model embeds by composition. Flags beat
//! environment beats config file beats defaults; the environment and file
//! layers are already folded into [`Settings`](crate::config::Settings)
//! before resolution.

use crate::config::Settings;
use crate::error::CliError;
use crate::printer::Level;
use crate::render::OutputFormat;
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Printer verbosity choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl Verbosity {
    pub fn level(self) -> Level {
        match self {
            Verbosity::Error => Level::Error,
            Verbosity::Warn => Level::Warn,
            Verbosity::Info => Level::Info,
            Verbosity::Debug => Level::Debug,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// Raw global flags as clap parses them.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project ID to scope the command to. Falls back to the configuration
    #[arg(long = "project-id", global = true, value_name = "PROJECT_ID")]
    pub project_id: Option<String>,

    /// Region for region-scoped services. Falls back to the configuration
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Output format for command results
    #[arg(long = "output-format", global = true, value_enum, value_name = "FORMAT")]
    pub output_format: Option<OutputFormat>,

    /// How much diagnostic output to print
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub verbosity: Option<Verbosity>,

    /// Answer every confirmation prompt with yes
    #[arg(short = 'y', long = "assume-yes", global = true)]
    pub assume_yes: bool,

    /// Return right after submission instead of waiting for completion
    #[arg(long = "async", global = true)]
    pub async_mode: bool,
}

/// Resolved global flags, immutable for the rest of the invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalFlags {
    /// Empty when neither flag nor configuration provides one; project-scoped
    /// commands fail their parse in that case.
    pub project_id: String,
    /// Empty when neither flag nor configuration provides one.
    pub region: String,
    pub output_format: OutputFormat,
    pub verbosity: Verbosity,
    pub assume_yes: bool,
    #[serde(rename = "async")]
    pub async_mode: bool,
}

impl GlobalFlags {
    /// Fold the flag layer over the already-layered settings.
    pub fn resolve(args: &GlobalArgs, settings: &Settings) -> Self {
        let verbosity = args
            .verbosity
            .or_else(|| settings.verbosity.as_deref().and_then(Verbosity::parse))
            .unwrap_or_default();
        Self {
            project_id: args
                .project_id
                .clone()
                .or_else(|| settings.project_id.clone())
                .unwrap_or_default(),
            region: args
                .region
                .clone()
                .or_else(|| settings.region.clone())
                .unwrap_or_default(),
            output_format: args.output_format.unwrap_or_default(),
            verbosity,
            assume_yes: args.assume_yes,
            async_mode: args.async_mode,
        }
    }

    /// Guard for project-scoped commands.
    pub fn require_project_id(&self) -> Result<(), CliError> {
        if self.project_id.is_empty() {
            return Err(CliError::MissingProjectId);
        }
        Ok(())
    }

    /// Guard for region-scoped services.
    pub fn require_region(&self) -> Result<&str, CliError> {
        if self.region.is_empty() {
            return Err(CliError::flag(
                "region",
                "region is required; set with `nimbus config set region xxx` or --region",
            ));
        }
        Ok(&self.region)
    }

    /// Human-readable project label for prompts and prose.
    /// Remote name lookup is an external collaborator; the ID is the label.
    pub fn project_label(&self) -> &str {
        &self.project_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(project: Option<&str>, region: Option<&str>, verbosity: Option<&str>) -> Settings {
        Settings {
            project_id: project.map(String::from),
            region: region.map(String::from),
            verbosity: verbosity.map(String::from),
            ..Settings::default()
        }
    }

    #[test]
    fn test_flag_beats_configuration() {
        let args = GlobalArgs {
            project_id: Some("from-flag".to_string()),
            region: Some("eu02".to_string()),
            ..GlobalArgs::default()
        };
        let flags = GlobalFlags::resolve(&args, &settings_with(Some("from-config"), Some("eu01"), None));
        assert_eq!(flags.project_id, "from-flag");
        assert_eq!(flags.region, "eu02");
    }

    #[test]
    fn test_configuration_fills_missing_flags() {
        let flags = GlobalFlags::resolve(
            &GlobalArgs::default(),
            &settings_with(Some("cfg-project"), Some("eu01"), Some("debug")),
        );
        assert_eq!(flags.project_id, "cfg-project");
        assert_eq!(flags.region, "eu01");
        assert_eq!(flags.verbosity, Verbosity::Debug);
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let flags = GlobalFlags::resolve(&GlobalArgs::default(), &Settings::default());
        assert_eq!(flags.project_id, "");
        assert_eq!(flags.region, "");
        assert_eq!(flags.output_format, OutputFormat::Default);
        assert_eq!(flags.verbosity, Verbosity::Info);
        assert!(!flags.assume_yes);
        assert!(!flags.async_mode);
    }

    #[test]
    fn test_require_project_id() {
        let mut flags = GlobalFlags::resolve(&GlobalArgs::default(), &Settings::default());
        assert!(matches!(
            flags.require_project_id(),
            Err(CliError::MissingProjectId)
        ));
        flags.project_id = "p".to_string();
        assert!(flags.require_project_id().is_ok());
    }

    #[test]
    fn test_require_region_names_the_flag() {
        let flags = GlobalFlags::resolve(&GlobalArgs::default(), &Settings::default());
        match flags.require_region() {
            Err(CliError::FlagValidation { flag, .. }) => assert_eq!(flag, "region"),
            other => panic!("expected flag validation, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_configured_verbosity_falls_back_to_default() {
        let flags = GlobalFlags::resolve(
            &GlobalArgs::default(),
            &settings_with(None, None, Some("loud")),
        );
        assert_eq!(flags.verbosity, Verbosity::Info);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let args = GlobalArgs {
            project_id: Some("p".to_string()),
            assume_yes: true,
            ..GlobalArgs::default()
        };
        let settings = settings_with(None, Some("eu01"), Some("warn"));
        assert_eq!(
            GlobalFlags::resolve(&args, &settings),
            GlobalFlags::resolve(&args, &settings)
        );
    }
}
