//! Output renderer: one entry point taking a value plus a pretty-print
//! callback, selecting the representation from the user-chosen format.

use crate::error::CliError;
use crate::printer::Printer;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// User-selectable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Invoke the command's pretty-print callback.
    #[default]
    Default,
    /// Indented JSON on stdout.
    Json,
    /// YAML on stdout, with field names matching the JSON representation.
    Yaml,
    /// Suppress result output entirely.
    None,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Default => "default",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::None => "none",
        }
    }
}

/// Marshal a JSON-compatible value to YAML.
///
/// The value goes through `serde_json::Value` first so serde field renames
/// applied for JSON also shape the YAML output.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, CliError> {
    let json_value = serde_json::to_value(value)
        .map_err(|e| CliError::remote("render output", format!("marshal to JSON value: {e}")))?;
    serde_yml::to_string(&json_value)
        .map_err(|e| CliError::remote("render output", format!("marshal to YAML: {e}")))
}

/// Emit `value` according to `format`.
///
/// For `default`, the command-supplied callback runs and its result
/// propagates; for `none`, nothing is written at all.
pub fn output<T: Serialize>(
    p: &Printer,
    format: OutputFormat,
    value: &T,
    pretty: impl FnOnce(&Printer) -> Result<(), CliError>,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|e| CliError::remote("render output", format!("marshal to JSON: {e}")))?;
            p.outputln(&rendered);
            Ok(())
        }
        OutputFormat::Yaml => {
            let mut rendered = to_yaml(value)?;
            if !rendered.ends_with('\n') {
                rendered.push('\n');
            }
            p.output(&rendered);
            Ok(())
        }
        OutputFormat::None => Ok(()),
        OutputFormat::Default => pretty(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_json_round_trips() {
        let value = json!({"id": "v-1", "size": 64, "labels": {"env": "dev"}});
        let rendered = serde_json::to_string_pretty(&value).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_yaml_round_trips_through_json_names() {
        #[derive(Serialize)]
        struct Volume {
            #[serde(rename = "availabilityZone")]
            availability_zone: String,
        }
        let rendered = to_yaml(&Volume {
            availability_zone: "eu01-1".to_string(),
        })
        .unwrap();
        assert!(rendered.contains("availabilityZone"), "{rendered}");
        let parsed: serde_json::Value = serde_yml::from_str(&rendered).unwrap();
        assert_eq!(parsed, json!({"availabilityZone": "eu01-1"}));
    }

    #[test]
    fn test_default_invokes_callback_exactly_once() {
        let p = Printer::new();
        let calls = Cell::new(0);
        output(&p, OutputFormat::Default, &json!({}), |_| {
            calls.set(calls.get() + 1);
            Ok(())
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_structured_formats_never_invoke_callback() {
        let p = Printer::new();
        for format in [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::None] {
            let called = Cell::new(false);
            output(&p, format, &json!({"a": 1}), |_| {
                called.set(true);
                Ok(())
            })
            .unwrap();
            assert!(!called.get(), "{format:?} must not call the pretty callback");
        }
    }

    #[test]
    fn test_callback_error_propagates() {
        let p = Printer::new();
        let result = output(&p, OutputFormat::Default, &json!({}), |_| {
            Err(CliError::EmptyUpdate)
        });
        assert!(matches!(result, Err(CliError::EmptyUpdate)));
    }
}
