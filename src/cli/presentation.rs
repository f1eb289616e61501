//! Presentation: table builders for default-format output.

pub mod database;
pub mod volume;

/// Placeholder for fields the service did not report.
pub(crate) fn dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Compact `key=value` rendering of a label map.
pub(crate) fn labels_summary(labels: Option<&std::collections::BTreeMap<String, String>>) -> String {
    match labels {
        Some(labels) if !labels.is_empty() => labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}
