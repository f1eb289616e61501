//! Debug capture: redacted dumps of input models and HTTP traffic.
//!
//! Everything here renders to compact `[key: value, ...]` strings with keys
//! ordered alphabetically, so debug logs stay readable and deterministic.
//! Secrets never reach the log: the `Authorization` header and any field
//! whose name contains `token`, `password` or `secret` are replaced.

use crate::error::CliError;
use crate::printer::Printer;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const REDACTED: &str = "[redacted]";

/// Headers worth echoing in debug capture. Everything else is dropped.
const CAPTURED_HEADERS: [&str; 4] = ["accept", "content-type", "content-length", "user-agent"];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("token") || key.contains("password") || key.contains("secret")
}

/// Replace sensitive fields at any nesting depth.
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if is_sensitive_key(key) && !entry.is_null() {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    redact(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact(item);
            }
        }
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn value_str(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let inner: BTreeMap<_, _> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            debug_str_from_map(&inner)
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(value_str).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn debug_str_from_map(map: &BTreeMap<String, Value>) -> String {
    let parts: Vec<String> = map
        .iter()
        .filter(|(_, v)| !is_empty(v))
        .map(|(k, v)| format!("{}: {}", k, value_str(v)))
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Redacted single-line rendering of a parsed input model.
///
/// Empty fields are omitted so unset optional flags do not clutter the dump.
pub fn model_debug_str<T: Serialize>(model: &T) -> Result<String, CliError> {
    let mut value = serde_json::to_value(model)
        .map_err(|e| CliError::Config(format!("serialize input model for debug output: {e}")))?;
    redact(&mut value);
    match value {
        Value::Object(map) => {
            let map: BTreeMap<_, _> = map.into_iter().collect();
            Ok(debug_str_from_map(&map))
        }
        other => Ok(value_str(&other)),
    }
}

/// Emit the parsed input model at debug verbosity.
pub fn log_input_model<T: Serialize>(p: &Printer, model: &T) {
    if !p.is_debug() {
        return;
    }
    match model_debug_str(model) {
        Ok(s) => p.debug(&format!("parsed input model: {s}")),
        Err(e) => p.debug(&format!("render input model for debug output: {e}")),
    }
}

fn header_debug_str(headers: &HeaderMap) -> String {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        if name == AUTHORIZATION {
            map.insert(name.to_string(), Value::String(REDACTED.to_string()));
            continue;
        }
        if !CAPTURED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let rendered = value.to_str().unwrap_or(REDACTED).to_string();
        map.insert(name.to_string(), Value::String(rendered));
    }
    debug_str_from_map(&map)
}

/// Capture an outgoing request: method, URL, filtered headers, body length.
pub fn log_request(p: &Printer, method: &Method, url: &Url, headers: &HeaderMap, body_len: usize) {
    if !p.is_debug() {
        return;
    }
    p.debug(&format!("request to {url}: {method}"));
    p.debug(&format!("request headers: {}", header_debug_str(headers)));
    p.debug(&format!("request body length: {body_len}"));
}

/// Capture a response: status, URL, body length.
pub fn log_response(p: &Printer, status: StatusCode, url: &Url, body_len: usize) {
    if !p.is_debug() {
        return;
    }
    p.debug(&format!("response from {url}: {status}"));
    p.debug(&format!("response body length: {body_len}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
    use serde_json::json;

    #[derive(Serialize)]
    struct SampleModel {
        project_id: String,
        name: Option<String>,
        size: Option<i64>,
        service_account_token: Option<String>,
    }

    #[test]
    fn test_model_debug_str_is_sorted_and_skips_empty() {
        let model = SampleModel {
            project_id: "my-project".to_string(),
            name: None,
            size: Some(64),
            service_account_token: None,
        };
        let s = model_debug_str(&model).unwrap();
        assert_eq!(s, "[project_id: my-project, size: 64]");
    }

    #[test]
    fn test_model_debug_str_redacts_token_fields() {
        let model = SampleModel {
            project_id: "p".to_string(),
            name: Some("n".to_string()),
            size: None,
            service_account_token: Some("very-secret-value".to_string()),
        };
        let s = model_debug_str(&model).unwrap();
        assert!(!s.contains("very-secret-value"), "{s}");
        assert!(s.contains("service_account_token: [redacted]"), "{s}");
    }

    #[test]
    fn test_redact_reaches_nested_objects() {
        let mut v = json!({
            "outer": {
                "password": "hunter2",
                "plain": "visible"
            },
            "list": [{"api_secret": "x"}]
        });
        redact(&mut v);
        assert_eq!(v["outer"]["password"], "[redacted]");
        assert_eq!(v["outer"]["plain"], "visible");
        assert_eq!(v["list"][0]["api_secret"], "[redacted]");
    }

    #[test]
    fn test_sensitive_key_matching_is_case_insensitive() {
        assert!(is_sensitive_key("Access_Token"));
        assert!(is_sensitive_key("PASSWORD"));
        assert!(is_sensitive_key("clientSecret"));
        assert!(!is_sensitive_key("region"));
    }

    #[test]
    fn test_header_capture_redacts_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-internal", HeaderValue::from_static("dropped"));
        let s = header_debug_str(&headers);
        assert!(s.contains("authorization: [redacted]"), "{s}");
        assert!(s.contains("accept: application/json"), "{s}");
        assert!(!s.contains("dropped"), "{s}");
    }
}
