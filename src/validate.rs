//! Primitive validators shared by flag and positional-argument parsing.
//!
//! Validators return the human-readable detail only; callers wrap it into
//! the flag or argument error kind so the dispatcher renders it uniformly.

use regex::Regex;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::OnceLock;
use uuid::Uuid;

fn label_part_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z0-9_-]{1,64}$").expect("static regex"))
}

fn label_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Za-z0-9_-]{0,64}$").expect("static regex"))
}

/// Resource identifiers are UUIDs on the current API surface.
pub fn validate_uuid(value: &str) -> Result<(), String> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| format!("\"{value}\" is not a valid UUID"))
}

/// IP network in CIDR notation, v4 or v6.
pub fn validate_cidr(value: &str) -> Result<(), String> {
    let Some((address, prefix)) = value.split_once('/') else {
        return Err(format!("\"{value}\" is not in CIDR notation (address/prefix)"));
    };
    let address: IpAddr = address
        .parse()
        .map_err(|_| format!("\"{value}\" has an invalid IP address"))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| format!("\"{value}\" has an invalid prefix length"))?;
    let max = if address.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(format!("\"{value}\" has an invalid prefix length (max {max})"));
    }
    Ok(())
}

/// Closed-set membership, e.g. for source types or storage classes.
pub fn validate_one_of(value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(format!(
        "\"{value}\" is not one of the allowed values [{}]",
        allowed.join(", ")
    ))
}

/// `--limit` must be at least 1 when present.
pub fn validate_limit(limit: i64) -> Result<(), String> {
    if limit < 1 {
        return Err("must be greater than 0".to_string());
    }
    Ok(())
}

/// Parse `key=value` label pairs into a sorted map.
///
/// Keys are 1-64 chars of `[A-Za-z0-9_-]`; values may be empty but follow
/// the same character class.
pub fn parse_labels(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut labels = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("\"{pair}\" is not a key=value pair"));
        };
        if !label_part_regex().is_match(key) {
            return Err(format!(
                "label key \"{key}\" must be 1-64 characters of [A-Za-z0-9_-]"
            ));
        }
        if !label_value_regex().is_match(value) {
            return Err(format!(
                "label value \"{value}\" must be at most 64 characters of [A-Za-z0-9_-]"
            ));
        }
        labels.insert(key.to_string(), value.to_string());
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_accepts_canonical_form() {
        assert!(validate_uuid("a6b4c2de-39a2-4d3f-b3a1-6e1e7c3a9f10").is_ok());
    }

    #[test]
    fn test_uuid_rejects_garbage() {
        for bad in ["not-a-uuid", "", "123", "a6b4c2de-39a2-4d3f-b3a1"] {
            assert!(validate_uuid(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_cidr_accepts_v4_and_v6() {
        assert!(validate_cidr("1.2.3.0/24").is_ok());
        assert!(validate_cidr("0.0.0.0/0").is_ok());
        assert!(validate_cidr("2001:db8::/32").is_ok());
    }

    #[test]
    fn test_cidr_rejects_bad_inputs() {
        for bad in ["1.2.3.4", "1.2.3.4/33", "2001:db8::/129", "x/24", "1.2.3.0/"] {
            assert!(validate_cidr(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_one_of_membership() {
        assert!(validate_one_of("image", &["image", "snapshot"]).is_ok());
        let detail = validate_one_of("disk", &["image", "snapshot"]).unwrap_err();
        assert!(detail.contains("image, snapshot"), "{detail}");
    }

    #[test]
    fn test_limit_lower_bound() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-3).is_err());
    }

    #[test]
    fn test_labels_parse_into_sorted_map() {
        let labels = parse_labels(&["env=dev".to_string(), "app=web".to_string()]).unwrap();
        let keys: Vec<_> = labels.keys().cloned().collect();
        assert_eq!(keys, ["app", "env"]);
        assert_eq!(labels["env"], "dev");
    }

    #[test]
    fn test_labels_allow_empty_value() {
        let labels = parse_labels(&["flag=".to_string()]).unwrap();
        assert_eq!(labels["flag"], "");
    }

    #[test]
    fn test_labels_reject_bad_shapes() {
        for bad in ["noequals", "=value", "key with space=x", "key=bad value"] {
            assert!(parse_labels(&[bad.to_string()]).is_err(), "{bad}");
        }
        let long_key = format!("{}=v", "k".repeat(65));
        assert!(parse_labels(&[long_key]).is_err());
    }
}
