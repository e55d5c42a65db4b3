//! Value coercion for environment and manifest values

use serde_json::Value;
use std::fmt;

/// A resolved configuration value
///
/// Absence is modelled as `Option::None` by the callers, never as
/// `Bool(false)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
    /// Non-string manifest values (numbers, arrays, objects) pass through as-is
    Json(Value),
}

impl ConfigValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Empty strings count as absent for resolution purposes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(value) if value.is_empty())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Coerce a raw environment value.
///
/// `"true"` and `"false"` become booleans, everything else is kept verbatim.
#[must_use]
pub fn coerce_env_value(raw: Option<&str>) -> Option<ConfigValue> {
    raw.map(|value| match value {
        "true" => ConfigValue::Bool(true),
        "false" => ConfigValue::Bool(false),
        other => ConfigValue::Text(other.to_string()),
    })
}

/// Coerce a value read from the manifest's `config` section.
///
/// JSON `null` is treated like a missing key.
#[must_use]
pub fn coerce_manifest_value(raw: Option<&Value>) -> Option<ConfigValue> {
    match raw? {
        Value::Null => None,
        Value::Bool(value) => Some(ConfigValue::Bool(*value)),
        Value::String(value) => coerce_env_value(Some(value.as_str())),
        other => Some(ConfigValue::Json(other.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_env_coercion() {
        assert_eq!(coerce_env_value(Some("true")), Some(ConfigValue::Bool(true)));
        assert_eq!(coerce_env_value(Some("false")), Some(ConfigValue::Bool(false)));
        assert_eq!(coerce_env_value(Some("42")), Some(ConfigValue::from("42")));
        assert_eq!(coerce_env_value(Some("TRUE")), Some(ConfigValue::from("TRUE")));
        assert_eq!(coerce_env_value(None), None);
    }

    #[test]
    fn test_absent_is_not_false() {
        let absent = coerce_env_value(None);
        let explicit_false = coerce_env_value(Some("false"));
        assert_ne!(absent, explicit_false);
        assert_eq!(explicit_false.and_then(|v| v.as_bool()), Some(false));
    }

    #[test]
    fn test_manifest_coercion() {
        assert_eq!(coerce_manifest_value(Some(&json!("true"))), Some(ConfigValue::Bool(true)));
        assert_eq!(coerce_manifest_value(Some(&json!(false))), Some(ConfigValue::Bool(false)));
        assert_eq!(coerce_manifest_value(Some(&json!(8080))), Some(ConfigValue::Json(json!(8080))));
        assert_eq!(coerce_manifest_value(Some(&Value::Null)), None);
        assert_eq!(coerce_manifest_value(None), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigValue::Bool(true).to_string(), "true");
        assert_eq!(ConfigValue::from("src").to_string(), "src");
        assert_eq!(ConfigValue::Json(json!(3)).to_string(), "3");
    }
}
