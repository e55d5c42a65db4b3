//! Bundler stats as reported by one build cycle

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report produced by the external bundler for one cycle
///
/// Field names follow the bundler's JSON stats output so the report can be
/// deserialized straight from its stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    #[serde(default)]
    pub errors: Vec<StatsMessage>,
    #[serde(default)]
    pub warnings: Vec<StatsMessage>,
    #[serde(default)]
    pub modules: Vec<StatsModule>,
}

impl BundleStats {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(StatsMessage::render).collect()
    }

    #[must_use]
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(StatsMessage::render).collect()
    }

    /// JSON view of the report, as the bundler itself would print it.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// An error or warning entry
///
/// Older bundlers print bare strings, newer ones print objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(default, rename = "moduleName", skip_serializing_if = "Option::is_none")]
        module_name: Option<String>,
    },
}

impl StatsMessage {
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Detailed {
                message,
                module_name: Some(module),
            } => format!("{module}: {message}"),
            Self::Detailed { message, .. } => message.clone(),
        }
    }
}

impl From<&str> for StatsMessage {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One module of the bundle graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsModule {
    #[serde(default)]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_dependencies: Vec<PathBuf>,
    /// Modules that import this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<ModuleReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReason {
    #[serde(default)]
    pub module_identifier: Option<String>,
}
