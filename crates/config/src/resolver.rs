//! Four-tier configuration resolution

use crate::coerce::{coerce_manifest_value, ConfigValue};
use crate::process::ProcessConfig;
use tracing::trace;
use weft_types::{BuildContext, TaskInfo};

/// Where to look for one setting in each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey<'a> {
    pub long_flag: &'a str,
    pub short_flag: Option<&'a str>,
    pub env_var: &'a str,
    pub manifest_field: &'a str,
}

impl<'a> From<&'a TaskInfo> for ConfigKey<'a> {
    fn from(task: &'a TaskInfo) -> Self {
        Self {
            long_flag: &task.full_arg,
            short_flag: task.short_arg.as_deref(),
            env_var: &task.env_var,
            manifest_field: &task.package_config,
        }
    }
}

impl ProcessConfig {
    /// Resolve a setting: CLI argument, then environment, then the manifest's
    /// `config` section, then `default`.
    ///
    /// The manifest tier is only consulted once `context.root_dir` is known.
    /// The default is returned unmodified.
    #[must_use]
    pub fn get_config_value(
        &self,
        context: &BuildContext,
        key: &ConfigKey<'_>,
        default: Option<ConfigValue>,
    ) -> Option<ConfigValue> {
        if let Some(value) = self.arg_value(key.long_flag, key.short_flag) {
            trace!(flag = key.long_flag, value, "resolved from argument");
            return Some(ConfigValue::from(value));
        }

        if let Some(value) = self.env_var(key.env_var).filter(|v| !v.is_empty()) {
            trace!(var = key.env_var, %value, "resolved from environment");
            return Some(value);
        }

        if let Some(value) = context
            .root_dir
            .as_deref()
            .and_then(|root| self.manifest(root))
            .and_then(|manifest| coerce_manifest_value(manifest.config_value(key.manifest_field)))
            .filter(|v| !v.is_empty())
        {
            trace!(field = key.manifest_field, %value, "resolved from package manifest");
            return Some(value);
        }

        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::PackageManifest;
    use serde_json::json;

    const KEY: ConfigKey<'static> = ConfigKey {
        long_flag: "--srcDir",
        short_flag: None,
        env_var: "WEFT_SRC_DIR",
        manifest_field: "weft_src_dir",
    };

    fn rooted() -> BuildContext {
        BuildContext {
            root_dir: Some("/app".into()),
            ..BuildContext::default()
        }
    }

    fn with_manifest(process: &mut ProcessConfig, config: serde_json::Value) {
        let manifest: PackageManifest = serde_json::from_value(json!({ "config": config })).unwrap();
        process.set_manifest(Some(manifest));
    }

    #[test]
    fn test_env_false_is_a_match() {
        let process = ProcessConfig::new(
            Vec::<String>::new(),
            [("WEFT_SRC_DIR".to_string(), "false".to_string())],
            "/app",
        );
        let value = process.get_config_value(&rooted(), &KEY, Some("fallback".into()));
        assert_eq!(value, Some(ConfigValue::Bool(false)));
    }

    #[test]
    fn test_manifest_tier() {
        let mut process = ProcessConfig::new(Vec::<String>::new(), [], "/app");
        with_manifest(&mut process, json!({ "weft_src_dir": "client" }));

        let value = process.get_config_value(&rooted(), &KEY, None);
        assert_eq!(value, Some(ConfigValue::from("client")));
    }

    #[test]
    fn test_empty_values_are_absent_on_every_tier() {
        let mut process = ProcessConfig::new(
            Vec::<String>::new(),
            [("WEFT_SRC_DIR".to_string(), String::new())],
            "/app",
        );
        with_manifest(&mut process, json!({ "weft_src_dir": "" }));

        let value = process.get_config_value(&rooted(), &KEY, Some("fallback".into()));
        assert_eq!(value, Some(ConfigValue::from("fallback")));
    }

    #[test]
    fn test_default_returned_unmodified() {
        let mut process = ProcessConfig::new(Vec::<String>::new(), [], "/app");
        process.set_manifest(None);
        let value = process.get_config_value(&rooted(), &KEY, Some("true".into()));
        assert_eq!(value, Some(ConfigValue::Text("true".into())));
    }

    #[test]
    fn test_manifest_skipped_without_root() {
        let mut process = ProcessConfig::new(Vec::<String>::new(), [], "/app");
        with_manifest(&mut process, json!({ "weft_src_dir": "client" }));

        let value = process.get_config_value(&BuildContext::default(), &KEY, None);
        assert_eq!(value, None);
    }

    #[test]
    fn test_key_from_task_info() {
        let task = TaskInfo {
            full_arg: "--bundler".into(),
            short_arg: Some("-b".into()),
            env_var: "WEFT_BUNDLER".into(),
            package_config: "weft_bundler".into(),
            default_config_file: "bundler.config.json".into(),
        };
        let key = ConfigKey::from(&task);
        assert_eq!(key.short_flag, Some("-b"));
        assert_eq!(key.manifest_field, "weft_bundler");
    }
}
