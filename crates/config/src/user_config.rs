//! Per-task user config files

use crate::context::absolutize;
use crate::process::ProcessConfig;
use crate::resolver::ConfigKey;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::warn;
use weft_types::{BuildContext, ContextDir, TaskInfo};

/// Locate the user config file for a task.
///
/// An explicit path wins; otherwise the task's resolver key is consulted
/// and the result is taken relative to the project root.
#[must_use]
pub fn get_user_config_file(
    process: &ProcessConfig,
    context: &BuildContext,
    task: &TaskInfo,
    explicit: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(absolutize(process.cwd(), path));
    }

    let value = process
        .get_config_value(context, &ConfigKey::from(task), None)
        .filter(|value| !value.is_empty())?;
    let root = context.dir(ContextDir::Root).unwrap_or(process.cwd());
    Some(absolutize(root, Path::new(&value.to_string())))
}

/// Merge the user's config file over `defaults` into a fresh object.
///
/// The merge is shallow: each top-level key of the user file replaces the
/// default's. A missing or malformed user file is reported and ignored.
#[must_use]
pub fn fill_config_defaults(user_config_file: Option<&Path>, defaults: &Value) -> Value {
    let mut merged = match defaults {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if let Some(user) = user_config_file.and_then(load_user_config) {
        merged.extend(user);
    }

    Value::Object(merged)
}

fn load_user_config(path: &Path) -> Option<Map<String, Value>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file does not exist, using defaults");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file unreadable, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(path = %path.display(), "config file is not a JSON object, using defaults");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file has errors, using defaults");
            None
        }
    }
}

/// Substitute `{{SRC}}`, `{{WWW}}`, `{{TMP}}`, `{{ROOT}}` and `{{BUILD}}`
/// in every string of `value`, recursing into arrays and objects.
#[must_use]
pub fn replace_path_vars(context: &BuildContext, value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(replace_in_str(context, text)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| replace_path_vars(context, item))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), replace_path_vars(context, item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn replace_in_str(context: &BuildContext, text: &str) -> String {
    const VARS: [(&str, ContextDir); 5] = [
        ("{{SRC}}", ContextDir::Src),
        ("{{WWW}}", ContextDir::Www),
        ("{{TMP}}", ContextDir::Tmp),
        ("{{ROOT}}", ContextDir::Root),
        ("{{BUILD}}", ContextDir::Build),
    ];

    VARS.iter().fold(text.to_string(), |acc, (var, dir)| {
        match context.dir(*dir) {
            Some(path) => acc.replace(var, &path.display().to_string()),
            None => acc,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn context() -> BuildContext {
        BuildContext {
            root_dir: Some("/app".into()),
            tmp_dir: Some("/app/.tmp".into()),
            src_dir: Some("/app/src".into()),
            www_dir: Some("/app/www".into()),
            build_dir: Some("/app/www/build".into()),
            ..BuildContext::default()
        }
    }

    #[test]
    fn test_replace_path_vars_recurses() {
        let value = json!({
            "entry": ["{{SRC}}/main.ts", "{{ROOT}}/polyfills.ts"],
            "output": { "path": "{{BUILD}}", "filename": "main.js" },
            "devtool": 3
        });
        let replaced = replace_path_vars(&context(), &value);
        assert_eq!(
            replaced,
            json!({
                "entry": ["/app/src/main.ts", "/app/polyfills.ts"],
                "output": { "path": "/app/www/build", "filename": "main.js" },
                "devtool": 3
            })
        );
    }

    #[test]
    fn test_fill_config_defaults_shallow_merge() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("bundler.json");
        std::fs::write(&user, r#"{"prod": {"command": ["custom"]}}"#).unwrap();

        let defaults = json!({ "dev": { "command": ["a"] }, "prod": { "command": ["b"], "devtool": "x" } });
        let merged = fill_config_defaults(Some(&user), &defaults);

        assert_eq!(merged["dev"], json!({ "command": ["a"] }));
        assert_eq!(merged["prod"], json!({ "command": ["custom"] }));
        // defaults are not mutated
        assert_eq!(defaults["prod"]["devtool"], json!("x"));
    }

    #[test]
    fn test_fill_config_defaults_missing_or_broken_file() {
        let dir = TempDir::new().unwrap();
        let defaults = json!({ "dev": {} });

        let missing = dir.path().join("nope.json");
        assert_eq!(fill_config_defaults(Some(&missing), &defaults), defaults);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert_eq!(fill_config_defaults(Some(&broken), &defaults), defaults);

        assert_eq!(fill_config_defaults(None, &defaults), defaults);
    }

    #[test]
    fn test_user_config_file_from_resolver() {
        let task = TaskInfo {
            full_arg: "--bundler".into(),
            short_arg: Some("-b".into()),
            env_var: "WEFT_BUNDLER".into(),
            package_config: "weft_bundler".into(),
            default_config_file: "bundler.config.json".into(),
        };

        let mut process = ProcessConfig::new(["-b", "config/bundler.json"], [], "/elsewhere");
        process.set_manifest(None);
        assert_eq!(
            get_user_config_file(&process, &context(), &task, None),
            Some(PathBuf::from("/app/config/bundler.json"))
        );

        assert_eq!(
            get_user_config_file(&process, &context(), &task, Some(Path::new("local.json"))),
            Some(PathBuf::from("/elsewhere/local.json"))
        );

        let mut process = ProcessConfig::new(Vec::<String>::new(), [], "/elsewhere");
        process.set_manifest(None);
        assert_eq!(get_user_config_file(&process, &context(), &task, None), None);
    }
}
