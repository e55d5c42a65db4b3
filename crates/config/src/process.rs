//! Process-wide configuration state

use crate::coerce::{coerce_env_value, ConfigValue};
use crate::constants::{ARG_DEBUG, ENV_VAR_DEBUG_MODE};
use crate::manifest::{FsManifestLoader, ManifestLoader, PackageManifest};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Arguments, environment, working directory and the caches derived from them
///
/// One instance exists per invocation. Everything the resolver reads comes
/// from here, so tests can build an isolated instance instead of touching
/// the real process environment.
pub struct ProcessConfig {
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: PathBuf,
    manifest_loader: Box<dyn ManifestLoader>,
    manifest: OnceLock<Option<PackageManifest>>,
    debug_mode: Option<bool>,
}

impl ProcessConfig {
    /// Create an isolated configuration.
    ///
    /// `args` excludes the program name.
    #[must_use]
    pub fn new(
        args: impl IntoIterator<Item = impl Into<String>>,
        env: impl IntoIterator<Item = (String, String)>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: env.into_iter().collect(),
            cwd: cwd.into(),
            manifest_loader: Box::new(FsManifestLoader),
            manifest: OnceLock::new(),
            debug_mode: None,
        }
    }

    /// Snapshot the real process arguments, environment and working directory.
    #[must_use]
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(std::env::args().skip(1), std::env::vars(), cwd)
    }

    /// Replace the manifest source.
    #[must_use]
    pub fn with_manifest_loader(mut self, loader: impl ManifestLoader + 'static) -> Self {
        self.manifest_loader = Box::new(loader);
        self
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Raw environment view, as handed to child processes.
    #[must_use]
    pub fn env_vars(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Raw, uncoerced environment value.
    #[must_use]
    pub fn raw_env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Coerced environment value; `None` when the key is not in the map.
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<ConfigValue> {
        coerce_env_value(self.raw_env_var(key))
    }

    /// Write a value back into the environment map.
    ///
    /// Empty keys or values are ignored so a real value is never replaced
    /// with nothing.
    pub fn set_env_var(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.env.insert(key.to_string(), value.to_string());
    }

    /// Read a raw environment flag as a boolean (`"true"` only).
    #[must_use]
    pub fn boolean_property(&self, key: &str) -> bool {
        self.raw_env_var(key) == Some("true")
    }

    /// Case-insensitive presence test for a flag.
    #[must_use]
    pub fn has_arg(&self, full_name: &str, short_name: Option<&str>) -> bool {
        let matches = |name: &str| self.args.iter().any(|arg| arg.eq_ignore_ascii_case(name));
        matches(full_name) || short_name.is_some_and(matches)
    }

    /// Value following `full_name` or `short_name` in the argument list.
    ///
    /// A flag followed by nothing or by an empty token does not count, and
    /// scanning continues with later occurrences.
    #[must_use]
    pub fn arg_value(&self, full_name: &str, short_name: Option<&str>) -> Option<&str> {
        self.args
            .iter()
            .enumerate()
            .filter(|(_, arg)| *arg == full_name || short_name == Some(arg.as_str()))
            .find_map(|(i, _)| {
                self.args
                    .get(i + 1)
                    .map(String::as_str)
                    .filter(|value| !value.is_empty())
            })
    }

    /// Pre-seed the manifest cache, bypassing the loader.
    ///
    /// Has no effect once the manifest has been loaded.
    pub fn set_manifest(&mut self, manifest: Option<PackageManifest>) {
        let _ = self.manifest.set(manifest);
    }

    /// The project manifest, loaded at most once.
    ///
    /// Loader failures are logged and cached as "no manifest".
    pub fn manifest(&self, root_dir: &Path) -> Option<&PackageManifest> {
        self.manifest
            .get_or_init(|| match self.manifest_loader.load(root_dir) {
                Ok(manifest) => manifest,
                Err(e) => {
                    debug!(error = %e, "ignoring package manifest");
                    None
                }
            })
            .as_ref()
    }

    /// Detect debug mode once and mirror it into the environment map.
    pub fn check_debug_mode(&mut self) -> bool {
        if let Some(enabled) = self.debug_mode {
            return enabled;
        }
        let enabled = self.detect_debug_mode();
        if enabled {
            self.set_env_var(ENV_VAR_DEBUG_MODE, "true");
        }
        self.debug_mode = Some(enabled);
        enabled
    }

    fn detect_debug_mode(&self) -> bool {
        self.has_arg(ARG_DEBUG, None)
            || self.env_var(ENV_VAR_DEBUG_MODE) == Some(ConfigValue::Bool(true))
    }
}

impl fmt::Debug for ProcessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessConfig")
            .field("args", &self.args)
            .field("cwd", &self.cwd)
            .field("env_len", &self.env.len())
            .field("manifest_loaded", &self.manifest.get().is_some())
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(args: &[&str], env: &[(&str, &str)]) -> ProcessConfig {
        ProcessConfig::new(
            args.iter().copied(),
            env.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())),
            "/work",
        )
    }

    #[test]
    fn test_arg_value_takes_next_token() {
        let p = process(&["build", "--srcDir", "app"], &[]);
        assert_eq!(p.arg_value("--srcDir", None), Some("app"));
        assert_eq!(p.arg_value("--wwwDir", None), None);
    }

    #[test]
    fn test_arg_value_short_flag() {
        let p = process(&["-b", "custom.json"], &[]);
        assert_eq!(p.arg_value("--bundler", Some("-b")), Some("custom.json"));
    }

    #[test]
    fn test_arg_value_empty_or_trailing_is_absent() {
        let p = process(&["--srcDir", ""], &[]);
        assert_eq!(p.arg_value("--srcDir", None), None);

        let p = process(&["--srcDir"], &[]);
        assert_eq!(p.arg_value("--srcDir", None), None);

        let p = process(&["--srcDir", "", "--srcDir", "later"], &[]);
        assert_eq!(p.arg_value("--srcDir", None), Some("later"));
    }

    #[test]
    fn test_has_arg_ignores_case() {
        let p = process(&["--WATCH"], &[]);
        assert!(p.has_arg("--watch", None));
        assert!(!p.has_arg("--prod", Some("-p")));
    }

    #[test]
    fn test_set_env_var_ignores_empty() {
        let mut p = process(&[], &[("WEFT_SRC_DIR", "/app/src")]);
        p.set_env_var("WEFT_SRC_DIR", "");
        assert_eq!(p.raw_env_var("WEFT_SRC_DIR"), Some("/app/src"));

        p.set_env_var("WEFT_SRC_DIR", "/other");
        assert_eq!(p.raw_env_var("WEFT_SRC_DIR"), Some("/other"));
    }

    #[test]
    fn test_debug_mode_from_flag() {
        let mut p = process(&["--debug"], &[]);
        assert!(p.check_debug_mode());
        assert_eq!(p.raw_env_var(ENV_VAR_DEBUG_MODE), Some("true"));
    }

    #[test]
    fn test_debug_mode_from_env_is_cached() {
        let mut p = process(&[], &[(ENV_VAR_DEBUG_MODE, "true")]);
        assert!(p.check_debug_mode());

        // Later changes are not observed once checked
        p.set_env_var(ENV_VAR_DEBUG_MODE, "false");
        assert!(p.check_debug_mode());
    }

    #[test]
    fn test_debug_mode_off_by_default() {
        let mut p = process(&[], &[(ENV_VAR_DEBUG_MODE, "yes")]);
        assert!(!p.check_debug_mode());
    }
}
