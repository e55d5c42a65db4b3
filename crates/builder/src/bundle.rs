//! The bundle task

use crate::bundler::{BundleConfig, Bundler};
use crate::full::run_full_build;
use crate::incremental::IncrementalBuilder;
use crate::scope::TaskScope;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;
use weft_config::constants::{ENV_PRINT_DEPENDENCY_TREE, ENV_WEBPACK_LOADER};
use weft_config::{fill_config_defaults, get_user_config_file, replace_path_vars, ProcessConfig};
use weft_errors::{BuildError, Error, Result};
use weft_events::{EventEmitter, EventSender};
use weft_types::{BuildContext, BuildState, BundleStats, ContextDir, TaskInfo};

const DEFAULT_BUNDLER_CONFIG: &str = include_str!("../config/bundler.config.json");

/// How the bundler config file is located
#[must_use]
pub fn bundler_task_info() -> TaskInfo {
    TaskInfo {
        full_arg: "--bundler".into(),
        short_arg: Some("-b".into()),
        env_var: "WEFT_BUNDLER".into(),
        package_config: "weft_bundler".into(),
        default_config_file: "bundler.config.json".into(),
    }
}

/// Resolve the bundler config for this context.
///
/// The user's config file is merged over the built-in defaults, the `prod`
/// section is picked for AOT builds and `dev` otherwise, and path variables
/// are expanded.
///
/// # Errors
///
/// Returns `BuildError::InvalidBundlerConfig` if the chosen section is
/// missing or malformed.
pub fn get_bundle_config(
    process: &ProcessConfig,
    context: &BuildContext,
    config_file: Option<&Path>,
) -> Result<BundleConfig> {
    let task = bundler_task_info();
    let user_file = get_user_config_file(process, context, &task, config_file);
    debug!(
        user_file = ?user_file,
        defaults = %task.default_config_file,
        "loading bundler config"
    );

    let defaults: Value =
        serde_json::from_str(DEFAULT_BUNDLER_CONFIG).map_err(|e| BuildError::InvalidBundlerConfig {
            message: format!("built-in defaults: {e}"),
        })?;
    let dictionary = fill_config_defaults(user_file.as_deref(), &defaults);

    let section = if context.run_aot() { "prod" } else { "dev" };
    let raw = dictionary
        .get(section)
        .ok_or_else(|| BuildError::InvalidBundlerConfig {
            message: format!("missing `{section}` section"),
        })?;

    let mut config: BundleConfig = serde_json::from_value(replace_path_vars(context, raw))
        .map_err(|e| BuildError::InvalidBundlerConfig {
            message: format!("`{section}` section: {e}"),
        })?;
    config.env = process.env_vars().clone();
    config.cwd = context.root_dir.clone();
    config.watch_dir = context.src_dir.clone();
    Ok(config)
}

/// Runs bundles for one context, in full or watch mode
pub struct BundleTask {
    bundler: Arc<dyn Bundler>,
    incremental: IncrementalBuilder,
    events: Option<EventSender>,
}

impl std::fmt::Debug for BundleTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleTask")
            .field("incremental", &self.incremental)
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

impl BundleTask {
    #[must_use]
    pub fn new(bundler: Arc<dyn Bundler>) -> Self {
        Self {
            incremental: IncrementalBuilder::new(Arc::clone(&bundler)),
            bundler,
            events: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn incremental(&self) -> &IncrementalBuilder {
        &self.incremental
    }

    /// Bundle the project and record the results on `context`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Stale` untouched when a newer watch request took the
    /// result. Any other failure comes back as a build error that has
    /// already been logged.
    pub async fn bundle(
        &self,
        process: &ProcessConfig,
        context: &mut BuildContext,
        config_file: Option<&Path>,
    ) -> Result<()> {
        let scope = TaskScope::start("bundle", self.events.clone());

        match self.worker(&scope, process, context, config_file).await {
            Ok(()) => {
                context.bundle_state = Some(BuildState::SuccessfulBuild);
                scope.finish();
                Ok(())
            }
            Err(Error::Stale) => {
                scope.emit_build_superseded();
                Err(Error::Stale)
            }
            Err(err) => {
                context.bundle_state = Some(BuildState::RequiresBuild);
                Err(scope.fail(err.into_build_error()))
            }
        }
    }

    async fn worker(
        &self,
        scope: &TaskScope,
        process: &ProcessConfig,
        context: &mut BuildContext,
        config_file: Option<&Path>,
    ) -> Result<()> {
        let config = get_bundle_config(process, context, config_file)?;

        let stats = if context.is_watch() {
            self.incremental.request(context, &config)?.await?
        } else {
            run_full_build(self.bundler.as_ref(), &config).await?
        };

        for warning in stats.warning_messages() {
            scope.emit_build_warning(warning);
        }
        build_complete(process, context, &stats);
        scope.emit_build_completed(
            stats.modules.len(),
            stats.warnings.len(),
            context.bundled_file_paths.len(),
        );
        Ok(())
    }
}

/// Record what the last bundle produced.
pub fn build_complete(process: &ProcessConfig, context: &mut BuildContext, stats: &BundleStats) {
    if process.boolean_property(ENV_PRINT_DEPENDENCY_TREE) {
        let map = dependency_map(stats, process.raw_env_var(ENV_WEBPACK_LOADER));
        print_dependency_map(&map);
    }

    context.module_files = module_files(stats);
    context.bundled_file_paths = context
        .dir(ContextDir::Build)
        .map(bundled_file_paths)
        .unwrap_or_default();
}

/// Source files that went into the bundle, in report order.
#[must_use]
pub fn module_files(stats: &BundleStats) -> Vec<PathBuf> {
    stats
        .modules
        .iter()
        .flat_map(|module| {
            if let Some(resource) = &module.resource {
                vec![resource.clone()]
            } else if let Some(context) = &module.context {
                vec![context.clone()]
            } else {
                module.file_dependencies.clone()
            }
        })
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}

/// `.js` and `.js.map` files under `build_dir`.
#[must_use]
pub fn bundled_file_paths(build_dir: &Path) -> Vec<PathBuf> {
    if !build_dir.is_dir() {
        return Vec::new();
    }
    let mut paths: Vec<PathBuf> = WalkDir::new(build_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable build output");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            let name = path.to_string_lossy();
            name.ends_with(".js") || name.ends_with(".js.map")
        })
        .collect();
    paths.sort();
    paths
}

/// Map each module to the modules that import it.
#[must_use]
pub fn dependency_map(
    stats: &BundleStats,
    loader_prefix: Option<&str>,
) -> BTreeMap<String, BTreeSet<String>> {
    stats
        .modules
        .iter()
        .map(|module| {
            let importers = module
                .reasons
                .iter()
                .filter_map(|reason| reason.module_identifier.as_deref())
                .map(|id| purge_loader_prefix(id, loader_prefix))
                .collect();
            (purge_loader_prefix(&module.identifier, loader_prefix), importers)
        })
        .collect()
}

fn purge_loader_prefix(identifier: &str, loader_prefix: Option<&str>) -> String {
    let stripped = match loader_prefix.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => identifier.replacen(prefix, "", 1),
        None => identifier.to_string(),
    };
    stripped.replacen('!', "", 1)
}

fn print_dependency_map(map: &BTreeMap<String, BTreeSet<String>>) {
    for (module, importers) in map {
        debug!(module = %module, importers = ?importers, "module dependency");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_types::{ModuleReason, StatsModule};

    fn module(identifier: &str) -> StatsModule {
        StatsModule {
            identifier: identifier.into(),
            resource: None,
            context: None,
            file_dependencies: Vec::new(),
            reasons: Vec::new(),
        }
    }

    #[test]
    fn test_module_files_fallbacks() {
        let stats = BundleStats {
            modules: vec![
                StatsModule {
                    resource: Some("/app/src/main.ts".into()),
                    context: Some("/app/src".into()),
                    ..module("a")
                },
                StatsModule {
                    context: Some("/app/src/lazy".into()),
                    ..module("b")
                },
                StatsModule {
                    file_dependencies: vec!["/app/src/x.ts".into(), PathBuf::new()],
                    ..module("c")
                },
            ],
            ..BundleStats::default()
        };

        assert_eq!(
            module_files(&stats),
            vec![
                PathBuf::from("/app/src/main.ts"),
                PathBuf::from("/app/src/lazy"),
                PathBuf::from("/app/src/x.ts"),
            ]
        );
    }

    #[test]
    fn test_dependency_map_strips_loader_prefix() {
        let stats = BundleStats {
            modules: vec![StatsModule {
                reasons: vec![
                    ModuleReason {
                        module_identifier: Some("/loader.js!/app/src/main.ts".into()),
                    },
                    ModuleReason {
                        module_identifier: None,
                    },
                ],
                ..module("/loader.js!/app/src/util.ts")
            }],
            ..BundleStats::default()
        };

        let map = dependency_map(&stats, Some("/loader.js"));
        let importers = &map["/app/src/util.ts"];
        assert_eq!(importers.len(), 1);
        assert!(importers.contains("/app/src/main.ts"));
    }

    #[test]
    fn test_default_config_sections() {
        let defaults: Value = serde_json::from_str(DEFAULT_BUNDLER_CONFIG).unwrap();
        for section in ["dev", "prod"] {
            let config: BundleConfig = serde_json::from_value(defaults[section].clone()).unwrap();
            assert!(!config.command.is_empty());
        }
    }
}
