//! Build context generation

use crate::coerce::ConfigValue;
use crate::constants::{
    ARG_AOT, ARG_PROD, ARG_WATCH, BUILD_DIR, ENV_VAR_BUILD_DIR, ENV_VAR_ROOT_DIR, ENV_VAR_SRC_DIR,
    ENV_VAR_TMP_DIR, ENV_VAR_WWW_DIR, SRC_DIR, TMP_DIR, WWW_DIR,
};
use crate::process::ProcessConfig;
use crate::resolver::ConfigKey;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use weft_types::{BuildContext, ContextDir};

/// Resolution rule for one context directory
struct DirSpec {
    dir: ContextDir,
    flag: &'static str,
    env_var: &'static str,
    manifest_field: &'static str,
    /// Parent directory and child name of the default; `None` means the cwd
    default: Option<(ContextDir, &'static str)>,
}

/// Resolution order: a default may only reference directories listed above it.
const DIR_SPECS: [DirSpec; 5] = [
    DirSpec {
        dir: ContextDir::Root,
        flag: "--rootDir",
        env_var: ENV_VAR_ROOT_DIR,
        manifest_field: "weft_root_dir",
        default: None,
    },
    DirSpec {
        dir: ContextDir::Tmp,
        flag: "--tmpDir",
        env_var: ENV_VAR_TMP_DIR,
        manifest_field: "weft_tmp_dir",
        default: Some((ContextDir::Root, TMP_DIR)),
    },
    DirSpec {
        dir: ContextDir::Src,
        flag: "--srcDir",
        env_var: ENV_VAR_SRC_DIR,
        manifest_field: "weft_src_dir",
        default: Some((ContextDir::Root, SRC_DIR)),
    },
    DirSpec {
        dir: ContextDir::Www,
        flag: "--wwwDir",
        env_var: ENV_VAR_WWW_DIR,
        manifest_field: "weft_www_dir",
        default: Some((ContextDir::Root, WWW_DIR)),
    },
    DirSpec {
        dir: ContextDir::Build,
        flag: "--buildDir",
        env_var: ENV_VAR_BUILD_DIR,
        manifest_field: "weft_build_dir",
        default: Some((ContextDir::Www, BUILD_DIR)),
    },
];

impl DirSpec {
    fn key(&self) -> ConfigKey<'static> {
        ConfigKey {
            long_flag: self.flag,
            short_flag: None,
            env_var: self.env_var,
            manifest_field: self.manifest_field,
        }
    }

    fn default_path(&self, context: &BuildContext, cwd: &Path) -> PathBuf {
        match self.default {
            Some((parent, child)) => context.dir(parent).unwrap_or(cwd).join(child),
            None => cwd.to_path_buf(),
        }
    }
}

/// Fill every unset field of `partial` and return the populated context.
///
/// Fields that are already set keep their value (relative directories are
/// made absolute). Every directory is mirrored into the environment map so
/// later lookups and child processes see the resolved value.
pub fn generate_context(process: &mut ProcessConfig, partial: Option<BuildContext>) -> BuildContext {
    let mut context = partial.unwrap_or_default();

    process.check_debug_mode();

    if context.is_prod.is_none() {
        context.is_prod = Some(process.has_arg(ARG_PROD, None));
    }
    if context.run_aot.is_none() {
        context.run_aot = Some(context.is_prod() || process.has_arg(ARG_AOT, None));
    }
    if context.is_watch.is_none() {
        context.is_watch = Some(process.has_arg(ARG_WATCH, None));
    }

    for spec in &DIR_SPECS {
        let cwd = process.cwd().to_path_buf();
        let resolved = match context.dir(spec.dir) {
            Some(existing) => absolutize(&cwd, existing),
            None => {
                let default = spec.default_path(&context, &cwd);
                let value = process
                    .get_config_value(
                        &context,
                        &spec.key(),
                        Some(ConfigValue::Text(default.display().to_string())),
                    )
                    .map_or(default, |value| PathBuf::from(value.to_string()));
                absolutize(&cwd, &value)
            }
        };

        process.set_env_var(spec.env_var, &resolved.display().to_string());
        debug!(dir = %spec.dir, path = %resolved.display(), "resolved build directory");
        *context.dir_slot_mut(spec.dir) = Some(resolved);
    }

    context
}

/// Make `path` absolute against `base` and fold `.` and `..` lexically.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root
                if normalized.parent().is_some() {
                    normalized.pop();
                }
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize() {
        let base = Path::new("/work");
        assert_eq!(absolutize(base, Path::new("src")), PathBuf::from("/work/src"));
        assert_eq!(absolutize(base, Path::new("./a/../b")), PathBuf::from("/work/b"));
        assert_eq!(absolutize(base, Path::new("/abs/./x")), PathBuf::from("/abs/x"));
        assert_eq!(absolutize(base, Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn test_specs_only_reference_earlier_dirs() {
        for (index, spec) in DIR_SPECS.iter().enumerate() {
            if let Some((parent, _)) = spec.default {
                let parent_index = DIR_SPECS.iter().position(|s| s.dir == parent).unwrap();
                assert!(parent_index < index, "{} depends on a later dir", spec.dir);
            }
        }
    }
}
