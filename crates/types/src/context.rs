//! Process-wide build context

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use weft_errors::{ConfigError, Error};

/// Outcome of the last pass of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    SuccessfulBuild,
    RequiresUpdate,
    RequiresBuild,
}

/// Directories tracked by the build context, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextDir {
    Root,
    Tmp,
    Src,
    Www,
    Build,
}

impl ContextDir {
    /// All directories, each listed after the ones its default depends on.
    pub const ALL: [ContextDir; 5] = [
        ContextDir::Root,
        ContextDir::Tmp,
        ContextDir::Src,
        ContextDir::Www,
        ContextDir::Build,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root_dir",
            Self::Tmp => "tmp_dir",
            Self::Src => "src_dir",
            Self::Www => "www_dir",
            Self::Build => "build_dir",
        }
    }
}

impl fmt::Display for ContextDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a live external watcher
///
/// Cloning shares the same watcher; [`WatchHandle::close`] stops it for
/// every clone.
#[derive(Clone)]
pub struct WatchHandle {
    id: Uuid,
    stopper: Arc<dyn Fn() + Send + Sync>,
}

impl WatchHandle {
    /// Wrap a watcher whose shutdown is performed by `stop`.
    pub fn new(stop: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            stopper: Arc::new(stop),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop the underlying watcher.
    pub fn close(&self) {
        (self.stopper)();
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle").field("id", &self.id).finish()
    }
}

/// The single process-wide configuration record
///
/// Created once per invocation and mutated in place by every stage.
/// `None` means "not resolved yet" for directories and "derive from flags"
/// for the tri-state booleans.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub root_dir: Option<PathBuf>,
    pub tmp_dir: Option<PathBuf>,
    pub src_dir: Option<PathBuf>,
    pub www_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,

    pub is_watch: Option<bool>,
    pub is_prod: Option<bool>,
    pub run_aot: Option<bool>,

    /// Source files that went into the last bundle, in bundler order
    pub module_files: Vec<PathBuf>,
    /// Emitted `.js` / `.js.map` files under `build_dir`
    pub bundled_file_paths: Vec<PathBuf>,

    pub bundle_state: Option<BuildState>,

    /// Present only in watch mode
    pub watch: Option<WatchHandle>,
}

impl BuildContext {
    #[must_use]
    pub fn dir(&self, dir: ContextDir) -> Option<&Path> {
        match dir {
            ContextDir::Root => self.root_dir.as_deref(),
            ContextDir::Tmp => self.tmp_dir.as_deref(),
            ContextDir::Src => self.src_dir.as_deref(),
            ContextDir::Www => self.www_dir.as_deref(),
            ContextDir::Build => self.build_dir.as_deref(),
        }
    }

    /// Get a resolved directory or fail when the context was never generated.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if the directory is unset.
    pub fn require_dir(&self, dir: ContextDir) -> Result<&Path, Error> {
        self.dir(dir).ok_or_else(|| {
            ConfigError::MissingField {
                field: dir.as_str().to_string(),
            }
            .into()
        })
    }

    pub fn dir_slot_mut(&mut self, dir: ContextDir) -> &mut Option<PathBuf> {
        match dir {
            ContextDir::Root => &mut self.root_dir,
            ContextDir::Tmp => &mut self.tmp_dir,
            ContextDir::Src => &mut self.src_dir,
            ContextDir::Www => &mut self.www_dir,
            ContextDir::Build => &mut self.build_dir,
        }
    }

    #[must_use]
    pub fn is_watch(&self) -> bool {
        self.is_watch.unwrap_or(false)
    }

    #[must_use]
    pub fn is_prod(&self) -> bool {
        self.is_prod.unwrap_or(false)
    }

    #[must_use]
    pub fn run_aot(&self) -> bool {
        self.run_aot.unwrap_or(false)
    }
}
