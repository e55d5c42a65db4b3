//! Bundler driven as a child process

use crate::bundler::{BundleConfig, Bundler, ENV_VAR_BUNDLER_CONFIG};
use async_trait::async_trait;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use weft_errors::{BuildError, Error};
use weft_events::BuildEventSink;
use weft_types::{BundleStats, WatchHandle};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Runs the configured bundler command and reads its JSON stats from stdout
#[derive(Debug, Clone)]
pub struct ProcessBundler {
    debounce: Duration,
}

impl Default for ProcessBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBundler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run one cycle and report its outcome to `sink`.
    async fn cycle(&self, config: &BundleConfig, sink: &BuildEventSink) {
        let settled = match self.run(config).await {
            Ok(stats) if stats.has_errors() => sink.emit_failure(BuildError::Compilation {
                errors: stats.error_messages(),
            }),
            Ok(stats) => sink.emit_success(stats),
            Err(e) => sink.emit_failure(e),
        };
        debug!(settled, "watch cycle reported");
    }
}

#[async_trait]
impl Bundler for ProcessBundler {
    async fn run(&self, config: &BundleConfig) -> Result<BundleStats, Error> {
        let (program, args) =
            config
                .command
                .split_first()
                .ok_or_else(|| BuildError::InvalidBundlerConfig {
                    message: "`command` must name a program".into(),
                })?;
        let command_line = config.command.join(" ");
        let serialized = serde_json::to_string(config).map_err(|e| {
            BuildError::InvalidBundlerConfig {
                message: e.to_string(),
            }
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(&config.env)
            .env(ENV_VAR_BUNDLER_CONFIG, serialized)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &config.cwd {
            cmd.current_dir(dir);
        }

        debug!(command = %command_line, "running bundler");
        let output = cmd.output().await.map_err(|e| BuildError::CommandFailed {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        // Bundlers exit non-zero on compile errors but still print stats
        match serde_json::from_slice::<BundleStats>(&output.stdout) {
            Ok(stats) => Ok(stats),
            Err(_) if !output.status.success() => Err(BuildError::CommandFailed {
                command: command_line,
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into()),
            Err(e) => Err(BuildError::InvalidStats {
                message: e.to_string(),
            }
            .into()),
        }
    }

    fn watch(&self, config: &BundleConfig, sink: BuildEventSink) -> Result<WatchHandle, Error> {
        let watch_dir = config
            .watch_dir
            .clone()
            .ok_or_else(|| BuildError::WatcherStart {
                message: "no source directory to watch".into(),
            })?;
        if !watch_dir.is_dir() {
            return Err(BuildError::WatcherStart {
                message: format!("{} is not a directory", watch_dir.display()),
            }
            .into());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(self.debounce, move |result: DebounceEventResult| {
            let _ = tx.send(result);
        })
        .map_err(|e| BuildError::WatcherStart {
            message: e.to_string(),
        })?;
        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::Recursive)
            .map_err(|e| BuildError::WatcherStart {
                message: e.to_string(),
            })?;
        info!(dir = %watch_dir.display(), "watching for changes");

        let bundler = self.clone();
        let config = config.clone();
        let task = tokio::spawn(async move {
            // Dropping the debouncer stops the file watcher
            let _debouncer = debouncer;

            bundler.cycle(&config, &sink).await;
            while let Some(result) = rx.recv().await {
                match result {
                    Ok(events) => {
                        let changed = events
                            .iter()
                            .filter(|event| matches!(event.kind, DebouncedEventKind::Any))
                            .count();
                        if changed > 0 {
                            debug!(changed, "sources changed, rebuilding");
                            bundler.cycle(&config, &sink).await;
                        }
                    }
                    Err(e) => warn!(error = %e, "file watcher error, continuing"),
                }
            }
        });

        let abort = task.abort_handle();
        Ok(WatchHandle::new(move || abort.abort()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BundleOutput, BundleResolve};
    use std::collections::HashMap;

    fn config(command: &[&str]) -> BundleConfig {
        BundleConfig {
            devtool: None,
            entry: serde_json::Value::Null,
            output: BundleOutput {
                path: "/tmp/out".into(),
                filename: "main.js".into(),
            },
            resolve: BundleResolve::default(),
            command: command.iter().map(ToString::to_string).collect(),
            env: HashMap::new(),
            cwd: None,
            watch_dir: None,
        }
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let err = ProcessBundler::new().run(&config(&[])).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Build {
                source: BuildError::InvalidBundlerConfig { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ProcessBundler::new()
            .run(&config(&["weft-definitely-not-installed"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build {
                source: BuildError::CommandFailed { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_watch_requires_directory() {
        let sink = weft_events::BuildEventBus::new().sink();
        let err = ProcessBundler::new().watch(&config(&["true"]), sink).unwrap_err();
        assert!(err.is_fatal());
    }
}
