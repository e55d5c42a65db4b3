//! weft - build orchestration for web front-end projects
//!
//! Resolves the build context from CLI flags, environment and `package.json`,
//! then runs one of the build tasks against it.

mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::logging::{init_tracing, log_event_with_tracing};
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{debug, error, info};
use weft_builder::{clean, BundleTask, Bundler, ProcessBundler};
use weft_config::{generate_context, ProcessConfig};
use weft_errors::Error;
use weft_events::{EventReceiver, EventSender};
use weft_types::BuildContext;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut process = ProcessConfig::new(cli.process_args(), std::env::vars(), cwd);
    let debug_mode = process.check_debug_mode();

    init_tracing(cli.global.json, debug_mode);

    let command = cli.command;
    if let Err(e) = run(command, process).await {
        if !e.has_been_logged() {
            error!(task = command.name(), "{} failed: {e}", command.name());
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(command: Commands, mut process: ProcessConfig) -> Result<(), CliError> {
    info!("Starting weft v{}", env!("CARGO_PKG_VERSION"));

    let mut context = generate_context(&mut process, None);
    debug!(
        args = ?process.args(),
        root_dir = ?context.root_dir,
        src_dir = ?context.src_dir,
        build_dir = ?context.build_dir,
        is_watch = context.is_watch(),
        run_aot = context.run_aot(),
        "resolved build context"
    );

    let (event_sender, event_receiver) = weft_events::channel();
    let bundler: Arc<dyn Bundler> = Arc::new(ProcessBundler::new());
    let task = BundleTask::new(bundler).with_event_sender(event_sender.clone());

    let result = execute_with_events(
        execute_command(command, &process, &mut context, &task, event_sender),
        event_receiver,
    )
    .await;

    if let Some(watch) = context.watch.take() {
        watch.close();
    }
    result
}

/// Run `command_future` while logging the events it emits
async fn execute_with_events<F>(
    command_future: F,
    mut event_receiver: EventReceiver,
) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>>,
{
    let mut command_future = Box::pin(command_future);

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(message) = event_receiver.try_recv() {
                    log_event_with_tracing(&message);
                }
                return result;
            }

            message = event_receiver.recv() => {
                if let Some(message) = message {
                    log_event_with_tracing(&message);
                }
            }
        }
    }
}

async fn execute_command(
    command: Commands,
    process: &ProcessConfig,
    context: &mut BuildContext,
    task: &BundleTask,
    events: EventSender,
) -> Result<(), CliError> {
    match command {
        Commands::Clean => clean(context, Some(events)).await?,
        Commands::Bundle => task.bundle(process, context, None).await?,
        Commands::Build => {
            clean(context, Some(events)).await?;
            task.bundle(process, context, None).await?;
        }
        Commands::Watch => watch(process, context, task).await?,
    }
    info!("{} completed", command.name());
    Ok(())
}

/// Rebundle on every watcher cycle until interrupted.
///
/// Failed cycles are reported and the session keeps going. A fatal failure,
/// or any failure before a watcher is running, ends the session since no
/// later cycle could settle the next request.
async fn watch(
    process: &ProcessConfig,
    context: &mut BuildContext,
    task: &BundleTask,
) -> Result<(), CliError> {
    context.is_watch = Some(true);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let outcome = select! {
            result = task.bundle(process, context, None) => Some(result),
            signal = &mut interrupted => {
                signal.map_err(CliError::Signal)?;
                None
            }
        };

        match outcome {
            None => {
                info!("watch interrupted");
                return Ok(());
            }
            Some(Ok(()) | Err(Error::Stale)) => {}
            Some(Err(e)) if e.is_fatal() || context.watch.is_none() => return Err(e.into()),
            Some(Err(e)) => debug!(error = %e, "watch cycle failed, waiting for changes"),
        }
    }
}
