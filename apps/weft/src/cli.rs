//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use weft_config::constants::{ARG_AOT, ARG_DEBUG, ARG_PROD, ARG_WATCH};

/// weft - build orchestration for web front-end projects
#[derive(Parser)]
#[command(name = "weft")]
#[command(version)]
#[command(about = "Build orchestration for web front-end projects", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(clap::Args)]
pub struct GlobalArgs {
    /// Project root directory
    #[arg(long = "rootDir", global = true, value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Scratch directory
    #[arg(long = "tmpDir", global = true, value_name = "DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Source directory
    #[arg(long = "srcDir", global = true, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Web output directory
    #[arg(long = "wwwDir", global = true, value_name = "DIR")]
    pub www_dir: Option<PathBuf>,

    /// Bundle output directory
    #[arg(long = "buildDir", global = true, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Bundler config file
    #[arg(short = 'b', long, global = true, value_name = "FILE")]
    pub bundler: Option<PathBuf>,

    /// Production build
    #[arg(long, global = true)]
    pub prod: bool,

    /// Ahead-of-time build
    #[arg(long, global = true)]
    pub aot: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Empty the build directory
    Clean,

    /// Bundle the project once
    Bundle,

    /// Clean, then bundle
    Build,

    /// Rebundle on every source change until interrupted
    Watch,
}

impl Commands {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Commands::Clean => "clean",
            Commands::Bundle => "bundle",
            Commands::Build => "build",
            Commands::Watch => "watch",
        }
    }
}

impl Cli {
    /// The argument list the config resolver reads.
    ///
    /// Every option is written back in `--flag value` form so that values
    /// given as `--flag=value` resolve the same way.
    #[must_use]
    pub fn process_args(&self) -> Vec<String> {
        let global = &self.global;
        let mut args = vec![self.command.name().to_string()];

        let valued = [
            ("--rootDir", &global.root_dir),
            ("--tmpDir", &global.tmp_dir),
            ("--srcDir", &global.src_dir),
            ("--wwwDir", &global.www_dir),
            ("--buildDir", &global.build_dir),
            ("--bundler", &global.bundler),
        ];
        for (flag, value) in valued {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.display().to_string());
            }
        }

        let switches = [
            (ARG_PROD, global.prod),
            (ARG_AOT, global.aot),
            (ARG_DEBUG, global.debug),
            (ARG_WATCH, self.command == Commands::Watch),
        ];
        args.extend(
            switches
                .into_iter()
                .filter(|(_, on)| *on)
                .map(|(flag, _)| flag.to_string()),
        );
        args
    }
}
