//! Command-line interface for git-depend.
//!
//! The `git-dep` binary is built on `clap` derive. Each subcommand lives in
//! its own module as an `Args` struct with an async `execute` method taking
//! the shared [`common::CommandContext`].
//!
//! # Commands
//!
//! - `config` - show or update author, email and cache directory
//! - `add` / `rm` - manage `url:branch` project entries
//! - `clean` - delete every cached mirror
//! - `tree` - print the dependency tree of a spec file
//! - `sync` - clone or update every repository of a spec file
//! - `write-deps` / `show-deps` - write or read dependency notes
//! - `merge` - merge branches across several repositories under locks
//! - `unlock` - release a stale lock
//!
//! # Global options
//!
//! - `-v, --verbose` - debug logging
//! - `-q, --quiet` - errors only
//! - `--config <path>` - configuration file
//! - `--cache-dir <path>` - cache directory
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet`.

mod add;
mod cache;
pub mod common;
mod config;
mod deps;
mod merge;
mod remove;
mod tree;
mod unlock;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use common::CommandContext;

/// Options collected from the global flags.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Level used when `RUST_LOG` is unset
    pub log_level: LevelFilter,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Explicit cache directory
    pub cache_dir: Option<PathBuf>,
}

#[derive(Parser)]
#[command(
    name = "git-dep",
    about = "Track and merge dependent branches across git repositories",
    version,
    long_about = "git-depend stores dependency records and locks as git notes and merges \
                  feature branches across several repositories in one operation."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Cache directory holding the repository mirrors
    #[arg(long, global = true, value_name = "PATH")]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or update the configuration
    Config(config::ConfigCommand),

    /// Add projects as url:branch
    Add(add::AddCommand),

    /// Remove projects
    Rm(remove::RemoveCommand),

    /// Delete all cached repositories
    Clean(cache::CleanCommand),

    /// Print the dependency tree
    Tree(tree::TreeCommand),

    /// Clone or update every repository in a spec file
    Sync(cache::SyncCommand),

    /// Write dependency notes for a repository
    WriteDeps(deps::WriteDepsCommand),

    /// Show the dependency notes of a repository
    ShowDeps(deps::ShowDepsCommand),

    /// Merge a branch into another across repositories
    Merge(merge::MergeCommand),

    /// Release the lock on a repository
    Unlock(unlock::UnlockCommand),
}

impl Cli {
    /// Initializes logging, loads the configuration and runs the subcommand.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        init_logging(config.log_level);
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            LevelFilter::DEBUG
        } else if self.quiet {
            LevelFilter::ERROR
        } else {
            LevelFilter::INFO
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let context = CommandContext::load(&config).await?;

        match self.command {
            Commands::Config(cmd) => cmd.execute(context).await,
            Commands::Add(cmd) => cmd.execute(context).await,
            Commands::Rm(cmd) => cmd.execute(context).await,
            Commands::Clean(cmd) => cmd.execute(context).await,
            Commands::Tree(cmd) => cmd.execute(context).await,
            Commands::Sync(cmd) => cmd.execute(context).await,
            Commands::WriteDeps(cmd) => cmd.execute(context).await,
            Commands::ShowDeps(cmd) => cmd.execute(context).await,
            Commands::Merge(cmd) => cmd.execute(context).await,
            Commands::Unlock(cmd) => cmd.execute(context).await,
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `level`.
///
/// A second call is a no-op.
pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
