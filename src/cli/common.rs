//! Shared state and helpers for CLI commands.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::cache::Cache;
use crate::config::Config;
use crate::graph::Graph;

/// Configuration and paths every command starts from.
#[derive(Debug)]
pub struct CommandContext {
    /// Loaded configuration (default if the file does not exist)
    pub config: Config,
    /// Where the configuration was loaded from and is saved to
    pub config_path: PathBuf,
    cache_dir: Option<PathBuf>,
}

impl CommandContext {
    /// Loads the configuration named by the global flags.
    pub async fn load(cli: &CliConfig) -> Result<Self> {
        let config_path = Config::resolve_path(cli.config_path.clone())?;
        let config = Config::load_from(&config_path).await?;
        tracing::debug!("Loaded configuration from {}", config_path.display());

        Ok(Self {
            config,
            config_path,
            cache_dir: cli.cache_dir.clone(),
        })
    }

    /// Effective cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.config.resolve_cache_dir(self.cache_dir.clone())
    }

    /// Cache directory given on the command line, if any.
    #[must_use]
    pub fn cache_dir_override(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Opens the cache, carrying the configured identity when there is one.
    pub fn open_cache(&self) -> Result<Cache> {
        let cache = Cache::new(self.cache_dir()?)?;
        Ok(match self.config.optional_identity() {
            Some(identity) => cache.with_identity(identity),
            None => cache,
        })
    }

    /// Writes the configuration back to where it was loaded from.
    pub async fn save(&self) -> Result<()> {
        self.config.save_to(&self.config_path).await
    }
}

/// Reads and validates a spec file.
pub fn load_graph(path: &Path) -> Result<Graph> {
    Graph::from_file(path).with_context(|| format!("Failed to load dependency graph from {}", path.display()))
}

/// Clones or updates `urls`, printing a summary line.
pub async fn sync_repositories(cache: &Cache, urls: &[String]) -> Result<Vec<PathBuf>> {
    let paths = cache.clone_or_update_many(urls).await?;
    println!("{} Synced {} repositories", "✓".green(), paths.len());
    Ok(paths)
}
