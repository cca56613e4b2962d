//! Cache maintenance: `clean` and `sync`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, load_graph, sync_repositories};

#[derive(Args, Debug)]
pub struct CleanCommand {}

impl CleanCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let cache = context.open_cache()?;
        cache.clean().await?;
        println!("{} Removed cache at {}", "✓".green(), cache.root().display());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SyncCommand {
    /// JSON file listing the repositories
    specs: PathBuf,
}

impl SyncCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let graph = load_graph(&self.specs)?;
        let cache = context.open_cache()?;
        let urls = graph.all_urls();

        let paths = sync_repositories(&cache, &urls).await?;
        for (url, path) in urls.iter().zip(&paths) {
            println!("  {url} {} {}", "->".dimmed(), path.display());
        }
        Ok(())
    }
}
