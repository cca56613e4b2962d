//! Release a lock left behind by an interrupted operation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, load_graph};
use crate::notes::{clear_locks, read_lock, remove_lock};

#[derive(Args, Debug)]
pub struct UnlockCommand {
    /// JSON file listing the repositories
    specs: PathBuf,

    /// Repository to unlock
    name: String,

    /// Remove every lock note, even when several runs left one
    #[arg(long)]
    all: bool,
}

impl UnlockCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let graph = load_graph(&self.specs)?;
        let node = graph.require(&self.name)?;
        let cache = context.open_cache()?;
        cache.clone_or_update(node.url()).await?;

        if self.all {
            match clear_locks(&cache, node).await? {
                0 => println!("{} is not locked", self.name),
                count => println!("{} Removed {} lock note(s) on {}", "✓".green(), count, self.name.bold()),
            }
            return Ok(());
        }

        match read_lock(&cache, node).await? {
            Some(lock) => {
                remove_lock(&cache, node).await?;
                println!(
                    "{} Released lock {} on {} (taken {})",
                    "✓".green(),
                    lock.id,
                    self.name.bold(),
                    lock.timestamp.to_rfc3339()
                );
            }
            None => println!("{} is not locked", self.name),
        }
        Ok(())
    }
}
