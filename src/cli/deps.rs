//! Write and show dependency notes.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, load_graph, sync_repositories};
use crate::notes::{read_dependency_notes, write_all_dependency_notes, write_dependency_notes};

#[derive(Args, Debug)]
pub struct WriteDepsCommand {
    /// JSON file listing the repositories
    specs: PathBuf,

    /// Repository to write the record for
    name: String,

    /// Also write records for everything below the repository
    #[arg(long)]
    all: bool,

    /// Lock owner id (a fresh UUID by default)
    #[arg(long)]
    owner: Option<String>,
}

impl WriteDepsCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let graph = load_graph(&self.specs)?;
        let node = graph.require(&self.name)?;
        let cache = context.open_cache()?;
        let owner = self.owner.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut urls = vec![node.url().to_string()];
        if self.all {
            urls.extend(graph.children(node).into_iter().map(|child| child.url().to_string()));
        }
        sync_repositories(&cache, &urls).await?;

        if self.all {
            write_all_dependency_notes(&cache, &graph, &owner, node).await?;
        } else {
            write_dependency_notes(&cache, &graph, &owner, node).await?;
        }

        println!("{} Wrote dependency notes for {}", "✓".green(), self.name.bold());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowDepsCommand {
    /// JSON file listing the repositories
    specs: PathBuf,

    /// Repository whose record to show
    name: String,
}

impl ShowDepsCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let graph = load_graph(&self.specs)?;
        let node = graph.require(&self.name)?;
        let cache = context.open_cache()?;
        cache.clone_or_update(node.url()).await?;

        let specs = read_dependency_notes(&cache, node).await?;
        if specs.is_empty() {
            println!("No dependency notes for {}", self.name);
        } else {
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        Ok(())
    }
}
