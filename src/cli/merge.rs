//! Merge a branch into another across several repositories.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, load_graph, sync_repositories};
use crate::request::Requests;

/// Every named repository is locked for the duration of the merge. The
/// author and email come from the configuration.
#[derive(Args, Debug)]
pub struct MergeCommand {
    /// JSON file listing the repositories
    specs: PathBuf,

    /// Branch to merge
    #[arg(long)]
    from: String,

    /// Branch to merge into
    #[arg(long)]
    to: String,

    /// Repositories to merge in
    #[arg(required = true, value_name = "NAME")]
    names: Vec<String>,
}

impl MergeCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let identity = context.config.identity()?;
        let graph = load_graph(&self.specs)?;
        let cache = context.open_cache()?;

        let mut requests = Requests::new(&graph, &cache);
        for name in &self.names {
            requests.add_request(name, &self.from, &self.to, &identity.name, &identity.email)?;
        }

        // Everything that will be locked, not only the merged repositories.
        let mut urls = Vec::new();
        for name in &self.names {
            let node = graph.require(name)?;
            urls.extend(std::iter::once(node).chain(graph.children(node)).map(|n| n.url().to_string()));
        }
        sync_repositories(&cache, &urls).await?;

        requests.merge().await?;

        for request in requests.requests() {
            println!(
                "{} Merged {} into {} in {}",
                "✓".green(),
                request.from,
                request.to,
                request.name.bold()
            );
        }
        Ok(())
    }
}
