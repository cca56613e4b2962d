//! Print the dependency tree of a spec file.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{CommandContext, load_graph};

#[derive(Args, Debug)]
pub struct TreeCommand {
    /// JSON file listing the repositories
    specs: PathBuf,

    /// Only print the tree below this repository
    name: Option<String>,
}

impl TreeCommand {
    pub async fn execute(self, _context: CommandContext) -> Result<()> {
        let graph = load_graph(&self.specs)?;

        let starts = match &self.name {
            Some(name) => vec![graph.require(name)?],
            None => graph.roots(),
        };

        let trees: Vec<String> = starts.into_iter().map(|node| graph.tree_string(node)).collect();
        print!("{}", trees.join("\n"));
        Ok(())
    }
}
