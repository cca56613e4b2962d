//! Show or update the configuration file.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::common::CommandContext;

/// With no options the configuration is printed unchanged. A global
/// `--cache-dir` given to this command is stored as the default.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Author name used for locks and merge commits
    #[arg(long)]
    author: Option<String>,

    /// Author email used for locks and merge commits
    #[arg(long)]
    email: Option<String>,
}

impl ConfigCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        let cache_dir = context.cache_dir_override().map(Path::to_path_buf);
        let changed = self.author.is_some() || self.email.is_some() || cache_dir.is_some();

        if let Some(author) = self.author {
            context.config.author = Some(author);
        }
        if let Some(email) = self.email {
            context.config.email = Some(email);
        }
        if let Some(dir) = cache_dir {
            context.config.cache_dir = Some(dir);
        }

        if changed {
            context.save().await?;
            println!("{} Updated {}", "✓".green(), context.config_path.display());
        }

        println!("{}", "Configuration".bold());
        println!("Location: {}\n", context.config_path.display());
        println!("{}", context.config);
        Ok(())
    }
}
