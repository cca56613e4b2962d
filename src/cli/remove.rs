//! Remove projects from the configuration.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;

#[derive(Args, Debug)]
pub struct RemoveCommand {
    /// Projects as url:branch
    #[arg(required = true, value_name = "PROJECT")]
    projects: Vec<String>,
}

impl RemoveCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        let mut removed = 0;
        for project in &self.projects {
            if context.config.remove_project(project) {
                println!("{} Removed {project}", "✓".green());
                removed += 1;
            } else {
                println!("{} {project} is not configured", "•".yellow());
            }
        }

        if removed > 0 {
            context.save().await?;
        }
        Ok(())
    }
}
