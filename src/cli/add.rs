//! Add projects to the configuration.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::config::parse_project;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// Projects as url:branch
    #[arg(required = true, value_name = "PROJECT")]
    projects: Vec<String>,
}

impl AddCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        for project in &self.projects {
            parse_project(project)?;
        }

        let mut added = 0;
        for project in &self.projects {
            if context.config.add_project(project) {
                println!("{} Added {project}", "✓".green());
                added += 1;
            } else {
                println!("{} {project} is already configured", "•".yellow());
            }
        }

        if added > 0 {
            context.save().await?;
        }
        Ok(())
    }
}
