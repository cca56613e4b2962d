//! User configuration for git-depend
//!
//! The configuration lives in a TOML file in the home directory
//! (`~/.git-depend.toml`). It records who the user is, for lock notes and
//! merge commits, and which projects they work on.
//!
//! ```toml
//! author = "Eric"
//! email = "eric@example.com"
//! projects = ["https://example.com/foo.git:main"]
//! cache_dir = "/var/cache/git-depend"
//! ```
//!
//! # Location
//!
//! 1. `--config <path>` on the command line
//! 2. `GIT_DEPEND_CONFIG`
//! 3. `~/.git-depend.toml`
//!
//! # Cache directory
//!
//! 1. `--cache-dir <path>` on the command line
//! 2. `GIT_DEPEND_CACHE_DIR`
//! 3. `cache_dir` in the configuration file
//! 4. the platform cache directory (`~/.cache/git-depend` on Linux)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{CACHE_DIR_ENV, CONFIG_ENV, CONFIG_FILE_NAME};
use crate::core::DependError;
use crate::git::Identity;

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Author name for notes and merge commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Author email for notes and merge commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Projects as `url:branch`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,

    /// Cache directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

/// A project entry split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Repository URL
    pub url: String,
    /// Branch worked on
    pub branch: String,
}

/// Splits `url:branch` on the last colon, so SSH URLs keep theirs.
///
/// # Errors
///
/// [`DependError::ConfigError`] when either side is empty or there is no
/// colon.
pub fn parse_project(project: &str) -> Result<Project> {
    match project.rsplit_once(':') {
        Some((url, branch)) if !url.is_empty() && !branch.is_empty() => Ok(Project {
            url: url.to_string(),
            branch: branch.to_string(),
        }),
        _ => Err(DependError::ConfigError {
            message: format!("Project '{project}' is not of the form <url>:<branch>"),
        }
        .into()),
    }
}

impl Config {
    /// Default configuration path: `GIT_DEPEND_CONFIG`, else
    /// `~/.git-depend.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or_else(|| DependError::ConfigError {
            message: "Unable to determine home directory".to_string(),
        })?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    /// Configuration path, preferring an explicit one.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path),
            None => Self::default_path(),
        }
    }

    /// Loads the configuration from the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?).await
    }

    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Saves the configuration to `path`.
    ///
    /// Creates parent directories as needed. On Unix the file is made
    /// readable by its owner only.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)
                .await
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    /// Adds a project unless already present. Returns true if added.
    pub fn add_project(&mut self, project: &str) -> bool {
        if self.projects.iter().any(|p| p == project) {
            return false;
        }
        self.projects.push(project.to_string());
        true
    }

    /// Removes every occurrence of a project. Returns true if any was removed.
    pub fn remove_project(&mut self, project: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p != project);
        self.projects.len() != before
    }

    /// Parsed project entries.
    pub fn parsed_projects(&self) -> Result<Vec<Project>> {
        self.projects.iter().map(|p| parse_project(p)).collect()
    }

    /// Author identity for notes and merge commits.
    ///
    /// # Errors
    ///
    /// [`DependError::ConfigError`] naming the missing field.
    pub fn identity(&self) -> Result<Identity> {
        let missing = |field: &str| DependError::ConfigError {
            message: format!("No {field} configured"),
        };
        let author = self.author.as_deref().filter(|a| !a.is_empty()).ok_or_else(|| missing("author"))?;
        let email = self.email.as_deref().filter(|e| !e.is_empty()).ok_or_else(|| missing("email"))?;
        Ok(Identity::new(author, email))
    }

    /// Identity if both author and email are configured.
    #[must_use]
    pub fn optional_identity(&self) -> Option<Identity> {
        self.identity().ok()
    }

    /// Cache directory, preferring an explicit one.
    ///
    /// See the module documentation for the resolution order.
    pub fn resolve_cache_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        let from_env = std::env::var(CACHE_DIR_ENV).ok().filter(|dir| !dir.is_empty()).map(PathBuf::from);
        let platform = dirs::cache_dir().map(|dir| dir.join("git-depend"));
        pick_cache_dir(explicit, from_env, self.cache_dir.clone(), platform)
    }
}

fn pick_cache_dir(
    explicit: Option<PathBuf>,
    from_env: Option<PathBuf>,
    configured: Option<PathBuf>,
    platform: Option<PathBuf>,
) -> Result<PathBuf> {
    explicit.or(from_env).or(configured).or(platform).ok_or_else(|| {
        DependError::ConfigError {
            message: "Unable to determine cache directory".to_string(),
        }
        .into()
    })
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Author: {}", self.author.as_deref().unwrap_or("<unset>"))?;
        writeln!(f, "Email: {}", self.email.as_deref().unwrap_or("<unset>"))?;
        if let Some(dir) = &self.cache_dir {
            writeln!(f, "Cache: {}", dir.display())?;
        }
        write!(f, "Projects:")?;
        if self.projects.is_empty() {
            write!(f, " <none>")?;
        }
        for project in &self.projects {
            write!(f, "\n  {project}")?;
        }
        Ok(())
    }
}
