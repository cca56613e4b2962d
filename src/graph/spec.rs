//! Repository spec wire format.
//!
//! A spec document is a JSON array of `{"Name", "Url", "Deps"}` objects. The
//! same shape is stored in dependency notes, one entry per direct dependency.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::DependError;

/// One declared repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepoSpec {
    /// Unique key of the repository within a spec document
    pub name: String,
    /// Clone URL
    pub url: String,
    /// Names of direct dependencies, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
}

impl RepoSpec {
    /// Creates a spec.
    pub fn new<I, S>(name: impl Into<String>, url: impl Into<String>, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            url: url.into(),
            deps: deps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parses a JSON spec document.
///
/// # Errors
///
/// Returns [`DependError::InvalidSpec`] if the document is not an array of
/// specs.
pub fn parse_specs(json: &str) -> Result<Vec<RepoSpec>> {
    serde_json::from_str(json).map_err(|e| {
        DependError::InvalidSpec {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Reads and parses a spec document from disk.
pub fn read_specs(path: &Path) -> Result<Vec<RepoSpec>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file {}", path.display()))?;
    parse_specs(&json).with_context(|| format!("Failed to parse spec file {}", path.display()))
}
