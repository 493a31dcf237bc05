// src/registry/database.rs
// =============================================================================
// The registry table: a static mapping from module name to the provider that
// hosts it.
//
// The table is plain JSON:
//   { "std": { "type": "github", "owner": "denoland", "repo": "deno", "path": "/std/" } }
//
// Each entry is tagged by its "type" field. Entries with a type we can't
// serve are skipped with a warning, so one odd entry doesn't break the whole
// table; those names simply never resolve.
//
// Rust concepts:
// - Internally tagged enums: #[serde(tag = "type")]
// - BTreeMap: sorted map, so listings of the table are stable
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::warn;

// The table that ships inside the binary
const EMBEDDED_DATABASE: &str = include_str!("database.json");

// Values of the "type" field that map to a RegistryEntry variant
const KNOWN_TYPES: &[&str] = &["url", "esm", "github", "gitlab"];

/// Which kind of host serves an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Url,
    PackageRegistry,
    GitHub,
    GitLab,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Url => "URL",
            ProviderKind::PackageRegistry => "package registry",
            ProviderKind::GitHub => "GitHub",
            ProviderKind::GitLab => "GitLab",
        };
        f.write_str(name)
    }
}

/// One row of the registry table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryEntry {
    /// Direct URL templates; `${b}` is replaced by the branch
    Url { url: String, repo: String },
    /// Package registry templates; `${v}` is replaced by the version
    #[serde(rename = "esm")]
    PackageRegistry { url: String, repo: String },
    #[serde(rename = "github")]
    GitHub {
        owner: String,
        repo: String,
        #[serde(default)]
        path: Option<String>,
    },
    #[serde(rename = "gitlab")]
    GitLab {
        project: String,
        #[serde(default)]
        path: Option<String>,
    },
}

impl RegistryEntry {
    pub fn kind(&self) -> ProviderKind {
        match self {
            RegistryEntry::Url { .. } => ProviderKind::Url,
            RegistryEntry::PackageRegistry { .. } => ProviderKind::PackageRegistry,
            RegistryEntry::GitHub { .. } => ProviderKind::GitHub,
            RegistryEntry::GitLab { .. } => ProviderKind::GitLab,
        }
    }
}

/// Read-only name -> entry mapping, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Parses a registry table from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(json).context("Invalid registry table")?;

        let mut entries = BTreeMap::new();
        for (name, value) in raw {
            let entry_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
            if !KNOWN_TYPES.contains(&entry_type) {
                warn!(name = %name, entry_type, "skipping registry entry with unsupported type");
                continue;
            }
            let entry: RegistryEntry = serde_json::from_value(value)
                .with_context(|| format!("Invalid registry entry '{}'", name))?;
            entries.insert(name, entry);
        }

        Ok(Self { entries })
    }

    /// The table compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_DATABASE)
    }

    /// Loads a registry table from a JSON file on disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read registry file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Could not load registry file {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, RegistryEntry)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, RegistryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
