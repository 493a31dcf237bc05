// src/registry/resolve.rs
// =============================================================================
// Turns a virtual path into a provider entry plus a sub-path.
//
// Path scheme:
//   /x/<name>[@<branch>]/<subpath...>
//   /std[@<branch>]/<subpath...>  (alias for /x/std[@<branch>]/<subpath...>)
//
// Examples:
//   /x/oak@v4.0.0/mod.ts  -> entry "oak", branch "v4.0.0", path "mod.ts"
//   /std/fs/              -> entry "std", branch "master", path "fs/"
//   /std@v0.18.0/fs/      -> entry "std_old", branch "v0.18.0", path "fs/"
//   /nope                 -> None
//
// Resolution is pure: no network, no shared state. Unknown names are not
// errors, they just resolve to None and the caller shows "not found".
// =============================================================================

use serde::Serialize;
use tracing::debug;

use super::database::{ProviderKind, Registry, RegistryEntry};
use crate::config::Hosts;

const CANONICAL_PREFIX: &str = "/x/";
const LEGACY_ALIAS: &str = "/std";
const DEFAULT_BRANCH: &str = "master";
const LATEST_VERSION: &str = "latest";

// The standard library moved from denoland/deno_std into denoland/deno.
// Links to tags and commits from before the move keep working by routing
// them to the "std_old" entry.
const MOVED_MODULE: &str = "std";
const MOVED_MODULE_TARGET: &str = "std_old";
const MOVED_TAGS: &[&str] = &["v0.16.0", "v0.17.0", "v0.18.0", "v0.19.0", "v0.20.0"];
const MOVED_COMMIT_PREFIXES: &[&str] = &["8c90bd", "17a214", "6958a4"];

/// A registry entry pinned to a branch, able to build URLs for any sub-path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    name: String,
    branch: String,
    entry: RegistryEntry,
    hosts: Hosts,
}

/// Result of a successful resolve: the entry and the path inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: ResolvedEntry,
    pub path: String,
}

/// Summary of a resolution, for `resolve --json`
#[derive(Debug, Serialize)]
pub struct ResolutionReport {
    pub name: String,
    pub provider: ProviderKind,
    pub branch: String,
    pub path: String,
    pub raw_url: String,
    pub repository_url: String,
}

impl ResolvedEntry {
    /// Name of the registry entry this resolved to (after legacy rewrites)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn kind(&self) -> ProviderKind {
        self.entry.kind()
    }

    pub fn entry(&self) -> &RegistryEntry {
        &self.entry
    }

    /// Package-registry version: "latest" stands in for the default branch
    pub fn version(&self) -> &str {
        if self.branch == DEFAULT_BRANCH {
            LATEST_VERSION
        } else {
            &self.branch
        }
    }

    /// Whether the provider can list directories
    pub fn lists_directories(&self) -> bool {
        matches!(self.kind(), ProviderKind::GitHub | ProviderKind::GitLab)
    }

    /// Absolute URL serving the raw bytes of `sub_path`
    pub fn url_for(&self, sub_path: &str) -> String {
        match &self.entry {
            RegistryEntry::Url { url, .. } => fill(url, "${b}", &self.branch) + sub_path,
            RegistryEntry::PackageRegistry { url, .. } => fill(url, "${v}", self.version()) + sub_path,
            RegistryEntry::GitHub { owner, repo, path } => format!(
                "{}/{}/{}/{}{}{}",
                self.hosts.github_raw,
                owner,
                repo,
                self.branch,
                base_path(path),
                sub_path
            ),
            RegistryEntry::GitLab { project, path } => {
                let file = format!("{}{}", path.as_deref().unwrap_or(""), sub_path);
                format!(
                    "{}/api/v4/projects/{}/repository/files/{}/raw?ref={}",
                    self.hosts.gitlab,
                    urlencoding::encode(project),
                    urlencoding::encode(&file),
                    urlencoding::encode(&self.branch)
                )
            }
        }
    }

    /// Absolute URL of the human-facing page for `sub_path`
    pub fn repo_for(&self, sub_path: &str) -> String {
        match &self.entry {
            RegistryEntry::Url { repo, .. } => fill(repo, "${b}", &self.branch) + sub_path,
            RegistryEntry::PackageRegistry { repo, .. } => {
                fill(repo, "${v}", self.version()) + sub_path
            }
            RegistryEntry::GitHub { owner, repo, path } => format!(
                "{}/{}/{}/tree/{}{}{}",
                self.hosts.github_web,
                owner,
                repo,
                self.branch,
                base_path(path),
                sub_path
            ),
            RegistryEntry::GitLab { project, path } => format!(
                "{}/{}/blob/{}{}{}",
                self.hosts.gitlab,
                project,
                self.branch,
                base_path(path),
                sub_path
            ),
        }
    }
}

impl Resolution {
    pub fn report(&self) -> ResolutionReport {
        ResolutionReport {
            name: self.entry.name.clone(),
            provider: self.entry.kind(),
            branch: self.entry.branch.clone(),
            path: self.path.clone(),
            raw_url: self.entry.url_for(&self.path),
            repository_url: self.entry.repo_for(&self.path),
        }
    }
}

// Replaces the first occurrence of a placeholder
fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

// An empty or missing configured path means the repository root
fn base_path(path: &Option<String>) -> &str {
    match path.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => "/",
    }
}

/// Maps virtual paths to registry entries. Holds an injected, read-only table.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Registry,
    hosts: Hosts,
}

impl Resolver {
    pub fn new(registry: Registry, hosts: Hosts) -> Self {
        Self { registry, hosts }
    }

    // Resolves a virtual path, or None if nothing serves it
    pub fn resolve(&self, virtual_path: &str) -> Option<Resolution> {
        // "/std", "/std/..." and "/std@<branch>/..." all mean /x/std; "/stdlib" doesn't
        let aliased = virtual_path
            .strip_prefix(LEGACY_ALIAS)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('@'));
        if aliased {
            debug!(path = virtual_path, "rewriting legacy alias");
            return self.resolve(&format!("/x{}", virtual_path));
        }

        let name_branch_rest = virtual_path.strip_prefix(CANONICAL_PREFIX)?;

        // First segment is name[@branch]; separators after it are dropped
        // so the remaining path is always relative
        let (name_branch, rest) = match name_branch_rest.split_once('/') {
            Some((first, rest)) => (first, rest.trim_start_matches('/')),
            None => (name_branch_rest, ""),
        };
        let (name, branch) = match name_branch.split_once('@') {
            Some((name, branch)) if !branch.is_empty() => (name, branch),
            Some((name, _)) => (name, DEFAULT_BRANCH),
            None => (name_branch, DEFAULT_BRANCH),
        };

        debug!(name, branch, path = rest, "looking up registry entry");
        let entry = self.entry(name, branch)?;

        debug_assert!(!rest.starts_with('/'));
        Some(Resolution {
            entry,
            path: rest.to_string(),
        })
    }

    // Looks up a name at a branch, applying the std -> std_old rewrite
    pub fn entry(&self, name: &str, branch: &str) -> Option<ResolvedEntry> {
        let name = if is_moved_std(name, branch) {
            debug!(branch, "routing pre-merge std reference to {}", MOVED_MODULE_TARGET);
            MOVED_MODULE_TARGET
        } else {
            name
        };

        let entry = self.registry.get(name)?;

        Some(ResolvedEntry {
            name: name.to_string(),
            branch: branch.to_string(),
            entry: entry.clone(),
            hosts: self.hosts.clone(),
        })
    }
}

// Exact match for tags, prefix match for commit hashes
fn is_moved_std(name: &str, branch: &str) -> bool {
    name == MOVED_MODULE
        && (MOVED_TAGS.contains(&branch)
            || MOVED_COMMIT_PREFIXES
                .iter()
                .any(|prefix| branch.starts_with(prefix)))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does the `?` do on an Option?
//    - `strip_prefix(...)?` returns None from resolve() if the prefix is
//      missing, the same way `?` returns early with an Err on a Result
//
// 2. What is split_once?
//    - Splits a string at the first match only
//    - "std@v1@x".split_once('@') gives ("std", "v1@x")
//
// 3. Why a `match` on RegistryEntry in url_for and repo_for?
//    - The compiler checks that every provider variant is handled
//    - Adding a new provider fails to compile until both URLs exist for it
// -----------------------------------------------------------------------------
