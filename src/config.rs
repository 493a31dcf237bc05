// src/config.rs
// =============================================================================
// Runtime configuration, assembled once at startup.
//
// Sources:
// - The registry table: embedded JSON, or a file given with --registry
// - Provider host URLs: defaults, overridable by environment variables
//   (handy for pointing the tool at a local mirror or a test server)
// - Optional bearer tokens: GITHUB_TOKEN and GITLAB_TOKEN
//
// Everything here is read-only after loading.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use url::Url;

use crate::registry::Registry;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_RAW: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_GITHUB_WEB: &str = "https://github.com";
pub const DEFAULT_GITLAB: &str = "https://gitlab.com";

/// Base URLs of the hosted providers, without trailing slashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    pub github_api: String,
    pub github_raw: String,
    pub github_web: String,
    pub gitlab: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            github_api: DEFAULT_GITHUB_API.to_string(),
            github_raw: DEFAULT_GITHUB_RAW.to_string(),
            github_web: DEFAULT_GITHUB_WEB.to_string(),
            gitlab: DEFAULT_GITLAB.to_string(),
        }
    }
}

impl Hosts {
    // Applies REGISTRY_BROWSER_* overrides from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Same as from_env, but with an injectable lookup so tests don't touch
    // the process environment
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let pick = |key: &str, default: String| -> Result<String> {
            match lookup(key) {
                Some(value) => normalize_base_url(&value).with_context(|| format!("Invalid {}", key)),
                None => Ok(default),
            }
        };

        Ok(Self {
            github_api: pick("REGISTRY_BROWSER_GITHUB_API", defaults.github_api)?,
            github_raw: pick("REGISTRY_BROWSER_GITHUB_RAW", defaults.github_raw)?,
            github_web: pick("REGISTRY_BROWSER_GITHUB_WEB", defaults.github_web)?,
            gitlab: pick("REGISTRY_BROWSER_GITLAB", defaults.gitlab)?,
        })
    }

    // Points every provider at one base URL (a local mock server)
    #[cfg(test)]
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            github_api: base.clone(),
            github_raw: base.clone(),
            github_web: base.clone(),
            gitlab: base,
        }
    }
}

// Checks that a configured host is an absolute http(s) URL and strips any
// trailing slash, since URL builders append "/..." themselves
fn normalize_base_url(value: &str) -> Result<String> {
    let parsed = Url::parse(value).map_err(|e| anyhow!("'{}' is not a URL: {}", value, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("'{}' must use http or https", value));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Everything the resolver and provider client need
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: Registry,
    pub hosts: Hosts,
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
}

impl Config {
    // Loads the registry (embedded or from a file), hosts and tokens
    pub fn load(registry_path: Option<&Path>) -> Result<Self> {
        let registry = match registry_path {
            Some(path) => Registry::from_file(path)?,
            None => Registry::embedded()?,
        };

        Ok(Self {
            registry,
            hosts: Hosts::from_env()?,
            github_token: non_empty_env("GITHUB_TOKEN"),
            gitlab_token: non_empty_env("GITLAB_TOKEN"),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
