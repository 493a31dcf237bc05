// src/provider/mod.rs
// =============================================================================
// This module talks to the hosted providers.
//
// Submodules:
// - github: directory listings through the GitHub contents API
// - gitlab: directory listings through the GitLab repository tree API
//
// This file holds what both share: the normalized DirectoryItem shape, the
// ProviderQueryError type, and ProviderClient, which owns the HTTP client and
// the optional bearer tokens.
//
// Every call is a single request/response round trip. There is no caching and
// no retrying: a failed call is returned to the caller as-is.
//
// Rust concepts:
// - thiserror: derive Display/Error for our error enum
// - async fn: network calls suspend while waiting for the response
// =============================================================================

mod github;
mod gitlab;

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, Hosts};
use crate::registry::{ProviderKind, RegistryEntry, ResolvedEntry};

/// What a directory child is, independent of the provider's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Dir,
    Symlink,
    Unknown,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "file",
            ItemKind::Dir => "dir",
            ItemKind::Symlink => "symlink",
            ItemKind::Unknown => "unknown",
        }
    }
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryItem {
    pub name: String,
    pub kind: ItemKind,
    /// Bytes; 0 for non-files or when the provider doesn't report it
    pub size: u64,
    pub symlink_target: Option<String>,
}

/// A provider call that failed or returned something we can't use
#[derive(Debug, Error)]
pub enum ProviderQueryError {
    #[error("Got an error ({status}) when querying the {provider} API:\n{body}")]
    Status {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("Unexpected {reason} when querying the {provider} API:\n{payload}")]
    UnexpectedShape {
        provider: ProviderKind,
        reason: String,
        payload: String,
    },

    #[error("Request to the {provider} API failed: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} entries don't support directory listings")]
    NoListing { provider: ProviderKind },
}

impl ProviderQueryError {
    // Builds an UnexpectedShape error with the payload pretty-printed
    fn unexpected(provider: ProviderKind, reason: impl Into<String>, payload: &serde_json::Value) -> Self {
        ProviderQueryError::UnexpectedShape {
            provider,
            reason: reason.into(),
            payload: serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
        }
    }

    // For bodies that aren't even JSON; the raw text is kept instead
    fn not_json(provider: ProviderKind, body: &str) -> Self {
        ProviderQueryError::UnexpectedShape {
            provider,
            reason: "non-JSON response".to_string(),
            payload: body.to_string(),
        }
    }
}

/// HTTP access to the providers, shared by listings and content fetches
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
    hosts: Hosts,
    github_token: Option<String>,
    gitlab_token: Option<String>,
}

impl ProviderClient {
    pub fn new(hosts: Hosts, github_token: Option<String>, gitlab_token: Option<String>) -> Result<Self> {
        // GitHub rejects API requests without a User-Agent
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            hosts,
            github_token,
            gitlab_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.hosts.clone(),
            config.github_token.clone(),
            config.gitlab_token.clone(),
        )
    }

    // Lists `sub_path` inside a GitHub or GitLab entry
    pub async fn list_directory(
        &self,
        sub_path: &str,
        entry: &ResolvedEntry,
    ) -> Result<Vec<DirectoryItem>, ProviderQueryError> {
        match entry.entry() {
            RegistryEntry::GitHub { owner, repo, path } => {
                github::list_directory(self, owner, repo, path.as_deref(), sub_path, entry.branch()).await
            }
            RegistryEntry::GitLab { project, path } => {
                gitlab::list_directory(self, project, path.as_deref(), sub_path, entry.branch()).await
            }
            RegistryEntry::Url { .. } | RegistryEntry::PackageRegistry { .. } => {
                Err(ProviderQueryError::NoListing {
                    provider: entry.kind(),
                })
            }
        }
    }

    // Downloads the raw text of `path` inside the entry
    pub async fn fetch_content(&self, entry: &ResolvedEntry, path: &str) -> Result<String, ProviderQueryError> {
        let provider = entry.kind();
        let url = entry.url_for(path);
        debug!(%url, %provider, "fetching file content");

        let (status, body) = self.get(provider, &url, None).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderQueryError::Status { provider, status, body });
        }
        Ok(body)
    }

    // Sends one GET and returns (status, body text). The token for the
    // provider, if any, goes along as bearer auth.
    async fn get(
        &self,
        provider: ProviderKind,
        url: &str,
        accept: Option<&str>,
    ) -> Result<(u16, String), ProviderQueryError> {
        let mut request = self.http.get(url);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }
        if let Some(token) = self.token_for(provider) {
            request = request.bearer_auth(token);
        }

        let transport = |source| ProviderQueryError::Transport { provider, source };
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        debug!(url, status, bytes = body.len(), "provider responded");
        Ok((status, body))
    }

    fn token_for(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::GitHub => self.github_token.as_deref(),
            ProviderKind::GitLab => self.gitlab_token.as_deref(),
            ProviderKind::Url | ProviderKind::PackageRegistry => None,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why thiserror here but anyhow in main.rs?
//    - Callers of list_directory can match on the variants
//      (Status, UnexpectedShape, ...)
//    - main.rs only prints errors, so anyhow's catch-all type is enough there
//
// 2. What is `map_err`?
//    - Converts the error inside a Result into another error type
//    - Here it wraps reqwest::Error into ProviderQueryError::Transport
//
// 3. Why is ProviderClient cheap to clone?
//    - reqwest::Client is an Arc around a connection pool internally
// -----------------------------------------------------------------------------
