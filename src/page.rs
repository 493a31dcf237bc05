// src/page.rs
// =============================================================================
// Loads one page for a location: the top-level request handler.
//
// Flow:
// 1. Split the location into virtual path and query
// 2. Resolve the path; no match means a "not found" page
// 3. Empty paths and paths ending in '/' on GitHub/GitLab are listed as
//    directories; everything else is fetched as file content
// 4. Provider errors become a "failed" page carrying the error message
//
// A Page is plain data, so the CLI can print it as text or JSON, and the
// explore loop can hand it to the navigator.
// =============================================================================

use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::provider::{DirectoryItem, ProviderClient};
use crate::registry::{Resolution, Resolver};
use crate::view::{partition_hidden, Location, View};

/// Resolver plus provider client: everything needed to load pages
#[derive(Debug, Clone)]
pub struct Browser {
    resolver: Resolver,
    client: ProviderClient,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowseOptions {
    /// Include dotfiles in directory listings
    pub show_hidden: bool,
    /// Show documentation even without "?doc" in the location
    pub docs: bool,
}

/// What a navigation ends up showing
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Directory {
        location: String,
        repository_url: String,
        items: Vec<DirectoryItem>,
        hidden: usize,
    },
    File {
        location: String,
        path: String,
        raw_url: String,
        repository_url: String,
        view: View,
        contents: String,
    },
    NotFound {
        location: String,
    },
    Failed {
        location: String,
        error: String,
    },
}

impl Page {
    // 0 = shown, 1 = not found, 2 = provider error
    pub fn exit_code(&self) -> i32 {
        match self {
            Page::Directory { .. } | Page::File { .. } => 0,
            Page::NotFound { .. } => 1,
            Page::Failed { .. } => 2,
        }
    }
}

impl Browser {
    pub fn new(resolver: Resolver, client: ProviderClient) -> Self {
        Self { resolver, client }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            Resolver::new(config.registry.clone(), config.hosts.clone()),
            ProviderClient::from_config(config)?,
        ))
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub async fn load(&self, location: &str, options: BrowseOptions) -> Page {
        let parsed = Location::parse(location);
        let location = location.trim().to_string();

        let Some(Resolution { entry, path }) = self.resolver.resolve(&parsed.path) else {
            return Page::NotFound { location };
        };

        let is_directory = path.is_empty() || path.ends_with('/');
        let result = if is_directory && entry.lists_directories() {
            self.client
                .list_directory(&path, &entry)
                .await
                .map(|items| {
                    let (items, hidden) = partition_hidden(items, options.show_hidden);
                    Page::Directory {
                        location: location.clone(),
                        repository_url: entry.repo_for(&path),
                        items,
                        hidden,
                    }
                })
        } else {
            let view = View::select(&path, options.docs || parsed.wants_docs());
            self.client
                .fetch_content(&entry, &path)
                .await
                .map(|contents| Page::File {
                    location: location.clone(),
                    raw_url: entry.url_for(&path),
                    repository_url: entry.repo_for(&path),
                    path: path.clone(),
                    view,
                    contents,
                })
        };

        result.unwrap_or_else(|error| {
            warn!(%location, %error, "provider query failed");
            Page::Failed {
                location,
                error: error.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hosts;
    use crate::provider::ItemKind;
    use crate::registry::Registry;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn browser_at(base: &str) -> Browser {
        let registry = Registry::from_json(&format!(
            r#"{{
                "std": {{ "type": "github", "owner": "denoland", "repo": "deno", "path": "/std/" }},
                "std_old": {{ "type": "github", "owner": "denoland", "repo": "deno_std" }},
                "pkg": {{ "type": "esm", "url": "{base}/pkg@${{v}}/", "repo": "{base}/browse/pkg@${{v}}/" }}
            }}"#
        ))
        .unwrap();
        let hosts = Hosts::all_at(base);
        Browser::new(
            Resolver::new(registry, hosts.clone()),
            ProviderClient::new(hosts, None, None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_unknown_location_is_not_found() {
        let browser = browser_at("http://127.0.0.1:9");
        let page = browser.load("/nope", BrowseOptions::default()).await;
        assert!(matches!(page, Page::NotFound { .. }));
        assert_eq!(page.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_directory_hides_dotfiles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/denoland/deno/contents/std/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "dir",
                "entries": [
                    { "name": ".gitignore", "type": "file", "size": 12 },
                    { "name": ".github", "type": "dir", "size": 0 },
                    { "name": "fs", "type": "dir", "size": 0 },
                    { "name": "README.md", "type": "file", "size": 300 }
                ]
            })))
            .mount(&server)
            .await;

        let browser = browser_at(&server.uri());
        let page = browser.load("/std/", BrowseOptions::default()).await;
        match &page {
            Page::Directory {
                items,
                hidden,
                repository_url,
                ..
            } => {
                assert_eq!(*hidden, 2);
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].kind, ItemKind::Dir);
                assert_eq!(
                    repository_url,
                    &format!("{}/denoland/deno/tree/master/std/", server.uri())
                );
            }
            other => panic!("unexpected page: {other:?}"),
        }

        let options = BrowseOptions {
            show_hidden: true,
            ..BrowseOptions::default()
        };
        match browser.load("/std/", options).await {
            Page::Directory { items, hidden, .. } => {
                assert_eq!(hidden, 0);
                assert_eq!(items.len(), 4);
            }
            other => panic!("unexpected page: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_with_doc_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/denoland/deno_std/v0.18.0/fs/mod.ts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("/** Hi */\nexport const a = 1;\n"))
            .mount(&server)
            .await;

        let browser = browser_at(&server.uri());
        let page = browser
            .load("/x/std@v0.18.0/fs/mod.ts?doc", BrowseOptions::default())
            .await;
        match page {
            Page::File {
                view,
                contents,
                raw_url,
                ..
            } => {
                assert_eq!(view, View::Documentation);
                assert!(contents.starts_with("/** Hi */"));
                assert_eq!(
                    raw_url,
                    format!("{}/denoland/deno_std/v0.18.0/fs/mod.ts", server.uri())
                );
            }
            other => panic!("unexpected page: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_directory_path_is_fetched_as_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg@latest/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("index"))
            .mount(&server)
            .await;

        let browser = browser_at(&server.uri());
        let page = browser.load("/x/pkg/", BrowseOptions::default()).await;
        match page {
            Page::File { view, contents, .. } => {
                assert_eq!(view, View::Code);
                assert_eq!(contents, "index");
            }
            other => panic!("unexpected page: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_failed_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API rate limit exceeded"))
            .mount(&server)
            .await;

        let browser = browser_at(&server.uri());
        let page = browser.load("/x/std/", BrowseOptions::default()).await;
        match &page {
            Page::Failed { error, .. } => {
                assert!(error.contains("403"));
                assert!(error.contains("API rate limit exceeded"));
            }
            other => panic!("unexpected page: {other:?}"),
        }
        assert_eq!(page.exit_code(), 2);
    }
}
