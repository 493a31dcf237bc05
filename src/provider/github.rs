// src/provider/github.rs
// =============================================================================
// Directory listings through the GitHub contents API.
//
//   GET {api}/repos/{owner}/{repo}/contents/{path}?ref={branch}
//   Accept: application/vnd.github.v3.object
//
// The "object" media type wraps a directory as
//   { "type": "dir", "entries": [ { "name", "type", "size", "target" }, ... ] }
// instead of returning a bare array, which lets us tell a directory apart from
// a file that happens to live at the same path.
// =============================================================================

use serde::Deserialize;
use tracing::debug;

use super::{DirectoryItem, ItemKind, ProviderClient, ProviderQueryError};
use crate::registry::ProviderKind;

const OBJECT_MEDIA_TYPE: &str = "application/vnd.github.v3.object";

const PROVIDER: ProviderKind = ProviderKind::GitHub;

#[derive(Debug, Deserialize)]
struct ContentsObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    entries: Vec<ContentsEntry>,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    target: Option<String>,
}

pub(super) async fn list_directory(
    client: &ProviderClient,
    owner: &str,
    repo: &str,
    base_path: Option<&str>,
    sub_path: &str,
    branch: &str,
) -> Result<Vec<DirectoryItem>, ProviderQueryError> {
    let url = listing_url(&client.hosts.github_api, owner, repo, base_path, sub_path, branch);
    debug!(%url, "listing GitHub directory");

    let (status, body) = client.get(PROVIDER, &url, Some(OBJECT_MEDIA_TYPE)).await?;
    parse_listing(status, &body)
}

fn listing_url(
    api: &str,
    owner: &str,
    repo: &str,
    base_path: Option<&str>,
    sub_path: &str,
    branch: &str,
) -> String {
    let path = format!("{}{}", base_path.unwrap_or(""), sub_path);
    format!(
        "{}/repos/{}/{}/contents/{}?ref={}",
        api,
        owner,
        repo,
        path.trim_start_matches('/'),
        urlencoding::encode(branch)
    )
}

// Turns a contents API response into directory items
fn parse_listing(status: u16, body: &str) -> Result<Vec<DirectoryItem>, ProviderQueryError> {
    if status != 200 {
        return Err(ProviderQueryError::Status {
            provider: PROVIDER,
            status,
            body: body.to_string(),
        });
    }

    let payload: serde_json::Value =
        serde_json::from_str(body).map_err(|_| ProviderQueryError::not_json(PROVIDER, body))?;

    let object: ContentsObject = match serde_json::from_value(payload.clone()) {
        Ok(object) => object,
        Err(_) => return Err(ProviderQueryError::unexpected(PROVIDER, "response shape", &payload)),
    };
    if object.kind != "dir" {
        return Err(ProviderQueryError::unexpected(
            PROVIDER,
            format!("type {}", object.kind),
            &payload,
        ));
    }

    Ok(object.entries.into_iter().map(to_item).collect())
}

fn to_item(entry: ContentsEntry) -> DirectoryItem {
    let kind = match entry.kind.as_str() {
        "file" => ItemKind::File,
        "dir" => ItemKind::Dir,
        "symlink" => ItemKind::Symlink,
        _ => ItemKind::Unknown,
    };

    DirectoryItem {
        name: entry.name,
        kind,
        size: if kind == ItemKind::File { entry.size } else { 0 },
        symlink_target: if kind == ItemKind::Symlink { entry.target } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hosts;
    use crate::registry::{Registry, Resolver};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_listing_url() {
        assert_eq!(
            listing_url("https://api.github.com", "denoland", "deno", Some("/std/"), "fs/", "master"),
            "https://api.github.com/repos/denoland/deno/contents/std/fs/?ref=master"
        );
        assert_eq!(
            listing_url("https://api.github.com", "o", "r", None, "", "v1"),
            "https://api.github.com/repos/o/r/contents/?ref=v1"
        );
    }

    #[test]
    fn test_listing_url_encodes_branch() {
        assert_eq!(
            listing_url("https://api.github.com", "o", "r", None, "src/", "feat#2&a+b"),
            "https://api.github.com/repos/o/r/contents/src/?ref=feat%232%26a%2Bb"
        );
    }

    #[test]
    fn test_file_child_keeps_size() {
        let body = json!({
            "type": "dir",
            "entries": [{ "name": "a.ts", "type": "file", "size": 42 }]
        })
        .to_string();

        let items = parse_listing(200, &body).unwrap();
        assert_eq!(
            items,
            vec![DirectoryItem {
                name: "a.ts".to_string(),
                kind: ItemKind::File,
                size: 42,
                symlink_target: None,
            }]
        );
    }

    #[test]
    fn test_kinds_pass_through() {
        let body = json!({
            "type": "dir",
            "entries": [
                { "name": "fs", "type": "dir", "size": 0 },
                { "name": "latest", "type": "symlink", "size": 7, "target": "v2/mod.ts" },
                { "name": "vendor", "type": "submodule", "size": 0 }
            ]
        })
        .to_string();

        let items = parse_listing(200, &body).unwrap();
        assert_eq!(items[0].kind, ItemKind::Dir);
        assert_eq!(items[1].kind, ItemKind::Symlink);
        assert_eq!(items[1].size, 0);
        assert_eq!(items[1].symlink_target.as_deref(), Some("v2/mod.ts"));
        assert_eq!(items[2].kind, ItemKind::Unknown);
    }

    #[test]
    fn test_non_200_is_status_error() {
        let err = parse_listing(404, r#"{"message":"Not Found"}"#).unwrap_err();
        match err {
            ProviderQueryError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_payload_is_unexpected_shape() {
        let body = json!({ "type": "file", "name": "mod.ts", "size": 10 }).to_string();
        let err = parse_listing(200, &body).unwrap_err();
        match err {
            ProviderQueryError::UnexpectedShape { reason, payload, .. } => {
                assert_eq!(reason, "type file");
                assert!(payload.contains("\"mod.ts\""));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_garbage_body_is_unexpected_shape() {
        let err = parse_listing(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderQueryError::UnexpectedShape { .. }));

        let err = parse_listing(200, "[]").unwrap_err();
        assert!(matches!(err, ProviderQueryError::UnexpectedShape { .. }));
    }

    #[tokio::test]
    async fn test_list_directory_against_mock_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/denoland/deno/contents/std/fs/"))
            .and(query_param("ref", "v0.30.0"))
            .and(header("accept", OBJECT_MEDIA_TYPE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "dir",
                "entries": [
                    { "name": "mod.ts", "type": "file", "size": 512 },
                    { "name": "_util", "type": "dir", "size": 0 }
                ]
            })))
            .mount(&server)
            .await;

        let hosts = Hosts::all_at(&server.uri());
        let registry = Registry::from_json(
            r#"{ "std": { "type": "github", "owner": "denoland", "repo": "deno", "path": "/std/" } }"#,
        )
        .unwrap();
        let resolution = Resolver::new(registry, hosts.clone())
            .resolve("/x/std@v0.30.0/fs/")
            .unwrap();

        let client = ProviderClient::new(hosts, None, None).unwrap();
        let items = client
            .list_directory(&resolution.path, &resolution.entry)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "mod.ts");
        assert_eq!(items[0].size, 512);
        assert_eq!(items[1].kind, ItemKind::Dir);
    }

    #[tokio::test]
    async fn test_list_directory_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let hosts = Hosts::all_at(&server.uri());
        let registry =
            Registry::from_json(r#"{ "r": { "type": "github", "owner": "o", "repo": "r" } }"#).unwrap();
        let resolution = Resolver::new(registry, hosts.clone()).resolve("/x/r/").unwrap();

        let client = ProviderClient::new(hosts, None, None).unwrap();
        let err = client
            .list_directory(&resolution.path, &resolution.entry)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderQueryError::Status { status: 500, .. }));
    }
}
