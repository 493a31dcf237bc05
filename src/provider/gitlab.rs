// src/provider/gitlab.rs
// =============================================================================
// Directory listings through the GitLab repository tree API.
//
//   GET {gitlab}/api/v4/projects/{project}/repository/tree
//       ?ref={branch}&path={path}&per_page=100
//
// The project id and path are percent-encoded ("group/project" becomes
// "group%2Fproject"). Only the first page is read.
//
// The tree endpoint doesn't report sizes or symlink destinations, so sizes
// are always 0 and a symlink's target is reported as its own name.
// =============================================================================

use serde::Deserialize;
use tracing::debug;

use super::{DirectoryItem, ItemKind, ProviderClient, ProviderQueryError};
use crate::registry::ProviderKind;

const PAGE_SIZE: u32 = 100;

// Git file mode for symbolic links
const SYMLINK_MODE: &str = "120000";

const PROVIDER: ProviderKind = ProviderKind::GitLab;

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    mode: String,
}

pub(super) async fn list_directory(
    client: &ProviderClient,
    project: &str,
    base_path: Option<&str>,
    sub_path: &str,
    branch: &str,
) -> Result<Vec<DirectoryItem>, ProviderQueryError> {
    let url = listing_url(&client.hosts.gitlab, project, base_path, sub_path, branch);
    debug!(%url, "listing GitLab directory");

    let (status, body) = client.get(PROVIDER, &url, None).await?;
    parse_listing(status, &body)
}

fn listing_url(gitlab: &str, project: &str, base_path: Option<&str>, sub_path: &str, branch: &str) -> String {
    let path = format!("{}{}", base_path.unwrap_or(""), sub_path);
    let path = path.strip_prefix('/').unwrap_or(&path);
    format!(
        "{}/api/v4/projects/{}/repository/tree?ref={}&path={}&per_page={}",
        gitlab,
        urlencoding::encode(project),
        urlencoding::encode(branch),
        urlencoding::encode(path),
        PAGE_SIZE
    )
}

// Turns a tree API response into directory items
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
    if !payload.is_array() {
        return Err(ProviderQueryError::unexpected(PROVIDER, "non-array response", &payload));
    }

    let entries: Vec<TreeEntry> = match serde_json::from_value(payload.clone()) {
        Ok(entries) => entries,
        Err(_) => return Err(ProviderQueryError::unexpected(PROVIDER, "tree entry shape", &payload)),
    };

    Ok(entries.into_iter().map(to_item).collect())
}

fn to_item(entry: TreeEntry) -> DirectoryItem {
    let kind = if entry.mode == SYMLINK_MODE {
        ItemKind::Symlink
    } else {
        match entry.kind.as_str() {
            "tree" => ItemKind::Dir,
            "blob" => ItemKind::File,
            _ => ItemKind::Unknown,
        }
    };

    // The link destination isn't exposed by this endpoint
    let symlink_target = (kind == ItemKind::Symlink).then(|| entry.name.clone());

    DirectoryItem {
        name: entry.name,
        kind,
        size: 0,
        symlink_target,
    }
}
