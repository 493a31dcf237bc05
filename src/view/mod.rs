// src/view/mod.rs
// =============================================================================
// Decides how fetched content is presented.
//
// Submodules:
// - markdown: renders .md files to HTML
// - docs: extracts /** */ documentation from TypeScript sources
//
// This file handles the parts that don't need a parser:
// - splitting a location like "/x/oak/mod.ts?doc" into path and query
// - picking a view (markdown, documentation, or plain code)
// - hiding dotfiles from directory listings
// =============================================================================

mod docs;
mod markdown;

pub use docs::extract_docs;
pub use markdown::render_markdown;

use serde::Serialize;

use crate::provider::DirectoryItem;

pub const NO_DOCUMENTATION: &str = "No documentation available.";

/// A virtual path plus whatever followed the '?'
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        match location.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: query.to_string(),
            },
            None => Self {
                path: location.to_string(),
                query: String::new(),
            },
        }
    }

    // Any query mentioning "doc" asks for the documentation view
    pub fn wants_docs(&self) -> bool {
        self.query.contains("doc")
    }
}

/// How a file should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Markdown,
    Documentation,
    /// Documentation was asked for, but the file type has none
    NoDocumentation,
    Code,
}

impl View {
    pub fn select(path: &str, wants_docs: bool) -> Self {
        if path.ends_with(".md") {
            View::Markdown
        } else if wants_docs && has_docs(path) {
            View::Documentation
        } else if wants_docs {
            View::NoDocumentation
        } else {
            View::Code
        }
    }
}

// Only TypeScript sources get a documentation view
pub fn has_docs(path: &str) -> bool {
    path.ends_with(".ts")
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

// Splits off dotfiles unless `show_hidden` is set.
// Returns the items to show and how many were hidden.
pub fn partition_hidden(items: Vec<DirectoryItem>, show_hidden: bool) -> (Vec<DirectoryItem>, usize) {
    if show_hidden {
        return (items, 0);
    }
    let (hidden, visible): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| is_hidden(&item.name));
    (visible, hidden.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ItemKind;

    fn item(name: &str) -> DirectoryItem {
        DirectoryItem {
            name: name.to_string(),
            kind: ItemKind::File,
            size: 1,
            symlink_target: None,
        }
    }

    #[test]
    fn test_location_parse() {
        let location = Location::parse("/x/oak/mod.ts?doc");
        assert_eq!(location.path, "/x/oak/mod.ts");
        assert!(location.wants_docs());

        let location = Location::parse("/x/oak/mod.ts");
        assert_eq!(location.query, "");
        assert!(!location.wants_docs());

        let location = Location::parse("/x/oak/?tab=files");
        assert_eq!(location.path, "/x/oak/");
        assert!(!location.wants_docs());
    }

    #[test]
    fn test_view_selection() {
        assert_eq!(View::select("README.md", false), View::Markdown);
        assert_eq!(View::select("README.md", true), View::Markdown);
        assert_eq!(View::select("fs/mod.ts", true), View::Documentation);
        assert_eq!(View::select("fs/mod.ts", false), View::Code);
        assert_eq!(View::select("build.js", true), View::NoDocumentation);
        assert_eq!(View::select("build.js", false), View::Code);
    }

    #[test]
    fn test_hidden_files_are_counted() {
        let items = vec![item(".gitignore"), item("mod.ts"), item(".github"), item("README.md")];
        let (visible, hidden) = partition_hidden(items.clone(), false);
        assert_eq!(hidden, 2);
        assert_eq!(
            visible.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["mod.ts", "README.md"]
        );

        let (visible, hidden) = partition_hidden(items, true);
        assert_eq!(hidden, 0);
        assert_eq!(visible.len(), 4);
    }
}
