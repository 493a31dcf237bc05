// src/view/docs.rs
// =============================================================================
// Pulls documentation out of TypeScript source.
//
// A documented item is a `/** ... */` block followed by the declaration it
// describes:
//
//   /** Reads a file as text. */
//   export async function readFileStr(path: string): Promise<string> {
//
// becomes DocItem { signature: "export async function readFileStr(...)...",
// doc: "Reads a file as text." }. Blocks with nothing after them are dropped.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocItem {
    pub signature: String,
    pub doc: String,
}

pub fn extract_docs(source: &str) -> Vec<DocItem> {
    let mut items = Vec::new();
    let mut lines = source.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("/**") {
            continue;
        }

        // Collect the comment body up to and including the closing "*/"
        let mut block = vec![trimmed.to_string()];
        if !trimmed.contains("*/") {
            for next in lines.by_ref() {
                block.push(next.trim().to_string());
                if next.contains("*/") {
                    break;
                }
            }
        }

        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        // A block directly followed by another block documents nothing;
        // the next one starts over on the following iteration
        let Some(signature) = lines.peek().copied().map(str::trim) else {
            break;
        };
        if signature.starts_with("/**") {
            continue;
        }

        lines.next();
        items.push(DocItem {
            signature: clean_signature(signature),
            doc: clean_comment(&block),
        });
    }

    items
}

// Strips comment markers and leading asterisks, keeping paragraph breaks
fn clean_comment(block: &[String]) -> String {
    let text: Vec<&str> = block
        .iter()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("/**").unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line);
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .collect();

    text.join("\n").trim().to_string()
}

// Drops an opening body brace so only the declaration remains
fn clean_signature(line: &str) -> String {
    line.trim_end_matches('{').trim_end().to_string()
}
