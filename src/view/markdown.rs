// src/view/markdown.rs
// =============================================================================
// Renders Markdown files to HTML.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Ships an HTML writer that consumes those events
//
// GitHub-flavoured extras (tables, strikethrough, task lists) are switched on
// because most READMEs on the registry use them.
// =============================================================================

use pulldown_cmark::{html, Options, Parser};

// Renders Markdown source into an HTML fragment
//
// Example:
//   "# Title"  ->  "<h1>Title</h1>\n"
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);

    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_link() {
        let html = render_markdown("# Oak\n\nSee [docs](https://oakserver.github.io/oak/).");
        assert!(html.contains("<h1>Oak</h1>"));
        assert!(html.contains(r#"<a href="https://oakserver.github.io/oak/">docs</a>"#));
    }

    #[test]
    fn test_render_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_render_code_block_is_escaped() {
        let html = render_markdown("```ts\nconst x = a < b;\n```\n");
        assert!(html.contains("a &lt; b"));
    }
}
