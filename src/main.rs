// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load the configuration (registry table, hosts, tokens)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the page and exit with a proper code
//    (0 = shown, 1 = not found, 2 = provider or internal error)
//
// This is the only place that turns failures into user-visible output;
// everything below it returns pages, Options, or Results.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;        // src/cli.rs - command-line parsing
mod config;     // src/config.rs - registry table, hosts and tokens
mod navigation; // src/navigation/ - latest-wins display state
mod page;       // src/page.rs - loads one page for a location
mod provider;   // src/provider/ - GitHub/GitLab listings and raw downloads
mod registry;   // src/registry/ - virtual path resolution
mod view;       // src/view/ - markdown, docs and code views

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Config;
use navigation::Navigator;
use page::{BrowseOptions, Browser, Page};
use provider::{DirectoryItem, ItemKind};
use view::View;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.registry.as_deref())?;
    info!(entries = config.registry.len(), "registry loaded");
    let browser = Browser::from_config(&config)?;

    match cli.command {
        Commands::Resolve { path, json } => handle_resolve(&browser, &path, json),
        Commands::Browse {
            location,
            json,
            all,
            doc,
            html,
        } => {
            let options = BrowseOptions {
                show_hidden: all,
                docs: doc,
            };
            handle_browse(&browser, &location, options, json, html).await
        }
        Commands::Explore { all } => {
            let options = BrowseOptions {
                show_hidden: all,
                docs: false,
            };
            handle_explore(browser, options).await
        }
    }
}

// Logs go to stderr so they never mix with page output.
// Default is warnings only; --verbose turns on our debug logs.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,registry_browser=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Handles the 'resolve' subcommand
fn handle_resolve(browser: &Browser, path: &str, json: bool) -> Result<i32> {
    let Some(resolution) = browser.resolver().resolve(path) else {
        if json {
            println!("null");
        } else {
            println!("❌ Not found: {}", path);
        }
        return Ok(1);
    };

    let report = resolution.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:<12} {}", "Name:", report.name);
        println!("{:<12} {}", "Provider:", report.provider);
        println!("{:<12} {}", "Branch:", report.branch);
        println!("{:<12} {}", "Path:", report.path);
        println!("{:<12} {}", "Raw:", report.raw_url);
        println!("{:<12} {}", "Repository:", report.repository_url);
    }
    Ok(0)
}

// Handles the 'browse' subcommand
async fn handle_browse(
    browser: &Browser,
    location: &str,
    options: BrowseOptions,
    json: bool,
    html: bool,
) -> Result<i32> {
    let page = browser.load(location, options).await;
    print_page(&page, json, html)?;
    Ok(page.exit_code())
}

// Handles the 'explore' subcommand
//
// Each stdin line starts a navigation right away, without waiting for the
// previous one. The navigator prints a page only if no newer line has been
// read by the time it finishes loading.
async fn handle_explore(browser: Browser, options: BrowseOptions) -> Result<i32> {
    let browser = Arc::new(browser);
    let navigator: Navigator<Page> = Navigator::new(|page: &Page| {
        if let Err(e) = print_page(page, false, false) {
            eprintln!("Error: {:#}", e);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let location = line.trim().to_string();
        if location.is_empty() {
            continue;
        }
        debug!(%location, "navigating");

        let browser = Arc::clone(&browser);
        pending.push(navigator.navigate(async move { browser.load(&location, options).await }));
    }

    for handle in pending {
        handle.await?;
    }

    Ok(navigator.displayed().map(|page| page.exit_code()).unwrap_or(0))
}

// Prints a page either as text or JSON
fn print_page(page: &Page, json: bool, html: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    match page {
        Page::Directory {
            location,
            repository_url,
            items,
            hidden,
        } => {
            println!("📁 {}", location);
            println!("   Repository: {}", repository_url);
            println!();
            print_listing(items);
            if *hidden > 0 {
                println!();
                println!("👻 {} hidden file(s) (use --all to show them)", hidden);
            }
        }
        Page::File {
            location,
            path,
            raw_url,
            repository_url,
            view,
            contents,
        } => {
            println!("📄 {}", location);
            println!("   Repository: {}", repository_url);
            println!("   Raw: {}", raw_url);
            let source_location = location.split('?').next().unwrap_or(location);
            match view {
                View::Code if view::has_docs(path) => {
                    println!("   Documentation: {}?doc", source_location)
                }
                View::Documentation | View::NoDocumentation => {
                    println!("   Source code: {}", source_location)
                }
                View::Code | View::Markdown => {}
            }
            println!();
            print_contents(*view, contents, html);
        }
        Page::NotFound { location } => {
            println!("❌ Not found: {}", location);
        }
        Page::Failed { location, error } => {
            eprintln!("⚠️  Could not load {}:", location);
            eprintln!("{}", error);
        }
    }
    Ok(())
}

fn print_contents(view: View, contents: &str, html: bool) {
    match view {
        View::Markdown if html => print!("{}", view::render_markdown(contents)),
        View::Markdown | View::Code => println!("{}", contents),
        View::Documentation => {
            let docs = view::extract_docs(contents);
            if docs.is_empty() {
                println!("{}", view::NO_DOCUMENTATION);
            }
            for item in docs {
                println!("{}", item.signature);
                for line in item.doc.lines() {
                    println!("    {}", line);
                }
                println!();
            }
        }
        View::NoDocumentation => println!("{}", view::NO_DOCUMENTATION),
    }
}

// Prints a directory listing as a table
fn print_listing(items: &[DirectoryItem]) {
    println!("{:<10} {:>10}  {}", "TYPE", "SIZE", "NAME");
    println!("{}", "=".repeat(60));

    for item in items {
        let size = if item.kind == ItemKind::File {
            item.size.to_string()
        } else {
            String::new()
        };
        println!("{:<10} {:>10}  {}", item.kind.as_str(), size, format_name(item));
    }
}

// Directories get a trailing '/', symlinks show where they point
fn format_name(item: &DirectoryItem) -> String {
    match (item.kind, item.symlink_target.as_deref()) {
        (ItemKind::Dir, _) => format!("{}/", item.name),
        (ItemKind::Symlink, Some(target)) if target != item.name => {
            format!("{} -> {}", item.name, target)
        }
        _ => item.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, kind: ItemKind, target: Option<&str>) -> DirectoryItem {
        DirectoryItem {
            name: name.to_string(),
            kind,
            size: 0,
            symlink_target: target.map(str::to_string),
        }
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(&item("fs", ItemKind::Dir, None)), "fs/");
        assert_eq!(format_name(&item("mod.ts", ItemKind::File, None)), "mod.ts");
        assert_eq!(
            format_name(&item("latest", ItemKind::Symlink, Some("v2/mod.ts"))),
            "latest -> v2/mod.ts"
        );
        // GitLab reports the link's own name as its target
        assert_eq!(
            format_name(&item("link", ItemKind::Symlink, Some("link"))),
            "link"
        );
    }
}
