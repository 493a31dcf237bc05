// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Commands:
// - resolve: show which provider serves a virtual path, and its URLs
// - browse:  list a directory or show a file
// - explore: read locations from stdin and show only the latest one
//
// Global options (--registry, --verbose) come before the subcommand.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "registry-browser",
    version = "0.1.0",
    about = "Browse source files and docs from GitHub, GitLab and package registries",
    long_about = "registry-browser maps paths like /x/<name>@<branch>/<path> onto the repository \
                  that hosts the module, then lists directories or shows files from it. \
                  /std/<path> is shorthand for /x/std/<path>."
)]
pub struct Cli {
    /// JSON registry table to use instead of the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Print debug logs to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show where a virtual path points, without fetching anything
    ///
    /// Example: registry-browser resolve /x/std@v0.18.0/fs/mod.ts
    Resolve {
        /// Virtual path (e.g., /x/oak@v4.0.0/mod.ts or /std/fs/)
        path: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List a directory or show a file
    ///
    /// Example: registry-browser browse "/x/oak/mod.ts?doc"
    Browse {
        /// Virtual path, optionally with a query (?doc shows documentation)
        location: String,

        /// Output the page as JSON
        #[arg(long)]
        json: bool,

        /// Include hidden files (names starting with '.') in listings
        #[arg(long, short)]
        all: bool,

        /// Show extracted documentation instead of source code
        #[arg(long)]
        doc: bool,

        /// Render Markdown files to HTML
        #[arg(long)]
        html: bool,
    },

    /// Navigate to each location read from stdin; only the newest result is shown
    Explore {
        /// Include hidden files in listings
        #[arg(long, short)]
        all: bool,
    },
}
