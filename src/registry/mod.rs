// src/registry/mod.rs
// =============================================================================
// This module maps virtual paths onto hosted repositories.
//
// Submodules:
// - database: the static name -> provider table
// - resolve: parses /x/<name>@<branch>/<path> and builds download and
//   repository URLs for the matching entry
// =============================================================================

mod database;
mod resolve;

pub use database::{ProviderKind, Registry, RegistryEntry};
pub use resolve::{Resolution, ResolvedEntry, Resolver};
