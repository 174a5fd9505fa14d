//! Content loaders for reading combat data from files.
//!
//! Definitions, archetypes and scenarios are RON; balance configuration is
//! TOML. Every loader has a `parse` entry point for in-memory text and a
//! `load` entry point for files.

pub mod archetypes;
pub mod config;
pub mod definitions;
pub mod factory;
pub mod scenario;

pub use archetypes::ArchetypeLoader;
pub use config::ConfigLoader;
pub use definitions::DefinitionLoader;
pub use factory::ContentFactory;
pub use scenario::ScenarioLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
