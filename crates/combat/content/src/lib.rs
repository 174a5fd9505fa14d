//! Data-driven combat content.
//!
//! This crate turns authored data into the read-only inputs of an encounter:
//! - Effect, ability, weapon, armor and item definitions (RON) collected in a
//!   [`Catalog`] that implements the definition oracle
//! - Race and class archetypes (RON)
//! - Unit templates and deployments that resolve into `UnitSpec`s
//! - Combat balance configuration (TOML)
//!
//! Content is consumed through oracles and spawn specs and never appears in
//! encounter state directly.

pub mod archetypes;
pub mod catalog;
pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use archetypes::ArchetypeRegistry;
pub use catalog::{Catalog, CatalogError, DefinitionKind};
pub use templates::{Deployment, Scenario, UnitTemplate};

#[cfg(feature = "loaders")]
pub use loaders::{
    ArchetypeLoader, ConfigLoader, ContentFactory, DefinitionLoader, LoadResult, ScenarioLoader,
};
