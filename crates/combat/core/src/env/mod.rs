//! Traits describing read-only collaborators.
//!
//! Oracles expose battlefield geometry, pathfinding, authored definitions
//! and dice. The [`Env`] aggregate bundles them so the encounter can reach
//! everything it needs without coupling to concrete implementations.
mod definitions;
mod error;
mod grid;
mod rng;

use std::fmt;
use std::sync::Arc;

pub use definitions::{
    AbilityDefinition, AbilityId, AbilityKind, ArmorDefinition, ArmorId, ItemDefinition,
    ItemEffect, ItemId, ResourceCost, TargetFlags, WeaponDefinition, WeaponId,
};
pub use error::OracleError;
pub use grid::{GridOracle, OpenGrid, PathOracle};
pub use rng::{PcgRng, RngOracle, RollStream, compute_seed};

use crate::effects::{EffectDefinition, EffectId};

/// Lookup of externally authored definitions.
pub trait DefinitionOracle: Send + Sync {
    fn effect(&self, id: EffectId) -> Option<Arc<EffectDefinition>>;
    fn ability(&self, id: AbilityId) -> Option<Arc<AbilityDefinition>>;
    fn weapon(&self, id: WeaponId) -> Option<Arc<WeaponDefinition>>;
    fn armor(&self, id: ArmorId) -> Option<Arc<ArmorDefinition>>;
    fn item(&self, id: ItemId) -> Option<Arc<ItemDefinition>>;
}

/// Aggregates the read-only oracles an encounter consults while resolving
/// commands.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    grid: Option<&'a dyn GridOracle>,
    paths: Option<&'a dyn PathOracle>,
    definitions: Option<&'a dyn DefinitionOracle>,
    rng: Option<&'a dyn RngOracle>,
}

impl<'a> Env<'a> {
    pub fn new(
        grid: Option<&'a dyn GridOracle>,
        paths: Option<&'a dyn PathOracle>,
        definitions: Option<&'a dyn DefinitionOracle>,
        rng: Option<&'a dyn RngOracle>,
    ) -> Self {
        Self {
            grid,
            paths,
            definitions,
            rng,
        }
    }

    pub fn with_all(
        grid: &'a dyn GridOracle,
        paths: &'a dyn PathOracle,
        definitions: &'a dyn DefinitionOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self::new(Some(grid), Some(paths), Some(definitions), Some(rng))
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None)
    }

    /// # Errors
    ///
    /// Returns `OracleError::GridNotAvailable` if no grid oracle was provided.
    pub fn grid(&self) -> Result<&'a dyn GridOracle, OracleError> {
        self.grid.ok_or(OracleError::GridNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::PathsNotAvailable` if no path oracle was provided.
    pub fn paths(&self) -> Result<&'a dyn PathOracle, OracleError> {
        self.paths.ok_or(OracleError::PathsNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::DefinitionsNotAvailable` if no definition oracle was provided.
    pub fn definitions(&self) -> Result<&'a dyn DefinitionOracle, OracleError> {
        self.definitions.ok_or(OracleError::DefinitionsNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    pub fn effect(&self, id: EffectId) -> Result<Arc<EffectDefinition>, OracleError> {
        self.definitions()?
            .effect(id)
            .ok_or(OracleError::EffectNotFound(id))
    }

    pub fn ability(&self, id: AbilityId) -> Result<Arc<AbilityDefinition>, OracleError> {
        self.definitions()?
            .ability(id)
            .ok_or(OracleError::AbilityNotFound(id))
    }

    pub fn item(&self, id: ItemId) -> Result<Arc<ItemDefinition>, OracleError> {
        self.definitions()?
            .item(id)
            .ok_or(OracleError::ItemNotFound(id))
    }
}

impl fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("grid", &self.grid.is_some())
            .field("paths", &self.paths.is_some())
            .field("definitions", &self.definitions.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}
