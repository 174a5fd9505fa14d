//! Runtime wrappers around the read-only combat oracles.
//!
//! These implementations expose `combat-core` oracle traits and bundle them
//! into an [`OracleManager`] so the runtime can build [`combat_core::Env`]
//! snapshots on demand. The data is immutable at runtime; dynamic state
//! lives in the encounter.
mod grid;

use std::sync::Arc;

use combat_core::{DefinitionOracle, Env, PcgRng, RngOracle};

pub use grid::{DEFAULT_COVER, GridError, GridMap};

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) grid: Arc<GridMap>,
    pub(crate) definitions: Arc<dyn DefinitionOracle>,
    pub(crate) rng: Arc<dyn RngOracle>,
}

impl OracleManager {
    /// Creates a new oracle manager rolling dice with [`PcgRng`].
    pub fn new(grid: GridMap, definitions: impl DefinitionOracle + 'static) -> Self {
        Self {
            grid: Arc::new(grid),
            definitions: Arc::new(definitions),
            rng: Arc::new(PcgRng),
        }
    }

    /// Replaces the dice source, e.g. with a fixed roll in tests.
    pub fn with_rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Arc::new(rng);
        self
    }

    /// Borrows every oracle as an [`Env`] for one encounter call.
    pub fn as_env(&self) -> Env<'_> {
        Env::with_all(
            self.grid.as_ref(),
            self.grid.as_ref(),
            self.definitions.as_ref(),
            self.rng.as_ref(),
        )
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn definitions(&self) -> &dyn DefinitionOracle {
        self.definitions.as_ref()
    }
}

impl std::fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleManager")
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}
