//! Encounter-local state: identifiers, grid coordinates and combatants.
mod common;
mod unit;

use std::collections::BTreeMap;

pub use common::{Position, TeamId, Tick, UnitId};
pub use unit::{Loadout, Unit, UnitSpec};

#[cfg(test)]
pub(crate) use unit::fixtures;

/// Every unit in an encounter, dead or alive, keyed by id.
pub type Roster = BTreeMap<UnitId, Unit>;
