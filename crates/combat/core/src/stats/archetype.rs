//! Race and class archetypes.
//!
//! A unit's stored base values are the sum of its race and class
//! contributions, computed once when the unit is spawned.

use super::attributes::PrimaryAttributes;
use super::resources::ResourceValues;

/// Contributions shared by races and classes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArchetypeContribution {
    pub name: String,
    pub attributes: PrimaryAttributes,
    /// Flat part of each resource maximum.
    pub resources: ResourceValues,
    /// Regeneration per turn for each resource.
    pub regen: ResourceValues,
    /// Initiative gained per tick before modifiers.
    pub speed: i32,
}

/// Biological archetype (e.g. human, elf).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RaceArchetype(pub ArchetypeContribution);

/// Trained archetype (e.g. fighter, mage).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClassArchetype(pub ArchetypeContribution);

impl RaceArchetype {
    pub fn new(contribution: ArchetypeContribution) -> Self {
        Self(contribution)
    }
}

impl ClassArchetype {
    pub fn new(contribution: ArchetypeContribution) -> Self {
        Self(contribution)
    }
}

/// Base values produced by combining a race with a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchetypeBase {
    pub attributes: PrimaryAttributes,
    pub resources: ResourceValues,
    pub regen: ResourceValues,
    pub speed: i32,
}

impl ArchetypeBase {
    pub fn combine(race: &RaceArchetype, class: &ClassArchetype) -> Self {
        let (race, class) = (&race.0, &class.0);
        Self {
            attributes: race.attributes.combined(&class.attributes),
            resources: race.resources.combined(&class.resources),
            regen: race.regen.combined(&class.regen),
            speed: race.speed + class.speed,
        }
    }
}
