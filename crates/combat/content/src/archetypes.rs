//! Named race and class archetypes.

use std::collections::BTreeMap;

use combat_core::{ArchetypeContribution, ClassArchetype, RaceArchetype};

use crate::catalog::{CatalogError, DefinitionKind};

/// Races and classes keyed by their `name`.
#[derive(Clone, Debug, Default)]
pub struct ArchetypeRegistry {
    races: BTreeMap<String, RaceArchetype>,
    classes: BTreeMap<String, ClassArchetype>,
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_race(&mut self, contribution: ArchetypeContribution) -> Result<(), CatalogError> {
        if self.races.contains_key(&contribution.name) {
            return Err(CatalogError::duplicate(DefinitionKind::Race, &contribution.name));
        }
        self.races
            .insert(contribution.name.clone(), RaceArchetype::new(contribution));
        Ok(())
    }

    pub fn add_class(&mut self, contribution: ArchetypeContribution) -> Result<(), CatalogError> {
        if self.classes.contains_key(&contribution.name) {
            return Err(CatalogError::duplicate(DefinitionKind::Class, &contribution.name));
        }
        self.classes
            .insert(contribution.name.clone(), ClassArchetype::new(contribution));
        Ok(())
    }

    pub fn race(&self, name: &str) -> Option<&RaceArchetype> {
        self.races.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassArchetype> {
        self.classes.get(name)
    }

    pub fn race_names(&self) -> impl Iterator<Item = &str> {
        self.races.keys().map(String::as_str)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}
