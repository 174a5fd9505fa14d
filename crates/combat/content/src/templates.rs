//! Unit templates and deployments.
//!
//! A template names its race, class and equipment by key; instantiating it
//! against a [`Catalog`] and an [`ArchetypeRegistry`] produces the
//! `UnitSpec` an encounter spawns from.

use combat_core::{
    AbilityId, ArmorId, DefinitionOracle, ItemId, Loadout, Position, TeamId, UnitId, UnitSpec,
    WeaponId,
};

use crate::archetypes::ArchetypeRegistry;
use crate::catalog::{Catalog, CatalogError, DefinitionKind};

/// Reusable description of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTemplate {
    pub name: String,
    pub race: String,
    pub class: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<WeaponId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub armor: Option<ArmorId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<AbilityId>,
    /// One entry per carried charge.
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<ItemId>,
}

impl UnitTemplate {
    /// Resolves every key and builds a spawn spec.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Missing`] for the first unknown race, class,
    /// weapon, armor, ability or item.
    pub fn instantiate(
        &self,
        id: UnitId,
        team: TeamId,
        position: Position,
        catalog: &Catalog,
        archetypes: &ArchetypeRegistry,
    ) -> Result<UnitSpec, CatalogError> {
        let race = archetypes
            .race(&self.race)
            .ok_or_else(|| CatalogError::missing(DefinitionKind::Race, &self.race, &self.name))?;
        let class = archetypes.class(&self.class).ok_or_else(|| {
            CatalogError::missing(DefinitionKind::Class, &self.class, &self.name)
        })?;

        let weapon = self
            .weapon
            .map(|weapon| {
                catalog.weapon(weapon).ok_or_else(|| {
                    CatalogError::missing(DefinitionKind::Weapon, weapon, &self.name)
                })
            })
            .transpose()?;
        let armor = self
            .armor
            .map(|armor| {
                catalog
                    .armor(armor)
                    .ok_or_else(|| CatalogError::missing(DefinitionKind::Armor, armor, &self.name))
            })
            .transpose()?;

        if let Some(&ability) = self
            .abilities
            .iter()
            .find(|&&ability| catalog.ability(ability).is_none())
        {
            return Err(CatalogError::missing(
                DefinitionKind::Ability,
                ability,
                &self.name,
            ));
        }
        if let Some(&item) = self.items.iter().find(|&&item| catalog.item(item).is_none()) {
            return Err(CatalogError::missing(DefinitionKind::Item, item, &self.name));
        }

        let mut spec = UnitSpec::new(id, self.name.clone(), team, race.clone(), class.clone())
            .at(position)
            .with_loadout(Loadout::new(weapon, armor));
        spec.abilities = self.abilities.clone();
        spec.items = self.items.clone();
        Ok(spec)
    }
}

/// Placement of one templated unit in a scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deployment {
    pub id: UnitId,
    pub team: TeamId,
    pub position: Position,
    /// Key into the scenario's template table.
    pub template: String,
}

/// Resolved starting state of an encounter.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub seed: u64,
    pub units: Vec<UnitSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ArchetypeContribution, WeaponDefinition};

    fn registry() -> ArchetypeRegistry {
        let mut registry = ArchetypeRegistry::new();
        registry
            .add_race(ArchetypeContribution {
                name: "human".into(),
                speed: 60,
                ..ArchetypeContribution::default()
            })
            .expect("race");
        registry
            .add_class(ArchetypeContribution {
                name: "fighter".into(),
                speed: 40,
                ..ArchetypeContribution::default()
            })
            .expect("class");
        registry
    }

    fn template() -> UnitTemplate {
        UnitTemplate {
            name: "guard".into(),
            race: "human".into(),
            class: "fighter".into(),
            weapon: Some(WeaponId(1)),
            armor: None,
            abilities: Vec::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn instantiate_resolves_loadout() {
        let mut catalog = Catalog::new();
        catalog
            .insert_weapon(WeaponDefinition {
                id: WeaponId(1),
                name: "spear".into(),
                base_damage: 5,
                accuracy: 15,
                range: 2,
                attack_cost: 2,
                true_damage: false,
            })
            .expect("weapon");

        let spec = template()
            .instantiate(
                UnitId(4),
                TeamId(1),
                Position::new(2, 3),
                &catalog,
                &registry(),
            )
            .expect("resolves");

        assert_eq!(spec.id, UnitId(4));
        assert_eq!(spec.position, Position::new(2, 3));
        assert_eq!(spec.race.0.speed + spec.class.0.speed, 100);
        assert_eq!(spec.loadout.weapon.as_ref().map(|weapon| weapon.range), Some(2));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let catalog = Catalog::new();
        let error = template()
            .instantiate(UnitId(1), TeamId(0), Position::ORIGIN, &catalog, &registry())
            .expect_err("weapon missing");
        assert_eq!(
            error,
            CatalogError::missing(DefinitionKind::Weapon, "weapon:1", "guard")
        );

        let mut orphan = template();
        orphan.weapon = None;
        orphan.class = "bard".into();
        let error = orphan
            .instantiate(UnitId(1), TeamId(0), Position::ORIGIN, &catalog, &registry())
            .expect_err("class missing");
        assert_eq!(
            error,
            CatalogError::missing(DefinitionKind::Class, "bard", "guard")
        );
    }
}
