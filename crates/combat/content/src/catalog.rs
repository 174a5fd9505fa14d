//! In-memory definition store.

use std::collections::BTreeMap;
use std::sync::Arc;

use combat_core::{
    AbilityDefinition, AbilityId, ArmorDefinition, ArmorId, DefinitionOracle, EffectDefinition,
    EffectId, ErrorSeverity, GameError, ItemDefinition, ItemEffect, ItemId, WeaponDefinition,
    WeaponId,
};

/// Kind of authored definition, used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DefinitionKind {
    Effect,
    Ability,
    Weapon,
    Armor,
    Item,
    Race,
    Class,
    Template,
}

/// Content that is inconsistent with itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} definition `{key}`")]
    Duplicate { kind: DefinitionKind, key: String },

    #[error("{owner} references unknown {kind} `{key}`")]
    Missing {
        kind: DefinitionKind,
        key: String,
        owner: String,
    },
}

impl CatalogError {
    pub(crate) fn duplicate(kind: DefinitionKind, key: impl ToString) -> Self {
        Self::Duplicate {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn missing(kind: DefinitionKind, key: impl ToString, owner: impl ToString) -> Self {
        Self::Missing {
            kind,
            key: key.to_string(),
            owner: owner.to_string(),
        }
    }
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Duplicate { .. } => "CONTENT_DUPLICATE_DEFINITION",
            CatalogError::Missing { .. } => "CONTENT_MISSING_DEFINITION",
        }
    }
}

/// Every authored definition of one content set, keyed by id.
///
/// Definitions are shared through `Arc` so effect instances and loadouts can
/// hold them without copying.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    effects: BTreeMap<EffectId, Arc<EffectDefinition>>,
    abilities: BTreeMap<AbilityId, Arc<AbilityDefinition>>,
    weapons: BTreeMap<WeaponId, Arc<WeaponDefinition>>,
    armors: BTreeMap<ArmorId, Arc<ArmorDefinition>>,
    items: BTreeMap<ItemId, Arc<ItemDefinition>>,
}

fn insert<K: Ord + Copy + ToString, V>(
    map: &mut BTreeMap<K, Arc<V>>,
    kind: DefinitionKind,
    id: K,
    definition: V,
) -> Result<(), CatalogError> {
    if map.contains_key(&id) {
        return Err(CatalogError::duplicate(kind, id));
    }
    map.insert(id, Arc::new(definition));
    Ok(())
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_effect(&mut self, definition: EffectDefinition) -> Result<(), CatalogError> {
        insert(&mut self.effects, DefinitionKind::Effect, definition.id, definition)
    }

    pub fn insert_ability(&mut self, definition: AbilityDefinition) -> Result<(), CatalogError> {
        insert(&mut self.abilities, DefinitionKind::Ability, definition.id, definition)
    }

    pub fn insert_weapon(&mut self, definition: WeaponDefinition) -> Result<(), CatalogError> {
        insert(&mut self.weapons, DefinitionKind::Weapon, definition.id, definition)
    }

    pub fn insert_armor(&mut self, definition: ArmorDefinition) -> Result<(), CatalogError> {
        insert(&mut self.armors, DefinitionKind::Armor, definition.id, definition)
    }

    pub fn insert_item(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        insert(&mut self.items, DefinitionKind::Item, definition.id, definition)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
            && self.abilities.is_empty()
            && self.weapons.is_empty()
            && self.armors.is_empty()
            && self.items.is_empty()
    }

    pub fn effects(&self) -> impl Iterator<Item = &Arc<EffectDefinition>> {
        self.effects.values()
    }

    pub fn abilities(&self) -> impl Iterator<Item = &Arc<AbilityDefinition>> {
        self.abilities.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.items.values()
    }

    /// Checks that every effect referenced by an ability or item exists.
    ///
    /// # Errors
    ///
    /// Returns the first dangling reference, in id order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for ability in self.abilities.values() {
            for effect in &ability.applies {
                if !self.effects.contains_key(effect) {
                    return Err(CatalogError::missing(DefinitionKind::Effect, effect, ability.id));
                }
            }
        }
        for item in self.items.values() {
            let applied = item.effects.iter().filter_map(|effect| match effect {
                ItemEffect::ApplyEffect(id) => Some(id),
                ItemEffect::Restore { .. } => None,
            });
            for effect in applied {
                if !self.effects.contains_key(effect) {
                    return Err(CatalogError::missing(DefinitionKind::Effect, effect, item.id));
                }
            }
        }
        Ok(())
    }
}

impl DefinitionOracle for Catalog {
    fn effect(&self, id: EffectId) -> Option<Arc<EffectDefinition>> {
        self.effects.get(&id).cloned()
    }

    fn ability(&self, id: AbilityId) -> Option<Arc<AbilityDefinition>> {
        self.abilities.get(&id).cloned()
    }

    fn weapon(&self, id: WeaponId) -> Option<Arc<WeaponDefinition>> {
        self.weapons.get(&id).cloned()
    }

    fn armor(&self, id: ArmorId) -> Option<Arc<ArmorDefinition>> {
        self.armors.get(&id).cloned()
    }

    fn item(&self, id: ItemId) -> Option<Arc<ItemDefinition>> {
        self.items.get(&id).cloned()
    }
}
