//! Definition catalog loader.

use std::path::Path;

use combat_core::{
    AbilityDefinition, ArmorDefinition, EffectDefinition, ItemDefinition, WeaponDefinition,
};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::loaders::{LoadResult, read_file};

/// Definition file structure for RON files. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionFile {
    pub effects: Vec<EffectDefinition>,
    pub abilities: Vec<AbilityDefinition>,
    pub weapons: Vec<WeaponDefinition>,
    pub armors: Vec<ArmorDefinition>,
    pub items: Vec<ItemDefinition>,
}

/// Loader for definition catalogs from RON files.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Load a catalog from a RON file containing a [`DefinitionFile`].
    ///
    /// Duplicate ids and references to unknown effects are load errors.
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Catalog> {
        let file: DefinitionFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse definition RON: {}", e))?;
        Self::build(file)
    }

    pub fn build(file: DefinitionFile) -> LoadResult<Catalog> {
        let mut catalog = Catalog::new();
        for effect in file.effects {
            catalog.insert_effect(effect)?;
        }
        for ability in file.abilities {
            catalog.insert_ability(ability)?;
        }
        for weapon in file.weapons {
            catalog.insert_weapon(weapon)?;
        }
        for armor in file.armors {
            catalog.insert_armor(armor)?;
        }
        for item in file.items {
            catalog.insert_item(item)?;
        }
        catalog.validate()?;

        tracing::debug!(
            target: "combat::content",
            effects = catalog.effects().count(),
            abilities = catalog.abilities().count(),
            items = catalog.items().count(),
            "definition catalog loaded"
        );
        Ok(catalog)
    }
}
