//! Race and class archetype loader.

use std::path::Path;

use combat_core::ArchetypeContribution;
use serde::{Deserialize, Serialize};

use crate::archetypes::ArchetypeRegistry;
use crate::loaders::{LoadResult, read_file};

/// Archetype file structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeFile {
    pub races: Vec<ArchetypeContribution>,
    pub classes: Vec<ArchetypeContribution>,
}

/// Loader for archetype registries from RON files.
pub struct ArchetypeLoader;

impl ArchetypeLoader {
    pub fn load(path: &Path) -> LoadResult<ArchetypeRegistry> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ArchetypeRegistry> {
        let file: ArchetypeFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse archetype RON: {}", e))?;

        let mut registry = ArchetypeRegistry::new();
        for race in file.races {
            registry.add_race(race)?;
        }
        for class in file.classes {
            registry.add_class(class)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_default_to_zero() {
        let registry = ArchetypeLoader::parse(
            r#"
            (
                races: [(name: "elf", attributes: (dexterity: 4, wisdom: 2), speed: 70)],
                classes: [(name: "mage", resources: (mana: 12), regen: (mana: 2))],
            )
            "#,
        )
        .expect("valid archetypes");

        let elf = registry.race("elf").expect("elf");
        assert_eq!(elf.0.attributes.dexterity, 4);
        assert_eq!(elf.0.attributes.strength, 0);
        assert_eq!(elf.0.speed, 70);

        let mage = registry.class("mage").expect("mage");
        assert_eq!(mage.0.resources.mana, 12);
        assert_eq!(mage.0.regen.mana, 2);
        assert_eq!(mage.0.speed, 0);
    }

    #[test]
    fn duplicate_names_fail_the_load() {
        let content = r#"(races: [(name: "orc"), (name: "orc")])"#;
        assert!(ArchetypeLoader::parse(content).is_err());
    }
}
