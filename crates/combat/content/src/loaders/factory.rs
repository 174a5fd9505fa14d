//! Content factory for loading a complete content set from a directory.

use std::path::{Path, PathBuf};

use combat_core::CombatConfig;

use crate::archetypes::ArchetypeRegistry;
use crate::catalog::Catalog;
use crate::loaders::{
    ArchetypeLoader, ConfigLoader, DefinitionLoader, LoadResult, ScenarioLoader,
};
use crate::templates::Scenario;

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── definitions.ron
/// ├── archetypes.ron
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `config.toml`, or defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "combat::content", path = %path.display(), "no config file, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the definition catalog from `definitions.ron`.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        DefinitionLoader::load(&self.data_dir.join("definitions.ron"))
    }

    /// Load races and classes from `archetypes.ron`.
    pub fn load_archetypes(&self) -> LoadResult<ArchetypeRegistry> {
        ArchetypeLoader::load(&self.data_dir.join("archetypes.ron"))
    }

    /// Load `scenarios/{name}.ron` against an already loaded catalog.
    pub fn load_scenario(
        &self,
        name: &str,
        catalog: &Catalog,
        archetypes: &ArchetypeRegistry,
    ) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path, catalog, archetypes)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{AbilityId, DefinitionOracle};

    fn bundled() -> ContentFactory {
        ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    #[test]
    fn bundled_content_loads() {
        let factory = bundled();
        let config = factory.load_config().expect("config");
        let catalog = factory.load_catalog().expect("catalog");
        let archetypes = factory.load_archetypes().expect("archetypes");
        let scenario = factory
            .load_scenario("skirmish", &catalog, &archetypes)
            .expect("scenario");

        assert_eq!(config.initiative_threshold, CombatConfig::DEFAULT_INITIATIVE_THRESHOLD);
        assert!(catalog.ability(AbilityId(1)).is_some());
        assert_eq!(scenario.units.len(), 4);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let factory = ContentFactory::new(dir.path());

        assert_eq!(factory.load_config().expect("defaults"), CombatConfig::default());
        assert!(factory.load_catalog().is_err());
        assert_eq!(factory.data_dir(), dir.path());
    }
}
