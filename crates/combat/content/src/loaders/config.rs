//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
///
/// Missing keys keep their default values.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.min_hit_chance > config.max_hit_chance {
            anyhow::bail!(
                "min_hit_chance ({}) exceeds max_hit_chance ({})",
                config.min_hit_chance,
                config.max_hit_chance
            );
        }
        if config.initiative_threshold == 0 {
            anyhow::bail!("initiative_threshold must be positive");
        }
        Ok(config)
    }
}
