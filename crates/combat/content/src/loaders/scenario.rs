//! Scenario loader.
//!
//! A scenario file carries the encounter seed, a table of unit templates and
//! the deployments that place them on the grid.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archetypes::ArchetypeRegistry;
use crate::catalog::{Catalog, CatalogError, DefinitionKind};
use crate::loaders::{LoadResult, read_file};
use crate::templates::{Deployment, Scenario, UnitTemplate};

/// Scenario file structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub seed: u64,
    pub templates: BTreeMap<String, UnitTemplate>,
    pub deployments: Vec<Deployment>,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario, resolving every deployment against `catalog` and
    /// `archetypes`.
    pub fn load(
        path: &Path,
        catalog: &Catalog,
        archetypes: &ArchetypeRegistry,
    ) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content, catalog, archetypes)
    }

    pub fn parse(
        content: &str,
        catalog: &Catalog,
        archetypes: &ArchetypeRegistry,
    ) -> LoadResult<Scenario> {
        let file: ScenarioFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        let mut units = Vec::with_capacity(file.deployments.len());
        for deployment in &file.deployments {
            let template = file.templates.get(&deployment.template).ok_or_else(|| {
                CatalogError::missing(DefinitionKind::Template, &deployment.template, deployment.id)
            })?;
            let spec = template
                .instantiate(
                    deployment.id,
                    deployment.team,
                    deployment.position,
                    catalog,
                    archetypes,
                )
                .map_err(|e| anyhow::anyhow!("Failed to deploy unit {}: {}", deployment.id, e))?;
            units.push(spec);
        }

        Ok(Scenario {
            seed: file.seed,
            units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ArchetypeContribution, Position, TeamId, UnitId};

    fn archetypes() -> ArchetypeRegistry {
        let mut registry = ArchetypeRegistry::new();
        for name in ["human", "orc"] {
            registry
                .add_race(ArchetypeContribution {
                    name: name.into(),
                    ..ArchetypeContribution::default()
                })
                .expect("race");
        }
        registry
            .add_class(ArchetypeContribution {
                name: "fighter".into(),
                ..ArchetypeContribution::default()
            })
            .expect("class");
        registry
    }

    #[test]
    fn deployments_share_templates() {
        let scenario = ScenarioLoader::parse(
            r#"
            (
                seed: 99,
                templates: {
                    "grunt": (name: "Grunt", race: "orc", class: "fighter"),
                },
                deployments: [
                    (id: (1), team: (1), position: (x: 4, y: 0), template: "grunt"),
                    (id: (2), team: (1), position: (x: 4, y: 1), template: "grunt"),
                ],
            )
            "#,
            &Catalog::new(),
            &archetypes(),
        )
        .expect("valid scenario");

        assert_eq!(scenario.seed, 99);
        assert_eq!(scenario.units.len(), 2);
        assert_eq!(scenario.units[1].id, UnitId(2));
        assert_eq!(scenario.units[1].team, TeamId(1));
        assert_eq!(scenario.units[1].position, Position::new(4, 1));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let error = ScenarioLoader::parse(
            r#"(seed: 1, templates: {}, deployments: [(id: (1), team: (0), position: (x: 0, y: 0), template: "ghost")])"#,
            &Catalog::new(),
            &archetypes(),
        )
        .expect_err("unknown template");
        assert!(error.to_string().contains("ghost"));
    }
}
