//! Read-only views for presentation layers.

use std::collections::BTreeSet;

use crate::effects::{EffectDuration, EffectId};
use crate::state::{Position, TeamId, Unit, UnitId};
use crate::stats::{PrimaryAttributes, ResourceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceView {
    pub kind: ResourceKind,
    pub current: i32,
    pub max: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectView {
    pub id: EffectId,
    pub name: String,
    pub remaining: EffectDuration,
    pub stacks: u32,
}

/// Snapshot of everything a unit panel shows. All values are effective.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub alive: bool,
    pub initiative: u32,
    pub speed: i32,
    pub attributes: PrimaryAttributes,
    pub resources: Vec<ResourceView>,
    pub armor: i32,
    pub magic_resist: i32,
    pub effects: Vec<EffectView>,
}

impl UnitView {
    pub fn of(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            team: unit.team,
            position: unit.position,
            alive: unit.is_alive(),
            initiative: unit.initiative(),
            speed: unit.effective_speed(),
            attributes: unit.effective_attributes(),
            resources: ResourceKind::ALL
                .into_iter()
                .map(|kind| ResourceView {
                    kind,
                    current: unit.current(kind),
                    max: unit.effective_max(kind),
                })
                .collect(),
            armor: unit.armor_rating(),
            magic_resist: unit.magic_resist(),
            effects: unit
                .effects()
                .iter()
                .map(|instance| EffectView {
                    id: instance.definition().id,
                    name: instance.definition().name.clone(),
                    remaining: instance.remaining(),
                    stacks: instance.stacks(),
                })
                .collect(),
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourceView> {
        self.resources.iter().find(|view| view.kind == kind)
    }
}

/// Widest diamond [`tiles_within`] enumerates.
pub const MAX_TILE_RANGE: u32 = 64;

/// Every tile within `range` Manhattan steps of `origin`, excluding `origin`.
///
/// `range` is capped at [`MAX_TILE_RANGE`]; tiles past the edge of the
/// coordinate space collapse onto it.
pub fn tiles_within(origin: Position, range: u32) -> BTreeSet<Position> {
    if range > MAX_TILE_RANGE {
        tracing::warn!(
            target: "combat::encounter",
            range,
            cap = MAX_TILE_RANGE,
            "tile range capped"
        );
    }
    let reach = range.min(MAX_TILE_RANGE) as i32;
    let mut tiles = BTreeSet::new();
    for dx in -reach..=reach {
        let remaining = reach - dx.abs();
        for dy in -remaining..=remaining {
            let tile = Position::new(origin.x.saturating_add(dx), origin.y.saturating_add(dy));
            if tile != origin {
                tiles.insert(tile);
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_of_radius_two() {
        let tiles = tiles_within(Position::ORIGIN, 2);
        assert_eq!(tiles.len(), 12);
        assert!(tiles.contains(&Position::new(0, 2)));
        assert!(tiles.contains(&Position::new(1, -1)));
        assert!(!tiles.contains(&Position::new(2, 1)));
        assert!(!tiles.contains(&Position::ORIGIN));
    }

    #[test]
    fn huge_ranges_are_capped() {
        let capped = tiles_within(Position::ORIGIN, MAX_TILE_RANGE);
        assert_eq!(tiles_within(Position::ORIGIN, u32::MAX), capped);

        let corner = Position::new(i32::MAX, i32::MIN);
        let edge = tiles_within(corner, u32::MAX);
        assert!(edge.contains(&Position::new(i32::MAX - 1, i32::MIN)));
        assert!(!edge.contains(&corner));
        assert!(edge.len() < capped.len());
    }
}
