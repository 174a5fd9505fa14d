//! Asynchronous abstraction for sourcing unit intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so the encounter
//! can run with human input, scripted fixtures, or simple AI policies.
use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use combat_core::{
    ActionCommand, ActionCost, Encounter, Position, ResourceKind, UnitId, can_afford,
};

use super::errors::Result;
use crate::oracle::OracleManager;

/// Trait for providing commands based on the current encounter.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - AI decisions
/// - Scripted/replayed commands
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide the next command for the active `unit`.
    ///
    /// `encounter` is a read-only snapshot taken after the previous command
    /// resolved. Returning [`ActionCommand::Wait`] ends the turn.
    async fn provide_action(&self, unit: UnitId, encounter: &Encounter) -> Result<ActionCommand>;
}

/// A simple action provider that always returns Wait.
/// Useful for testing or as a fallback.
pub struct WaitActionProvider;

#[async_trait]
impl ActionProvider for WaitActionProvider {
    async fn provide_action(&self, _unit: UnitId, _encounter: &Encounter) -> Result<ActionCommand> {
        Ok(ActionCommand::Wait)
    }
}

/// Replays queued commands per unit, then waits.
#[derive(Default)]
pub struct ScriptedActionProvider {
    scripts: Mutex<BTreeMap<UnitId, VecDeque<ActionCommand>>>,
}

impl ScriptedActionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(
        mut self,
        unit: UnitId,
        commands: impl IntoIterator<Item = ActionCommand>,
    ) -> Self {
        self.scripts
            .get_mut()
            .entry(unit)
            .or_default()
            .extend(commands);
        self
    }

    /// Commands still queued for `unit`.
    pub async fn remaining(&self, unit: UnitId) -> usize {
        self.scripts
            .lock()
            .await
            .get(&unit)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl ActionProvider for ScriptedActionProvider {
    async fn provide_action(&self, unit: UnitId, _encounter: &Encounter) -> Result<ActionCommand> {
        let mut scripts = self.scripts.lock().await;
        Ok(scripts
            .get_mut(&unit)
            .and_then(VecDeque::pop_front)
            .unwrap_or(ActionCommand::Wait))
    }
}

/// Greedy skirmisher: attack the weakest enemy in reach, otherwise close
/// in on the nearest one, otherwise wait.
pub struct NearestEnemyProvider {
    oracles: OracleManager,
}

impl NearestEnemyProvider {
    pub fn new(oracles: OracleManager) -> Self {
        Self { oracles }
    }

    fn decide(&self, id: UnitId, encounter: &Encounter) -> ActionCommand {
        let Some(unit) = encounter.unit(id).filter(|unit| unit.is_alive()) else {
            return ActionCommand::Wait;
        };

        let attack = ActionCost::for_attack(unit, encounter.config());
        if can_afford(unit, &attack) {
            let weakest = encounter
                .targets_in_range(id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|target| encounter.unit(target))
                .min_by_key(|target| (target.current(ResourceKind::Vitality), target.id));
            if let Some(target) = weakest {
                return ActionCommand::Attack { target: target.id };
            }
        }

        let Some(goal) = nearest_enemy(encounter, id) else {
            return ActionCommand::Wait;
        };
        let distance = unit.position.manhattan(goal);
        let env = self.oracles.as_env();
        encounter
            .movement_range(id, &env)
            .unwrap_or_default()
            .into_iter()
            .filter(|tile| tile.manhattan(goal) < distance)
            .min_by_key(|tile| (tile.manhattan(goal), tile.manhattan(unit.position), *tile))
            .map_or(ActionCommand::Wait, |to| ActionCommand::Move { to })
    }
}

#[async_trait]
impl ActionProvider for NearestEnemyProvider {
    async fn provide_action(&self, unit: UnitId, encounter: &Encounter) -> Result<ActionCommand> {
        let command = self.decide(unit, encounter);
        tracing::trace!(target: "runtime::provider", %unit, ?command, "decided");
        Ok(command)
    }
}

fn nearest_enemy(encounter: &Encounter, id: UnitId) -> Option<Position> {
    let unit = encounter.unit(id)?;
    encounter
        .roster()
        .values()
        .filter(|other| other.is_alive() && other.team != unit.team)
        .min_by_key(|other| (unit.position.manhattan(other.position), other.id))
        .map(|other| other.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        ArchetypeContribution, ClassArchetype, CombatConfig, PrimaryAttributes, RaceArchetype,
        ResourceValues, TeamId, UnitSpec,
    };

    use crate::oracle::GridMap;
    use combat_content::Catalog;

    /// 30 vitality and 5 action points.
    fn spec(id: u32, team: u8, position: Position) -> UnitSpec {
        let race = RaceArchetype::new(ArchetypeContribution {
            name: "human".into(),
            attributes: PrimaryAttributes::uniform(10),
            resources: ResourceValues {
                vitality: 20,
                action_points: 4,
                ..ResourceValues::default()
            },
            speed: 100,
            ..ArchetypeContribution::default()
        });
        UnitSpec::new(
            UnitId(id),
            format!("unit {id}"),
            TeamId(team),
            race,
            ClassArchetype::default(),
        )
        .at(position)
    }

    fn encounter(enemy_at: Position) -> Encounter {
        let mut encounter = Encounter::new(CombatConfig::default(), 1);
        encounter.spawn(spec(1, 0, Position::ORIGIN)).expect("spawn");
        encounter.spawn(spec(2, 1, enemy_at)).expect("spawn");
        encounter
    }

    fn provider() -> NearestEnemyProvider {
        NearestEnemyProvider::new(OracleManager::new(GridMap::open(8, 8), Catalog::new()))
    }

    #[tokio::test]
    async fn scripts_replay_in_order_then_wait() {
        let to = Position::new(1, 0);
        let provider = ScriptedActionProvider::new()
            .with_script(UnitId(1), [ActionCommand::Move { to }, ActionCommand::Wait]);
        let encounter = encounter(Position::new(5, 5));

        let first = provider.provide_action(UnitId(1), &encounter).await.expect("ok");
        assert_eq!(first, ActionCommand::Move { to });
        assert_eq!(provider.remaining(UnitId(1)).await, 1);
        provider.provide_action(UnitId(1), &encounter).await.expect("ok");
        let exhausted = provider.provide_action(UnitId(1), &encounter).await.expect("ok");
        assert_eq!(exhausted, ActionCommand::Wait);
        let unscripted = provider.provide_action(UnitId(2), &encounter).await.expect("ok");
        assert_eq!(unscripted, ActionCommand::Wait);
    }

    #[tokio::test]
    async fn adjacent_enemy_is_attacked() {
        let encounter = encounter(Position::new(1, 0));
        let command = provider()
            .provide_action(UnitId(1), &encounter)
            .await
            .expect("ok");
        assert_eq!(command, ActionCommand::Attack { target: UnitId(2) });
    }

    #[tokio::test]
    async fn distant_enemy_is_approached() {
        let encounter = encounter(Position::new(6, 0));
        let command = provider()
            .provide_action(UnitId(1), &encounter)
            .await
            .expect("ok");

        let ActionCommand::Move { to } = command else {
            panic!("expected a move, got {command:?}");
        };
        assert!(to.manhattan(Position::new(6, 0)) < 6);
    }

    #[tokio::test]
    async fn dead_or_unknown_units_wait() {
        let encounter = encounter(Position::new(1, 0));
        let command = provider()
            .provide_action(UnitId(9), &encounter)
            .await
            .expect("ok");
        assert_eq!(command, ActionCommand::Wait);
    }
}
