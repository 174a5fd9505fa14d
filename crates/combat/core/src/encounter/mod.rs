//! Encounter orchestration.
//!
//! One [`Encounter`] owns everything a single fight mutates: the roster, the
//! scheduler, the config and the dice state. There is no global; callers pass
//! the encounter (and an [`Env`] of read-only oracles) explicitly.
//!
//! ```text
//! step()    → scheduler tick → turn start: effect ticks → regeneration
//! perform() → validate (unit, target, range, cost) → spend → resolve → reap deaths
//! ```
mod error;
mod events;
mod query;

use std::collections::{BTreeSet, btree_map::Entry};
use std::sync::Arc;

pub use error::EncounterError;
pub use events::{ActionReport, CombatEvent, EncounterOutcome, StepOutcome};
pub use query::{EffectView, MAX_TILE_RANGE, ResourceView, UnitView, tiles_within};

use crate::action::{ActionCommand, ActionCost, ActionError, spend};
use crate::combat::{AttackOutcome, AttackResult, CombatResolver, DamageKind};
use crate::config::CombatConfig;
use crate::effects::{ApplyOutcome, CasterSnapshot, EffectDefinition, apply_effect, tick_effects};
use crate::env::{
    AbilityDefinition, AbilityKind, Env, GridOracle, ItemDefinition, ItemEffect, RngOracle,
    RollStream, TargetFlags,
};
use crate::state::{Position, Roster, Tick, Unit, UnitId, UnitSpec};
use crate::stats::ResourceKind;
use crate::turn::{TurnError, TurnScheduler};

/// Oracles a resolution needs, captured during validation.
#[derive(Clone, Copy)]
struct Dice<'e> {
    grid: &'e dyn GridOracle,
    rng: &'e dyn RngOracle,
}

enum ItemStep {
    Restore { resource: ResourceKind, amount: i32 },
    Apply(Arc<EffectDefinition>),
}

/// A command that passed validation. Executing it cannot fail.
enum Plan<'e> {
    Move {
        from: Position,
        to: Position,
    },
    Attack {
        target: UnitId,
        dice: Dice<'e>,
    },
    Ability {
        definition: Arc<AbilityDefinition>,
        target: UnitId,
        effects: Vec<Arc<EffectDefinition>>,
        dice: Dice<'e>,
    },
    Item {
        definition: Arc<ItemDefinition>,
        target: UnitId,
        steps: Vec<ItemStep>,
    },
    Wait,
}

/// A single combat.
#[derive(Clone, Debug)]
pub struct Encounter {
    config: CombatConfig,
    seed: u64,
    nonce: u64,
    roster: Roster,
    scheduler: TurnScheduler,
}

impl Encounter {
    pub fn new(config: CombatConfig, seed: u64) -> Self {
        let scheduler = TurnScheduler::new(config.initiative_threshold);
        Self {
            config,
            seed,
            nonce: 0,
            roster: Roster::new(),
            scheduler,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of commands accepted so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.roster.get(&id)
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn active_unit(&self) -> Option<UnitId> {
        self.scheduler.active_unit()
    }

    pub fn elapsed(&self) -> Tick {
        self.scheduler.elapsed()
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Builds a unit from `spec` at full resources and registers it.
    ///
    /// # Errors
    ///
    /// Rejects duplicate ids and tiles already held by a living unit.
    pub fn spawn(&mut self, spec: UnitSpec) -> Result<UnitId, EncounterError> {
        if self.roster.contains_key(&spec.id) {
            return Err(EncounterError::DuplicateUnit(spec.id));
        }
        if self.living_unit_at(spec.position).is_some() {
            return Err(EncounterError::PositionTaken(spec.position));
        }
        let Entry::Vacant(slot) = self.roster.entry(spec.id) else {
            return Err(EncounterError::DuplicateUnit(spec.id));
        };

        let unit = slot.insert(Unit::from_spec(spec));
        let id = unit.id;
        if unit.is_alive() {
            self.scheduler.register(id);
        }
        tracing::info!(
            target: "combat::encounter",
            unit = %id,
            name = %unit.name,
            team = %unit.team,
            "unit spawned"
        );
        Ok(id)
    }

    /// Applies `definition` to `target` outside of any command (auras,
    /// scripted openers). Returns `None` when `target` does not exist.
    ///
    /// The events include the application itself and, when the effect
    /// kills the target, its defeat and the end of its turn if it was acting.
    pub fn apply_effect(
        &mut self,
        target: UnitId,
        definition: &Arc<EffectDefinition>,
        caster: Option<UnitId>,
    ) -> Option<(ApplyOutcome, Vec<CombatEvent>)> {
        let mut events = Vec::new();
        let outcome = self.attach(target, definition, caster, &mut events)?;
        let was_acting = self.scheduler.is_active(target);
        if self.reap(target, &mut events) && was_acting {
            events.push(CombatEvent::TurnEnded { unit: target });
        }
        Some((outcome, events))
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advances the scheduler by one tick.
    ///
    /// When a unit's turn starts, its effects tick and then its pools
    /// regenerate. A unit killed by its own effects has its turn ended.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.outcome();
        if outcome.is_finished() {
            return StepOutcome::Finished(outcome);
        }

        let unit_id = match self.scheduler.tick(&mut self.roster) {
            Ok(Some(unit)) => unit,
            Ok(None) => return StepOutcome::Waiting,
            Err(TurnError::UnitActive(unit)) => return StepOutcome::Busy(unit),
            Err(error) => {
                tracing::error!(target: "combat::encounter", %error, "scheduler tick failed");
                return StepOutcome::Waiting;
            }
        };

        let mut events = vec![CombatEvent::TurnStarted {
            unit: unit_id,
            tick: self.scheduler.elapsed(),
        }];
        if let Some(unit) = self.roster.get_mut(&unit_id) {
            for tick in tick_effects(unit) {
                events.push(CombatEvent::EffectTicked {
                    unit: unit_id,
                    effect: tick.effect,
                    periodic: tick.periodic,
                    amount: tick.amount,
                });
                if tick.expired {
                    events.push(CombatEvent::EffectExpired {
                        unit: unit_id,
                        effect: tick.effect,
                    });
                }
            }
            for (resource, amount) in unit.regenerate() {
                events.push(CombatEvent::Regenerated {
                    unit: unit_id,
                    resource,
                    amount,
                });
            }
        }

        if self.reap(unit_id, &mut events) {
            events.push(CombatEvent::TurnEnded { unit: unit_id });
            return StepOutcome::TurnSkipped {
                unit: unit_id,
                events,
            };
        }
        StepOutcome::TurnStarted {
            unit: unit_id,
            events,
        }
    }

    /// Ends the active unit's turn.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Turn`] when `unit` is not the active unit.
    pub fn end_turn(&mut self, unit: UnitId) -> Result<Vec<CombatEvent>, ActionError> {
        self.scheduler.end_unit_turn(unit, &mut self.roster)?;
        Ok(vec![CombatEvent::TurnEnded { unit }])
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Validates, pays for and resolves one command from the active unit.
    ///
    /// # Errors
    ///
    /// Every rejection happens before the cost is paid; a rejected command
    /// leaves the encounter untouched.
    pub fn perform(
        &mut self,
        unit: UnitId,
        command: ActionCommand,
        env: &Env<'_>,
    ) -> Result<ActionReport, ActionError> {
        if !self.scheduler.is_active(unit) {
            return Err(ActionError::NotActiveUnit {
                unit,
                active: self.scheduler.active_unit(),
            });
        }
        let actor = self.roster.get(&unit).ok_or(ActionError::UnitNotFound(unit))?;
        if !actor.is_alive() {
            return Err(ActionError::UnitDead(unit));
        }

        let (plan, cost) = self.plan(actor, command, env)?;
        let actor = self
            .roster
            .get_mut(&unit)
            .ok_or(ActionError::UnitNotFound(unit))?;
        spend(&self.scheduler, actor, &cost)?;
        self.nonce += 1;

        tracing::debug!(
            target: "combat::encounter",
            unit = %unit,
            command = %command.kind(),
            nonce = self.nonce,
            "command accepted"
        );

        let mut events = Vec::new();
        self.execute(unit, plan, &mut events);

        // The actor may already have been reaped as its own target.
        self.reap(unit, &mut events);
        let mut turn_ended = false;
        if !self.scheduler.is_active(unit) {
            events.push(CombatEvent::TurnEnded { unit });
            turn_ended = true;
        } else if matches!(command, ActionCommand::Wait) {
            match self.scheduler.end_unit_turn(unit, &mut self.roster) {
                Ok(()) => {
                    events.push(CombatEvent::TurnEnded { unit });
                    turn_ended = true;
                }
                Err(error) => {
                    tracing::error!(target: "combat::encounter", %error, "wait could not end turn");
                }
            }
        }

        Ok(ActionReport {
            unit,
            command,
            cost,
            events,
            turn_ended,
        })
    }

    fn plan<'e>(
        &self,
        actor: &Unit,
        command: ActionCommand,
        env: &Env<'e>,
    ) -> Result<(Plan<'e>, ActionCost), ActionError> {
        match command {
            ActionCommand::Move { to } => {
                let from = actor.position;
                let occupied_by_terrain = env.grid()?.is_occupied(to);
                let occupied_by_unit = self
                    .living_unit_at(to)
                    .is_some_and(|other| other != actor.id);
                if to != from && (occupied_by_terrain || occupied_by_unit) {
                    return Err(ActionError::Occupied(to));
                }
                let path = env
                    .paths()?
                    .find_path(from, to, actor.id)
                    .ok_or(ActionError::NoPath(to))?;
                Ok((
                    Plan::Move { from, to },
                    ActionCost::for_move(path.len(), &self.config),
                ))
            }
            ActionCommand::Attack { target } => {
                let dice = dice(env)?;
                let range = actor
                    .loadout
                    .weapon
                    .as_ref()
                    .map_or(self.config.unarmed_range, |weapon| weapon.range);
                self.check_target(actor, target, TargetFlags::ENEMY, range, dice.grid)?;
                Ok((
                    Plan::Attack { target, dice },
                    ActionCost::for_attack(actor, &self.config),
                ))
            }
            ActionCommand::UseAbility { ability, target } => {
                if !actor.abilities.contains(&ability) {
                    return Err(ActionError::AbilityNotKnown {
                        unit: actor.id,
                        ability,
                    });
                }
                let definition = env.ability(ability)?;
                let dice = dice(env)?;
                self.check_target(actor, target, definition.targets, definition.range, dice.grid)?;
                let effects = definition
                    .applies
                    .iter()
                    .map(|&effect| env.effect(effect))
                    .collect::<Result<Vec<_>, _>>()?;
                let cost = ActionCost::for_ability(&definition);
                Ok((
                    Plan::Ability {
                        definition,
                        target,
                        effects,
                        dice,
                    },
                    cost,
                ))
            }
            ActionCommand::UseItem { item, target } => {
                if !actor.items.contains(&item) {
                    return Err(ActionError::ItemNotCarried {
                        unit: actor.id,
                        item,
                    });
                }
                let definition = env.item(item)?;
                self.check_target(
                    actor,
                    target,
                    definition.targets,
                    definition.range,
                    env.grid()?,
                )?;
                let steps = definition
                    .effects
                    .iter()
                    .map(|effect| match *effect {
                        ItemEffect::Restore { resource, amount } => {
                            Ok(ItemStep::Restore { resource, amount })
                        }
                        ItemEffect::ApplyEffect(id) => env.effect(id).map(ItemStep::Apply),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let cost = ActionCost::for_item(&definition);
                Ok((
                    Plan::Item {
                        definition,
                        target,
                        steps,
                    },
                    cost,
                ))
            }
            ActionCommand::Wait => Ok((Plan::Wait, ActionCost::for_wait(&self.config))),
        }
    }

    fn check_target(
        &self,
        actor: &Unit,
        target: UnitId,
        allowed: TargetFlags,
        range: u32,
        grid: &dyn GridOracle,
    ) -> Result<(), ActionError> {
        let target_unit = self
            .roster
            .get(&target)
            .ok_or(ActionError::TargetNotFound(target))?;
        if !target_unit.is_alive() {
            return Err(ActionError::InvalidTarget {
                unit: actor.id,
                target,
            });
        }

        let relation = if target == actor.id {
            TargetFlags::SELF
        } else if target_unit.team == actor.team {
            TargetFlags::ALLY
        } else {
            TargetFlags::ENEMY
        };
        if !allowed.contains(relation) {
            return Err(ActionError::InvalidTarget {
                unit: actor.id,
                target,
            });
        }

        let distance = grid.manhattan_distance(actor.position, target_unit.position);
        if distance > range {
            return Err(ActionError::OutOfRange { distance, range });
        }
        Ok(())
    }

    fn execute(&mut self, unit: UnitId, plan: Plan<'_>, events: &mut Vec<CombatEvent>) {
        match plan {
            Plan::Move { from, to } => {
                if let Some(actor) = self.roster.get_mut(&unit) {
                    actor.position = to;
                }
                events.push(CombatEvent::Moved { unit, from, to });
            }
            Plan::Attack { target, dice } => {
                let resolver = CombatResolver::new(&self.config, dice.grid);
                let mut rolls = RollStream::new(dice.rng, self.seed, self.nonce, unit);
                let result = match (self.roster.get(&unit), self.roster.get(&target)) {
                    (Some(attacker), Some(defender)) => {
                        resolver.resolve_attack(attacker, defender, &mut rolls)
                    }
                    _ => AttackResult::miss(DamageKind::Physical),
                };
                self.damage(target, result.damage);
                events.push(CombatEvent::AttackResolved {
                    attacker: unit,
                    target,
                    outcome: result.outcome,
                    kind: result.kind,
                    damage: result.damage,
                });
                self.reap(target, events);
            }
            Plan::Ability {
                definition,
                target,
                effects,
                dice,
            } => {
                let resolver = CombatResolver::new(&self.config, dice.grid);
                let mut rolls = RollStream::new(dice.rng, self.seed, self.nonce, unit);
                let caster = self.roster.get(&unit);
                let target_unit = self.roster.get(&target);

                let (outcome, damage, healing) = match definition.kind {
                    AbilityKind::Damage => match (caster, target_unit) {
                        (Some(caster), Some(target_unit)) => {
                            let result =
                                resolver.resolve_ability(&definition, caster, target_unit, &mut rolls);
                            (result.outcome, result.damage, 0)
                        }
                        _ => (AttackOutcome::Miss, 0, 0),
                    },
                    AbilityKind::Heal => (
                        AttackOutcome::Hit,
                        0,
                        resolver.calculate_healing(&definition, caster),
                    ),
                    AbilityKind::Effect => {
                        let hit = resolver.resolve_ability_hit(
                            &definition,
                            caster,
                            target_unit,
                            &mut rolls,
                        );
                        let outcome = if hit {
                            AttackOutcome::Hit
                        } else {
                            AttackOutcome::Miss
                        };
                        (outcome, 0, 0)
                    }
                };

                self.damage(target, damage);
                events.push(CombatEvent::AbilityResolved {
                    caster: unit,
                    target,
                    ability: definition.id,
                    outcome,
                    damage,
                });
                if healing > 0 {
                    let amount = self.restore(target, ResourceKind::Vitality, healing);
                    events.push(CombatEvent::Healed {
                        unit: target,
                        source: unit,
                        amount,
                    });
                }
                if outcome.connected() {
                    for effect in &effects {
                        self.attach(target, effect, Some(unit), events);
                    }
                }
                self.reap(target, events);
            }
            Plan::Item {
                definition,
                target,
                steps,
            } => {
                if let Some(actor) = self.roster.get_mut(&unit) {
                    if let Some(index) = actor.items.iter().position(|&item| item == definition.id) {
                        actor.items.remove(index);
                    }
                }
                events.push(CombatEvent::ItemUsed {
                    unit,
                    item: definition.id,
                    target,
                });
                for step in &steps {
                    match step {
                        ItemStep::Restore { resource, amount } => {
                            let applied = self.restore(target, *resource, *amount);
                            events.push(CombatEvent::ResourceRestored {
                                unit: target,
                                resource: *resource,
                                amount: applied,
                            });
                        }
                        ItemStep::Apply(effect) => {
                            self.attach(target, effect, Some(unit), events);
                        }
                    }
                }
                self.reap(target, events);
            }
            Plan::Wait => {}
        }
    }

    fn damage(&mut self, target: UnitId, amount: i32) {
        if amount <= 0 {
            return;
        }
        if let Some(unit) = self.roster.get_mut(&target) {
            unit.modify_resource(ResourceKind::Vitality, -amount);
        }
    }

    fn restore(&mut self, target: UnitId, resource: ResourceKind, amount: i32) -> i32 {
        self.roster
            .get_mut(&target)
            .map_or(0, |unit| unit.modify_resource(resource, amount))
    }

    fn attach(
        &mut self,
        target: UnitId,
        definition: &Arc<EffectDefinition>,
        caster: Option<UnitId>,
        events: &mut Vec<CombatEvent>,
    ) -> Option<ApplyOutcome> {
        let snapshot =
            CasterSnapshot::capture(definition, caster.and_then(|id| self.roster.get(&id)));
        let unit = self.roster.get_mut(&target)?;
        let outcome = apply_effect(unit, definition, snapshot);
        events.push(CombatEvent::EffectApplied {
            unit: target,
            effect: definition.id,
            outcome,
        });
        Some(outcome)
    }

    /// Unregisters `unit` if it just died. Returns whether it did.
    fn reap(&mut self, unit: UnitId, events: &mut Vec<CombatEvent>) -> bool {
        let dead = self.roster.get(&unit).is_some_and(|state| !state.is_alive());
        if !dead || !self.scheduler.unregister(unit) {
            return false;
        }
        events.push(CombatEvent::UnitDefeated { unit });
        tracing::info!(target: "combat::encounter", unit = %unit, "unit defeated");
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// `Victory` once every living unit shares a team.
    pub fn outcome(&self) -> EncounterOutcome {
        let mut teams = self
            .roster
            .values()
            .filter(|unit| unit.is_alive())
            .map(|unit| unit.team);
        let Some(first) = teams.next() else {
            return EncounterOutcome::Draw;
        };
        if teams.all(|team| team == first) {
            EncounterOutcome::Victory { team: first }
        } else {
            EncounterOutcome::Ongoing
        }
    }

    pub fn unit_view(&self, id: UnitId) -> Option<UnitView> {
        self.roster.get(&id).map(UnitView::of)
    }

    /// Tiles `id` could move to with its action points: the current pool
    /// while acting, a full pool otherwise.
    ///
    /// # Errors
    ///
    /// Fails for unknown or dead units and when no path oracle is available.
    pub fn movement_range(
        &self,
        id: UnitId,
        env: &Env<'_>,
    ) -> Result<BTreeSet<Position>, ActionError> {
        let unit = self.living(id)?;
        let paths = env.paths()?;
        let grid = env.grid().ok();

        let points = if self.scheduler.is_active(id) {
            unit.current(ResourceKind::ActionPoints)
        } else {
            unit.effective_max(ResourceKind::ActionPoints)
        }
        .max(0) as u32;
        let budget = match self.config.move_cost_per_tile {
            0 => u32::MAX,
            per_tile => points / per_tile,
        };

        Ok(paths
            .reachable_tiles(unit.position, budget)
            .into_iter()
            .filter(|&tile| self.living_unit_at(tile).is_none())
            .filter(|&tile| !grid.is_some_and(|grid| grid.is_occupied(tile)))
            .collect())
    }

    /// Tiles within reach of `id`'s weapon (or unarmed reach).
    ///
    /// # Errors
    ///
    /// Fails for unknown or dead units.
    pub fn attack_range(&self, id: UnitId) -> Result<BTreeSet<Position>, ActionError> {
        let unit = self.living(id)?;
        Ok(tiles_within(unit.position, self.attack_reach(unit)))
    }

    /// Living enemies `id` could attack right now.
    ///
    /// # Errors
    ///
    /// Fails for unknown or dead units.
    pub fn targets_in_range(&self, id: UnitId) -> Result<Vec<UnitId>, ActionError> {
        let unit = self.living(id)?;
        let reach = self.attack_reach(unit);
        Ok(self
            .roster
            .values()
            .filter(|other| other.is_alive() && other.team != unit.team)
            .filter(|other| unit.position.manhattan(other.position) <= reach)
            .map(|other| other.id)
            .collect())
    }

    fn attack_reach(&self, unit: &Unit) -> u32 {
        unit.loadout
            .weapon
            .as_ref()
            .map_or(self.config.unarmed_range, |weapon| weapon.range)
    }

    fn living(&self, id: UnitId) -> Result<&Unit, ActionError> {
        let unit = self.roster.get(&id).ok_or(ActionError::UnitNotFound(id))?;
        if !unit.is_alive() {
            return Err(ActionError::UnitDead(id));
        }
        Ok(unit)
    }

    fn living_unit_at(&self, position: Position) -> Option<UnitId> {
        self.roster
            .values()
            .find(|unit| unit.is_alive() && unit.position == position)
            .map(|unit| unit.id)
    }
}

fn dice<'e>(env: &Env<'e>) -> Result<Dice<'e>, ActionError> {
    Ok(Dice {
        grid: env.grid()?,
        rng: env.rng()?,
    })
}
