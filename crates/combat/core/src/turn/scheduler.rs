use std::cmp::Reverse;

use crate::state::{Roster, Tick, UnitId};
use crate::stats::{Attribute, ResourceKind};

use super::error::TurnError;

/// Scheduler state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Accumulating speed until someone crosses the threshold.
    #[default]
    Idle,
    /// Exactly one unit is taking its turn.
    UnitActive(UnitId),
}

/// Speed-accumulation initiative.
///
/// Each idle tick adds every living unit's effective speed to its
/// accumulator. The first unit at or above the threshold becomes active and
/// keeps its accumulator until [`TurnScheduler::end_unit_turn`].
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    threshold: u32,
    order: Vec<UnitId>,
    phase: SchedulerPhase,
    elapsed: Tick,
}

impl TurnScheduler {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            order: Vec::new(),
            phase: SchedulerPhase::Idle,
            elapsed: Tick::ZERO,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn active_unit(&self) -> Option<UnitId> {
        match self.phase {
            SchedulerPhase::UnitActive(unit) => Some(unit),
            SchedulerPhase::Idle => None,
        }
    }

    pub fn is_active(&self, unit: UnitId) -> bool {
        self.active_unit() == Some(unit)
    }

    /// Ticks accumulated since the scheduler was created.
    pub fn elapsed(&self) -> Tick {
        self.elapsed
    }

    /// Registered units in registration order.
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    pub fn is_registered(&self, unit: UnitId) -> bool {
        self.order.contains(&unit)
    }

    /// Adds `unit` at the end of the registration order. Re-registering is a no-op.
    pub fn register(&mut self, unit: UnitId) -> bool {
        if self.is_registered(unit) {
            return false;
        }
        self.order.push(unit);
        true
    }

    /// Removes `unit`, clearing the active slot if it was acting.
    pub fn unregister(&mut self, unit: UnitId) -> bool {
        let before = self.order.len();
        self.order.retain(|&registered| registered != unit);
        if self.is_active(unit) {
            self.phase = SchedulerPhase::Idle;
        }
        self.order.len() != before
    }

    /// Advances one tick and returns the unit that became active, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::UnitActive`] without accumulating anything when a
    /// unit is already acting.
    pub fn tick(&mut self, roster: &mut Roster) -> Result<Option<UnitId>, TurnError> {
        if let SchedulerPhase::UnitActive(active) = self.phase {
            tracing::warn!(target: "combat::turn", unit = %active, "tick while a unit is active");
            return Err(TurnError::UnitActive(active));
        }

        self.elapsed = self.elapsed + 1;
        for id in &self.order {
            let Some(unit) = roster.get_mut(id).filter(|unit| unit.is_alive()) else {
                continue;
            };
            let speed = unit.effective_speed().max(0) as u32;
            unit.set_initiative(unit.initiative().saturating_add(speed));
        }

        let winner = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let unit = roster.get(id).filter(|unit| unit.is_alive())?;
                (unit.initiative() >= self.threshold).then(|| {
                    let key = (
                        unit.initiative(),
                        unit.effective_speed(),
                        unit.effective_attribute(Attribute::TIE_BREAK_PRIMARY),
                        unit.effective_attribute(Attribute::TIE_BREAK_SECONDARY),
                        Reverse(index),
                    );
                    (key, *id)
                })
            })
            .max_by_key(|(key, _)| *key)
            .map(|(_, id)| id);

        let Some(winner) = winner else {
            return Ok(None);
        };
        if let Some(unit) = roster.get_mut(&winner) {
            unit.refill(ResourceKind::ActionPoints);
        }
        self.phase = SchedulerPhase::UnitActive(winner);
        tracing::debug!(
            target: "combat::turn",
            unit = %winner,
            tick = %self.elapsed,
            "turn started"
        );
        Ok(Some(winner))
    }

    /// Ends the active unit's turn, zeroing its accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::NotActiveUnit`] when `unit` is not the active unit.
    pub fn end_unit_turn(&mut self, unit: UnitId, roster: &mut Roster) -> Result<(), TurnError> {
        if !self.is_active(unit) {
            tracing::warn!(
                target: "combat::turn",
                requested = %unit,
                active = ?self.active_unit(),
                "end_unit_turn for a unit that is not active"
            );
            return Err(TurnError::NotActiveUnit {
                requested: unit,
                active: self.active_unit(),
            });
        }
        if let Some(state) = roster.get_mut(&unit) {
            state.set_initiative(0);
        }
        self.phase = SchedulerPhase::Idle;
        tracing::debug!(target: "combat::turn", unit = %unit, "turn ended");
        Ok(())
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(crate::config::CombatConfig::DEFAULT_INITIATIVE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Unit;
    use crate::state::fixtures::unit_with;
    use crate::stats::PrimaryAttributes;

    fn roster_of(units: impl IntoIterator<Item = Unit>) -> Roster {
        units.into_iter().map(|unit| (unit.id, unit)).collect()
    }

    fn with_dex(id: u32, dexterity: i32, speed: i32) -> Unit {
        unit_with(id, PrimaryAttributes::new(10, dexterity, 10, 10, 10, 10), speed)
    }

    /// Runs until someone becomes active, returning (tick, unit).
    fn next_turn(scheduler: &mut TurnScheduler, roster: &mut Roster) -> (u64, UnitId) {
        loop {
            if let Some(unit) = scheduler.tick(roster).expect("idle scheduler") {
                return (scheduler.elapsed().0, unit);
            }
        }
    }

    #[test]
    fn equal_speed_tie_breaks_on_dexterity() {
        let mut roster = roster_of([with_dex(2, 5, 100), with_dex(1, 10, 100)]);
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(2));
        scheduler.register(UnitId(1));

        let (tick, first) = next_turn(&mut scheduler, &mut roster);
        assert_eq!(tick, 10);
        assert_eq!(first, UnitId(1));
        assert_eq!(roster[&UnitId(2)].initiative(), 1000);

        scheduler.end_unit_turn(first, &mut roster).expect("active unit");
        let (tick, second) = next_turn(&mut scheduler, &mut roster);
        assert_eq!(tick, 11);
        assert_eq!(second, UnitId(2));
    }

    #[test]
    fn higher_accumulator_wins_over_speed() {
        let mut roster = roster_of([with_dex(1, 10, 500), with_dex(2, 10, 300)]);
        if let Some(unit) = roster.get_mut(&UnitId(1)) {
            unit.set_initiative(600);
        }
        if let Some(unit) = roster.get_mut(&UnitId(2)) {
            unit.set_initiative(900);
        }
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));
        scheduler.register(UnitId(2));

        // both cross on tick 1: 600 + 500 = 1100, 900 + 300 = 1200
        let (tick, first) = next_turn(&mut scheduler, &mut roster);
        assert_eq!(tick, 1);
        assert_eq!(first, UnitId(2));
    }

    #[test]
    fn identical_units_fall_back_to_registration_order() {
        let orders: Vec<Vec<UnitId>> = (0..3)
            .map(|_| {
                let mut roster = roster_of([with_dex(1, 10, 100), with_dex(2, 10, 100)]);
                let mut scheduler = TurnScheduler::new(1000);
                scheduler.register(UnitId(2));
                scheduler.register(UnitId(1));
                (0..6)
                    .map(|_| {
                        let (_, unit) = next_turn(&mut scheduler, &mut roster);
                        scheduler.end_unit_turn(unit, &mut roster).expect("active");
                        unit
                    })
                    .collect()
            })
            .collect();

        assert_eq!(orders[0][0], UnitId(2));
        assert!(orders.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn activation_refills_action_points_but_keeps_accumulator() {
        let mut roster = roster_of([with_dex(1, 10, 500)]);
        if let Some(unit) = roster.get_mut(&UnitId(1)) {
            unit.modify_resource(ResourceKind::ActionPoints, -10);
        }
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));

        next_turn(&mut scheduler, &mut roster);
        let unit = &roster[&UnitId(1)];
        assert_eq!(unit.current(ResourceKind::ActionPoints), 5);
        assert_eq!(unit.initiative(), 1000);
    }

    #[test]
    fn tick_while_active_is_rejected_without_change() {
        let mut roster = roster_of([with_dex(1, 10, 1000), with_dex(2, 10, 100)]);
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));
        scheduler.register(UnitId(2));
        next_turn(&mut scheduler, &mut roster);

        assert_eq!(
            scheduler.tick(&mut roster),
            Err(TurnError::UnitActive(UnitId(1)))
        );
        assert_eq!(roster[&UnitId(2)].initiative(), 100);
        assert_eq!(scheduler.elapsed(), Tick(1));
    }

    #[test]
    fn end_turn_for_wrong_unit_is_rejected() {
        let mut roster = roster_of([with_dex(1, 10, 1000), with_dex(2, 10, 100)]);
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));
        scheduler.register(UnitId(2));
        next_turn(&mut scheduler, &mut roster);

        assert!(scheduler.end_unit_turn(UnitId(2), &mut roster).is_err());
        assert_eq!(scheduler.phase(), SchedulerPhase::UnitActive(UnitId(1)));
        assert_eq!(roster[&UnitId(1)].initiative(), 1000);

        scheduler.end_unit_turn(UnitId(1), &mut roster).expect("active");
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(roster[&UnitId(1)].initiative(), 0);
    }

    #[test]
    fn unregistering_the_active_unit_clears_the_slot() {
        let mut roster = roster_of([with_dex(1, 10, 1000)]);
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));
        next_turn(&mut scheduler, &mut roster);

        assert!(scheduler.unregister(UnitId(1)));
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert!(scheduler.order().is_empty());
        assert!(!scheduler.unregister(UnitId(1)));
    }

    #[test]
    fn dead_units_do_not_accumulate() {
        let mut roster = roster_of([with_dex(1, 10, 100)]);
        if let Some(unit) = roster.get_mut(&UnitId(1)) {
            unit.modify_resource(ResourceKind::Vitality, -1_000);
        }
        let mut scheduler = TurnScheduler::new(1000);
        scheduler.register(UnitId(1));

        for _ in 0..20 {
            assert_eq!(scheduler.tick(&mut roster), Ok(None));
        }
        assert_eq!(roster[&UnitId(1)].initiative(), 0);
    }
}
