//! Notifications emitted while an encounter advances.
//!
//! Events describe what already happened; presentation layers consume them
//! but never feed anything back into the simulation.

use crate::action::{ActionCommand, ActionCost};
use crate::combat::{AttackOutcome, DamageKind};
use crate::effects::{ApplyOutcome, EffectId, PeriodicKind};
use crate::env::{AbilityId, ItemId};
use crate::state::{Position, TeamId, Tick, UnitId};
use crate::stats::ResourceKind;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    TurnStarted {
        unit: UnitId,
        tick: Tick,
    },
    TurnEnded {
        unit: UnitId,
    },
    Moved {
        unit: UnitId,
        from: Position,
        to: Position,
    },
    AttackResolved {
        attacker: UnitId,
        target: UnitId,
        outcome: AttackOutcome,
        kind: DamageKind,
        damage: i32,
    },
    AbilityResolved {
        caster: UnitId,
        target: UnitId,
        ability: AbilityId,
        outcome: AttackOutcome,
        damage: i32,
    },
    Healed {
        unit: UnitId,
        source: UnitId,
        amount: i32,
    },
    ItemUsed {
        unit: UnitId,
        item: ItemId,
        target: UnitId,
    },
    ResourceRestored {
        unit: UnitId,
        resource: ResourceKind,
        amount: i32,
    },
    Regenerated {
        unit: UnitId,
        resource: ResourceKind,
        amount: i32,
    },
    EffectApplied {
        unit: UnitId,
        effect: EffectId,
        outcome: ApplyOutcome,
    },
    EffectTicked {
        unit: UnitId,
        effect: EffectId,
        periodic: Option<PeriodicKind>,
        amount: i32,
    },
    EffectExpired {
        unit: UnitId,
        effect: EffectId,
    },
    UnitDefeated {
        unit: UnitId,
    },
}

impl CombatEvent {
    /// Whether the event belongs to the turn-flow topic rather than combat.
    pub fn is_turn_event(&self) -> bool {
        matches!(
            self,
            CombatEvent::TurnStarted { .. } | CombatEvent::TurnEnded { .. }
        )
    }
}

/// Result of a single [`Encounter::step`](super::Encounter::step).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Speed accumulated but nobody reached the threshold.
    Waiting,
    /// A unit is ready to act; its turn-start effects already ran.
    TurnStarted {
        unit: UnitId,
        events: Vec<CombatEvent>,
    },
    /// The unit died during its own turn-start tick; its turn is over.
    TurnSkipped {
        unit: UnitId,
        events: Vec<CombatEvent>,
    },
    /// Ignored: a unit is still acting.
    Busy(UnitId),
    /// The encounter is over; nothing advanced.
    Finished(EncounterOutcome),
}

impl StepOutcome {
    pub fn events(&self) -> &[CombatEvent] {
        match self {
            StepOutcome::TurnStarted { events, .. } | StepOutcome::TurnSkipped { events, .. } => {
                events
            }
            StepOutcome::Waiting | StepOutcome::Busy(_) | StepOutcome::Finished(_) => &[],
        }
    }
}

/// What one accepted command did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    pub unit: UnitId,
    pub command: ActionCommand,
    pub cost: ActionCost,
    pub events: Vec<CombatEvent>,
    /// The acting unit's turn is over (Wait, or the actor died).
    pub turn_ended: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterOutcome {
    Ongoing,
    /// Every living unit belongs to `team`.
    Victory { team: TeamId },
    /// No unit is left standing.
    Draw,
}

impl EncounterOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, EncounterOutcome::Ongoing)
    }
}
