use std::sync::Arc;

use crate::state::UnitId;

use super::definition::{DurationKind, EffectDefinition, PeriodicKind};

/// Remaining lifetime of an active effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Ticks left before removal.
    Rounds(u32),
    /// Sentinel that never decrements.
    Permanent,
}

impl EffectDuration {
    /// Full duration granted by `definition`.
    pub fn full(definition: &EffectDefinition) -> Self {
        match definition.duration_kind {
            DurationKind::Rounds => EffectDuration::Rounds(definition.duration),
            DurationKind::Permanent => EffectDuration::Permanent,
        }
    }

    pub fn is_permanent(self) -> bool {
        matches!(self, EffectDuration::Permanent)
    }
}

/// An effect currently attached to a unit.
///
/// The caster is a lookup-only handle: the instance keeps working after the
/// caster dies or leaves the encounter, because everything it needs from the
/// caster was captured in `snapshot` at application time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectInstance {
    definition: Arc<EffectDefinition>,
    caster: Option<UnitId>,
    remaining: EffectDuration,
    stacks: u32,
    snapshot: i32,
}

impl ActiveEffectInstance {
    /// Fresh instance with one stack and full duration.
    pub fn new(definition: Arc<EffectDefinition>, caster: Option<UnitId>, snapshot: i32) -> Self {
        let remaining = EffectDuration::full(&definition);
        Self {
            definition,
            caster,
            remaining,
            stacks: 1,
            snapshot,
        }
    }

    pub fn definition(&self) -> &EffectDefinition {
        &self.definition
    }

    pub fn caster(&self) -> Option<UnitId> {
        self.caster
    }

    pub fn remaining(&self) -> EffectDuration {
        self.remaining
    }

    /// Stack count, always within `[1, max_stacks]`.
    pub fn stacks(&self) -> u32 {
        self.stacks.clamp(1, self.definition.stack_cap())
    }

    /// Caster stat captured at application; never updated afterwards.
    pub fn snapshot(&self) -> i32 {
        self.snapshot
    }

    pub(crate) fn refresh(&mut self) {
        self.remaining = EffectDuration::full(&self.definition);
    }

    /// Adds one stack unless already capped. Returns whether the count changed.
    pub(crate) fn add_stack(&mut self) -> bool {
        let cap = self.definition.stack_cap();
        if self.stacks >= cap {
            return false;
        }
        self.stacks += 1;
        true
    }

    /// Clamps a stored stack count that drifted outside its bounds.
    pub(crate) fn sanitize(&mut self) {
        let clamped = self.stacks();
        if clamped != self.stacks {
            tracing::error!(
                target: "combat::effects",
                effect = %self.definition.id,
                stored = self.stacks,
                clamped,
                "stack count out of bounds"
            );
            self.stacks = clamped;
        }
    }

    /// Signed vitality change produced by one tick, if this effect is periodic.
    pub(crate) fn periodic_delta(&self) -> Option<i32> {
        let periodic = self.definition.periodic?;
        let power = periodic
            .power_per_stack(self.snapshot)
            .saturating_mul(self.stacks() as i32)
            .max(0);
        Some(match periodic.kind {
            PeriodicKind::Damage => -power,
            PeriodicKind::Heal => power,
        })
    }

    /// Decrements the remaining duration. Returns true once it reaches 0.
    pub(crate) fn advance(&mut self) -> bool {
        match self.remaining {
            EffectDuration::Permanent => false,
            EffectDuration::Rounds(0) => {
                tracing::error!(
                    target: "combat::effects",
                    effect = %self.definition.id,
                    "ticked an instance with no rounds left"
                );
                true
            }
            EffectDuration::Rounds(left) => {
                self.remaining = EffectDuration::Rounds(left - 1);
                left == 1
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_stacks(&mut self, stacks: u32) {
        self.stacks = stacks;
    }
}
