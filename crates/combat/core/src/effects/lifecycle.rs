//! Application, ticking and removal of active effects.
//!
//! Every change to a unit's effect list goes through this module so the
//! recompute-and-reclamp pass is never skipped.

use std::sync::Arc;

use crate::state::{Unit, UnitId};
use crate::stats::ResourceKind;

use super::definition::{EffectDefinition, EffectId, PeriodicKind, StackingPolicy};
use super::instance::ActiveEffectInstance;

/// Result of applying an effect to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplyOutcome {
    /// A new instance was attached.
    Applied,
    /// An existing instance's duration was reset.
    Refreshed,
    /// An existing instance gained a stack (or sat at its cap) and was refreshed.
    Stacked { stacks: u32 },
    /// Nothing changed.
    Ignored,
}

/// What one instance did during a tick pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTick {
    pub effect: EffectId,
    pub periodic: Option<PeriodicKind>,
    /// Vitality change actually applied (negative for damage).
    pub amount: i32,
    pub expired: bool,
}

/// Caster data captured when an effect is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CasterSnapshot {
    pub caster: Option<UnitId>,
    /// Effective value of the definition's scaling stat, or 0.
    pub value: i32,
}

impl CasterSnapshot {
    /// Reads the caster's scaling stat for `definition`.
    ///
    /// A missing caster, or a definition without scaling, snapshots 0.
    pub fn capture(definition: &EffectDefinition, caster: Option<&Unit>) -> Self {
        let value = match (caster, definition.periodic.and_then(|p| p.scaling)) {
            (Some(unit), Some(scaling)) => unit.effective_attribute(scaling.stat),
            _ => 0,
        };
        Self {
            caster: caster.map(|unit| unit.id),
            value,
        }
    }
}

/// Attaches `definition` to `target` according to its stacking policy.
pub fn apply_effect(
    target: &mut Unit,
    definition: &Arc<EffectDefinition>,
    caster: CasterSnapshot,
) -> ApplyOutcome {
    if !target.is_alive() {
        tracing::debug!(
            target: "combat::effects",
            unit = %target.id,
            effect = %definition.id,
            "ignored effect on a dead unit"
        );
        return ApplyOutcome::Ignored;
    }

    let existing = target
        .effects()
        .iter()
        .position(|instance| instance.definition().id == definition.id);

    let outcome = match (definition.stacking, existing) {
        (StackingPolicy::AddNewInstance, _) | (_, None) => {
            target.effects_mut().push(ActiveEffectInstance::new(
                Arc::clone(definition),
                caster.caster,
                caster.value,
            ));
            target.recompute_and_reclamp();
            ApplyOutcome::Applied
        }
        (StackingPolicy::None, Some(_)) => ApplyOutcome::Ignored,
        (StackingPolicy::RefreshDuration, Some(index)) => {
            target.effects_mut()[index].refresh();
            ApplyOutcome::Refreshed
        }
        (StackingPolicy::IncreaseStacks, Some(index)) => {
            let instance = &mut target.effects_mut()[index];
            let grew = instance.add_stack();
            instance.refresh();
            let stacks = instance.stacks();
            if grew {
                target.recompute_and_reclamp();
            }
            ApplyOutcome::Stacked { stacks }
        }
    };

    tracing::debug!(
        target: "combat::effects",
        unit = %target.id,
        effect = %definition.id,
        ?outcome,
        "effect applied"
    );
    outcome
}

/// Runs one tick for every instance on `unit`, in list order.
///
/// Periodic actions fire first, then durations count down. Expired
/// instances are removed after the pass. Stops as soon as the unit dies.
pub fn tick_effects(unit: &mut Unit) -> Vec<EffectTick> {
    let mut ticks = Vec::new();
    let mut expired = vec![false; unit.effects().len()];

    for index in 0..expired.len() {
        if !unit.is_alive() {
            break;
        }

        let (effect, periodic, delta) = {
            let instance = &mut unit.effects_mut()[index];
            instance.sanitize();
            (
                instance.definition().id,
                instance.definition().periodic.map(|p| p.kind),
                instance.periodic_delta(),
            )
        };

        let amount = match delta {
            Some(delta) => unit.modify_resource(ResourceKind::Vitality, delta),
            None => 0,
        };
        if !unit.is_alive() {
            ticks.push(EffectTick {
                effect,
                periodic,
                amount,
                expired: false,
            });
            break;
        }

        expired[index] = unit.effects_mut()[index].advance();
        ticks.push(EffectTick {
            effect,
            periodic,
            amount,
            expired: expired[index],
        });
    }

    if unit.is_alive() && expired.iter().any(|&flag| flag) {
        let mut flags = expired.into_iter();
        unit.effects_mut()
            .retain(|_| !flags.next().unwrap_or(false));
        unit.recompute_and_reclamp();
    }
    ticks
}

/// Removes every instance of `effect`. Returns how many were removed.
pub fn remove_effect(unit: &mut Unit, effect: EffectId) -> usize {
    if !unit.is_alive() {
        return 0;
    }
    let before = unit.effects().len();
    unit.effects_mut()
        .retain(|instance| instance.definition().id != effect);
    let removed = before - unit.effects().len();
    if removed > 0 {
        unit.recompute_and_reclamp();
    }
    removed
}

/// Removes every active effect. Returns how many were removed.
pub fn clear_effects(unit: &mut Unit) -> usize {
    if !unit.is_alive() {
        return 0;
    }
    let removed = unit.effects().len();
    unit.effects_mut().clear();
    if removed > 0 {
        unit.recompute_and_reclamp();
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectDuration, PeriodicAction, ScalingSpec};
    use crate::state::fixtures::{plain_unit, unit_with};
    use crate::stats::{Attribute, PrimaryAttributes, StatId, StatModifier};

    fn apply(unit: &mut Unit, definition: &Arc<EffectDefinition>) -> ApplyOutcome {
        apply_effect(unit, definition, CasterSnapshot::default())
    }

    fn definition(stacking: StackingPolicy, max_stacks: u32) -> Arc<EffectDefinition> {
        Arc::new(
            EffectDefinition::new(EffectId(7), "test", 3)
                .with_stacking(stacking, max_stacks)
                .with_modifier(StatModifier::flat(Attribute::Strength.into(), 2.0)),
        )
    }

    fn poison(base_power: i32, scaling: Option<ScalingSpec>) -> Arc<EffectDefinition> {
        Arc::new(
            EffectDefinition::new(EffectId(9), "poison", 3)
                .with_stacking(StackingPolicy::IncreaseStacks, 5)
                .with_periodic(PeriodicAction {
                    kind: PeriodicKind::Damage,
                    base_power,
                    scaling,
                }),
        )
    }

    #[test]
    fn first_application_creates_instance() {
        let mut unit = plain_unit(1);
        let outcome = apply(&mut unit, &definition(StackingPolicy::None, 1));

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(unit.effects().len(), 1);
        assert_eq!(unit.effective_attribute(Attribute::Strength), 12);
    }

    #[test]
    fn none_policy_ignores_reapplication() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::None, 1);
        apply(&mut unit, &def);

        assert_eq!(apply(&mut unit, &def), ApplyOutcome::Ignored);
        assert_eq!(unit.effects().len(), 1);
    }

    #[test]
    fn refresh_never_changes_stack_count() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::RefreshDuration, 4);
        apply(&mut unit, &def);
        tick_effects(&mut unit);
        assert_eq!(unit.effects()[0].remaining(), EffectDuration::Rounds(2));

        for _ in 0..10 {
            assert_eq!(
                apply(&mut unit, &def),
                ApplyOutcome::Refreshed
            );
        }
        assert_eq!(unit.effects().len(), 1);
        assert_eq!(unit.effects()[0].stacks(), 1);
        assert_eq!(unit.effects()[0].remaining(), EffectDuration::Rounds(3));
    }

    #[test]
    fn increase_stacks_caps_and_always_refreshes() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::IncreaseStacks, 3);
        apply(&mut unit, &def);

        let mut last = ApplyOutcome::Ignored;
        for _ in 0..3 {
            tick_effects(&mut unit);
            last = apply(&mut unit, &def);
            assert_eq!(unit.effects()[0].remaining(), EffectDuration::Rounds(3));
        }

        // maxStacks + 1 applications in total
        assert_eq!(last, ApplyOutcome::Stacked { stacks: 3 });
        assert_eq!(unit.effects()[0].stacks(), 3);
        // 10 + 2 × 3
        assert_eq!(unit.effective_attribute(Attribute::Strength), 16);
    }

    #[test]
    fn add_new_instance_is_independent() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::AddNewInstance, 1);
        apply(&mut unit, &def);
        tick_effects(&mut unit);
        apply(&mut unit, &def);

        let remaining: Vec<_> = unit.effects().iter().map(|i| i.remaining()).collect();
        assert_eq!(remaining, vec![EffectDuration::Rounds(2), EffectDuration::Rounds(3)]);
    }

    #[test]
    fn duration_three_expires_on_third_tick() {
        for stacks in [1u32, 3] {
            let mut unit = plain_unit(1);
            let def = definition(StackingPolicy::IncreaseStacks, 3);
            for _ in 0..stacks {
                apply(&mut unit, &def);
            }

            let first = tick_effects(&mut unit);
            assert!(!first[0].expired);
            assert_eq!(unit.effects()[0].remaining(), EffectDuration::Rounds(2));
            tick_effects(&mut unit);
            assert_eq!(unit.effects()[0].remaining(), EffectDuration::Rounds(1));

            let third = tick_effects(&mut unit);
            assert!(third[0].expired);
            assert!(unit.effects().is_empty());
            assert_eq!(unit.effective_attribute(Attribute::Strength), 10);
        }
    }

    #[test]
    fn permanent_effects_never_expire() {
        let mut unit = plain_unit(1);
        let def = Arc::new(EffectDefinition::new(EffectId(2), "aura", 0).permanent());
        apply(&mut unit, &def);

        for _ in 0..50 {
            tick_effects(&mut unit);
        }
        assert_eq!(unit.effects()[0].remaining(), EffectDuration::Permanent);
    }

    #[test]
    fn periodic_damage_scales_with_snapshot_and_stacks() {
        let caster = unit_with(2, PrimaryAttributes::uniform(9), 100);
        let mut target = plain_unit(1);
        let def = poison(
            2,
            Some(ScalingSpec {
                stat: Attribute::Intelligence,
                factor: 0.5,
            }),
        );

        let snapshot = CasterSnapshot::capture(&def, Some(&caster));
        assert_eq!(snapshot.value, 9);
        apply_effect(&mut target, &def, snapshot);
        apply_effect(&mut target, &def, snapshot);

        // (2 + floor(9 × 0.5)) × 2 stacks = 12
        let ticks = tick_effects(&mut target);
        assert_eq!(ticks[0].amount, -12);
        assert_eq!(target.current(ResourceKind::Vitality), 18);
    }

    #[test]
    fn caster_changes_and_death_leave_applied_effects_alone() {
        let mut caster = plain_unit(2);
        let mut target = plain_unit(1);
        let def = poison(
            0,
            Some(ScalingSpec {
                stat: Attribute::Intelligence,
                factor: 1.0,
            }),
        );
        apply_effect(&mut target, &def, CasterSnapshot::capture(&def, Some(&caster)));

        let insight = Arc::new(
            EffectDefinition::new(EffectId(4), "insight", 5)
                .with_modifier(StatModifier::flat(Attribute::Intelligence.into(), 20.0)),
        );
        apply(&mut caster, &insight);
        assert_eq!(caster.effective_attribute(Attribute::Intelligence), 30);
        caster.modify_resource(ResourceKind::Vitality, -1_000);
        assert!(!caster.is_alive());

        let ticks = tick_effects(&mut target);

        // still scales from the Int 10 captured at application
        assert_eq!(ticks[0].amount, -10);
        assert_eq!(target.current(ResourceKind::Vitality), 20);
        let instance = &target.effects()[0];
        assert_eq!(instance.caster(), Some(UnitId(2)));
        assert_eq!(instance.snapshot(), 10);
        assert_eq!(instance.remaining(), EffectDuration::Rounds(2));
    }

    #[test]
    fn missing_caster_snapshots_zero() {
        let def = poison(
            1,
            Some(ScalingSpec {
                stat: Attribute::Intelligence,
                factor: 1.0,
            }),
        );
        let snapshot = CasterSnapshot::capture(&def, None);
        assert_eq!(snapshot, CasterSnapshot::default());
    }

    #[test]
    fn negative_periodic_power_clamps_to_zero() {
        let mut unit = plain_unit(1);
        apply(&mut unit, &poison(-5, None));

        let ticks = tick_effects(&mut unit);
        assert_eq!(ticks[0].amount, 0);
        assert_eq!(unit.current(ResourceKind::Vitality), 30);
    }

    #[test]
    fn tick_stops_when_the_unit_dies() {
        let mut unit = plain_unit(1);
        unit.set_current(ResourceKind::Vitality, 3);
        apply(&mut unit, &poison(10, None));
        apply(&mut unit, &definition(StackingPolicy::None, 1));

        let ticks = tick_effects(&mut unit);

        assert!(!unit.is_alive());
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].amount, -3);
        // untouched after death
        assert_eq!(unit.effects()[1].remaining(), EffectDuration::Rounds(3));
    }

    #[test]
    fn expiring_buff_reclamps_resources() {
        let mut unit = plain_unit(1);
        let def = Arc::new(
            EffectDefinition::new(EffectId(3), "fortify", 1).with_modifier(StatModifier::flat(
                StatId::MaxResource(ResourceKind::Vitality),
                10.0,
            )),
        );
        apply(&mut unit, &def);
        unit.refill(ResourceKind::Vitality);
        assert_eq!(unit.current(ResourceKind::Vitality), 40);

        tick_effects(&mut unit);
        assert_eq!(unit.current(ResourceKind::Vitality), 30);
    }

    #[test]
    fn out_of_range_stacks_are_clamped() {
        let mut unit = plain_unit(1);
        apply(&mut unit, &poison(1, None));
        unit.effects_mut()[0].force_stacks(40);

        let ticks = tick_effects(&mut unit);
        // capped at 5 stacks
        assert_eq!(ticks[0].amount, -5);
        assert_eq!(unit.effects()[0].stacks(), 5);
    }

    #[test]
    fn zero_max_stacks_behaves_as_one() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::IncreaseStacks, 0);
        apply(&mut unit, &def);

        assert_eq!(
            apply(&mut unit, &def),
            ApplyOutcome::Stacked { stacks: 1 }
        );
    }

    #[test]
    fn explicit_removal_and_clear() {
        let mut unit = plain_unit(1);
        let def = definition(StackingPolicy::AddNewInstance, 1);
        apply(&mut unit, &def);
        apply(&mut unit, &def);
        apply(&mut unit, &poison(1, None));

        assert_eq!(remove_effect(&mut unit, EffectId(7)), 2);
        assert_eq!(unit.effective_attribute(Attribute::Strength), 10);
        assert_eq!(clear_effects(&mut unit), 1);
        assert!(unit.effects().is_empty());
    }
}
