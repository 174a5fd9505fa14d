//! Stat modifier evaluation.
//!
//! This module implements the three-phase modifier stack every effective
//! value goes through:
//!
//! ```text
//! Flat → PercentAdd (against the original base) → PercentMult (compounding) → Round → Floor at 0
//! ```
//!
//! The phase order is part of the numeric contract and must not be
//! reassociated. In particular PercentAdd scales the *original* base value,
//! not the Flat-adjusted total.

use crate::effects::ActiveEffectInstance;

use super::attributes::StatId;

/// Phase in which a modifier is folded into a stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierPhase {
    /// Additive bonus (applied first).
    Flat,
    /// Fractional increase of the original base, summed with other PercentAdd
    /// modifiers (0.2 = +20% of base).
    PercentAdd,
    /// Sequential multiplier (0.1 = ×1.1), compounding with every other
    /// PercentMult modifier.
    PercentMult,
}

/// A single modifier carried by an effect definition.
///
/// Magnitudes are scaled by the stack count of the instance that carries
/// them before they enter the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: StatId,
    pub phase: ModifierPhase,
    pub value: f64,
}

impl StatModifier {
    pub const fn new(stat: StatId, phase: ModifierPhase, value: f64) -> Self {
        Self { stat, phase, value }
    }

    /// Create a flat modifier
    pub const fn flat(stat: StatId, value: f64) -> Self {
        Self::new(stat, ModifierPhase::Flat, value)
    }

    /// Create a percent-of-base modifier (0.2 = +20%)
    pub const fn percent_add(stat: StatId, value: f64) -> Self {
        Self::new(stat, ModifierPhase::PercentAdd, value)
    }

    /// Create a compounding multiplier (0.1 = ×1.1)
    pub const fn percent_mult(stat: StatId, value: f64) -> Self {
        Self::new(stat, ModifierPhase::PercentMult, value)
    }
}

/// Compute the effective value of `stat` from `base` and a unit's active effects.
///
/// Only modifiers whose `stat` matches are considered. Each modifier's
/// magnitude is multiplied by its instance's stack count. Effects are read
/// in list order, which is the order PercentMult modifiers compound in.
///
/// # Example
///
/// Base 50 with `[Flat +10, PercentAdd +0.2, PercentMult +0.1]`:
///
/// ```text
/// flat:     50 + 10       = 60
/// pct add:  60 + 50 × 0.2 = 70
/// pct mult: 70 × 1.1      = 77
/// ```
pub fn evaluate(base: i32, stat: StatId, effects: &[ActiveEffectInstance]) -> i32 {
    evaluate_modifiers(
        base,
        stat,
        effects.iter().flat_map(|instance| {
            let stacks = instance.stacks();
            instance
                .definition()
                .modifiers
                .iter()
                .map(move |modifier| (modifier, stacks))
        }),
    )
}

/// Fold `(modifier, stack count)` pairs over `base`.
///
/// This is the stack behind [`evaluate`]; it is exposed separately so
/// callers holding bare modifiers (equipment previews, tooltips) can use the
/// exact same arithmetic.
pub fn evaluate_modifiers<'m, I>(base: i32, stat: StatId, modifiers: I) -> i32
where
    I: IntoIterator<Item = (&'m StatModifier, u32)>,
{
    let original = f64::from(base);

    let mut flat_sum = 0.0;
    let mut percent_add_sum = 0.0;
    let mut percent_mults = Vec::new();

    for (modifier, stacks) in modifiers {
        if modifier.stat != stat {
            continue;
        }
        let scaled = modifier.value * f64::from(stacks);
        match modifier.phase {
            ModifierPhase::Flat => flat_sum += scaled,
            ModifierPhase::PercentAdd => percent_add_sum += scaled,
            ModifierPhase::PercentMult => percent_mults.push(scaled),
        }
    }

    // Step 1: Flat
    let after_flat = original + flat_sum;

    // Step 2: PercentAdd, scaled by the original base
    let after_percent_add = after_flat + percent_add_sum * original;

    // Step 3: PercentMult, compounding in list order
    let after_percent_mult = percent_mults
        .into_iter()
        .fold(after_percent_add, |acc, scaled| acc * (1.0 + scaled));

    // Step 4: Round, then floor at 0
    finalize(after_percent_mult)
}

fn finalize(value: f64) -> i32 {
    if !value.is_finite() {
        tracing::error!(
            target: "combat::stats",
            value,
            "modifier stack produced a non-finite value, clamping to 0"
        );
        return 0;
    }
    value.round().clamp(0.0, f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Attribute, ResourceKind};

    const MAX_VITALITY: StatId = StatId::MaxResource(ResourceKind::Vitality);

    fn apply(base: i32, modifiers: &[StatModifier]) -> i32 {
        evaluate_modifiers(base, MAX_VITALITY, modifiers.iter().map(|m| (m, 1)))
    }

    #[test]
    fn three_phase_order_matches_worked_example() {
        let modifiers = [
            StatModifier::flat(MAX_VITALITY, 10.0),
            StatModifier::percent_add(MAX_VITALITY, 0.2),
            StatModifier::percent_mult(MAX_VITALITY, 0.1),
        ];
        // (50 + 10) + 50 × 0.2 = 70, then 70 × 1.1 = 77
        assert_eq!(apply(50, &modifiers), 77);
    }

    #[test]
    fn percent_add_uses_original_base_not_flat_total() {
        let modifiers = [
            StatModifier::flat(MAX_VITALITY, 100.0),
            StatModifier::percent_add(MAX_VITALITY, 0.5),
        ];
        // 10 + 100 + 10 × 0.5 = 115 (not 110 × 1.5 = 165)
        assert_eq!(apply(10, &modifiers), 115);
    }

    #[test]
    fn percent_add_sums_before_scaling() {
        let modifiers = [
            StatModifier::percent_add(MAX_VITALITY, 0.25),
            StatModifier::percent_add(MAX_VITALITY, 0.25),
        ];
        assert_eq!(apply(100, &modifiers), 150);
    }

    #[test]
    fn percent_mult_compounds() {
        let modifiers = [
            StatModifier::percent_mult(MAX_VITALITY, 0.5),
            StatModifier::percent_mult(MAX_VITALITY, 0.5),
        ];
        // 100 × 1.5 × 1.5 = 225 (summed would be 200)
        assert_eq!(apply(100, &modifiers), 225);
    }

    #[test]
    fn stack_count_scales_magnitude() {
        let flat = StatModifier::flat(MAX_VITALITY, 4.0);
        let mult = StatModifier::percent_mult(MAX_VITALITY, 0.1);
        let value = evaluate_modifiers(10, MAX_VITALITY, [(&flat, 3), (&mult, 2)]);
        // (10 + 4 × 3) × (1 + 0.1 × 2) = 22 × 1.2 = 26.4 → 26
        assert_eq!(value, 26);
    }

    #[test]
    fn other_stats_are_ignored() {
        let modifiers = [
            StatModifier::flat(StatId::Speed, 40.0),
            StatModifier::flat(StatId::Attribute(Attribute::Strength), 40.0),
        ];
        assert_eq!(apply(50, &modifiers), 50);
    }

    #[test]
    fn rounds_to_nearest_and_floors_at_zero() {
        let half = [StatModifier::percent_mult(MAX_VITALITY, 0.5)];
        // 5 × 1.5 = 7.5 → 8
        assert_eq!(apply(5, &half), 8);

        let crushing = [StatModifier::flat(MAX_VITALITY, -500.0)];
        assert_eq!(apply(50, &crushing), 0);

        let inverted = [StatModifier::percent_mult(MAX_VITALITY, -2.0)];
        assert_eq!(apply(50, &inverted), 0);
    }

    #[test]
    fn evaluation_is_reproducible() {
        let modifiers = [
            StatModifier::flat(MAX_VITALITY, 3.0),
            StatModifier::percent_add(MAX_VITALITY, 0.15),
            StatModifier::percent_mult(MAX_VITALITY, 0.07),
            StatModifier::percent_mult(MAX_VITALITY, -0.03),
        ];
        let first = apply(123, &modifiers);
        for _ in 0..100 {
            assert_eq!(apply(123, &modifiers), first);
        }
    }
}
