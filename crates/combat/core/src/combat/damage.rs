//! Damage and healing arithmetic.
//!
//! # Pipeline
//!
//! ```text
//! outgoing = round((base + floor(stat / 4)) × crit multiplier)
//! final    = true damage ? outgoing : round(outgoing × (1 - R / (R + K)))
//! final    = max(final, 1) when outgoing > 0, else 0
//! ```

/// Mitigation channel a hit goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageKind {
    /// Reduced by armor.
    Physical,
    /// Reduced by magic resist.
    Magical,
    /// Bypasses mitigation.
    True,
}

/// `round((base + floor(stat / 4)) × multiplier)`
pub fn outgoing_damage(base: i32, stat: i32, multiplier: f64) -> i32 {
    let raw = f64::from(base.saturating_add(stat.div_euclid(4)));
    round_to_i32(raw * multiplier)
}

/// Damage-reduction fraction `resistance / (resistance + k)`.
pub fn reduction_fraction(resistance: i32, k: f64) -> f64 {
    let resistance = f64::from(resistance.max(0));
    let denominator = resistance + k;
    if denominator <= 0.0 {
        return 0.0;
    }
    resistance / denominator
}

/// Applies mitigation and the minimum-damage floor.
pub fn mitigate(outgoing: i32, resistance: i32, k: f64, kind: DamageKind) -> i32 {
    if outgoing <= 0 {
        return 0;
    }
    let mitigated = match kind {
        DamageKind::True => outgoing,
        DamageKind::Physical | DamageKind::Magical => {
            round_to_i32(f64::from(outgoing) * (1.0 - reduction_fraction(resistance, k)))
        }
    };
    mitigated.max(1)
}

fn round_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        tracing::error!(target: "combat::damage", value, "non-finite damage, using 0");
        return 0;
    }
    value
        .round()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_fifty_halves_damage() {
        // base 10 + floor(8 / 4) = 12, PDR = 50 / 100
        let outgoing = outgoing_damage(10, 8, 1.0);
        assert_eq!(outgoing, 12);
        assert_eq!(mitigate(outgoing, 50, 50.0, DamageKind::Physical), 6);
    }

    #[test]
    fn crit_multiplier_rounds_outgoing() {
        // (7 + 0) × 1.5 = 10.5 → 11
        assert_eq!(outgoing_damage(7, 3, 1.5), 11);
    }

    #[test]
    fn positive_damage_never_drops_below_one() {
        assert_eq!(mitigate(1, 1_000_000, 50.0, DamageKind::Physical), 1);
        assert_eq!(mitigate(3, i32::MAX, 50.0, DamageKind::Magical), 1);
    }

    #[test]
    fn zero_outgoing_stays_zero() {
        assert_eq!(mitigate(0, 0, 50.0, DamageKind::True), 0);
        assert_eq!(mitigate(-4, 0, 50.0, DamageKind::Physical), 0);
    }

    #[test]
    fn true_damage_ignores_resistance() {
        assert_eq!(mitigate(12, 50, 50.0, DamageKind::True), 12);
    }

    #[test]
    fn zero_resistance_means_no_reduction() {
        assert_eq!(reduction_fraction(0, 50.0), 0.0);
        assert_eq!(mitigate(9, 0, 50.0, DamageKind::Physical), 9);
    }
}
