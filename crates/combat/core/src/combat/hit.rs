//! Hit chance calculations.

use crate::config::CombatConfig;
use crate::state::Unit;
use crate::stats::Attribute;

/// Hit chance in percent.
///
/// # Formula
///
/// ```text
/// chance = clamp(offense - defense, min_hit_chance, max_hit_chance)
/// ```
///
/// Inverted bounds are swapped rather than trusted.
pub fn hit_chance(offense: i32, defense: i32, config: &CombatConfig) -> i32 {
    let (low, high) = (config.min_hit_chance, config.max_hit_chance);
    let (low, high) = if low <= high {
        (low, high)
    } else {
        tracing::error!(
            target: "combat::resolver",
            min = low,
            max = high,
            "hit chance bounds are inverted"
        );
        (high, low)
    };
    offense.saturating_sub(defense).clamp(low, high)
}

/// A d100 roll hits when it does not exceed the chance.
pub fn roll_hits(roll: u32, chance: i32) -> bool {
    i64::from(roll) <= i64::from(chance)
}

/// `accuracy + floor(Dex / 2)`
pub fn physical_offense(attacker: &Unit, accuracy: i32) -> i32 {
    accuracy + attacker.effective_attribute(Attribute::Dexterity).div_euclid(2)
}

/// `evasion + floor(Wis / 2) + floor(Dex / 4) + cover`
pub fn physical_defense(defender: &Unit, cover: i32) -> i32 {
    defender.evasion()
        + defender.effective_attribute(Attribute::Wisdom).div_euclid(2)
        + defender.effective_attribute(Attribute::Dexterity).div_euclid(4)
        + cover
}

/// `base_accuracy + floor(Int / 4)`
pub fn ability_offense(caster: &Unit, base_accuracy: i32) -> i32 {
    base_accuracy + caster.effective_attribute(Attribute::Intelligence).div_euclid(4)
}

/// `floor(Wis / 4) + cover`
pub fn ability_defense(target: &Unit, cover: i32) -> i32 {
    target.effective_attribute(Attribute::Wisdom).div_euclid(4) + cover
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_differential_clamps_to_minimum() {
        // 80 - 95 = -15
        assert_eq!(hit_chance(80, 95, &CombatConfig::default()), 5);
    }

    #[test]
    fn differential_maps_into_bounds() {
        let config = CombatConfig::default();
        for offense in -200..=200 {
            let chance = hit_chance(offense, 40, &config);
            assert!((5..=95).contains(&chance));
        }
        assert_eq!(hit_chance(300, 0, &config), 95);
        assert_eq!(hit_chance(60, 10, &config), 50);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let config = CombatConfig {
            min_hit_chance: 90,
            max_hit_chance: 10,
            ..CombatConfig::default()
        };
        assert_eq!(hit_chance(50, 0, &config), 50);
        assert_eq!(hit_chance(0, 50, &config), 10);
        assert_eq!(hit_chance(200, 0, &config), 90);
    }

    #[test]
    fn roll_equal_to_chance_hits() {
        assert!(roll_hits(50, 50));
        assert!(!roll_hits(51, 50));
        assert!(roll_hits(1, 5));
    }
}
