//! Critical hit chances.

use crate::config::CombatConfig;
use crate::state::Unit;
use crate::stats::Attribute;

/// `clamp(base + floor(x / 4) + floor(y / 4), 0, 100)`
pub fn crit_chance(x: i32, y: i32, config: &CombatConfig) -> i32 {
    config
        .base_crit_chance
        .saturating_add(x.div_euclid(4))
        .saturating_add(y.div_euclid(4))
        .clamp(0, 100)
}

/// Physical crits scale with Dexterity and Strength.
pub fn physical_crit_chance(attacker: &Unit, config: &CombatConfig) -> i32 {
    crit_chance(
        attacker.effective_attribute(Attribute::Dexterity),
        attacker.effective_attribute(Attribute::Strength),
        config,
    )
}

/// Magical crits scale with Intelligence and Wisdom.
pub fn magical_crit_chance(caster: &Unit, config: &CombatConfig) -> i32 {
    crit_chance(
        caster.effective_attribute(Attribute::Intelligence),
        caster.effective_attribute(Attribute::Wisdom),
        config,
    )
}
