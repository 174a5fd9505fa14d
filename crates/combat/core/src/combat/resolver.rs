use crate::config::CombatConfig;
use crate::env::{AbilityDefinition, GridOracle, RollStream};
use crate::state::Unit;
use crate::stats::Attribute;

use super::critical::{magical_crit_chance, physical_crit_chance};
use super::damage::{DamageKind, mitigate, outgoing_damage};
use super::hit::{
    ability_defense, ability_offense, hit_chance, physical_defense, physical_offense, roll_hits,
};
use super::result::{AttackOutcome, AttackResult};

/// Resolves hits, crits and damage between two units.
///
/// Every check takes `Option<&Unit>`: a missing or dead participant yields
/// the safe default (miss, 0, no crit) and a warning instead of an error.
#[derive(Clone, Copy)]
pub struct CombatResolver<'a> {
    config: &'a CombatConfig,
    grid: &'a dyn GridOracle,
}

impl<'a> CombatResolver<'a> {
    pub fn new(config: &'a CombatConfig, grid: &'a dyn GridOracle) -> Self {
        Self { config, grid }
    }

    pub fn config(&self) -> &CombatConfig {
        self.config
    }

    // ========================================================================
    // Hit checks
    // ========================================================================

    /// Weapon (or unarmed) attack hit check.
    pub fn resolve_hit(
        &self,
        attacker: Option<&Unit>,
        defender: Option<&Unit>,
        rolls: &mut RollStream<'_>,
    ) -> bool {
        let (Some(attacker), Some(defender)) = (
            participant(attacker, "attacker", "resolve_hit"),
            participant(defender, "defender", "resolve_hit"),
        ) else {
            return false;
        };

        let accuracy = attacker
            .loadout
            .weapon
            .as_ref()
            .map_or(self.config.unarmed_accuracy, |weapon| weapon.accuracy);
        let offense = physical_offense(attacker, accuracy);
        let defense = physical_defense(defender, self.grid.cover_bonus(defender.position));
        let chance = hit_chance(offense, defense, self.config);
        let roll = rolls.d100();

        tracing::trace!(
            target: "combat::resolver",
            attacker = %attacker.id,
            defender = %defender.id,
            offense,
            defense,
            chance,
            roll,
            "physical hit check"
        );
        roll_hits(roll, chance)
    }

    /// Ability hit check. Non-positive base accuracy hits without rolling.
    pub fn resolve_ability_hit(
        &self,
        ability: &AbilityDefinition,
        caster: Option<&Unit>,
        target: Option<&Unit>,
        rolls: &mut RollStream<'_>,
    ) -> bool {
        let (Some(caster), Some(target)) = (
            participant(caster, "caster", "resolve_ability_hit"),
            participant(target, "target", "resolve_ability_hit"),
        ) else {
            return false;
        };
        if ability.base_accuracy <= 0 {
            return true;
        }

        let offense = ability_offense(caster, ability.base_accuracy);
        let defense = ability_defense(target, self.grid.cover_bonus(target.position));
        let chance = hit_chance(offense, defense, self.config);
        let roll = rolls.d100();

        tracing::trace!(
            target: "combat::resolver",
            caster = %caster.id,
            target = %target.id,
            ability = %ability.id,
            chance,
            roll,
            "ability hit check"
        );
        roll_hits(roll, chance)
    }

    // ========================================================================
    // Critical checks
    // ========================================================================

    pub fn check_critical_hit(&self, attacker: Option<&Unit>, rolls: &mut RollStream<'_>) -> bool {
        let Some(attacker) = participant(attacker, "attacker", "check_critical_hit") else {
            return false;
        };
        let chance = physical_crit_chance(attacker, self.config);
        roll_hits(rolls.d100(), chance)
    }

    pub fn check_magical_critical_hit(
        &self,
        caster: Option<&Unit>,
        rolls: &mut RollStream<'_>,
    ) -> bool {
        let Some(caster) = participant(caster, "caster", "check_magical_critical_hit") else {
            return false;
        };
        let chance = magical_crit_chance(caster, self.config);
        roll_hits(rolls.d100(), chance)
    }

    // ========================================================================
    // Damage
    // ========================================================================

    /// Physical damage from `base`, scaled by the attacker's Strength and
    /// mitigated by the defender's armor.
    pub fn calculate_physical_damage(
        &self,
        base: i32,
        attacker: Option<&Unit>,
        defender: Option<&Unit>,
        crit_multiplier: f64,
        true_damage: bool,
    ) -> i32 {
        let (Some(attacker), Some(defender)) = (
            participant(attacker, "attacker", "calculate_physical_damage"),
            participant(defender, "defender", "calculate_physical_damage"),
        ) else {
            return 0;
        };

        let outgoing = outgoing_damage(
            base,
            attacker.effective_attribute(Attribute::Strength),
            crit_multiplier,
        );
        let kind = if true_damage {
            DamageKind::True
        } else {
            DamageKind::Physical
        };
        mitigate(
            outgoing,
            defender.armor_rating(),
            self.config.mitigation_constant,
            kind,
        )
    }

    /// Magical damage for `ability`, rolling its own magical crit from
    /// `rolls`. Abilities without power deal exactly 0 and roll nothing.
    pub fn calculate_magical_damage(
        &self,
        ability: &AbilityDefinition,
        caster: Option<&Unit>,
        target: Option<&Unit>,
        rolls: &mut RollStream<'_>,
    ) -> AttackResult {
        let kind = if ability.true_damage {
            DamageKind::True
        } else {
            DamageKind::Magical
        };
        if ability.base_power <= 0 {
            return AttackResult {
                outcome: AttackOutcome::Hit,
                kind,
                damage: 0,
            };
        }
        let (Some(caster), Some(target)) = (
            participant(caster, "caster", "calculate_magical_damage"),
            participant(target, "target", "calculate_magical_damage"),
        ) else {
            return AttackResult::miss(kind);
        };

        let critical = self.check_magical_critical_hit(Some(caster), rolls);
        let multiplier = if critical {
            self.config.magic_crit_multiplier
        } else {
            1.0
        };
        let outgoing = outgoing_damage(
            ability.base_power,
            caster.effective_attribute(Attribute::Intelligence),
            multiplier,
        );
        AttackResult {
            outcome: outcome(critical),
            kind,
            damage: mitigate(
                outgoing,
                target.magic_resist(),
                self.config.mitigation_constant,
                kind,
            ),
        }
    }

    /// `base_power + floor(Int / 4)`, never negative.
    pub fn calculate_healing(&self, ability: &AbilityDefinition, caster: Option<&Unit>) -> i32 {
        let Some(caster) = participant(caster, "caster", "calculate_healing") else {
            return 0;
        };
        ability
            .base_power
            .saturating_add(caster.effective_attribute(Attribute::Intelligence).div_euclid(4))
            .max(0)
    }

    // ========================================================================
    // Full resolutions
    // ========================================================================

    /// Hit check, crit check and damage for a weapon or unarmed attack.
    pub fn resolve_attack(
        &self,
        attacker: &Unit,
        defender: &Unit,
        rolls: &mut RollStream<'_>,
    ) -> AttackResult {
        let weapon = attacker.loadout.weapon.as_deref();
        let kind = match weapon {
            Some(weapon) if weapon.true_damage => DamageKind::True,
            _ => DamageKind::Physical,
        };
        if !self.resolve_hit(Some(attacker), Some(defender), rolls) {
            return AttackResult::miss(kind);
        }

        let critical = self.check_critical_hit(Some(attacker), rolls);
        let multiplier = if critical {
            self.config.crit_multiplier
        } else {
            1.0
        };
        let base = weapon.map_or(self.config.unarmed_damage, |weapon| weapon.base_damage);
        let damage = self.calculate_physical_damage(
            base,
            Some(attacker),
            Some(defender),
            multiplier,
            kind == DamageKind::True,
        );

        AttackResult {
            outcome: outcome(critical),
            kind,
            damage,
        }
    }

    /// Hit check, crit check and damage for an offensive ability.
    pub fn resolve_ability(
        &self,
        ability: &AbilityDefinition,
        caster: &Unit,
        target: &Unit,
        rolls: &mut RollStream<'_>,
    ) -> AttackResult {
        let kind = if ability.true_damage {
            DamageKind::True
        } else {
            DamageKind::Magical
        };
        if !self.resolve_ability_hit(ability, Some(caster), Some(target), rolls) {
            return AttackResult::miss(kind);
        }
        self.calculate_magical_damage(ability, Some(caster), Some(target), rolls)
    }
}

impl std::fmt::Debug for CombatResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatResolver")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

fn outcome(critical: bool) -> AttackOutcome {
    if critical {
        AttackOutcome::Critical
    } else {
        AttackOutcome::Hit
    }
}

fn participant<'u>(
    unit: Option<&'u Unit>,
    role: &'static str,
    check: &'static str,
) -> Option<&'u Unit> {
    match unit {
        Some(unit) if unit.is_alive() => Some(unit),
        Some(unit) => {
            tracing::warn!(
                target: "combat::resolver",
                unit = %unit.id,
                role,
                check,
                "dead participant"
            );
            None
        }
        None => {
            tracing::warn!(target: "combat::resolver", role, check, "missing participant");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{
        AbilityId, AbilityKind, ArmorDefinition, OpenGrid, RngOracle, TargetFlags,
        WeaponDefinition, WeaponId,
    };
    use crate::state::fixtures::{plain_unit, unit_with};
    use crate::state::{Position, UnitId};
    use crate::stats::{PrimaryAttributes, ResourceKind};

    /// Every d100 comes up as the wrapped value.
    struct FixedRoll(u32);

    impl RngOracle for FixedRoll {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0 - 1
        }
    }

    struct CoverEverywhere(i32);

    impl GridOracle for CoverEverywhere {
        fn cover_bonus(&self, _position: Position) -> i32 {
            self.0
        }

        fn is_occupied(&self, _position: Position) -> bool {
            false
        }
    }

    fn bolt(base_power: i32, base_accuracy: i32) -> AbilityDefinition {
        AbilityDefinition {
            id: AbilityId(1),
            name: "bolt".into(),
            kind: AbilityKind::Damage,
            base_power,
            base_accuracy,
            range: 5,
            targets: TargetFlags::ENEMY,
            action_points: 2,
            resource_costs: Vec::new(),
            true_damage: false,
            applies: Vec::new(),
        }
    }

    fn sword(base_damage: i32, accuracy: i32) -> Arc<WeaponDefinition> {
        Arc::new(WeaponDefinition {
            id: WeaponId(1),
            name: "sword".into(),
            base_damage,
            accuracy,
            range: 1,
            attack_cost: 2,
            true_damage: false,
        })
    }

    fn plated(armor: i32) -> Option<Arc<ArmorDefinition>> {
        Some(Arc::new(ArmorDefinition {
            armor,
            ..ArmorDefinition::default()
        }))
    }

    #[test]
    fn physical_damage_halved_by_fifty_armor() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let attacker = unit_with(1, PrimaryAttributes::new(8, 0, 10, 0, 0, 0), 100);
        let mut defender = plain_unit(2);
        defender.loadout.armor = plated(50);

        let damage =
            resolver.calculate_physical_damage(10, Some(&attacker), Some(&defender), 1.0, false);
        assert_eq!(damage, 6);
    }

    #[test]
    fn true_damage_weapon_bypasses_armor() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let attacker = unit_with(1, PrimaryAttributes::new(8, 0, 10, 0, 0, 0), 100);
        let mut defender = plain_unit(2);
        defender.loadout.armor = plated(50);

        let damage =
            resolver.calculate_physical_damage(10, Some(&attacker), Some(&defender), 1.0, true);
        assert_eq!(damage, 12);
    }

    #[test]
    fn heavy_armor_still_takes_one() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let attacker = plain_unit(1);
        let mut defender = plain_unit(2);
        defender.loadout.armor = plated(100_000);

        assert_eq!(
            resolver.calculate_physical_damage(1, Some(&attacker), Some(&defender), 1.0, false),
            1
        );
    }

    #[test]
    fn zero_power_ability_deals_exactly_zero() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let caster = unit_with(1, PrimaryAttributes::uniform(40), 100);
        let target = plain_unit(2);
        let ability = bolt(0, 0);

        let rng = FixedRoll(1);
        let mut rolls = RollStream::new(&rng, 0, 0, caster.id);
        let direct =
            resolver.calculate_magical_damage(&ability, Some(&caster), Some(&target), &mut rolls);
        assert_eq!(direct.damage, 0);
        assert_eq!(rolls.rolls_drawn(), 0);

        let result = resolver.resolve_ability(&ability, &caster, &target, &mut rolls);
        assert_eq!(result.damage, 0);
        assert_eq!(rolls.rolls_drawn(), 0);
    }

    #[test]
    fn magical_crit_multiplies_before_mitigation() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let caster = unit_with(1, PrimaryAttributes::uniform(8), 100);
        let target = plain_unit(2);
        let ability = bolt(10, 0);

        // crit chance 5 + 2 + 2 = 9; (10 + 2) × 1.5 = 18, no magic resist
        let crit_roll = FixedRoll(9);
        let mut rolls = RollStream::new(&crit_roll, 0, 0, caster.id);
        let critical =
            resolver.calculate_magical_damage(&ability, Some(&caster), Some(&target), &mut rolls);
        assert_eq!(critical.outcome, AttackOutcome::Critical);
        assert_eq!(critical.damage, 18);
        assert_eq!(rolls.rolls_drawn(), 1);

        let plain_roll = FixedRoll(10);
        let mut rolls = RollStream::new(&plain_roll, 0, 0, caster.id);
        let plain =
            resolver.calculate_magical_damage(&ability, Some(&caster), Some(&target), &mut rolls);
        assert_eq!(plain.outcome, AttackOutcome::Hit);
        assert_eq!(plain.damage, 12);
    }

    #[test]
    fn resolve_ability_reports_the_magical_crit() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let caster = unit_with(1, PrimaryAttributes::uniform(8), 100);
        let target = plain_unit(2);
        let rng = FixedRoll(1);
        let mut rolls = RollStream::new(&rng, 0, 0, caster.id);

        // auto-hit draws nothing, the crit check draws one
        let result = resolver.resolve_ability(&bolt(10, 0), &caster, &target, &mut rolls);
        assert_eq!(result.outcome, AttackOutcome::Critical);
        assert_eq!(result.damage, 18);
        assert_eq!(rolls.rolls_drawn(), 1);
    }

    #[test]
    fn healing_adds_quarter_intelligence() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let caster = unit_with(1, PrimaryAttributes::uniform(13), 100);
        let mut heal = bolt(6, 0);
        heal.kind = AbilityKind::Heal;

        assert_eq!(resolver.calculate_healing(&heal, Some(&caster)), 9);
        assert_eq!(resolver.calculate_healing(&heal, None), 0);
    }

    #[test]
    fn missing_or_dead_participants_use_safe_defaults() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let rng = FixedRoll(1);
        let attacker = plain_unit(1);
        let mut dead = plain_unit(2);
        dead.modify_resource(ResourceKind::Vitality, -1_000);
        let mut rolls = RollStream::new(&rng, 0, 0, UnitId(1));

        assert!(!resolver.resolve_hit(Some(&attacker), None, &mut rolls));
        assert!(!resolver.resolve_hit(Some(&attacker), Some(&dead), &mut rolls));
        assert!(!resolver.check_critical_hit(None, &mut rolls));
        assert_eq!(
            resolver.calculate_physical_damage(10, None, Some(&attacker), 1.0, false),
            0
        );
        assert_eq!(rolls.rolls_drawn(), 0);
    }

    #[test]
    fn cover_lowers_hit_chance_to_the_floor() {
        let config = CombatConfig::default();
        let grid = CoverEverywhere(200);
        let resolver = CombatResolver::new(&config, &grid);
        let attacker = plain_unit(1);
        let defender = plain_unit(2);

        let hit_on_five = FixedRoll(5);
        let mut rolls = RollStream::new(&hit_on_five, 0, 0, attacker.id);
        assert!(resolver.resolve_hit(Some(&attacker), Some(&defender), &mut rolls));

        let miss_on_six = FixedRoll(6);
        let mut rolls = RollStream::new(&miss_on_six, 0, 0, attacker.id);
        assert!(!resolver.resolve_hit(Some(&attacker), Some(&defender), &mut rolls));
    }

    #[test]
    fn non_positive_ability_accuracy_auto_hits() {
        let config = CombatConfig::default();
        let grid = CoverEverywhere(500);
        let resolver = CombatResolver::new(&config, &grid);
        let caster = plain_unit(1);
        let target = plain_unit(2);
        let rng = FixedRoll(100);
        let mut rolls = RollStream::new(&rng, 0, 0, caster.id);

        let auto = bolt(5, 0);
        assert!(resolver.resolve_ability_hit(&auto, Some(&caster), Some(&target), &mut rolls));
        assert_eq!(rolls.rolls_drawn(), 0);
        let aimed = bolt(5, 10);
        assert!(!resolver.resolve_ability_hit(&aimed, Some(&caster), Some(&target), &mut rolls));
        assert_eq!(rolls.rolls_drawn(), 1);
    }

    #[test]
    fn resolve_attack_crits_with_shared_roll_stream() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let mut attacker = unit_with(1, PrimaryAttributes::new(8, 0, 10, 0, 0, 0), 100);
        attacker.loadout.weapon = Some(sword(10, 90));
        let mut defender = unit_with(2, PrimaryAttributes::new(0, 0, 10, 0, 0, 0), 100);
        defender.loadout.armor = plated(50);
        let rng = FixedRoll(1);
        let mut rolls = RollStream::new(&rng, 0, 0, attacker.id);

        let result = resolver.resolve_attack(&attacker, &defender, &mut rolls);

        // round(12 × 1.5) = 18, halved by armor 50
        assert_eq!(result.outcome, AttackOutcome::Critical);
        assert_eq!(result.damage, 9);
        assert_eq!(rolls.rolls_drawn(), 2);
    }

    #[test]
    fn unarmed_attack_uses_config_values() {
        let config = CombatConfig::default();
        let resolver = CombatResolver::new(&config, &OpenGrid);
        let attacker = unit_with(1, PrimaryAttributes::new(0, 0, 10, 0, 0, 0), 100);
        let defender = unit_with(2, PrimaryAttributes::new(0, 0, 10, 0, 0, 0), 100);
        // crit chance 5, roll 5 hits and crits
        let rng = FixedRoll(5);
        let mut rolls = RollStream::new(&rng, 0, 0, attacker.id);

        let result = resolver.resolve_attack(&attacker, &defender, &mut rolls);
        assert_eq!(result.kind, DamageKind::Physical);
        // round(1 × 1.5) = 2
        assert_eq!(result.damage, 2);
    }
}
