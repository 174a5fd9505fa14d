//! Combatant state and the resource model.
//!
//! A unit stores only its base attributes, its pool contributions and
//! current values, and its active effects. Effective attributes, maximums,
//! speed and mitigation are recomputed on every read from base values plus
//! the current effect list.

use std::sync::Arc;

use crate::effects::ActiveEffectInstance;
use crate::env::{AbilityId, ArmorDefinition, ItemId, WeaponDefinition};
use crate::stats::{
    ArchetypeBase, Attribute, ClassArchetype, PrimaryAttributes, RaceArchetype, ResourceKind,
    ResourcePool, ResourcePools, StatId, evaluate,
};

use super::common::{Position, TeamId, UnitId};

/// Equipped weapon and armor. An empty slot falls back to unarmed/unarmored values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loadout {
    pub weapon: Option<Arc<WeaponDefinition>>,
    pub armor: Option<Arc<ArmorDefinition>>,
}

impl Loadout {
    pub fn new(
        weapon: Option<Arc<WeaponDefinition>>,
        armor: Option<Arc<ArmorDefinition>>,
    ) -> Self {
        Self { weapon, armor }
    }
}

/// Everything needed to bring a unit into an encounter.
#[derive(Clone, Debug)]
pub struct UnitSpec {
    pub id: UnitId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub race: RaceArchetype,
    pub class: ClassArchetype,
    pub loadout: Loadout,
    pub abilities: Vec<AbilityId>,
    pub items: Vec<ItemId>,
}

impl UnitSpec {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        team: TeamId,
        race: RaceArchetype,
        class: ClassArchetype,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            position: Position::ORIGIN,
            race,
            class,
            loadout: Loadout::default(),
            abilities: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn with_ability(mut self, ability: AbilityId) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_item(mut self, item: ItemId) -> Self {
        self.items.push(item);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub loadout: Loadout,
    pub abilities: Vec<AbilityId>,
    /// Consumables carried; one entry per charge.
    pub items: Vec<ItemId>,

    attributes: PrimaryAttributes,
    base_speed: i32,
    resources: ResourcePools,
    effects: Vec<ActiveEffectInstance>,
    initiative: u32,
    alive: bool,
}

impl Unit {
    /// Builds a unit from its archetypes with every pool at its maximum.
    pub fn from_spec(spec: UnitSpec) -> Self {
        let base = ArchetypeBase::combine(&spec.race, &spec.class);

        let mut resources = ResourcePools::new();
        for kind in ResourceKind::ALL {
            *resources.get_mut(kind) =
                ResourcePool::new(base.resources.get(kind), base.regen.get(kind));
        }

        let mut unit = Self {
            id: spec.id,
            name: spec.name,
            team: spec.team,
            position: spec.position,
            loadout: spec.loadout,
            abilities: spec.abilities,
            items: spec.items,
            attributes: base.attributes,
            base_speed: base.speed,
            resources,
            effects: Vec::new(),
            initiative: 0,
            alive: true,
        };
        for kind in ResourceKind::ALL {
            unit.refill(kind);
        }
        if unit.resources.current(ResourceKind::Vitality) <= 0 {
            tracing::warn!(
                target: "combat::state",
                unit = %unit.id,
                "unit spawned with no vitality"
            );
            unit.die();
        }
        unit
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    pub fn base_attributes(&self) -> &PrimaryAttributes {
        &self.attributes
    }

    pub fn effective_attribute(&self, attribute: Attribute) -> i32 {
        evaluate(
            self.attributes.get(attribute),
            StatId::Attribute(attribute),
            &self.effects,
        )
    }

    pub fn effective_attributes(&self) -> PrimaryAttributes {
        let mut effective = PrimaryAttributes::default();
        for attribute in [
            Attribute::Strength,
            Attribute::Dexterity,
            Attribute::Constitution,
            Attribute::Intelligence,
            Attribute::Wisdom,
            Attribute::Charisma,
        ] {
            effective.set(attribute, self.effective_attribute(attribute));
        }
        effective
    }

    pub fn effective_max(&self, kind: ResourceKind) -> i32 {
        let governing = self.effective_attribute(kind.governing_attribute());
        let base = kind.base_maximum(self.resources.get(kind).contribution, governing);
        evaluate(base, StatId::MaxResource(kind), &self.effects)
    }

    /// Initiative gained per scheduler tick.
    pub fn effective_speed(&self) -> i32 {
        evaluate(self.base_speed, StatId::Speed, &self.effects)
    }

    pub fn armor_rating(&self) -> i32 {
        let base = self.loadout.armor.as_ref().map_or(0, |armor| armor.armor);
        evaluate(base, StatId::Armor, &self.effects)
    }

    pub fn magic_resist(&self) -> i32 {
        let base = self
            .loadout
            .armor
            .as_ref()
            .map_or(0, |armor| armor.magic_resist);
        evaluate(base, StatId::MagicResist, &self.effects)
    }

    /// Flat defense from equipped armor.
    pub fn evasion(&self) -> i32 {
        self.loadout.armor.as_ref().map_or(0, |armor| armor.evasion)
    }

    // ========================================================================
    // Stored state
    // ========================================================================

    pub fn current(&self, kind: ResourceKind) -> i32 {
        self.resources.current(kind)
    }

    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        self.resources.get(kind)
    }

    pub fn effects(&self) -> &[ActiveEffectInstance] {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut Vec<ActiveEffectInstance> {
        &mut self.effects
    }

    pub fn initiative(&self) -> u32 {
        self.initiative
    }

    pub(crate) fn set_initiative(&mut self, value: u32) {
        self.initiative = value;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // ========================================================================
    // Resource mutation
    // ========================================================================

    /// Adds `delta` to a pool, clamped into `[0, effective max]`.
    ///
    /// Returns the change actually applied. Dead units are never mutated.
    /// Dropping vitality from above 0 to 0 kills the unit.
    pub fn modify_resource(&mut self, kind: ResourceKind, delta: i32) -> i32 {
        if !self.alive {
            tracing::debug!(
                target: "combat::state",
                unit = %self.id,
                resource = %kind,
                delta,
                "refused to modify a dead unit"
            );
            return 0;
        }

        let max = self.effective_max(kind);
        let before = self.resources.current(kind);
        if kind == ResourceKind::Vitality && before <= 0 && delta <= 0 {
            return 0;
        }

        let after = (i64::from(before) + i64::from(delta)).clamp(0, i64::from(max)) as i32;
        self.resources.get_mut(kind).current = after;

        if kind == ResourceKind::Vitality && before > 0 && after <= 0 {
            self.die();
        }
        after - before
    }

    /// Sets a pool to its effective maximum.
    pub fn refill(&mut self, kind: ResourceKind) {
        if !self.alive {
            return;
        }
        let max = self.effective_max(kind);
        self.resources.get_mut(kind).current = max;
    }

    /// Applies per-turn regeneration to every pool except action points.
    ///
    /// Returns the non-zero changes actually applied.
    pub fn regenerate(&mut self) -> Vec<(ResourceKind, i32)> {
        let mut applied = Vec::new();
        for kind in ResourceKind::ALL {
            if kind == ResourceKind::ActionPoints || !self.alive {
                continue;
            }
            let rate = self.resources.get(kind).regen;
            if rate == 0 {
                continue;
            }
            let delta = self.modify_resource(kind, rate);
            if delta != 0 {
                applied.push((kind, delta));
            }
        }
        applied
    }

    /// Pulls every pool back under its (possibly lowered) maximum.
    ///
    /// Must run after any change to the effect list.
    pub fn recompute_and_reclamp(&mut self) {
        if !self.alive {
            return;
        }
        for kind in ResourceKind::ALL {
            let max = self.effective_max(kind);
            let pool = self.resources.get_mut(kind);
            if pool.current < 0 {
                tracing::error!(
                    target: "combat::state",
                    unit = %self.id,
                    resource = %kind,
                    current = pool.current,
                    "negative resource value, clamping to 0"
                );
                pool.current = 0;
            }
            if pool.current > max {
                pool.current = max;
            }
        }
        if self.resources.current(ResourceKind::Vitality) <= 0 {
            self.die();
        }
    }

    /// Debits a pool that the caller has already checked is affordable.
    pub(crate) fn debit(&mut self, kind: ResourceKind, amount: u32) {
        let pool = self.resources.get_mut(kind);
        pool.current = pool.current.saturating_sub(amount as i32).max(0);
    }

    fn die(&mut self) {
        self.alive = false;
        self.resources.get_mut(ResourceKind::ActionPoints).current = 0;
        tracing::debug!(target: "combat::state", unit = %self.id, "unit defeated");
    }

    #[cfg(test)]
    pub(crate) fn set_current(&mut self, kind: ResourceKind, value: i32) {
        self.resources.get_mut(kind).current = value;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::stats::{ArchetypeContribution, ResourceValues};

    /// A unit whose race supplies every attribute and whose class is empty.
    pub fn unit_with(id: u32, attributes: PrimaryAttributes, speed: i32) -> Unit {
        let race = RaceArchetype::new(ArchetypeContribution {
            name: "test".into(),
            attributes,
            resources: ResourceValues {
                vitality: 20,
                mana: 10,
                stamina: 10,
                focus: 10,
                influence: 0,
                action_points: 4,
            },
            regen: ResourceValues {
                mana: 2,
                stamina: 1,
                ..ResourceValues::default()
            },
            speed,
        });
        Unit::from_spec(UnitSpec::new(
            UnitId(id),
            format!("unit-{id}"),
            TeamId(0),
            race,
            ClassArchetype::default(),
        ))
    }

    pub fn plain_unit(id: u32) -> Unit {
        unit_with(id, PrimaryAttributes::uniform(10), 100)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::effects::{EffectDefinition, EffectId};
    use crate::stats::{ArchetypeContribution, StatModifier};

    fn buff(modifier: StatModifier) -> ActiveEffectInstance {
        let definition = EffectDefinition::new(EffectId(1), "buff", 3).with_modifier(modifier);
        ActiveEffectInstance::new(Arc::new(definition), None, 0)
    }

    #[test]
    fn spawn_sums_archetypes_and_fills_pools() {
        let race = RaceArchetype::new(ArchetypeContribution {
            name: "human".into(),
            attributes: PrimaryAttributes::uniform(5),
            speed: 60,
            ..ArchetypeContribution::default()
        });
        let class = ClassArchetype::new(ArchetypeContribution {
            name: "fighter".into(),
            attributes: PrimaryAttributes::new(6, 5, 7, 0, 1, 0),
            resources: crate::stats::ResourceValues {
                vitality: 30,
                action_points: 2,
                ..Default::default()
            },
            speed: 40,
            ..ArchetypeContribution::default()
        });
        let unit = Unit::from_spec(UnitSpec::new(UnitId(1), "a", TeamId(0), race, class));

        assert_eq!(unit.base_attributes().strength, 11);
        assert_eq!(unit.effective_speed(), 100);
        // 30 + 12 / 1
        assert_eq!(unit.effective_max(ResourceKind::Vitality), 42);
        assert_eq!(unit.current(ResourceKind::Vitality), 42);
        // 2 + floor(10 / 10)
        assert_eq!(unit.current(ResourceKind::ActionPoints), 3);
        assert!(unit.is_alive());
    }

    #[test]
    fn effective_max_follows_governing_attribute() {
        let mut unit = plain_unit(1);
        // 10 + floor(10 / 2)
        assert_eq!(unit.effective_max(ResourceKind::Mana), 15);

        unit.effects_mut()
            .push(buff(StatModifier::flat(Attribute::Intelligence.into(), 4.0)));
        // 10 + floor(14 / 2)
        assert_eq!(unit.effective_max(ResourceKind::Mana), 17);
    }

    #[test]
    fn modify_resource_clamps_to_bounds() {
        let mut unit = plain_unit(1);
        let max = unit.effective_max(ResourceKind::Mana);

        assert_eq!(unit.modify_resource(ResourceKind::Mana, 50), 0);
        assert_eq!(unit.current(ResourceKind::Mana), max);

        assert_eq!(unit.modify_resource(ResourceKind::Mana, -100), -max);
        assert_eq!(unit.current(ResourceKind::Mana), 0);
    }

    #[test]
    fn lethal_damage_kills_and_zeroes_action_points() {
        let mut unit = plain_unit(1);
        unit.modify_resource(ResourceKind::Vitality, -1_000);

        assert!(!unit.is_alive());
        assert_eq!(unit.current(ResourceKind::Vitality), 0);
        assert_eq!(unit.current(ResourceKind::ActionPoints), 0);
    }

    #[test]
    fn dead_units_are_never_mutated() {
        let mut unit = plain_unit(1);
        unit.modify_resource(ResourceKind::Vitality, -1_000);
        let mana = unit.current(ResourceKind::Mana);

        assert_eq!(unit.modify_resource(ResourceKind::Vitality, 10), 0);
        assert_eq!(unit.modify_resource(ResourceKind::Mana, -3), 0);
        unit.refill(ResourceKind::ActionPoints);

        assert_eq!(unit.current(ResourceKind::Vitality), 0);
        assert_eq!(unit.current(ResourceKind::Mana), mana);
        assert_eq!(unit.current(ResourceKind::ActionPoints), 0);
    }

    #[test]
    fn lowering_a_maximum_reclamps_current() {
        let mut unit = plain_unit(1);
        assert_eq!(unit.current(ResourceKind::Vitality), 30);

        unit.effects_mut().push(buff(StatModifier::flat(
            StatId::MaxResource(ResourceKind::Vitality),
            -12.0,
        )));
        unit.recompute_and_reclamp();

        assert_eq!(unit.current(ResourceKind::Vitality), 18);
        assert!(unit.is_alive());
    }

    #[test]
    fn reclamping_vitality_to_zero_kills() {
        let mut unit = plain_unit(1);
        unit.effects_mut().push(buff(StatModifier::percent_mult(
            StatId::MaxResource(ResourceKind::Vitality),
            -1.0,
        )));
        unit.recompute_and_reclamp();

        assert!(!unit.is_alive());
    }

    #[test]
    fn regenerate_skips_action_points_and_full_pools() {
        let mut unit = plain_unit(1);
        unit.modify_resource(ResourceKind::Mana, -5);
        unit.modify_resource(ResourceKind::ActionPoints, -10);

        let applied = unit.regenerate();

        assert_eq!(applied, vec![(ResourceKind::Mana, 2)]);
        assert_eq!(unit.current(ResourceKind::ActionPoints), 0);
    }

    #[test]
    fn armor_and_magic_resist_come_from_loadout() {
        let mut unit = plain_unit(1);
        assert_eq!(unit.armor_rating(), 0);

        unit.loadout.armor = Some(Arc::new(ArmorDefinition {
            armor: 20,
            magic_resist: 8,
            evasion: 3,
            ..ArmorDefinition::default()
        }));
        unit.effects_mut()
            .push(buff(StatModifier::percent_add(StatId::Armor, 0.5)));

        assert_eq!(unit.armor_rating(), 30);
        assert_eq!(unit.magic_resist(), 8);
        assert_eq!(unit.evasion(), 3);
    }
}
