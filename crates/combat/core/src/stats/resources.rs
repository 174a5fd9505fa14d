//! Resource pools.
//!
//! Resource pools are partially stored:
//! - Base maximum: race + class contribution, fixed at unit creation
//! - Current value and regeneration rate: stored
//! - Effective maximum: NOT stored, recomputed from effective attributes
//!
//! Formula:
//! ```text
//! effective_max = evaluate(contribution + floor(effective(governing attribute) / divisor),
//!                          MaxResource(kind))
//! ```

use super::attributes::Attribute;

// ============================================================================
// Resource Kind
// ============================================================================

/// The six resource pools every unit carries.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    /// Health. Reaching 0 kills the unit.
    Vitality,
    /// Spell resource.
    Mana,
    /// Physical technique resource.
    Stamina,
    /// Concentration resource.
    Focus,
    /// Social resource.
    Influence,
    /// Per-turn action budget, refilled at turn start.
    ActionPoints,
}

impl ResourceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Vitality,
        ResourceKind::Mana,
        ResourceKind::Stamina,
        ResourceKind::Focus,
        ResourceKind::Influence,
        ResourceKind::ActionPoints,
    ];

    /// Attribute whose effective value feeds this pool's maximum.
    pub const fn governing_attribute(self) -> Attribute {
        match self {
            ResourceKind::Vitality => Attribute::Constitution,
            ResourceKind::Mana => Attribute::Intelligence,
            ResourceKind::Stamina => Attribute::Strength,
            ResourceKind::Focus => Attribute::Wisdom,
            ResourceKind::Influence => Attribute::Charisma,
            ResourceKind::ActionPoints => Attribute::Dexterity,
        }
    }

    /// Divisor applied to the governing attribute (floor division).
    pub const fn divisor(self) -> i32 {
        match self {
            ResourceKind::Vitality => 1,
            ResourceKind::Mana
            | ResourceKind::Stamina
            | ResourceKind::Focus
            | ResourceKind::Influence => 2,
            ResourceKind::ActionPoints => 10,
        }
    }

    const fn index(self) -> usize {
        match self {
            ResourceKind::Vitality => 0,
            ResourceKind::Mana => 1,
            ResourceKind::Stamina => 2,
            ResourceKind::Focus => 3,
            ResourceKind::Influence => 4,
            ResourceKind::ActionPoints => 5,
        }
    }

    /// Maximum before the `MaxResource` modifier pass.
    ///
    /// `contribution + floor(attribute / divisor)`
    pub const fn base_maximum(self, contribution: i32, effective_attribute: i32) -> i32 {
        contribution + effective_attribute.div_euclid(self.divisor())
    }
}

// ============================================================================
// Pools
// ============================================================================

/// Stored portion of one resource pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    /// Race + class contribution to the maximum.
    pub contribution: i32,
    /// Current value, kept within `[0, effective max]`.
    pub current: i32,
    /// Amount restored at the owner's turn start.
    pub regen: i32,
}

impl ResourcePool {
    pub const fn new(contribution: i32, regen: i32) -> Self {
        Self {
            contribution,
            current: 0,
            regen,
        }
    }
}

/// One [`ResourcePool`] per [`ResourceKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePools {
    pools: [ResourcePool; ResourceKind::COUNT],
}

impl ResourcePools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ResourceKind) -> &ResourcePool {
        &self.pools[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        &mut self.pools[kind.index()]
    }

    pub fn current(&self, kind: ResourceKind) -> i32 {
        self.get(kind).current
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &ResourcePool)> {
        ResourceKind::ALL.into_iter().zip(self.pools.iter())
    }
}

/// Per-resource integers (maximum contributions or regeneration rates).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourceValues {
    pub vitality: i32,
    pub mana: i32,
    pub stamina: i32,
    pub focus: i32,
    pub influence: i32,
    pub action_points: i32,
}

impl ResourceValues {
    pub const fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Vitality => self.vitality,
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
            ResourceKind::Focus => self.focus,
            ResourceKind::Influence => self.influence,
            ResourceKind::ActionPoints => self.action_points,
        }
    }

    pub fn combined(&self, other: &ResourceValues) -> Self {
        Self {
            vitality: self.vitality + other.vitality,
            mana: self.mana + other.mana,
            stamina: self.stamina + other.stamina,
            focus: self.focus + other.focus,
            influence: self.influence + other.influence,
            action_points: self.action_points + other.action_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn all_matches_iteration_order() {
        assert_eq!(ResourceKind::iter().collect::<Vec<_>>(), ResourceKind::ALL);
    }

    #[test]
    fn base_maximum_floors_attribute_share() {
        // 20 + floor(15 / 2) = 27
        assert_eq!(ResourceKind::Mana.base_maximum(20, 15), 27);
        // 2 + floor(19 / 10) = 3
        assert_eq!(ResourceKind::ActionPoints.base_maximum(2, 19), 3);
        // 30 + 12 / 1 = 42
        assert_eq!(ResourceKind::Vitality.base_maximum(30, 12), 42);
    }

    #[test]
    fn pools_are_indexed_by_kind() {
        let mut pools = ResourcePools::new();
        pools.get_mut(ResourceKind::Focus).current = 7;
        assert_eq!(pools.current(ResourceKind::Focus), 7);
        assert_eq!(pools.current(ResourceKind::Mana), 0);
        assert_eq!(pools.iter().count(), ResourceKind::COUNT);
    }
}
