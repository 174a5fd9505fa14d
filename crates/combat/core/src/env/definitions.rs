//! Static definitions for equipment, abilities and consumables.
//!
//! Content is authored outside the engine (see `combat-content`) and handed
//! in through [`DefinitionOracle`](super::DefinitionOracle).

use std::fmt;

use crate::effects::EffectId;
use crate::stats::ResourceKind;

macro_rules! definition_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

definition_id!(
    /// Identifier of a [`WeaponDefinition`].
    WeaponId,
    "weapon"
);
definition_id!(
    /// Identifier of an [`ArmorDefinition`].
    ArmorId,
    "armor"
);
definition_id!(
    /// Identifier of an [`AbilityDefinition`].
    AbilityId,
    "ability"
);
definition_id!(
    /// Identifier of an [`ItemDefinition`].
    ItemId,
    "item"
);

bitflags::bitflags! {
    /// Which units an ability or item may target, relative to the user.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct TargetFlags: u8 {
        const SELF  = 0b0000_0001;
        const ALLY  = 0b0000_0010;
        const ENEMY = 0b0000_0100;
        const FRIENDLY = Self::SELF.bits() | Self::ALLY.bits();
    }
}

impl Default for TargetFlags {
    fn default() -> Self {
        TargetFlags::ENEMY
    }
}

/// A non-action-point resource debit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub resource: ResourceKind,
    pub amount: u32,
}

impl ResourceCost {
    pub const fn new(resource: ResourceKind, amount: u32) -> Self {
        Self { resource, amount }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponDefinition {
    pub id: WeaponId,
    pub name: String,
    pub base_damage: i32,
    pub accuracy: i32,
    /// Maximum Manhattan distance to the target.
    pub range: u32,
    /// Action points spent per attack.
    pub attack_cost: u32,
    /// Bypasses armor mitigation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub true_damage: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmorDefinition {
    pub id: ArmorId,
    pub name: String,
    /// Base value for the `Armor` stat.
    pub armor: i32,
    /// Flat defense added to physical hit checks.
    pub evasion: i32,
    /// Base value for the `MagicResist` stat.
    pub magic_resist: i32,
}

impl Default for ArmorId {
    fn default() -> Self {
        ArmorId(0)
    }
}

/// What an ability does to its target once it connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    /// Magical damage, mitigated by magic resist.
    Damage,
    /// Restores vitality; never rolls to hit.
    Heal,
    /// Only applies its effects.
    Effect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub kind: AbilityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_power: i32,
    /// Values ≤ 0 hit automatically.
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_accuracy: i32,
    pub range: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: TargetFlags,
    pub action_points: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_costs: Vec<ResourceCost>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub true_damage: bool,
    /// Applied to the target when the ability connects.
    #[cfg_attr(feature = "serde", serde(default))]
    pub applies: Vec<EffectId>,
}

/// A single consequence of using an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    Restore { resource: ResourceKind, amount: i32 },
    ApplyEffect(EffectId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub action_points: u32,
    #[cfg_attr(feature = "serde", serde(default = "ItemDefinition::default_targets"))]
    pub targets: TargetFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: u32,
    pub effects: Vec<ItemEffect>,
}

impl ItemDefinition {
    #[cfg(feature = "serde")]
    fn default_targets() -> TargetFlags {
        TargetFlags::SELF
    }
}
