//! Primary attributes and stat identities.
//!
//! The six primary attributes are the only stats a unit stores. Everything
//! else (resource maximums, speed, mitigation) is derived from them or from
//! archetype contributions and recomputed on every read.

use super::resources::ResourceKind;

/// The six primary attributes.
///
/// - **Strength**: physical power, melee damage, stamina
/// - **Dexterity**: accuracy, evasion, physical crits, action points
/// - **Constitution**: vitality
/// - **Intelligence**: spell power, spell accuracy, mana
/// - **Wisdom**: magic defense, awareness, focus
/// - **Charisma**: social power, influence
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
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Attribute {
    /// First initiative tie-breaker after speed.
    pub const TIE_BREAK_PRIMARY: Attribute = Attribute::Dexterity;

    /// Second initiative tie-breaker.
    pub const TIE_BREAK_SECONDARY: Attribute = Attribute::Wisdom;
}

/// Stored base values of the six primary attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrimaryAttributes {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl PrimaryAttributes {
    pub const fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    /// Every attribute set to the same value.
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    pub const fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Wisdom => self.wisdom = value,
            Attribute::Charisma => self.charisma = value,
        }
    }

    /// Component-wise sum, used to combine race and class contributions.
    pub fn combined(&self, other: &PrimaryAttributes) -> Self {
        Self {
            strength: self.strength + other.strength,
            dexterity: self.dexterity + other.dexterity,
            constitution: self.constitution + other.constitution,
            intelligence: self.intelligence + other.intelligence,
            wisdom: self.wisdom + other.wisdom,
            charisma: self.charisma + other.charisma,
        }
    }
}

/// Identity of a modifier-subject stat.
///
/// Modifiers target one of these; the evaluator only folds modifiers whose
/// `stat` equals the identity being evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatId {
    /// One of the six primary attributes.
    Attribute(Attribute),
    /// The maximum of a resource pool, applied after the attribute formula.
    MaxResource(ResourceKind),
    /// Initiative gained per scheduler tick.
    Speed,
    /// Physical mitigation rating.
    Armor,
    /// Magical mitigation rating.
    MagicResist,
}

impl From<Attribute> for StatId {
    fn from(attribute: Attribute) -> Self {
        StatId::Attribute(attribute)
    }
}
