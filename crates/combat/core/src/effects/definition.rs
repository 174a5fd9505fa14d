//! Externally authored effect definitions.
//!
//! Definitions are immutable once loaded. Active instances share them via
//! `Arc` and never copy the modifier list.

use std::fmt;

use crate::stats::{Attribute, StatModifier};

/// Identifier of an [`EffectDefinition`]. Two applications "stack" when
/// they carry the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// How long an effect lasts once applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationKind {
    /// Expires after `duration` ticks of its holder's turn start.
    Rounds,
    /// Never expires on its own.
    Permanent,
}

/// What happens when an already-active effect is applied again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Re-application is ignored.
    None,
    /// Remaining duration resets to full; stack count unchanged.
    RefreshDuration,
    /// Each application creates an independent instance.
    AddNewInstance,
    /// Stack count increments (capped) and duration always resets to full.
    IncreaseStacks,
}

/// Direction of a periodic vitality change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeriodicKind {
    Damage,
    Heal,
}

/// Caster attribute scaling for a periodic action.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingSpec {
    /// Caster attribute captured when the effect is applied.
    pub stat: Attribute,
    pub factor: f64,
}

/// Damage or healing applied at each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicAction {
    pub kind: PeriodicKind,
    pub base_power: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: Option<ScalingSpec>,
}

impl PeriodicAction {
    /// Per-stack power given the snapshotted caster stat.
    ///
    /// `base_power + floor(snapshot × factor)` when scaling is enabled.
    pub fn power_per_stack(&self, snapshot: i32) -> i32 {
        let scaled = self
            .scaling
            .map(|scaling| (f64::from(snapshot) * scaling.factor).floor() as i32)
            .unwrap_or(0);
        self.base_power.saturating_add(scaled)
    }
}

/// Immutable description of a status effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub id: EffectId,
    pub name: String,
    pub duration_kind: DurationKind,
    /// Number of ticks for [`DurationKind::Rounds`]; ignored when permanent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: u32,
    #[cfg_attr(feature = "serde", serde(default = "EffectDefinition::default_max_stacks"))]
    pub max_stacks: u32,
    pub stacking: StackingPolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<StatModifier>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub periodic: Option<PeriodicAction>,
}

impl EffectDefinition {
    /// A one-stack, non-stacking effect lasting `duration` rounds with no modifiers.
    pub fn new(id: EffectId, name: impl Into<String>, duration: u32) -> Self {
        Self {
            id,
            name: name.into(),
            duration_kind: DurationKind::Rounds,
            duration,
            max_stacks: 1,
            stacking: StackingPolicy::None,
            modifiers: Vec::new(),
            periodic: None,
        }
    }

    pub fn permanent(mut self) -> Self {
        self.duration_kind = DurationKind::Permanent;
        self
    }

    pub fn with_stacking(mut self, stacking: StackingPolicy, max_stacks: u32) -> Self {
        self.stacking = stacking;
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_periodic(mut self, periodic: PeriodicAction) -> Self {
        self.periodic = Some(periodic);
        self
    }

    /// Stack cap, never below 1.
    pub fn stack_cap(&self) -> u32 {
        self.max_stacks.max(1)
    }

    #[cfg(feature = "serde")]
    fn default_max_stacks() -> u32 {
        1
    }
}
