//! Combat result types.

use super::damage::DamageKind;

/// Outcome of an attack or offensive ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Miss,
    Hit,
    Critical,
}

impl AttackOutcome {
    pub fn connected(self) -> bool {
        !matches!(self, AttackOutcome::Miss)
    }
}

/// Result of a full hit → crit → damage resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub outcome: AttackOutcome,
    pub kind: DamageKind,
    /// Damage after mitigation; 0 on a miss.
    pub damage: i32,
}

impl AttackResult {
    pub const fn miss(kind: DamageKind) -> Self {
        Self {
            outcome: AttackOutcome::Miss,
            kind,
            damage: 0,
        }
    }
}
