use crate::env::{AbilityId, ItemId};
use crate::state::{Position, UnitId};

/// Category of a command, used for cost lookup and event reporting.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    UseAbility,
    UseItem,
    Wait,
}

/// A decision made by the active unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCommand {
    Move { to: Position },
    Attack { target: UnitId },
    UseAbility { ability: AbilityId, target: UnitId },
    UseItem { item: ItemId, target: UnitId },
    /// Ends the turn after paying the wait cost.
    Wait,
}

impl ActionCommand {
    pub const fn kind(&self) -> ActionKind {
        match self {
            ActionCommand::Move { .. } => ActionKind::Move,
            ActionCommand::Attack { .. } => ActionKind::Attack,
            ActionCommand::UseAbility { .. } => ActionKind::UseAbility,
            ActionCommand::UseItem { .. } => ActionKind::UseItem,
            ActionCommand::Wait => ActionKind::Wait,
        }
    }

    /// Unit targeted by the command, if any.
    pub const fn target(&self) -> Option<UnitId> {
        match self {
            ActionCommand::Attack { target }
            | ActionCommand::UseAbility { target, .. }
            | ActionCommand::UseItem { target, .. } => Some(*target),
            ActionCommand::Move { .. } | ActionCommand::Wait => None,
        }
    }
}
