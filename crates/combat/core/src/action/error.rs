//! Action validation errors.

use crate::env::{AbilityId, ItemId, OracleError};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{Position, UnitId};
use crate::stats::ResourceKind;
use crate::turn::TurnError;

/// Reasons a command is rejected. Rejection always happens before any
/// state is mutated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unit {0} is dead")]
    UnitDead(UnitId),

    #[error("{unit} is not the active unit (active: {active:?})")]
    NotActiveUnit {
        unit: UnitId,
        active: Option<UnitId>,
    },

    #[error("need {required} action points, have {available}")]
    InsufficientActionPoints { required: u32, available: i32 },

    #[error("need {required} {resource}, have {available}")]
    InsufficientResource {
        resource: ResourceKind,
        required: u32,
        available: i32,
    },

    #[error("target {0} not found")]
    TargetNotFound(UnitId),

    #[error("{target} is not a valid target for {unit}")]
    InvalidTarget { unit: UnitId, target: UnitId },

    #[error("target at distance {distance} is beyond range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("no path to {0:?}")]
    NoPath(Position),

    #[error("position {0:?} is occupied")]
    Occupied(Position),

    #[error("{unit} does not know {ability}")]
    AbilityNotKnown { unit: UnitId, ability: AbilityId },

    #[error("{unit} does not carry {item}")]
    ItemNotCarried { unit: UnitId, item: ItemId },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            InsufficientActionPoints { .. }
            | InsufficientResource { .. }
            | OutOfRange { .. }
            | NoPath(_)
            | Occupied(_) => ErrorSeverity::Recoverable,

            UnitNotFound(_)
            | UnitDead(_)
            | NotActiveUnit { .. }
            | TargetNotFound(_)
            | InvalidTarget { .. }
            | AbilityNotKnown { .. }
            | ItemNotCarried { .. } => ErrorSeverity::Validation,

            Oracle(error) => error.severity(),
            Turn(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            UnitNotFound(_) => "ACTION_UNIT_NOT_FOUND",
            UnitDead(_) => "ACTION_UNIT_DEAD",
            NotActiveUnit { .. } => "ACTION_NOT_ACTIVE_UNIT",
            InsufficientActionPoints { .. } => "ACTION_INSUFFICIENT_AP",
            InsufficientResource { .. } => "ACTION_INSUFFICIENT_RESOURCE",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            NoPath(_) => "ACTION_NO_PATH",
            Occupied(_) => "ACTION_OCCUPIED",
            AbilityNotKnown { .. } => "ACTION_ABILITY_NOT_KNOWN",
            ItemNotCarried { .. } => "ACTION_ITEM_NOT_CARRIED",
            Oracle(error) => error.error_code(),
            Turn(error) => error.error_code(),
        }
    }
}
