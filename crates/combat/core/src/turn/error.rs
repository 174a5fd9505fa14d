use crate::error::{ErrorSeverity, GameError};
use crate::state::UnitId;

/// Scheduler misuse. The scheduler state is unchanged whenever one of these
/// is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("tick ignored: {0} is still acting")]
    UnitActive(UnitId),

    #[error("{requested} is not the active unit (active: {active:?})")]
    NotActiveUnit {
        requested: UnitId,
        active: Option<UnitId>,
    },
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            TurnError::UnitActive(_) => "TURN_UNIT_ACTIVE",
            TurnError::NotActiveUnit { .. } => "TURN_NOT_ACTIVE_UNIT",
        }
    }
}
