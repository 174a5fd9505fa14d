use crate::error::{ErrorSeverity, GameError};
use crate::state::{Position, UnitId};

/// Roster setup errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    #[error("unit {0} is already in the encounter")]
    DuplicateUnit(UnitId),

    #[error("position {0:?} is already taken by a living unit")]
    PositionTaken(Position),
}

impl GameError for EncounterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            EncounterError::DuplicateUnit(_) => "ENCOUNTER_DUPLICATE_UNIT",
            EncounterError::PositionTaken(_) => "ENCOUNTER_POSITION_TAKEN",
        }
    }
}
