//! Oracle access errors.

use crate::effects::EffectId;
use crate::error::{ErrorSeverity, GameError};

use super::definitions::{AbilityId, ArmorId, ItemId, WeaponId};

/// A required oracle was missing from the [`Env`](super::Env) or a definition
/// lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("GridOracle not available")]
    GridNotAvailable,

    #[error("PathOracle not available")]
    PathsNotAvailable,

    #[error("DefinitionOracle not available")]
    DefinitionsNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("effect definition {0} not found")]
    EffectNotFound(EffectId),

    #[error("ability definition {0} not found")]
    AbilityNotFound(AbilityId),

    #[error("weapon definition {0} not found")]
    WeaponNotFound(WeaponId),

    #[error("armor definition {0} not found")]
    ArmorNotFound(ArmorId),

    #[error("item definition {0} not found")]
    ItemNotFound(ItemId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            GridNotAvailable | PathsNotAvailable | DefinitionsNotAvailable | RngNotAvailable => {
                ErrorSeverity::Internal
            }
            EffectNotFound(_)
            | AbilityNotFound(_)
            | WeaponNotFound(_)
            | ArmorNotFound(_)
            | ItemNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            GridNotAvailable => "ORACLE_GRID_NOT_AVAILABLE",
            PathsNotAvailable => "ORACLE_PATHS_NOT_AVAILABLE",
            DefinitionsNotAvailable => "ORACLE_DEFINITIONS_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            EffectNotFound(_) => "ORACLE_EFFECT_NOT_FOUND",
            AbilityNotFound(_) => "ORACLE_ABILITY_NOT_FOUND",
            WeaponNotFound(_) => "ORACLE_WEAPON_NOT_FOUND",
            ArmorNotFound(_) => "ORACLE_ARMOR_NOT_FOUND",
            ItemNotFound(_) => "ORACLE_ITEM_NOT_FOUND",
        }
    }
}
