//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, rejected commands and action
//! providers so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{ActionError, EncounterError, ErrorSeverity, GameError, TeamId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no action provider set for team {team}")]
    ProviderNotSet { team: TeamId },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("runtime requires an encounter or scenario before building")]
    MissingEncounter,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error("no unit became ready within {ticks} ticks")]
    Stalled { ticks: u64 },

    #[error("encounter still ongoing after {turns} turns")]
    TurnLimit { turns: u32 },
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Action(error) => error.severity(),
            RuntimeError::Encounter(error) => error.severity(),
            RuntimeError::ProviderNotSet { .. }
            | RuntimeError::MissingOracles
            | RuntimeError::MissingEncounter => ErrorSeverity::Validation,
            RuntimeError::TurnLimit { .. } => ErrorSeverity::Recoverable,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::Stalled { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Action(error) => error.error_code(),
            RuntimeError::Encounter(error) => error.error_code(),
            RuntimeError::ProviderNotSet { .. } => "RUNTIME_PROVIDER_NOT_SET",
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::MissingOracles => "RUNTIME_MISSING_ORACLES",
            RuntimeError::MissingEncounter => "RUNTIME_MISSING_ENCOUNTER",
            RuntimeError::Stalled { .. } => "RUNTIME_STALLED",
            RuntimeError::TurnLimit { .. } => "RUNTIME_TURN_LIMIT",
        }
    }
}
