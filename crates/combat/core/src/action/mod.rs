//! Commands and the action economy gate.
mod cost;
mod error;
mod kind;

pub use cost::{ActionCost, can_afford, check_affordable, spend};
pub use error::ActionError;
pub use kind::{ActionCommand, ActionKind};
