//! Initiative scheduling.
//!
//! ```text
//!   Idle ──tick (someone ≥ threshold)──▶ UnitActive(unit)
//!    ▲                                        │
//!    └──────── end_unit_turn / unregister ────┘
//! ```
mod error;
mod scheduler;

pub use error::TurnError;
pub use scheduler::{SchedulerPhase, TurnScheduler};
