//! Async driver for deterministic combat encounters.
//!
//! This crate wires the action provider abstraction, oracle access and a
//! simulation worker into a cohesive runtime API. Consumers embed
//! [`Runtime`] to drive turns, subscribe to events, and query the encounter
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] bundles grid, path, definition and dice oracles
//! - [`workers`] keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod logging;
pub mod oracle;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, NearestEnemyProvider, Result, RuntimeError, RuntimeHandle,
    ScriptedActionProvider, TurnPreparation, WaitActionProvider,
};
pub use events::{Event, EventBus, Topic};
pub use logging::init_tracing;
pub use oracle::{GridError, GridMap, OracleManager};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
