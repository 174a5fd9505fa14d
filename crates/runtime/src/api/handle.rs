//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the encounter, issuing commands or streaming events from
//! specific topics.
use std::collections::{BTreeSet, HashMap};

use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    ActionCommand, ActionReport, Encounter, EncounterOutcome, Position, UnitId, UnitSpec, UnitView,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// What the worker found when asked for the next turn.
#[derive(Clone, Debug)]
pub enum TurnPreparation {
    /// `unit` is active; `encounter` is a snapshot taken after its
    /// turn-start effects ran.
    Ready {
        unit: UnitId,
        encounter: Box<Encounter>,
    },
    Finished(EncounterOutcome),
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advances the scheduler until a unit becomes active or the encounter
    /// ends. Units killed by their own turn-start effects are skipped.
    pub async fn prepare_next_turn(&self) -> Result<TurnPreparation> {
        self.request(|reply| Command::PrepareNextTurn { reply })
            .await?
    }

    /// Performs `command` for the active `unit`.
    ///
    /// A rejected command leaves the encounter untouched and is also
    /// published on [`Topic::Command`].
    pub async fn perform(&self, unit: UnitId, command: ActionCommand) -> Result<ActionReport> {
        self.request(|reply| Command::Perform {
            unit,
            command,
            reply,
        })
        .await?
    }

    pub async fn end_turn(&self, unit: UnitId) -> Result<()> {
        self.request(|reply| Command::EndTurn { unit, reply })
            .await?
    }

    /// Adds a unit mid-encounter (reinforcements, summons).
    pub async fn spawn(&self, spec: UnitSpec) -> Result<UnitId> {
        self.request(|reply| Command::Spawn {
            spec: Box::new(spec),
            reply,
        })
        .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Attacks, abilities, effects, defeats
    /// - `Topic::Turn` - Turn start/end and the final outcome
    /// - `Topic::Command` - Rejected commands
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Read-only snapshot of the whole encounter.
    pub async fn query_encounter(&self) -> Result<Box<Encounter>> {
        self.request(|reply| Command::QueryEncounter { reply }).await
    }

    pub async fn outcome(&self) -> Result<EncounterOutcome> {
        self.request(|reply| Command::QueryOutcome { reply }).await
    }

    pub async fn unit_view(&self, unit: UnitId) -> Result<Option<UnitView>> {
        self.request(|reply| Command::QueryUnit { unit, reply })
            .await
    }

    /// Tiles `unit` could move to with its action points.
    pub async fn movement_range(&self, unit: UnitId) -> Result<BTreeSet<Position>> {
        self.request(|reply| Command::MovementRange { unit, reply })
            .await?
    }

    pub async fn attack_range(&self, unit: UnitId) -> Result<BTreeSet<Position>> {
        self.request(|reply| Command::AttackRange { unit, reply })
            .await?
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
