//! Simulation worker that owns the authoritative [`Encounter`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! against the encounter with the oracle [`Env`](combat_core::Env), and
//! publishes the resulting events to the EventBus.

use std::collections::BTreeSet;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use combat_core::{
    ActionCommand, ActionReport, Encounter, EncounterOutcome, GameError, Position, StepOutcome,
    UnitId, UnitSpec, UnitView,
};

use crate::api::{Result, RuntimeError, TurnPreparation};
use crate::events::{Event, EventBus};
use crate::oracle::OracleManager;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Tick the scheduler until a unit is ready or the encounter is over.
    PrepareNextTurn {
        reply: oneshot::Sender<Result<TurnPreparation>>,
    },
    /// Perform a command for the active unit.
    Perform {
        unit: UnitId,
        command: ActionCommand,
        reply: oneshot::Sender<Result<ActionReport>>,
    },
    EndTurn {
        unit: UnitId,
        reply: oneshot::Sender<Result<()>>,
    },
    Spawn {
        spec: Box<UnitSpec>,
        reply: oneshot::Sender<Result<UnitId>>,
    },
    QueryEncounter {
        reply: oneshot::Sender<Box<Encounter>>,
    },
    QueryOutcome {
        reply: oneshot::Sender<EncounterOutcome>,
    },
    QueryUnit {
        unit: UnitId,
        reply: oneshot::Sender<Option<UnitView>>,
    },
    MovementRange {
        unit: UnitId,
        reply: oneshot::Sender<Result<BTreeSet<Position>>>,
    },
    AttackRange {
        unit: UnitId,
        reply: oneshot::Sender<Result<BTreeSet<Position>>>,
    },
}

/// Background task that processes combat commands.
///
/// The worker never decides what a unit does; provider orchestration lives
/// in [`Runtime`](crate::Runtime).
pub struct SimulationWorker {
    encounter: Encounter,
    oracles: OracleManager,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    max_idle_ticks: u64,
    finished: bool,
}

impl SimulationWorker {
    pub fn new(
        encounter: Encounter,
        oracles: OracleManager,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        max_idle_ticks: u64,
    ) -> Self {
        info!(
            target: "runtime::worker",
            units = encounter.roster().len(),
            seed = encounter.seed(),
            "simulation worker initialized"
        );

        Self {
            encounter,
            oracles,
            command_rx,
            event_bus,
            max_idle_ticks,
            finished: false,
        }
    }

    /// Main worker loop; ends once every handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
        debug!(target: "runtime::worker", "command channel closed, worker stopping");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::PrepareNextTurn { reply } => {
                let result = self.handle_turn_preparation();
                respond(reply, result, "PrepareNextTurn");
            }
            Command::Perform {
                unit,
                command,
                reply,
            } => {
                let result = self.handle_perform(unit, command);
                respond(reply, result, "Perform");
            }
            Command::EndTurn { unit, reply } => {
                let result = self.handle_end_turn(unit);
                respond(reply, result, "EndTurn");
            }
            Command::Spawn { spec, reply } => {
                let result = self.encounter.spawn(*spec).map_err(RuntimeError::from);
                if let Ok(unit) = &result {
                    info!(target: "runtime::worker", %unit, "unit joined the encounter");
                }
                respond(reply, result, "Spawn");
            }
            Command::QueryEncounter { reply } => {
                respond(reply, Box::new(self.encounter.clone()), "QueryEncounter");
            }
            Command::QueryOutcome { reply } => {
                respond(reply, self.encounter.outcome(), "QueryOutcome");
            }
            Command::QueryUnit { unit, reply } => {
                respond(reply, self.encounter.unit_view(unit), "QueryUnit");
            }
            Command::MovementRange { unit, reply } => {
                let env = self.oracles.as_env();
                let result = self
                    .encounter
                    .movement_range(unit, &env)
                    .map_err(RuntimeError::from);
                respond(reply, result, "MovementRange");
            }
            Command::AttackRange { unit, reply } => {
                let result = self.encounter.attack_range(unit).map_err(RuntimeError::from);
                respond(reply, result, "AttackRange");
            }
        }
    }

    /// Steps the encounter until a turn starts.
    ///
    /// Gives up after `max_idle_ticks` consecutive ticks in which nobody
    /// became ready, which only happens when every living unit has no speed.
    fn handle_turn_preparation(&mut self) -> Result<TurnPreparation> {
        let mut idle = 0u64;
        loop {
            match self.encounter.step() {
                StepOutcome::Waiting => {
                    idle += 1;
                    if idle >= self.max_idle_ticks {
                        warn!(target: "runtime::worker", ticks = idle, "no unit became ready");
                        return Err(RuntimeError::Stalled { ticks: idle });
                    }
                }
                StepOutcome::TurnStarted { unit, events } => {
                    self.event_bus.publish_all(events);
                    debug!(
                        target: "runtime::worker",
                        %unit,
                        elapsed = %self.encounter.elapsed(),
                        "turn prepared"
                    );
                    return Ok(self.ready(unit));
                }
                StepOutcome::TurnSkipped { unit, events } => {
                    self.event_bus.publish_all(events);
                    debug!(target: "runtime::worker", %unit, "unit fell at turn start");
                    idle = 0;
                    if let Some(outcome) = self.publish_outcome() {
                        return Ok(TurnPreparation::Finished(outcome));
                    }
                }
                StepOutcome::Busy(unit) => {
                    debug!(target: "runtime::worker", %unit, "turn already in progress");
                    return Ok(self.ready(unit));
                }
                StepOutcome::Finished(outcome) => {
                    self.publish_outcome();
                    return Ok(TurnPreparation::Finished(outcome));
                }
            }
        }
    }

    fn ready(&self, unit: UnitId) -> TurnPreparation {
        TurnPreparation::Ready {
            unit,
            encounter: Box::new(self.encounter.clone()),
        }
    }

    fn handle_perform(&mut self, unit: UnitId, command: ActionCommand) -> Result<ActionReport> {
        let env = self.oracles.as_env();
        match self.encounter.perform(unit, command, &env) {
            Ok(report) => {
                self.event_bus.publish_all(report.events.iter().cloned());
                self.publish_outcome();
                Ok(report)
            }
            Err(error) => {
                if error.severity().is_internal() {
                    warn!(
                        target: "runtime::worker",
                        %unit,
                        command = %command.kind(),
                        code = error.error_code(),
                        %error,
                        "command failed"
                    );
                } else {
                    debug!(
                        target: "runtime::worker",
                        %unit,
                        command = %command.kind(),
                        code = error.error_code(),
                        %error,
                        "command rejected"
                    );
                }
                self.event_bus.publish(Event::rejected(unit, command, &error));
                Err(error.into())
            }
        }
    }

    fn handle_end_turn(&mut self, unit: UnitId) -> Result<()> {
        let events = self.encounter.end_turn(unit)?;
        self.event_bus.publish_all(events);
        Ok(())
    }

    /// Publishes the final outcome the first time it is reached.
    fn publish_outcome(&mut self) -> Option<EncounterOutcome> {
        let outcome = self.encounter.outcome();
        if !outcome.is_finished() {
            return None;
        }
        if !self.finished {
            self.finished = true;
            info!(target: "runtime::worker", ?outcome, "encounter finished");
            self.event_bus.publish(Event::Finished(outcome));
        }
        Some(outcome)
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::worker", command, "reply channel closed (caller dropped)");
    }
}
