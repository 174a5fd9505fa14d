//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the encounter.

use std::collections::BTreeMap;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use combat_content::Scenario;
use combat_core::{ActionCommand, ActionError, CombatConfig, Encounter, EncounterOutcome, TeamId, UnitId};

use crate::api::{ActionProvider, Result, RuntimeError, RuntimeHandle, TurnPreparation};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::OracleManager;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Consecutive empty scheduler ticks before preparation gives up.
    pub max_idle_ticks: u64,
    /// Commands a provider may issue in one turn before it is ended for it.
    pub max_actions_per_turn: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
            command_buffer_size: 32,
            max_idle_ticks: 10_000,
            max_actions_per_turn: 32,
        }
    }
}

/// Main runtime that orchestrates an encounter
///
/// Runtime owns the worker and decides who acts; [`RuntimeHandle`] provides
/// a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    config: RuntimeConfig,

    // Action providers (injected by user)
    providers: BTreeMap<TeamId, Box<dyn ActionProvider>>,
    default_provider: Option<Box<dyn ActionProvider>>,

    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Runs one full turn: prepares it, then asks the team's provider for
    /// commands until the turn ends.
    ///
    /// A rejected command is replaced by Wait so a confused provider cannot
    /// stall the encounter. Returns the outcome after the turn.
    pub async fn step(&mut self) -> Result<EncounterOutcome> {
        let (unit, mut encounter) = match self.handle.prepare_next_turn().await? {
            TurnPreparation::Finished(outcome) => return Ok(outcome),
            TurnPreparation::Ready { unit, encounter } => (unit, encounter),
        };
        let team = encounter
            .unit(unit)
            .map(|actor| actor.team)
            .ok_or(ActionError::UnitNotFound(unit))?;
        let provider = self.provider_for(team)?;

        for _ in 0..self.config.max_actions_per_turn {
            let command = provider.provide_action(unit, &encounter).await?;
            let report = match self.handle.perform(unit, command).await {
                Ok(report) => report,
                Err(RuntimeError::Action(error)) => {
                    debug!(target: "runtime", %unit, %error, "command rejected, yielding turn");
                    self.yield_turn(unit).await?;
                    return self.handle.outcome().await;
                }
                Err(error) => return Err(error),
            };
            if report.turn_ended {
                return self.handle.outcome().await;
            }

            encounter = self.handle.query_encounter().await?;
            let outcome = encounter.outcome();
            if outcome.is_finished() {
                return Ok(outcome);
            }
        }

        warn!(
            target: "runtime",
            %unit,
            limit = self.config.max_actions_per_turn,
            "action limit reached, ending turn"
        );
        self.handle.end_turn(unit).await?;
        self.handle.outcome().await
    }

    /// Steps until the encounter is decided.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::TurnLimit`] if it is still ongoing after
    /// `max_turns` turns.
    pub async fn run_until_finished(&mut self, max_turns: u32) -> Result<EncounterOutcome> {
        for _ in 0..max_turns {
            let outcome = self.step().await?;
            if outcome.is_finished() {
                return Ok(outcome);
            }
        }
        Err(RuntimeError::TurnLimit { turns: max_turns })
    }

    /// Wait, or end the turn outright if even waiting is unaffordable.
    async fn yield_turn(&self, unit: UnitId) -> Result<()> {
        match self.handle.perform(unit, ActionCommand::Wait).await {
            Ok(_) => Ok(()),
            Err(RuntimeError::Action(_)) => self.handle.end_turn(unit).await,
            Err(error) => Err(error),
        }
    }

    fn provider_for(&self, team: TeamId) -> Result<&dyn ActionProvider> {
        self.providers
            .get(&team)
            .or(self.default_provider.as_ref())
            .map(Box::as_ref)
            .ok_or(RuntimeError::ProviderNotSet { team })
    }

    /// Set the action provider for one team
    pub fn set_provider(&mut self, team: TeamId, provider: impl ActionProvider + 'static) {
        self.providers.insert(team, Box::new(provider));
    }

    /// Set the provider used by teams without their own
    pub fn set_default_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.default_provider = Some(Box::new(provider));
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    encounter: Option<Encounter>,
    scenario: Option<(CombatConfig, Scenario)>,
    oracles: Option<OracleManager>,
    providers: BTreeMap<TeamId, Box<dyn ActionProvider>>,
    default_provider: Option<Box<dyn ActionProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            encounter: None,
            scenario: None,
            oracles: None,
            providers: BTreeMap::new(),
            default_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive an already populated encounter
    pub fn encounter(mut self, encounter: Encounter) -> Self {
        self.encounter = Some(encounter);
        self
    }

    /// Build the encounter from a resolved scenario. Ignored when an
    /// encounter was supplied directly.
    pub fn scenario(mut self, config: CombatConfig, scenario: Scenario) -> Self {
        self.scenario = Some((config, scenario));
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn provider(mut self, team: TeamId, provider: impl ActionProvider + 'static) -> Self {
        self.providers.insert(team, Box::new(provider));
        self
    }

    pub fn default_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.default_provider = Some(Box::new(provider));
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;

        let encounter = match (self.encounter, self.scenario) {
            (Some(encounter), _) => encounter,
            (None, Some((config, scenario))) => {
                let mut encounter = Encounter::new(config, scenario.seed);
                for spec in scenario.units {
                    encounter.spawn(spec)?;
                }
                encounter
            }
            (None, None) => return Err(RuntimeError::MissingEncounter),
        };
        info!(
            target: "runtime",
            units = encounter.roster().len(),
            seed = encounter.seed(),
            "starting encounter"
        );

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            encounter,
            oracles,
            command_rx,
            event_bus,
            self.config.max_idle_ticks,
        );
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            config: self.config,
            providers: self.providers,
            default_provider: self.default_provider,
            sim_worker_handle,
        })
    }
}
