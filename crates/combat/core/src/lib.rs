//! Deterministic combat rules for a grid-based tactical game.
//!
//! `combat-core` defines the canonical combat arithmetic (stat modifiers,
//! resources, status effects, hit and damage resolution) together with the
//! initiative scheduler and the action economy. All state mutation for a
//! single fight flows through [`encounter::Encounter`]; the runtime and
//! content crates depend on the types re-exported here.
//!
//! Nothing in this crate reads the wall clock or a global: an encounter only
//! advances when its stepper calls [`encounter::Encounter::step`].
pub mod action;
pub mod combat;
pub mod config;
pub mod effects;
pub mod encounter;
pub mod env;
pub mod error;
pub mod state;
pub mod stats;
pub mod turn;

pub use action::{
    ActionCommand, ActionCost, ActionError, ActionKind, can_afford, check_affordable, spend,
};
pub use combat::{AttackOutcome, AttackResult, CombatResolver, DamageKind};
pub use config::CombatConfig;
pub use effects::{
    ActiveEffectInstance, ApplyOutcome, CasterSnapshot, DurationKind, EffectDefinition,
    EffectDuration, EffectId, EffectTick, PeriodicAction, PeriodicKind, ScalingSpec,
    StackingPolicy, apply_effect, clear_effects, remove_effect, tick_effects,
};
pub use encounter::{
    ActionReport, CombatEvent, EffectView, Encounter, EncounterError, EncounterOutcome,
    ResourceView, StepOutcome, UnitView,
};
pub use env::{
    AbilityDefinition, AbilityId, AbilityKind, ArmorDefinition, ArmorId, DefinitionOracle, Env,
    GridOracle, ItemDefinition, ItemEffect, ItemId, OpenGrid, OracleError, PathOracle, PcgRng,
    ResourceCost, RngOracle, RollStream, TargetFlags, WeaponDefinition, WeaponId, compute_seed,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{Loadout, Position, Roster, TeamId, Tick, Unit, UnitId, UnitSpec};
pub use stats::{
    ArchetypeContribution, Attribute, ClassArchetype, ModifierPhase, PrimaryAttributes,
    RaceArchetype, ResourceKind, ResourcePool, ResourcePools, ResourceValues, StatId,
    StatModifier, evaluate,
};
pub use turn::{SchedulerPhase, TurnError, TurnScheduler};
