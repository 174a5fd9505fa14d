//! Stat system.
//!
//! # Architecture
//!
//! ```text
//! [ Archetypes (race + class) ]  computed once at spawn
//!      ↓
//! [ Primary attributes ]         stored base values
//!      ↓
//! [ Modifier evaluator ]         Flat → PercentAdd → PercentMult
//!      ↓
//! [ Resource maximums / speed ]  derived, evaluated again against their own StatId
//! ```
//!
//! ## Principles
//!
//! 1. **Stored state is minimal**: base attributes, pool contributions, current values
//! 2. **Never cached**: every effective value is recomputed from base + active effects
//! 3. **Deterministic**: pure functions, no I/O or randomness

pub mod archetype;
pub mod attributes;
pub mod modifiers;
pub mod resources;

pub use archetype::{ArchetypeBase, ArchetypeContribution, ClassArchetype, RaceArchetype};
pub use attributes::{Attribute, PrimaryAttributes, StatId};
pub use modifiers::{ModifierPhase, StatModifier, evaluate, evaluate_modifiers};
pub use resources::{ResourceKind, ResourcePool, ResourcePools, ResourceValues};
