//! Status effects.
//!
//! ```text
//! EffectDefinition (authored, shared via Arc)
//!      ↓ apply_effect (stacking policy)
//! ActiveEffectInstance (per unit, ordered)
//!      ↓ tick_effects (holder's turn start)
//! periodic vitality change → duration countdown → expiry
//! ```
mod definition;
mod instance;
mod lifecycle;

pub use definition::{
    DurationKind, EffectDefinition, EffectId, PeriodicAction, PeriodicKind, ScalingSpec,
    StackingPolicy,
};
pub use instance::{ActiveEffectInstance, EffectDuration};
pub use lifecycle::{
    ApplyOutcome, CasterSnapshot, EffectTick, apply_effect, clear_effects, remove_effect,
    tick_effects,
};
