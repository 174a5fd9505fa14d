//! Combat resolution.
//!
//! Hit, crit and damage arithmetic over effective unit stats. Nothing here
//! mutates a unit; callers apply the returned amounts through the resource
//! model.
//!
//! # Core Functions
//!
//! - `CombatResolver::resolve_hit` / `resolve_ability_hit`: clamped d100 checks
//! - `CombatResolver::check_critical_hit` / `check_magical_critical_hit`
//! - `CombatResolver::calculate_physical_damage` / `calculate_magical_damage`
//! - `CombatResolver::calculate_healing`

pub mod critical;
pub mod damage;
pub mod hit;
mod resolver;
pub mod result;

pub use critical::{crit_chance, magical_crit_chance, physical_crit_chance};
pub use damage::{DamageKind, mitigate, outgoing_damage, reduction_fraction};
pub use hit::{hit_chance, roll_hits};
pub use resolver::CombatResolver;
pub use result::{AttackOutcome, AttackResult};
