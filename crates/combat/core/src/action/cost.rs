//! Action economy.
//!
//! Every command has a cost: action points plus optional debits from the
//! other pools. The gate checks the whole cost before touching anything and
//! then debits every pool in one step.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::env::{AbilityDefinition, ItemDefinition, ResourceCost};
use crate::state::Unit;
use crate::stats::ResourceKind;
use crate::turn::TurnScheduler;

use super::error::ActionError;

/// Non-action-point pools a cost can draw from.
const SECONDARY_POOLS: usize = ResourceKind::COUNT - 1;

/// Full price of one command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCost {
    pub action_points: u32,
    /// At most one entry per pool; never contains `ActionPoints`.
    pub resources: ArrayVec<ResourceCost, SECONDARY_POOLS>,
}

impl ActionCost {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn action_points(action_points: u32) -> Self {
        Self {
            action_points,
            ..Self::default()
        }
    }

    /// Adds `amount` of `resource`, merging with an existing entry.
    pub fn with_resource(mut self, resource: ResourceKind, amount: u32) -> Self {
        if resource == ResourceKind::ActionPoints {
            self.action_points = self.action_points.saturating_add(amount);
            return self;
        }
        match self.resources.iter_mut().find(|cost| cost.resource == resource) {
            Some(existing) => existing.amount = existing.amount.saturating_add(amount),
            None => {
                if self.resources.try_push(ResourceCost::new(resource, amount)).is_err() {
                    tracing::error!(target: "combat::action", %resource, "cost table full");
                }
            }
        }
        self
    }

    /// `move_cost_per_tile × path length`
    pub fn for_move(path_length: usize, config: &CombatConfig) -> Self {
        let tiles = u32::try_from(path_length).unwrap_or(u32::MAX);
        Self::action_points(config.move_cost_per_tile.saturating_mul(tiles))
    }

    /// Weapon attack cost, or the unarmed cost without a weapon.
    pub fn for_attack(attacker: &Unit, config: &CombatConfig) -> Self {
        let cost = attacker
            .loadout
            .weapon
            .as_ref()
            .map_or(config.unarmed_attack_cost, |weapon| weapon.attack_cost);
        Self::action_points(cost)
    }

    pub fn for_ability(ability: &AbilityDefinition) -> Self {
        ability
            .resource_costs
            .iter()
            .fold(Self::action_points(ability.action_points), |cost, extra| {
                cost.with_resource(extra.resource, extra.amount)
            })
    }

    pub fn for_item(item: &ItemDefinition) -> Self {
        Self::action_points(item.action_points)
    }

    pub fn for_wait(config: &CombatConfig) -> Self {
        Self::action_points(config.wait_cost)
    }
}

/// Checks `cost` against `unit` and reports the first shortfall.
///
/// Vitality costs must leave at least 1 vitality behind.
///
/// # Errors
///
/// Returns the reason `unit` cannot pay.
pub fn check_affordable(unit: &Unit, cost: &ActionCost) -> Result<(), ActionError> {
    if !unit.is_alive() {
        return Err(ActionError::UnitDead(unit.id));
    }

    let available = unit.current(ResourceKind::ActionPoints);
    if i64::from(available) < i64::from(cost.action_points) {
        return Err(ActionError::InsufficientActionPoints {
            required: cost.action_points,
            available,
        });
    }

    for extra in &cost.resources {
        let available = unit.current(extra.resource);
        let required = i64::from(extra.amount);
        let affordable = if extra.resource == ResourceKind::Vitality {
            i64::from(available) - required >= 1
        } else {
            i64::from(available) >= required
        };
        if !affordable {
            return Err(ActionError::InsufficientResource {
                resource: extra.resource,
                required: extra.amount,
                available,
            });
        }
    }
    Ok(())
}

/// Whether `unit` is alive and can pay `cost` in full.
pub fn can_afford(unit: &Unit, cost: &ActionCost) -> bool {
    check_affordable(unit, cost).is_ok()
}

/// Debits `cost` from the active unit, all pools or none.
///
/// # Errors
///
/// Returns [`ActionError::NotActiveUnit`] when `unit` is not acting, or the
/// affordability shortfall. Nothing is debited on error.
pub fn spend(
    scheduler: &TurnScheduler,
    unit: &mut Unit,
    cost: &ActionCost,
) -> Result<(), ActionError> {
    if !scheduler.is_active(unit.id) {
        return Err(ActionError::NotActiveUnit {
            unit: unit.id,
            active: scheduler.active_unit(),
        });
    }
    check_affordable(unit, cost)?;

    unit.debit(ResourceKind::ActionPoints, cost.action_points);
    for extra in &cost.resources {
        unit.debit(extra.resource, extra.amount);
    }
    tracing::debug!(
        target: "combat::action",
        unit = %unit.id,
        action_points = cost.action_points,
        extra = cost.resources.len(),
        "cost paid"
    );
    Ok(())
}
