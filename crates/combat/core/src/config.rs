/// Combat balance constants and tunable parameters.
///
/// One config is owned by each [`Encounter`](crate::encounter::Encounter);
/// nothing reads these values through a global.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Initiative accumulator value at which a unit takes its turn.
    pub initiative_threshold: u32,

    /// Lower bound of any hit chance, in percent.
    pub min_hit_chance: i32,
    /// Upper bound of any hit chance, in percent.
    pub max_hit_chance: i32,

    /// Flat critical chance before attribute contributions, in percent.
    pub base_crit_chance: i32,
    /// Damage multiplier applied by a physical critical hit.
    pub crit_multiplier: f64,
    /// Damage multiplier applied by a magical critical hit.
    pub magic_crit_multiplier: f64,

    /// `K` in `armor / (armor + K)`.
    pub mitigation_constant: f64,

    /// Accuracy used when the attacker has no weapon.
    pub unarmed_accuracy: i32,
    /// Base damage used when the attacker has no weapon.
    pub unarmed_damage: i32,
    /// Action point cost of an unarmed attack.
    pub unarmed_attack_cost: u32,
    /// Reach of an unarmed attack, in tiles.
    pub unarmed_range: u32,

    /// Action point cost per tile moved.
    pub move_cost_per_tile: u32,
    /// Action point cost of waiting.
    pub wait_cost: u32,
}

impl CombatConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_INITIATIVE_THRESHOLD: u32 = 1000;
    pub const DEFAULT_MIN_HIT_CHANCE: i32 = 5;
    pub const DEFAULT_MAX_HIT_CHANCE: i32 = 95;
    pub const DEFAULT_BASE_CRIT_CHANCE: i32 = 5;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_MITIGATION_CONSTANT: f64 = 50.0;
    pub const DEFAULT_UNARMED_DAMAGE: i32 = 1;
    pub const DEFAULT_UNARMED_ATTACK_COST: u32 = 2;

    pub fn new() -> Self {
        Self {
            initiative_threshold: Self::DEFAULT_INITIATIVE_THRESHOLD,
            min_hit_chance: Self::DEFAULT_MIN_HIT_CHANCE,
            max_hit_chance: Self::DEFAULT_MAX_HIT_CHANCE,
            base_crit_chance: Self::DEFAULT_BASE_CRIT_CHANCE,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            magic_crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            mitigation_constant: Self::DEFAULT_MITIGATION_CONSTANT,
            unarmed_accuracy: 0,
            unarmed_damage: Self::DEFAULT_UNARMED_DAMAGE,
            unarmed_attack_cost: Self::DEFAULT_UNARMED_ATTACK_COST,
            unarmed_range: 1,
            move_cost_per_tile: 1,
            wait_cost: 0,
        }
    }

    pub fn with_initiative_threshold(initiative_threshold: u32) -> Self {
        Self {
            initiative_threshold,
            ..Self::new()
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
