use std::collections::BTreeSet;

use crate::state::{Position, UnitId};

/// Read-only battlefield geometry.
pub trait GridOracle: Send + Sync {
    /// Defense bonus granted to a unit standing on `position`.
    fn cover_bonus(&self, position: Position) -> i32;

    fn manhattan_distance(&self, a: Position, b: Position) -> u32 {
        a.manhattan(b)
    }

    /// Whether `position` is blocked for movement (terrain or a unit).
    fn is_occupied(&self, position: Position) -> bool;
}

/// Pathfinding is an external collaborator; the engine only consumes paths.
pub trait PathOracle: Send + Sync {
    /// Tiles from `start` (exclusive) to `end` (inclusive), or `None` when
    /// unreachable. An empty path means `start == end`.
    fn find_path(&self, start: Position, end: Position, mover: UnitId) -> Option<Vec<Position>>;

    /// Every tile reachable from `origin` within `budget` steps, excluding `origin`.
    fn reachable_tiles(&self, origin: Position, budget: u32) -> BTreeSet<Position>;
}

/// Grid with no cover and nothing blocking.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenGrid;

impl GridOracle for OpenGrid {
    fn cover_bonus(&self, _position: Position) -> i32 {
        0
    }

    fn is_occupied(&self, _position: Position) -> bool {
        false
    }
}
