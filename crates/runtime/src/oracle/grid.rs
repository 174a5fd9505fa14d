//! Static battlefield layout served through [`GridOracle`] and [`PathOracle`].
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use combat_core::{GridOracle, PathOracle, Position, UnitId};

/// Defense bonus of a `+` tile in an ASCII layout.
pub const DEFAULT_COVER: i32 = 10;

/// Fixed neighbour order keeps paths reproducible.
const STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile `{glyph}` at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// Rectangular grid with impassable walls and cover tiles.
///
/// Holds terrain only. Units are tracked by the encounter, which filters
/// occupied tiles out of movement on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: u32,
    height: u32,
    walls: BTreeSet<Position>,
    cover: BTreeMap<Position, i32>,
}

impl GridMap {
    /// All floor, no cover.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: BTreeSet::new(),
            cover: BTreeMap::new(),
        }
    }

    /// Parses an ASCII layout: `.` floor, `#` wall, `+` cover. Row `y` of
    /// the slice is row `y` of the grid.
    ///
    /// # Errors
    ///
    /// Fails on an empty layout, rows of unequal width or unknown glyphs.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let expected = rows.first().ok_or(GridError::Empty)?.as_ref().chars().count();
        let mut grid = Self::open(to_u32(expected), to_u32(rows.len()));

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let position = Position::new(to_i32(x), to_i32(y));
                match glyph {
                    '.' => {}
                    '#' => {
                        grid.walls.insert(position);
                    }
                    '+' => {
                        grid.cover.insert(position, DEFAULT_COVER);
                    }
                    glyph => return Err(GridError::UnknownGlyph { glyph, x, y }),
                }
            }
        }
        Ok(grid)
    }

    pub fn with_wall(mut self, position: Position) -> Self {
        self.walls.insert(position);
        self
    }

    pub fn with_cover(mut self, position: Position, bonus: i32) -> Self {
        self.cover.insert(position, bonus);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.contains(position) && !self.walls.contains(&position)
    }

    fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        STEPS
            .iter()
            .map(move |&(dx, dy)| Position::new(position.x + dx, position.y + dy))
            .filter(|&next| self.is_walkable(next))
    }

    /// Breadth-first distances from `origin`, stopping at `budget` steps.
    fn flood(&self, origin: Position, budget: u32) -> BTreeMap<Position, (u32, Position)> {
        let mut visited = BTreeMap::new();
        let mut queue = VecDeque::from([(origin, 0u32)]);
        visited.insert(origin, (0, origin));

        while let Some((current, distance)) = queue.pop_front() {
            if distance >= budget {
                continue;
            }
            for next in self.neighbors(current) {
                if !visited.contains_key(&next) {
                    visited.insert(next, (distance + 1, current));
                    queue.push_back((next, distance + 1));
                }
            }
        }
        visited
    }
}

impl GridOracle for GridMap {
    fn cover_bonus(&self, position: Position) -> i32 {
        self.cover.get(&position).copied().unwrap_or(0)
    }

    fn is_occupied(&self, position: Position) -> bool {
        !self.is_walkable(position)
    }
}

impl PathOracle for GridMap {
    fn find_path(&self, start: Position, end: Position, mover: UnitId) -> Option<Vec<Position>> {
        if start == end {
            return Some(Vec::new());
        }
        if !self.is_walkable(end) {
            return None;
        }

        let visited = self.flood(start, u32::MAX);
        if !visited.contains_key(&end) {
            tracing::trace!(target: "runtime::oracle", %mover, ?start, ?end, "no path");
            return None;
        }

        let mut path = Vec::new();
        let mut current = end;
        while current != start {
            path.push(current);
            current = visited.get(&current)?.1;
        }
        path.reverse();
        Some(path)
    }

    fn reachable_tiles(&self, origin: Position, budget: u32) -> BTreeSet<Position> {
        self.flood(origin, budget)
            .into_keys()
            .filter(|&tile| tile != origin)
            .collect()
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
