//! Per-floor walkability grids.
//!
//! Cell value 0 is walkable, anything else is blocked. Grids are immutable
//! once built; construction rejects empty and ragged matrices.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{NavError, NavResult};

/// Integer cell coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 4-connected neighbours: down, right, up, left.
    pub fn neighbors_4(self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.x, self.y + 1),
            GridCoord::new(self.x + 1, self.y),
            GridCoord::new(self.x, self.y - 1),
            GridCoord::new(self.x - 1, self.y),
        ]
    }

    pub fn manhattan(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Cell holding a point coordinate under the configured scale.
    pub fn from_coords(x: f64, y: f64, config: &EngineConfig) -> Self {
        Self::new(config.cell_of(x), config.cell_of(y))
    }
}

/// Rectangular walkability matrix for one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i32>>", into = "Vec<Vec<i32>>")]
pub struct FloorGrid {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl FloorGrid {
    /// Build from row-major rows (`rows[y][x]`).
    pub fn from_rows(rows: &[Vec<i32>]) -> NavResult<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(NavError::MalformedGrid("grid has no rows".into()));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(NavError::MalformedGrid("grid has no columns".into()));
        }
        let mut blocked = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(NavError::MalformedGrid(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            blocked.extend(row.iter().map(|&cell| cell != 0));
        }
        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    /// Parse an ASCII picture: `#` blocked, anything else walkable.
    ///
    /// Handy for tests and fixtures; blank lines are skipped.
    pub fn from_ascii(picture: &str) -> NavResult<Self> {
        let rows: Vec<Vec<i32>> = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| i32::from(c == '#')).collect())
            .collect();
        Self::from_rows(&rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    fn index(&self, coord: GridCoord) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }

    /// Linear index of an in-bounds cell, for per-cell scratch arrays.
    pub(crate) fn cell_index(&self, coord: GridCoord) -> Option<usize> {
        self.in_bounds(coord).then(|| self.index(coord))
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Walkable means in bounds and zero.
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.in_bounds(coord) && !self.blocked[self.index(coord)]
    }

    /// Off-grid cells count as blocked.
    pub fn is_blocked(&self, coord: GridCoord) -> bool {
        !self.is_walkable(coord)
    }

    pub fn walkable_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| !b).count()
    }

    /// Nearest coordinate inside the grid.
    pub fn clamp(&self, coord: GridCoord) -> GridCoord {
        GridCoord::new(
            coord.x.clamp(0, self.width as i32 - 1),
            coord.y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Chebyshev radius of the closest blocked cell, scanning square rings
    /// outward from `coord`. Stops after `limit` rings.
    pub fn wall_distance(&self, coord: GridCoord, limit: u32) -> Option<u32> {
        for radius in 1..=limit as i32 {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    if self.is_blocked(GridCoord::new(coord.x + dx, coord.y + dy)) {
                        return Some(radius as u32);
                    }
                }
            }
        }
        None
    }

    /// Wall-proximity penalty for stepping onto `coord`.
    pub fn wall_penalty(&self, coord: GridCoord, config: &EngineConfig) -> f32 {
        let limit = config
            .penalty_radius()
            .unwrap_or_else(|| self.width.max(self.height) as u32);
        match self.wall_distance(coord, limit) {
            Some(radius) => config.wall_penalty(radius),
            None => 0.0,
        }
    }

    /// Closest walkable cell to `coord` by BFS hop count.
    ///
    /// Returns `coord` itself when already walkable. Off-grid requests start
    /// from the clamped cell. Blocked cells are traversed while searching;
    /// ties go to BFS discovery order (down, right, up, left).
    pub fn nearest_walkable(&self, coord: GridCoord) -> Option<GridCoord> {
        let seed = self.clamp(coord);
        if self.is_walkable(seed) {
            return Some(seed);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(seed);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            for next in current.neighbors_4() {
                if !self.in_bounds(next) || !visited.insert(next) {
                    continue;
                }
                if self.is_walkable(next) {
                    return Some(next);
                }
                queue.push_back(next);
            }
        }
        None
    }

    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.blocked
            .chunks(self.width)
            .map(|row| row.iter().map(|&b| i32::from(b)).collect())
            .collect()
    }
}

impl TryFrom<Vec<Vec<i32>>> for FloorGrid {
    type Error = NavError;

    fn try_from(rows: Vec<Vec<i32>>) -> NavResult<Self> {
        Self::from_rows(&rows)
    }
}

impl From<FloorGrid> for Vec<Vec<i32>> {
    fn from(grid: FloorGrid) -> Self {
        grid.to_rows()
    }
}
