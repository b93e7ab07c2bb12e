//! Single-floor A* over a walkability grid.
//!
//! Search is 4-connected with a Manhattan heuristic. Path cost is compared
//! lexicographically as (steps, wall penalty): the penalty steers the search
//! away from walls only among paths of equal length, so the returned path is
//! always a true shortest path in steps. This replaces an additive
//! `1 + penalty` step cost on purpose: a summed cost would trade extra
//! steps for wall clearance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::config::EngineConfig;
use crate::grid::{FloorGrid, GridCoord};

/// A cell path from start to goal, both inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    pub cells: Vec<GridCoord>,
    /// Summed wall penalty of every cell stepped onto.
    pub penalty: f32,
}

impl GridPath {
    /// Number of unit steps.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Steps plus wall penalty.
    pub fn cost(&self) -> f32 {
        self.steps() as f32 + self.penalty
    }

    pub fn start(&self) -> Option<GridCoord> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<GridCoord> {
        self.cells.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost {
    steps: u32,
    penalty: f32,
}

impl Cost {
    const ZERO: Cost = Cost {
        steps: 0,
        penalty: 0.0,
    };

    fn step(self, penalty: f32) -> Cost {
        Cost {
            steps: self.steps + 1,
            penalty: self.penalty + penalty,
        }
    }

    fn with_heuristic(self, h: u32) -> Cost {
        Cost {
            steps: self.steps + h,
            penalty: self.penalty,
        }
    }

    fn compare(&self, other: &Cost) -> Ordering {
        self.steps
            .cmp(&other.steps)
            .then_with(|| self.penalty.total_cmp(&other.penalty))
    }
}

/// Open-set entry. Ordered so `BinaryHeap` pops the lowest f first and,
/// among equal f, the earliest inserted.
#[derive(Debug)]
struct OpenNode {
    f: Cost,
    seq: u64,
    coord: GridCoord,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .compare(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* planner bound to one floor grid.
pub struct GridPathfinder<'a> {
    grid: &'a FloorGrid,
    config: &'a EngineConfig,
}

impl<'a> GridPathfinder<'a> {
    pub fn new(grid: &'a FloorGrid, config: &'a EngineConfig) -> Self {
        Self { grid, config }
    }

    /// Shortest path between two walkable cells.
    ///
    /// `None` when either endpoint is off-grid or blocked, or when no
    /// walkable channel connects them.
    pub fn find_path(&self, start: GridCoord, goal: GridCoord) -> Option<GridPath> {
        trace!(
            "[AStar] find_path: start=({},{}) goal=({},{})",
            start.x,
            start.y,
            goal.x,
            goal.y
        );
        if !self.grid.is_walkable(start) || !self.grid.is_walkable(goal) {
            debug!("[AStar] endpoint blocked or off-grid");
            return None;
        }
        if start == goal {
            return Some(GridPath {
                cells: vec![start],
                penalty: 0.0,
            });
        }

        let cells = self.grid.cell_count();
        let mut g_costs: Vec<Option<Cost>> = vec![None; cells];
        let mut came_from: Vec<Option<GridCoord>> = vec![None; cells];
        let mut closed = vec![false; cells];
        let mut penalties: Vec<Option<f32>> = vec![None; cells];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        let start_idx = self.grid.cell_index(start)?;
        g_costs[start_idx] = Some(Cost::ZERO);
        open.push(OpenNode {
            f: Cost::ZERO.with_heuristic(start.manhattan(goal)),
            seq,
            coord: start,
        });

        let mut expanded = 0usize;
        while let Some(OpenNode { coord: current, .. }) = open.pop() {
            let current_idx = self.grid.cell_index(current)?;
            if closed[current_idx] {
                continue;
            }
            if current == goal {
                debug!("[AStar] reached goal after expanding {} nodes", expanded);
                let g = g_costs[current_idx].unwrap_or(Cost::ZERO);
                return Some(self.reconstruct(&came_from, goal, g.penalty));
            }
            closed[current_idx] = true;
            expanded += 1;

            let current_g = g_costs[current_idx].unwrap_or(Cost::ZERO);
            for next in current.neighbors_4() {
                let Some(next_idx) = self.grid.cell_index(next) else {
                    continue;
                };
                if closed[next_idx] || !self.grid.is_walkable(next) {
                    continue;
                }
                let penalty = *penalties[next_idx]
                    .get_or_insert_with(|| self.grid.wall_penalty(next, self.config));
                let tentative = current_g.step(penalty);
                let better = match g_costs[next_idx] {
                    Some(existing) => tentative.compare(&existing) == Ordering::Less,
                    None => true,
                };
                if better {
                    g_costs[next_idx] = Some(tentative);
                    came_from[next_idx] = Some(current);
                    seq += 1;
                    open.push(OpenNode {
                        f: tentative.with_heuristic(next.manhattan(goal)),
                        seq,
                        coord: next,
                    });
                }
            }
        }

        debug!("[AStar] no path after expanding {} nodes", expanded);
        None
    }

    /// Like [`find_path`](Self::find_path), but first moves blocked or
    /// off-grid endpoints to their nearest walkable cell.
    pub fn find_path_nearest(&self, start: GridCoord, goal: GridCoord) -> Option<GridPath> {
        let start = self.relocate(start)?;
        let goal = self.relocate(goal)?;
        self.find_path(start, goal)
    }

    fn relocate(&self, coord: GridCoord) -> Option<GridCoord> {
        if self.grid.is_walkable(coord) {
            return Some(coord);
        }
        let found = self.grid.nearest_walkable(coord);
        match found {
            Some(cell) => debug!(
                "[AStar] relocated ({},{}) to nearest walkable ({},{})",
                coord.x, coord.y, cell.x, cell.y
            ),
            None => debug!("[AStar] grid has no walkable cell"),
        }
        found
    }

    fn reconstruct(
        &self,
        came_from: &[Option<GridCoord>],
        goal: GridCoord,
        penalty: f32,
    ) -> GridPath {
        let mut cells = vec![goal];
        let mut current = goal;
        while let Some(prev) = self
            .grid
            .cell_index(current)
            .and_then(|idx| came_from[idx])
        {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();
        GridPath { cells, penalty }
    }
}
