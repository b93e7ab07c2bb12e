//! Route planning between two points: segments, per-floor walks, stitching.
//!
//! A trip is cut into segments: walks on one floor (grid search) and climbs
//! between two linked connectors (no search). Each walk is resolved on its
//! own grid; the results are stitched back together in traversal order into
//! per-floor maneuver lists plus the order floors are visited in.
//!
//! Everything here is synchronous and pure. The async orchestrator decides
//! how walks are scheduled; it only has to hand results back in segment
//! order.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::connectors::{resolve_chain, ConnectorGraph};
use crate::error::{NavError, NavResult};
use crate::grid::{FloorGrid, GridCoord};
use crate::maneuvers::{self, generate_maneuvers, Instruction, Maneuver};
use crate::pathfinding::GridPathfinder;
use crate::points::{Point, PointInventory};

/// One leg of a trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Walk between two points on the same floor.
    Walk { floor: i32, from: Point, to: Point },
    /// Take a connector one floor up or down.
    Climb { from: Point, to: Point },
}

impl Segment {
    /// Floor the segment starts on.
    pub fn floor(&self) -> i32 {
        match self {
            Segment::Walk { floor, .. } => *floor,
            Segment::Climb { from, .. } => from.floor,
        }
    }
}

/// Maneuvers produced by one segment, tagged with the floor they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub floor: i32,
    pub maneuvers: Vec<Maneuver>,
}

/// Cut a trip into segments.
///
/// `chain` is the connector chain between the floors (empty for a
/// same-floor trip). Consecutive chain entries on one floor become a walk,
/// on adjacent floors a climb.
pub fn plan_segments(from: &Point, chain: &[&Point], to: &Point) -> NavResult<Vec<Segment>> {
    let mut stops: Vec<&Point> = Vec::with_capacity(chain.len() + 2);
    stops.push(from);
    stops.extend_from_slice(chain);
    stops.push(to);

    let mut segments = Vec::with_capacity(stops.len() - 1);
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.floor == b.floor {
            segments.push(Segment::Walk {
                floor: a.floor,
                from: a.clone(),
                to: b.clone(),
            });
        } else if (a.floor - b.floor).abs() == 1 && a.is_connector() && b.is_connector() {
            segments.push(Segment::Climb {
                from: a.clone(),
                to: b.clone(),
            });
        } else {
            return Err(NavError::InvariantViolation(format!(
                "no way from #{} on floor {} to #{} on floor {}",
                a.id, a.floor, b.id, b.floor
            )));
        }
    }
    Ok(segments)
}

/// Index of inventory points by grid cell for one floor.
///
/// When several points share a cell, the first in inventory order wins.
pub struct CellIndex<'a> {
    cells: HashMap<GridCoord, &'a Point>,
}

impl<'a> CellIndex<'a> {
    pub fn new(inventory: &'a PointInventory, floor: i32, config: &EngineConfig) -> Self {
        let mut cells = HashMap::new();
        for point in inventory.on_floor(floor) {
            cells
                .entry(GridCoord::from_coords(point.x, point.y, config))
                .or_insert(point);
        }
        Self { cells }
    }

    pub fn get(&self, cell: GridCoord) -> Option<&'a Point> {
        self.cells.get(&cell).copied()
    }
}

/// Semantic point path for a walk on one floor.
///
/// The first entry is `from` when the search started in its cell, the rest
/// are inventory points where one sits in the path cell and synthetic
/// waypoints elsewhere.
pub fn walk_points(
    grid: &FloorGrid,
    inventory: &PointInventory,
    from: &Point,
    to: &Point,
    config: &EngineConfig,
) -> NavResult<Vec<Point>> {
    if from.floor != to.floor {
        return Err(NavError::InvariantViolation(format!(
            "walk from floor {} to floor {}",
            from.floor, to.floor
        )));
    }
    let floor = from.floor;
    let start = GridCoord::from_coords(from.x, from.y, config);
    let goal = GridCoord::from_coords(to.x, to.y, config);

    let path = GridPathfinder::new(grid, config)
        .find_path_nearest(start, goal)
        .ok_or_else(|| NavError::NoRoute {
            floor,
            reason: format!(
                "no walkable channel from ({},{}) to ({},{})",
                start.x, start.y, goal.x, goal.y
            ),
        })?;
    debug!(
        "[Route] floor {}: {} steps, wall penalty {:.1}",
        floor,
        path.steps(),
        path.penalty
    );

    let index = CellIndex::new(inventory, floor, config);
    let scale = config.grid_scale as f64;
    let resolve = |cell: GridCoord| -> Point {
        index.get(cell).cloned().unwrap_or_else(|| {
            Point::waypoint(cell.x as f64 * scale, cell.y as f64 * scale, floor)
        })
    };

    let mut points = Vec::with_capacity(path.cells.len());
    for (i, &cell) in path.cells.iter().enumerate() {
        let point = if i == 0 && cell == start {
            from.clone()
        } else if i + 1 == path.cells.len() && cell == goal {
            to.clone()
        } else {
            resolve(cell)
        };
        points.push(point);
    }
    Ok(points)
}

/// Maneuvers for a walk on one floor.
pub fn walk_maneuvers(
    grid: &FloorGrid,
    inventory: &PointInventory,
    from: &Point,
    to: &Point,
    config: &EngineConfig,
) -> NavResult<Vec<Maneuver>> {
    let points = walk_points(grid, inventory, from, to, config)?;
    generate_maneuvers(&points, config)
}

/// Maneuvers for a connector hop.
pub fn climb_maneuvers(from: &Point, to: &Point, config: &EngineConfig) -> NavResult<Vec<Maneuver>> {
    let maneuvers = generate_maneuvers(&[from.clone(), to.clone()], config)?;
    match maneuvers.as_slice() {
        [m] if m.instruction.is_floor_change() => Ok(maneuvers),
        _ => Err(NavError::InvariantViolation(format!(
            "connector hop #{} -> #{} did not produce a single floor change",
            from.id, to.id
        ))),
    }
}

/// Turn one segment into its leg.
///
/// Walks need the grid of their floor; climbs ignore `grid`.
pub fn resolve_segment(
    segment: &Segment,
    grid: Option<&FloorGrid>,
    inventory: &PointInventory,
    config: &EngineConfig,
) -> NavResult<Leg> {
    let maneuvers = match segment {
        Segment::Walk { floor, from, to } => {
            let grid = grid.ok_or_else(|| NavError::GridUnavailable {
                floor: *floor,
                reason: "no grid loaded".into(),
            })?;
            walk_maneuvers(grid, inventory, from, to, config)?
        }
        Segment::Climb { from, to } => climb_maneuvers(from, to, config)?,
    };
    Ok(Leg {
        floor: segment.floor(),
        maneuvers,
    })
}

/// Segments for a trip, resolving the connector chain when floors differ.
pub fn route_segments(
    inventory: &PointInventory,
    graph: &ConnectorGraph,
    from: &Point,
    to: &Point,
    config: &EngineConfig,
) -> NavResult<Vec<Segment>> {
    config.check_floor(from.floor)?;
    config.check_floor(to.floor)?;
    if from.floor == to.floor {
        return plan_segments(from, &[], to);
    }
    let chain = resolve_chain(inventory, graph, from, to).ok_or(NavError::NoConnectorChain {
        from: from.floor,
        to: to.floor,
    })?;
    debug!(
        "[Route] chain {:?} from floor {} to floor {}",
        chain.iter().map(|p| p.id).collect::<Vec<_>>(),
        from.floor,
        to.floor
    );
    plan_segments(from, &chain, to)
}

/// Plan a whole trip on the calling thread, one segment after another.
///
/// `grid_for` returns the grid of a floor, or `None` if it is unavailable.
pub fn plan_route<'g>(
    inventory: &PointInventory,
    graph: &ConnectorGraph,
    grid_for: impl Fn(i32) -> Option<&'g FloorGrid>,
    from: &Point,
    to: &Point,
    config: &EngineConfig,
) -> NavResult<Navigation> {
    let segments = route_segments(inventory, graph, from, to, config)?;
    let legs = segments
        .iter()
        .map(|segment| resolve_segment(segment, grid_for(segment.floor()), inventory, config))
        .collect::<NavResult<Vec<_>>>()?;
    stitch(legs, to.floor, config)
}

/// A finished navigation: maneuvers grouped by floor and the visit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    /// Per-floor maneuver lists, indexed by floor slot (floor - min_floor).
    pub maneuvers: Vec<Vec<Maneuver>>,
    /// Floors in the order they are visited, without repeats.
    pub order: Vec<i32>,
    /// Floor held in slot 0.
    pub min_floor: i32,
}

impl Navigation {
    /// Maneuvers on one floor, empty for floors not on the route.
    pub fn floor(&self, floor: i32) -> &[Maneuver] {
        let slot = i64::from(floor) - i64::from(self.min_floor);
        if slot < 0 {
            return &[];
        }
        self.maneuvers
            .get(slot as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All maneuvers in traversal order.
    pub fn steps(&self) -> impl Iterator<Item = &Maneuver> {
        self.order.iter().flat_map(move |&floor| self.floor(floor).iter())
    }

    pub fn step_count(&self) -> usize {
        self.maneuvers.iter().map(Vec::len).sum()
    }

    /// Sum of straight distances over every floor.
    pub fn straight_distance(&self) -> f64 {
        self.maneuvers
            .iter()
            .map(|m| maneuvers::straight_distance(m))
            .sum()
    }

    /// Number of up/down maneuvers.
    pub fn floor_changes(&self) -> usize {
        self.steps()
            .filter(|m| m.instruction.is_floor_change())
            .count()
    }

    pub fn start_floor(&self) -> Option<i32> {
        self.order.first().copied()
    }

    pub fn end_floor(&self) -> Option<i32> {
        self.order.last().copied()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Maneuver> {
        self.steps().filter(|m| m.instruction.is_turn())
    }
}

/// Stitch legs (in segment order) into a navigation result.
///
/// A floor that shows up in several legs gets its maneuvers appended in
/// traversal order; `order` lists each floor once, first visit first.
pub fn stitch(legs: Vec<Leg>, arrival_floor: i32, config: &EngineConfig) -> NavResult<Navigation> {
    let mut maneuvers = vec![Vec::new(); config.floor_count()];
    let mut order: Vec<i32> = Vec::new();

    let floors = legs.iter().map(|leg| leg.floor).chain(std::iter::once(arrival_floor));
    for floor in floors {
        config.check_floor(floor)?;
        if !order.contains(&floor) {
            order.push(floor);
        }
    }
    for leg in legs {
        let slot = config
            .floor_slot(leg.floor)
            .ok_or(NavError::FloorOutOfRange {
                floor: leg.floor,
                min: config.min_floor,
                max: config.max_floor,
            })?;
        maneuvers[slot].extend(leg.maneuvers);
    }

    Ok(Navigation {
        maneuvers,
        order,
        min_floor: config.min_floor,
    })
}
