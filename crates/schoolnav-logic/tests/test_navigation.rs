//! Integration tests for the full navigation pipeline.
//!
//! Exercises: PointInventory → ConnectorGraph → segments → A* walks
//! → maneuvers → stitched Navigation
//!
//! All tests are pure logic: no providers, no async runtime.

use std::collections::{HashMap, HashSet, VecDeque};

use proptest::prelude::*;

use schoolnav_logic::connectors::ConnectorGraph;
use schoolnav_logic::grid::{FloorGrid, GridCoord};
use schoolnav_logic::maneuvers::Instruction;
use schoolnav_logic::pathfinding::GridPathfinder;
use schoolnav_logic::points::{Point, PointInventory};
use schoolnav_logic::route::{plan_route, route_segments, Segment};
use schoolnav_logic::validation::validate_inventory;
use schoolnav_logic::{EngineConfig, NavError};

// ── Helpers ────────────────────────────────────────────────────────────

/// Every floor: a corridor along row 1 and a side room reached at column 4.
const FLOOR_PLAN: &str = "
    ##########
    #........#
    ####.#####
    ###...####
    ##########
";

fn cell(c: i32) -> f64 {
    c as f64 * 5.0 + 2.0
}

/// Three floors (0..=2) joined by west stairs at column 1 and an east
/// elevator at column 7 that stops on floors 0 and 1 only.
fn building() -> (PointInventory, HashMap<i32, FloorGrid>) {
    let grid = FloorGrid::from_ascii(FLOOR_PLAN).unwrap();
    let grids: HashMap<i32, FloorGrid> = (0..=2).map(|f| (f, grid.clone())).collect();

    let inventory = PointInventory::new(vec![
        Point::room(1, cell(4), cell(3), 0, "G01"),
        Point::room(2, cell(6), cell(1), 0, "G02"),
        Point::room(3, cell(5), cell(3), 1, "101"),
        Point::room(4, cell(3), cell(3), 2, "201"),
        Point::exit(5, cell(8), cell(1), 0, "Main exit", true),
        Point::connector(10, cell(1), cell(1), 0, None, Some(11)).with_description("West stairs"),
        Point::connector(11, cell(1), cell(1), 1, Some(10), Some(12)).with_description("West stairs"),
        Point::connector(12, cell(1), cell(1), 2, Some(11), None).with_description("West stairs"),
        Point::connector(20, cell(7), cell(1), 0, None, Some(21)).with_description("Elevator"),
        Point::connector(21, cell(7), cell(1), 1, Some(20), None).with_description("Elevator"),
    ])
    .unwrap();
    (inventory, grids)
}

fn navigate(
    inventory: &PointInventory,
    grids: &HashMap<i32, FloorGrid>,
    from: u32,
    to: u32,
) -> Result<schoolnav_logic::Navigation, NavError> {
    let config = EngineConfig::default();
    let graph = ConnectorGraph::from_inventory(inventory);
    plan_route(
        inventory,
        &graph,
        |f| grids.get(&f),
        inventory.get(from).unwrap(),
        inventory.get(to).unwrap(),
        &config,
    )
}

/// Plain BFS step count on a grid, for comparison with A*.
fn bfs_steps(grid: &FloorGrid, start: GridCoord, goal: GridCoord) -> Option<usize> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((current, steps)) = queue.pop_front() {
        if current == goal {
            return Some(steps);
        }
        for next in current.neighbors_4() {
            if grid.is_walkable(next) && seen.insert(next) {
                queue.push_back((next, steps + 1));
            }
        }
    }
    None
}

/// Hop count from `seed` to every in-grid cell, walls included: steps to
/// reach the clamped cell from off the grid, then a plain BFS over all cells.
fn seed_hops(grid: &FloorGrid, seed: GridCoord) -> HashMap<GridCoord, u32> {
    let clamped = grid.clamp(seed);
    let offset = seed.manhattan(clamped);
    let mut hops = HashMap::from([(clamped, offset)]);
    let mut queue = VecDeque::from([clamped]);
    while let Some(current) = queue.pop_front() {
        let d = hops[&current];
        for next in current.neighbors_4() {
            if grid.in_bounds(next) && !hops.contains_key(&next) {
                hops.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    hops
}

// ── Building data ──────────────────────────────────────────────────────

#[test]
fn building_fixture_validates_clean() {
    let (inventory, grids) = building();
    let errors = validate_inventory(&inventory, |f| grids.get(&f), &EngineConfig::default());
    assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
}

// ── Same floor ─────────────────────────────────────────────────────────

#[test]
fn same_floor_route_has_single_floor_order() {
    let (inventory, grids) = building();
    let nav = navigate(&inventory, &grids, 1, 2).unwrap();
    assert_eq!(nav.order, vec![0]);
    assert_eq!(nav.floor_changes(), 0);
    // (4,3) north to the corridor, then east to column 6.
    let kinds: Vec<Instruction> = nav.floor(0).iter().map(|m| m.instruction).collect();
    assert_eq!(
        kinds,
        vec![Instruction::Straight, Instruction::Right, Instruction::Straight]
    );
    assert!((nav.straight_distance() - 4.0 * 5.0 / 100.0).abs() < 1e-9);
    assert_eq!(nav.floor(0).last().unwrap().point.id, 2);
}

#[test]
fn same_point_route_is_empty() {
    let (inventory, grids) = building();
    let nav = navigate(&inventory, &grids, 2, 2).unwrap();
    assert_eq!(nav.order, vec![0]);
    assert_eq!(nav.step_count(), 0);
}

// ── Multi-floor ────────────────────────────────────────────────────────

#[test]
fn two_floor_trip_uses_connector_nearest_destination() {
    let (inventory, _) = building();
    // Room 101 at column 5 is nearer the elevator (7) than the stairs (1).
    let segments = route_segments(
        &inventory,
        &ConnectorGraph::from_inventory(&inventory),
        inventory.get(1).unwrap(),
        inventory.get(3).unwrap(),
        &EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(segments.len(), 3);
    match &segments[1] {
        Segment::Climb { from, to } => assert_eq!((from.id, to.id), (20, 21)),
        other => panic!("expected climb, got {:?}", other),
    }
}

#[test]
fn three_floor_trip_climbs_twice() {
    let (inventory, grids) = building();
    let nav = navigate(&inventory, &grids, 1, 4).unwrap();
    assert_eq!(nav.order, vec![0, 1, 2]);
    assert_eq!(nav.floor_changes(), 2);

    let ground: Vec<Instruction> = nav.floor(0).iter().map(|m| m.instruction).collect();
    // North out of the room, left toward the stairs, up.
    assert_eq!(
        ground,
        vec![
            Instruction::Straight,
            Instruction::Left,
            Instruction::Straight,
            Instruction::Up,
        ]
    );
    assert_eq!(nav.floor(0).last().unwrap().point.id, 10);
    let first: Vec<Instruction> = nav.floor(1).iter().map(|m| m.instruction).collect();
    assert_eq!(first, vec![Instruction::Up]);
    assert_eq!(nav.floor(1)[0].point.id, 11);
    assert_eq!(nav.floor(2).last().unwrap().point.id, 4);
}

#[test]
fn downward_trip_reports_down() {
    let (inventory, grids) = building();
    let nav = navigate(&inventory, &grids, 4, 5).unwrap();
    assert_eq!(nav.order, vec![2, 1, 0]);
    let changes: Vec<Instruction> = nav
        .steps()
        .filter(|m| m.instruction.is_floor_change())
        .map(|m| m.instruction)
        .collect();
    assert_eq!(changes, vec![Instruction::Down, Instruction::Down]);
    assert_eq!(nav.steps().last().unwrap().point.id, 5);
}

#[test]
fn floor_order_never_repeats() {
    let (inventory, grids) = building();
    for (from, to) in [(1, 4), (4, 1), (3, 4), (2, 3), (5, 4)] {
        let nav = navigate(&inventory, &grids, from, to).unwrap();
        let unique: HashSet<i32> = nav.order.iter().copied().collect();
        assert_eq!(unique.len(), nav.order.len(), "{} -> {}", from, to);
        assert_eq!(nav.start_floor(), Some(inventory.get(from).unwrap().floor));
        assert_eq!(nav.end_floor(), Some(inventory.get(to).unwrap().floor));
    }
}

#[test]
fn adjacent_straights_are_merged() {
    let (inventory, grids) = building();
    let nav = navigate(&inventory, &grids, 1, 4).unwrap();
    for floor in &nav.order {
        let list = nav.floor(*floor);
        for pair in list.windows(2) {
            assert!(
                !(pair[0].instruction == Instruction::Straight
                    && pair[1].instruction == Instruction::Straight),
                "adjacent straights on floor {}",
                floor
            );
        }
    }
    assert!(nav.turns().all(|m| m.distance == 0.0));
}

// ── Failures ───────────────────────────────────────────────────────────

#[test]
fn missing_grid_fails_whole_trip() {
    let (inventory, mut grids) = building();
    grids.remove(&2);
    assert!(matches!(
        navigate(&inventory, &grids, 1, 4),
        Err(NavError::GridUnavailable { floor: 2, .. })
    ));
}

#[test]
fn unlinked_floor_has_no_chain() {
    let (inventory, grids) = building();
    let mut points = inventory.into_points();
    points.push(Point::room(40, cell(2), cell(1), 3, "301"));
    let inventory = PointInventory::new(points).unwrap();
    assert!(matches!(
        navigate(&inventory, &grids, 1, 40),
        Err(NavError::NoConnectorChain { from: 0, to: 3 })
    ));
}

#[test]
fn out_of_range_floor_is_rejected() {
    let (inventory, grids) = building();
    let mut points = inventory.into_points();
    points.push(Point::room(50, cell(2), cell(1), 9, "901"));
    let inventory = PointInventory::new(points).unwrap();
    assert!(matches!(
        navigate(&inventory, &grids, 1, 50),
        Err(NavError::FloorOutOfRange { floor: 9, .. })
    ));
}

#[test]
fn walled_off_room_is_no_route() {
    let (inventory, mut grids) = building();
    let sealed = FloorGrid::from_ascii(
        "
        ##########
        #........#
        ##########
        ###...####
        ##########
        ",
    )
    .unwrap();
    grids.insert(0, sealed);
    assert!(matches!(
        navigate(&inventory, &grids, 1, 2),
        Err(NavError::NoRoute { floor: 0, .. })
    ));
}

// ── Properties ─────────────────────────────────────────────────────────

fn arb_grid() -> impl Strategy<Value = FloorGrid> {
    (2usize..9, 2usize..9).prop_flat_map(|(w, h)| {
        prop::collection::vec(prop::bool::weighted(0.3), w * h).prop_map(move |cells| {
            let rows: Vec<Vec<i32>> = cells
                .chunks(w)
                .map(|row| row.iter().map(|&b| i32::from(b)).collect())
                .collect();
            FloorGrid::from_rows(&rows).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn astar_is_as_short_as_bfs(grid in arb_grid(), sx in 0i32..9, sy in 0i32..9, gx in 0i32..9, gy in 0i32..9) {
        let config = EngineConfig::default();
        let start = grid.clamp(GridCoord::new(sx, sy));
        let goal = grid.clamp(GridCoord::new(gx, gy));
        let astar = GridPathfinder::new(&grid, &config).find_path(start, goal);
        let bfs = bfs_steps(&grid, start, goal);
        prop_assert_eq!(astar.as_ref().map(|p| p.steps()), bfs);
        if let Some(path) = astar {
            prop_assert_eq!(path.start(), Some(start));
            prop_assert_eq!(path.goal(), Some(goal));
            for pair in path.cells.windows(2) {
                prop_assert_eq!(pair[0].manhattan(pair[1]), 1);
                prop_assert!(grid.is_walkable(pair[1]));
            }
        }
    }

    #[test]
    fn nearest_walkable_is_closest_walkable(grid in arb_grid(), x in -20i32..30, y in -20i32..30) {
        let seed = GridCoord::new(x, y);
        match grid.nearest_walkable(seed) {
            Some(cell) => {
                prop_assert!(grid.is_walkable(cell));
                let hops = seed_hops(&grid, seed);
                let best = hops
                    .iter()
                    .filter(|(c, _)| grid.is_walkable(**c))
                    .map(|(_, &d)| d)
                    .min();
                prop_assert_eq!(hops.get(&cell).copied(), best);
            }
            None => prop_assert_eq!(grid.walkable_count(), 0),
        }
    }
}
