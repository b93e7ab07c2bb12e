//! Connector chains between floors.
//!
//! `ConnectorGraph` holds the stair/elevator links of one point inventory
//! and finds, via BFS, the chain of connectors that carries a walker from
//! one floor to another.
//!
//! The search starts from every connector on the start floor at once and
//! only ever steps toward the destination floor. Of the connectors reached
//! on the destination floor, the one nearest the destination point wins.
//! That choice is greedy: it ignores how far the walker has to go on the
//! start floor to reach the chain, so the overall trip is not guaranteed to
//! be the shortest.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, trace};

use crate::points::{Point, PointInventory, PointKind};

/// A connector as the graph sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorNode {
    pub id: u32,
    pub floor: i32,
    pub x: f64,
    pub y: f64,
    pub down: Option<u32>,
    pub up: Option<u32>,
}

impl ConnectorNode {
    fn link_toward(&self, direction: i32) -> Option<u32> {
        if direction > 0 {
            self.up
        } else {
            self.down
        }
    }
}

/// Pre-built connector graph over one inventory snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConnectorGraph {
    /// connector id → node
    nodes: HashMap<u32, ConnectorNode>,
    /// floor → connector ids in inventory order
    by_floor: HashMap<i32, Vec<u32>>,
}

impl ConnectorGraph {
    /// Collect every connector of the inventory.
    pub fn from_inventory(inventory: &PointInventory) -> Self {
        Self::from_points(inventory.iter())
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut graph = Self::default();
        for point in points {
            let PointKind::Connector { down, up } = point.kind else {
                continue;
            };
            graph.nodes.insert(
                point.id,
                ConnectorNode {
                    id: point.id,
                    floor: point.floor,
                    x: point.x,
                    y: point.y,
                    down,
                    up,
                },
            );
            graph.by_floor.entry(point.floor).or_default().push(point.id);
        }
        graph
    }

    pub fn node(&self, id: u32) -> Option<&ConnectorNode> {
        self.nodes.get(&id)
    }

    pub fn has_connector(&self, id: u32) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn connector_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connector ids on a floor, in inventory order.
    pub fn on_floor(&self, floor: i32) -> &[u32] {
        self.by_floor.get(&floor).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The connector one floor toward `direction` from `id`, if the link is
    /// sound: it must exist and sit exactly one floor away.
    pub fn step(&self, id: u32, direction: i32) -> Option<&ConnectorNode> {
        let node = self.nodes.get(&id)?;
        let target = self.nodes.get(&node.link_toward(direction)?)?;
        if target.floor == node.floor + direction.signum() {
            Some(target)
        } else {
            trace!(
                "[Connectors] ignoring link #{} -> #{}: floor {} -> {}",
                node.id,
                target.id,
                node.floor,
                target.floor
            );
            None
        }
    }

    /// Chain of connector ids from `from_floor` to the floor of `destination`.
    ///
    /// The first id is on `from_floor`, the last on the destination floor.
    /// Returns an empty chain when the floors match and `None` when the
    /// floors are not linked.
    pub fn find_chain(&self, from_floor: i32, destination: &Point) -> Option<Vec<u32>> {
        let to_floor = destination.floor;
        if from_floor == to_floor {
            return Some(vec![]);
        }
        let direction = (to_floor - from_floor).signum();

        let mut visited = HashSet::new();
        let mut parent: HashMap<u32, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        for &id in self.on_floor(from_floor) {
            if visited.insert(id) {
                queue.push_back(id);
            }
        }

        let mut best: Option<(u32, f64)> = None;
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if node.floor == to_floor {
                let distance = (node.x - destination.x).hypot(node.y - destination.y);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((current, distance));
                }
                continue;
            }
            if let Some(next) = self.step(current, direction) {
                if visited.insert(next.id) {
                    parent.insert(next.id, current);
                    queue.push_back(next.id);
                }
            }
        }

        let Some((arrival, distance)) = best else {
            debug!(
                "[Connectors] no chain from floor {} to floor {}",
                from_floor, to_floor
            );
            return None;
        };
        debug!(
            "[Connectors] arrival connector #{} is {:.1} from destination",
            arrival, distance
        );

        let mut chain = vec![arrival];
        let mut current = arrival;
        while let Some(&prev) = parent.get(&current) {
            chain.push(prev);
            current = prev;
        }
        chain.reverse();
        Some(chain)
    }
}

/// Resolve a connector chain between two points on different floors.
///
/// Returns the chain as inventory points, or `None` if the floors match or
/// are not linked.
pub fn resolve_chain<'a>(
    inventory: &'a PointInventory,
    graph: &ConnectorGraph,
    from: &Point,
    to: &Point,
) -> Option<Vec<&'a Point>> {
    if from.floor == to.floor {
        return None;
    }
    let ids = graph.find_chain(from.floor, to)?;
    ids.into_iter().map(|id| inventory.get(id)).collect()
}
