//! Point model: rooms, exits, connectors, and synthetic waypoints.
//!
//! A `Point` is an addressable location on one floor. What distinguishes a
//! room from a stairway is its `PointKind`; code that behaves differently per
//! kind matches on it exhaustively.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{floors, WAYPOINT_ID};
use crate::error::{NavError, NavResult};

/// Named building levels. Floor indices outside this set are still valid
/// `i32`s when a deployment configures a taller building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Storey {
    Underground,
    Ground,
    First,
    Second,
    Third,
}

impl Storey {
    pub fn all() -> &'static [Storey] {
        &[
            Storey::Underground,
            Storey::Ground,
            Storey::First,
            Storey::Second,
            Storey::Third,
        ]
    }

    pub fn from_index(floor: i32) -> Option<Self> {
        match floor {
            floors::UNDERGROUND => Some(Storey::Underground),
            floors::GROUND => Some(Storey::Ground),
            floors::FIRST => Some(Storey::First),
            floors::SECOND => Some(Storey::Second),
            floors::THIRD => Some(Storey::Third),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Storey::Underground => floors::UNDERGROUND,
            Storey::Ground => floors::GROUND,
            Storey::First => floors::FIRST,
            Storey::Second => floors::SECOND,
            Storey::Third => floors::THIRD,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Storey::Underground => "underground",
            Storey::Ground => "ground floor",
            Storey::First => "first floor",
            Storey::Second => "second floor",
            Storey::Third => "third floor",
        }
    }
}

/// Human label for a floor index, falling back to the number.
pub fn floor_label(floor: i32) -> String {
    match Storey::from_index(floor) {
        Some(storey) => storey.label().to_string(),
        None => format!("floor {}", floor),
    }
}

/// Kind-specific data of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Room {
        room_number: String,
    },
    Exit {
        name: String,
        emergency: bool,
    },
    /// Stairway or elevator stop. `down`/`up` name the linked connector on
    /// the floor below/above.
    Connector {
        down: Option<u32>,
        up: Option<u32>,
    },
    /// Grid cell on a computed path with no semantic point behind it.
    Waypoint,
}

/// An addressable location on one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub floor: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub neighbors: Vec<u32>,
    pub kind: PointKind,
}

impl Point {
    pub fn room(id: u32, x: f64, y: f64, floor: i32, room_number: &str) -> Self {
        Self::with_kind(
            id,
            x,
            y,
            floor,
            PointKind::Room {
                room_number: room_number.to_string(),
            },
        )
    }

    pub fn exit(id: u32, x: f64, y: f64, floor: i32, name: &str, emergency: bool) -> Self {
        Self::with_kind(
            id,
            x,
            y,
            floor,
            PointKind::Exit {
                name: name.to_string(),
                emergency,
            },
        )
    }

    pub fn connector(
        id: u32,
        x: f64,
        y: f64,
        floor: i32,
        down: Option<u32>,
        up: Option<u32>,
    ) -> Self {
        Self::with_kind(id, x, y, floor, PointKind::Connector { down, up })
    }

    /// Synthetic path point at a grid cell's origin.
    pub fn waypoint(x: f64, y: f64, floor: i32) -> Self {
        Self::with_kind(WAYPOINT_ID, x, y, floor, PointKind::Waypoint)
    }

    fn with_kind(id: u32, x: f64, y: f64, floor: i32, kind: PointKind) -> Self {
        Self {
            id,
            x,
            y,
            floor,
            description: None,
            neighbors: Vec::new(),
            kind,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, PointKind::Connector { .. })
    }

    pub fn is_waypoint(&self) -> bool {
        matches!(self.kind, PointKind::Waypoint)
    }

    /// Linked connector id one floor toward `direction` (+1 up, -1 down).
    pub fn link_toward(&self, direction: i32) -> Option<u32> {
        match self.kind {
            PointKind::Connector { down, up } => match direction.signum() {
                1 => up,
                -1 => down,
                _ => None,
            },
            PointKind::Room { .. } | PointKind::Exit { .. } | PointKind::Waypoint => None,
        }
    }

    /// Display key: room number, exit name, or a description of the connector.
    pub fn display_name(&self) -> String {
        match &self.kind {
            PointKind::Room { room_number } => room_number.clone(),
            PointKind::Exit { name, .. } => name.clone(),
            PointKind::Connector { .. } => self
                .description
                .clone()
                .unwrap_or_else(|| format!("connector #{}", self.id)),
            PointKind::Waypoint => format!("({:.0}, {:.0})", self.x, self.y),
        }
    }

    /// Straight-line distance to another point, ignoring floors.
    pub fn planar_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.display_name(), floor_label(self.floor))
    }
}

/// Immutable snapshot of every point in the building.
///
/// Keeps the repository's order: when two points share a grid cell the one
/// listed first wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct PointInventory {
    points: Vec<Point>,
    by_id: HashMap<u32, usize>,
}

impl PointInventory {
    /// Build an inventory, rejecting duplicate or reserved ids.
    pub fn new(points: Vec<Point>) -> NavResult<Self> {
        let mut by_id = HashMap::with_capacity(points.len());
        for (index, point) in points.iter().enumerate() {
            if point.id == WAYPOINT_ID || point.is_waypoint() {
                return Err(NavError::InvalidInventory(format!(
                    "point #{} uses the reserved waypoint id or kind",
                    point.id
                )));
            }
            if by_id.insert(point.id, index).is_some() {
                return Err(NavError::InvalidInventory(format!(
                    "duplicate point id {}",
                    point.id
                )));
            }
        }
        Ok(Self { points, by_id })
    }

    pub fn get(&self, id: u32) -> Option<&Point> {
        self.by_id.get(&id).map(|&i| &self.points[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn on_floor(&self, floor: i32) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(move |p| p.floor == floor)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.is_connector())
    }

    pub fn connectors_on(&self, floor: i32) -> impl Iterator<Item = &Point> {
        self.on_floor(floor).filter(|p| p.is_connector())
    }

    /// Distinct floors that hold at least one point, ascending.
    pub fn floors(&self) -> Vec<i32> {
        let mut floors: Vec<i32> = self.points.iter().map(|p| p.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors
    }

    /// Find a room by its display number.
    pub fn room(&self, room_number: &str) -> Option<&Point> {
        self.points.iter().find(|p| match &p.kind {
            PointKind::Room { room_number: n } => n == room_number,
            _ => false,
        })
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl TryFrom<Vec<Point>> for PointInventory {
    type Error = NavError;

    fn try_from(points: Vec<Point>) -> NavResult<Self> {
        Self::new(points)
    }
}

impl From<PointInventory> for Vec<Point> {
    fn from(inventory: PointInventory) -> Self {
        inventory.points
    }
}
