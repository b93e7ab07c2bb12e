//! Pure navigation logic for SchoolNav.
//!
//! This crate contains everything about finding a way through a building
//! that is independent of where grids and points come from or how requests
//! are scheduled. Functions take plain data and return results, making
//! them unit-testable and usable from the async engine, the simulation
//! harness, and benchmarks alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Engine tunables (grid scale, wall penalty, floor range) |
//! | [`connectors`] | Stair/elevator graph and BFS connector chain resolution |
//! | [`constants`] | Default tunables and storey indices |
//! | [`error`] | `NavError` and the crate `NavResult` alias |
//! | [`grid`] | Per-floor walkability grids, wall distance, nearest walkable cell |
//! | [`maneuvers`] | Straight/left/right/up/down maneuvers from a point path |
//! | [`pathfinding`] | A* over a floor grid with a wall-proximity tie-break |
//! | [`points`] | Rooms, exits, connectors, waypoints and the point inventory |
//! | [`route`] | Segment planning, per-floor walks, stitching into a navigation |
//! | [`validation`] | Point/connector/grid data checks |

pub mod config;
pub mod connectors;
pub mod constants;
pub mod error;
pub mod grid;
pub mod maneuvers;
pub mod pathfinding;
pub mod points;
pub mod route;
pub mod validation;

pub use config::EngineConfig;
pub use error::{NavError, NavResult};
pub use grid::{FloorGrid, GridCoord};
pub use maneuvers::{Instruction, Maneuver};
pub use points::{Point, PointInventory, PointKind};
pub use route::Navigation;
