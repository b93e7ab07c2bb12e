//! Engine constants: grid scale, wall penalties, floor range.
//!
//! These are the defaults behind [`EngineConfig`](crate::config::EngineConfig).
//! Requests never carry them; a deployment overrides them through config.

/// Point coordinates per grid cell (coordinate → cell = floor(coord / scale)).
pub const GRID_SCALE: u32 = 5;

/// Divisor turning scaled cell distances into building distance units.
pub const DISTANCE_DIVISOR: f64 = 100.0;

/// Penalty for a cell directly adjacent to a wall.
pub const MAX_PENALTY: f32 = 2.0;

/// Penalty reduction per ring of clearance beyond the first.
pub const PENALTY_PER_WALL: f32 = 0.5;

/// Outermost clearance ring that can carry a wall penalty.
pub const MAX_PENALTY_RADIUS: u32 = 64;

/// Nominal distance reported for an up/down maneuver.
pub const FLOOR_CHANGE_DISTANCE: f64 = 0.0;

/// Synthetic waypoints carry this id; repository ids start at 1.
pub const WAYPOINT_ID: u32 = 0;

pub mod floors {
    pub const UNDERGROUND: i32 = -1;
    pub const GROUND: i32 = 0;
    pub const FIRST: i32 = 1;
    pub const SECOND: i32 = 2;
    pub const THIRD: i32 = 3;

    /// Lowest floor index in the building.
    pub const MIN: i32 = UNDERGROUND;
    /// Highest floor index in the building.
    pub const MAX: i32 = THIRD;

    /// Most floors a configured range may span.
    pub const MAX_COUNT: usize = 64;
}
