//! Engine-level configuration.
//!
//! `EngineConfig` carries the constants the navigation engine is tuned with.
//! Every field has a default from [`crate::constants`], so a JSON config only
//! needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::constants::{self, floors};
use crate::error::{NavError, NavResult};

/// Tuning for grid search, distance reporting, and the building's floor range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Point coordinates per grid cell.
    pub grid_scale: u32,
    /// Divisor applied to scaled cell distances for reported maneuver distances.
    pub distance_divisor: f64,
    /// Wall penalty for a cell touching a blocked cell.
    pub max_penalty: f32,
    /// Penalty drop per additional ring of clearance.
    pub penalty_per_wall: f32,
    /// Distance reported on up/down maneuvers.
    pub floor_change_distance: f64,
    /// Lowest floor index (basement).
    pub min_floor: i32,
    /// Highest floor index.
    pub max_floor: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_scale: constants::GRID_SCALE,
            distance_divisor: constants::DISTANCE_DIVISOR,
            max_penalty: constants::MAX_PENALTY,
            penalty_per_wall: constants::PENALTY_PER_WALL,
            floor_change_distance: constants::FLOOR_CHANGE_DISTANCE,
            min_floor: floors::MIN,
            max_floor: floors::MAX,
        }
    }
}

impl EngineConfig {
    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> NavResult<()> {
        if self.grid_scale == 0 {
            return Err(NavError::InvalidConfig("grid_scale must be positive".into()));
        }
        if !(self.distance_divisor > 0.0 && self.distance_divisor.is_finite()) {
            return Err(NavError::InvalidConfig(
                "distance_divisor must be positive".into(),
            ));
        }
        if !(self.max_penalty >= 0.0 && self.max_penalty.is_finite())
            || !(self.penalty_per_wall >= 0.0 && self.penalty_per_wall.is_finite())
        {
            return Err(NavError::InvalidConfig(format!(
                "penalties must be finite and non-negative (max_penalty={}, penalty_per_wall={})",
                self.max_penalty, self.penalty_per_wall
            )));
        }
        if self.max_penalty > 0.0
            && self.penalty_per_wall > 0.0
            && self.max_penalty / self.penalty_per_wall > constants::MAX_PENALTY_RADIUS as f32
        {
            return Err(NavError::InvalidConfig(format!(
                "max_penalty / penalty_per_wall must not exceed {} rings",
                constants::MAX_PENALTY_RADIUS
            )));
        }
        if !(self.floor_change_distance >= 0.0 && self.floor_change_distance.is_finite()) {
            return Err(NavError::InvalidConfig(
                "floor_change_distance must be non-negative".into(),
            ));
        }
        if self.min_floor > self.max_floor {
            return Err(NavError::InvalidConfig(format!(
                "empty floor range {}..={}",
                self.min_floor, self.max_floor
            )));
        }
        if self.floor_span() > floors::MAX_COUNT as i64 {
            return Err(NavError::InvalidConfig(format!(
                "floor range {}..={} spans more than {} floors",
                self.min_floor,
                self.max_floor,
                floors::MAX_COUNT
            )));
        }
        Ok(())
    }

    fn floor_span(&self) -> i64 {
        i64::from(self.max_floor) - i64::from(self.min_floor) + 1
    }

    /// Number of floors in the building; 0 for an inverted range.
    pub fn floor_count(&self) -> usize {
        self.floor_span().max(0) as usize
    }

    pub fn contains_floor(&self, floor: i32) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    /// Fail with `FloorOutOfRange` for floors outside the building.
    pub fn check_floor(&self, floor: i32) -> NavResult<()> {
        if self.contains_floor(floor) {
            Ok(())
        } else {
            Err(NavError::FloorOutOfRange {
                floor,
                min: self.min_floor,
                max: self.max_floor,
            })
        }
    }

    /// Non-negative index of a floor into per-floor arrays.
    ///
    /// With the default basement at -1 this is `floor + 1`.
    pub fn floor_slot(&self, floor: i32) -> Option<usize> {
        if self.contains_floor(floor) {
            Some((i64::from(floor) - i64::from(self.min_floor)) as usize)
        } else {
            None
        }
    }

    /// Grid cell index for a point coordinate.
    pub fn cell_of(&self, coord: f64) -> i32 {
        (coord / self.grid_scale as f64).floor() as i32
    }

    /// Reported distance for a run measured in grid cells.
    pub fn cells_to_distance(&self, cells: f64) -> f64 {
        cells * self.grid_scale as f64 / self.distance_divisor
    }

    /// Wall penalty for a cell whose nearest blocked cell sits on ring `radius`.
    pub fn wall_penalty(&self, radius: u32) -> f32 {
        let radius = radius.max(1);
        (self.max_penalty - (radius - 1) as f32 * self.penalty_per_wall).max(0.0)
    }

    /// Largest ring radius that can still carry a non-zero penalty.
    ///
    /// `None` when the penalty never decays (`penalty_per_wall == 0`).
    /// Never more than `MAX_PENALTY_RADIUS`.
    pub fn penalty_radius(&self) -> Option<u32> {
        if !(self.max_penalty > 0.0) {
            return Some(0);
        }
        if !(self.penalty_per_wall > 0.0) {
            return None;
        }
        let cap = constants::MAX_PENALTY_RADIUS;
        let ratio = (self.max_penalty / self.penalty_per_wall).ceil();
        let mut radius = if ratio.is_finite() && ratio < cap as f32 {
            (ratio as u32).max(1)
        } else {
            cap
        };
        // Settle f32 rounding against `wall_penalty` itself.
        while radius > 1 && self.wall_penalty(radius) <= 0.0 {
            radius -= 1;
        }
        while radius < cap && self.wall_penalty(radius + 1) > 0.0 {
            radius += 1;
        }
        Some(radius)
    }
}
