//! Turn-by-turn maneuvers from a point path.
//!
//! Directions are measured between the grid cells of consecutive points, so
//! distances and path cells share one scale. Turns are classified by the
//! sign of the 2-D cross product of the previous and next heading, taken in
//! a y-up frame (plan coordinates grow downward, so y is flipped first):
//! positive is a left turn, negative a right turn, zero keeps going straight.
//!
//! Straight runs merge into one maneuver. A floor change is only accepted
//! between two linked connectors and becomes a single up/down maneuver;
//! anything else crossing floors is an invariant violation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{NavError, NavResult};
use crate::grid::GridCoord;
use crate::points::{floor_label, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    Straight,
    Left,
    Right,
    Up,
    Down,
}

impl Instruction {
    pub fn is_turn(self) -> bool {
        matches!(self, Instruction::Left | Instruction::Right)
    }

    pub fn is_floor_change(self) -> bool {
        matches!(self, Instruction::Up | Instruction::Down)
    }
}

/// One instruction, its distance, and the point it applies at.
///
/// Straight maneuvers are anchored at the end of the run, turns at the
/// corner, and up/down at the connector being left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub instruction: Instruction,
    pub distance: f64,
    pub point: Point,
}

impl Maneuver {
    pub fn new(instruction: Instruction, distance: f64, point: Point) -> Self {
        Self {
            instruction,
            distance,
            point,
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instruction {
            Instruction::Straight => write!(f, "Go straight {:.2}", self.distance),
            Instruction::Left => write!(f, "Turn left"),
            Instruction::Right => write!(f, "Turn right"),
            Instruction::Up => write!(f, "Go up from {}", floor_label(self.point.floor)),
            Instruction::Down => write!(f, "Go down from {}", floor_label(self.point.floor)),
        }
    }
}

/// Cross product of two headings in a y-up frame.
fn cross_y_up(a: (i32, i32), b: (i32, i32)) -> i64 {
    let (ax, ay) = (a.0 as i64, -(a.1 as i64));
    let (bx, by) = (b.0 as i64, -(b.1 as i64));
    ax * by - ay * bx
}

fn dot(a: (i32, i32), b: (i32, i32)) -> i64 {
    a.0 as i64 * b.0 as i64 + a.1 as i64 * b.1 as i64
}

/// Turn direction from `previous` to `next` heading, `None` when collinear.
pub fn classify_turn(previous: (i32, i32), next: (i32, i32)) -> Option<Instruction> {
    match cross_y_up(previous, next).signum() {
        1 => Some(Instruction::Left),
        -1 => Some(Instruction::Right),
        _ => None,
    }
}

/// Up/down instruction for a connector hop, checking the link is real.
fn floor_change(from: &Point, to: &Point) -> NavResult<Instruction> {
    let delta = to.floor - from.floor;
    if delta.abs() != 1 {
        return Err(NavError::InvariantViolation(format!(
            "path jumps {} floors between #{} and #{}",
            delta, from.id, to.id
        )));
    }
    if from.link_toward(delta) != Some(to.id) {
        return Err(NavError::InvariantViolation(format!(
            "floor change between #{} (floor {}) and #{} (floor {}) is not a connector link",
            from.id, from.floor, to.id, to.floor
        )));
    }
    Ok(if delta > 0 {
        Instruction::Up
    } else {
        Instruction::Down
    })
}

/// Build the maneuver list for an ordered point path.
///
/// Paths shorter than two points yield no maneuvers.
pub fn generate_maneuvers(path: &[Point], config: &EngineConfig) -> NavResult<Vec<Maneuver>> {
    let mut maneuvers = Vec::new();
    let Some(first) = path.first() else {
        return Ok(maneuvers);
    };

    let mut prev = first;
    let mut heading: Option<(i32, i32)> = None;
    let mut run = 0.0f64;

    for curr in &path[1..] {
        if curr.floor != prev.floor {
            let instruction = floor_change(prev, curr)?;
            if run > 0.0 {
                maneuvers.push(Maneuver::new(
                    Instruction::Straight,
                    config.cells_to_distance(run),
                    prev.clone(),
                ));
            }
            maneuvers.push(Maneuver::new(
                instruction,
                config.floor_change_distance,
                prev.clone(),
            ));
            heading = None;
            run = 0.0;
            prev = curr;
            continue;
        }

        let a = GridCoord::from_coords(prev.x, prev.y, config);
        let b = GridCoord::from_coords(curr.x, curr.y, config);
        let step = (b.x - a.x, b.y - a.y);
        if step == (0, 0) {
            continue;
        }
        let length = (step.0 as f64).hypot(step.1 as f64);

        match heading {
            None => {
                heading = Some(step);
                run = length;
            }
            Some(h) => match classify_turn(h, step) {
                None if dot(h, step) < 0 => {
                    return Err(NavError::InvariantViolation(format!(
                        "path reverses direction at ({:.1}, {:.1})",
                        prev.x, prev.y
                    )));
                }
                None => run += length,
                Some(turn) => {
                    maneuvers.push(Maneuver::new(
                        Instruction::Straight,
                        config.cells_to_distance(run),
                        prev.clone(),
                    ));
                    maneuvers.push(Maneuver::new(turn, 0.0, prev.clone()));
                    heading = Some(step);
                    run = length;
                }
            },
        }
        prev = curr;
    }

    if run > 0.0 {
        maneuvers.push(Maneuver::new(
            Instruction::Straight,
            config.cells_to_distance(run),
            prev.clone(),
        ));
    }
    Ok(maneuvers)
}

/// Sum of straight-run distances.
pub fn straight_distance(maneuvers: &[Maneuver]) -> f64 {
    maneuvers
        .iter()
        .filter(|m| m.instruction == Instruction::Straight)
        .map(|m| m.distance)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(cx: i32, cy: i32) -> Point {
        Point::waypoint(cx as f64 * 5.0, cy as f64 * 5.0, 0)
    }

    fn instructions(maneuvers: &[Maneuver]) -> Vec<Instruction> {
        maneuvers.iter().map(|m| m.instruction).collect()
    }

    #[test]
    fn test_short_paths_are_empty() {
        let config = EngineConfig::default();
        assert!(generate_maneuvers(&[], &config).unwrap().is_empty());
        assert!(generate_maneuvers(&[wp(0, 0)], &config).unwrap().is_empty());
    }

    #[test]
    fn test_straight_corridor_merges() {
        let config = EngineConfig::default();
        let path: Vec<Point> = (0..5).map(|x| wp(x, 2)).collect();
        let maneuvers = generate_maneuvers(&path, &config).unwrap();
        assert_eq!(maneuvers.len(), 1);
        assert_eq!(maneuvers[0].instruction, Instruction::Straight);
        // 4 cells * 5 units / 100
        assert!((maneuvers[0].distance - 0.2).abs() < 1e-9);
        assert_eq!(maneuvers[0].point, wp(4, 2));
    }

    #[test]
    fn test_right_turn_in_plan_coordinates() {
        // East along y=0, then toward larger y (down the page): a right turn.
        let config = EngineConfig::default();
        let path = vec![wp(0, 0), wp(1, 0), wp(2, 0), wp(2, 1), wp(2, 2)];
        let maneuvers = generate_maneuvers(&path, &config).unwrap();
        assert_eq!(
            instructions(&maneuvers),
            vec![Instruction::Straight, Instruction::Right, Instruction::Straight]
        );
        assert!((maneuvers[0].distance - 0.1).abs() < 1e-9);
        assert_eq!(maneuvers[1].point, wp(2, 0));
        assert_eq!(maneuvers[1].distance, 0.0);
        assert!((maneuvers[2].distance - 0.1).abs() < 1e-9);
        assert_eq!(maneuvers[2].point, wp(2, 2));
    }

    #[test]
    fn test_left_turn_in_plan_coordinates() {
        let config = EngineConfig::default();
        let path = vec![wp(0, 2), wp(1, 2), wp(2, 2), wp(2, 1), wp(2, 0)];
        let maneuvers = generate_maneuvers(&path, &config).unwrap();
        assert_eq!(
            instructions(&maneuvers),
            vec![Instruction::Straight, Instruction::Left, Instruction::Straight]
        );
    }

    #[test]
    fn test_classify_turn_sign_convention() {
        assert_eq!(classify_turn((1, 0), (0, -1)), Some(Instruction::Left));
        assert_eq!(classify_turn((1, 0), (0, 1)), Some(Instruction::Right));
        assert_eq!(classify_turn((0, 1), (1, 0)), Some(Instruction::Left));
        assert_eq!(classify_turn((1, 0), (3, 0)), None);
    }

    #[test]
    fn test_duplicate_points_are_skipped() {
        let config = EngineConfig::default();
        let path = vec![wp(0, 0), wp(0, 0), wp(1, 0), wp(1, 0), wp(2, 0)];
        let maneuvers = generate_maneuvers(&path, &config).unwrap();
        assert_eq!(maneuvers.len(), 1);
        assert!((maneuvers[0].distance - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_reversal_is_rejected() {
        let config = EngineConfig::default();
        let path = vec![wp(0, 0), wp(1, 0), wp(0, 0)];
        assert!(matches!(
            generate_maneuvers(&path, &config),
            Err(NavError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_connector_hop_emits_single_up() {
        let config = EngineConfig::default();
        let lower = Point::connector(1, 10.0, 10.0, 0, None, Some(2));
        let upper = Point::connector(2, 10.0, 10.0, 1, Some(1), None);
        let maneuvers = generate_maneuvers(&[lower.clone(), upper], &config).unwrap();
        assert_eq!(maneuvers.len(), 1);
        assert_eq!(maneuvers[0].instruction, Instruction::Up);
        assert_eq!(maneuvers[0].distance, config.floor_change_distance);
        assert_eq!(maneuvers[0].point, lower);
    }

    #[test]
    fn test_connector_hop_down() {
        let config = EngineConfig::default();
        let upper = Point::connector(2, 10.0, 10.0, 1, Some(1), None);
        let lower = Point::connector(1, 10.0, 10.0, 0, None, Some(2));
        let maneuvers = generate_maneuvers(&[upper, lower], &config).unwrap();
        assert_eq!(instructions(&maneuvers), vec![Instruction::Down]);
    }

    #[test]
    fn test_unlinked_floor_change_fails() {
        let config = EngineConfig::default();
        let a = Point::waypoint(0.0, 0.0, 0);
        let b = Point::waypoint(0.0, 0.0, 1);
        assert!(matches!(
            generate_maneuvers(&[a, b], &config),
            Err(NavError::InvariantViolation(_))
        ));

        let skip_a = Point::connector(1, 0.0, 0.0, 0, None, Some(3));
        let skip_b = Point::connector(3, 0.0, 0.0, 2, Some(1), None);
        assert!(generate_maneuvers(&[skip_a, skip_b], &config).is_err());
    }

    #[test]
    fn test_straight_distance_sums_runs() {
        let config = EngineConfig::default();
        let path = vec![wp(0, 0), wp(1, 0), wp(2, 0), wp(2, 1), wp(2, 2), wp(2, 3)];
        let maneuvers = generate_maneuvers(&path, &config).unwrap();
        assert!((straight_distance(&maneuvers) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        let m = Maneuver::new(Instruction::Straight, 0.35, wp(0, 0));
        assert_eq!(m.to_string(), "Go straight 0.35");
        let up = Maneuver::new(Instruction::Up, 0.0, wp(0, 0));
        assert_eq!(up.to_string(), "Go up from ground floor");
    }
}
