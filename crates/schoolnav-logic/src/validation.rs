//! Building data validation.
//!
//! Pure functions over points, connectors and grids that return validation
//! errors instead of failing. Navigation itself tolerates most of what is
//! reported here (broken links are simply never followed); these checks are
//! for catching bad data before it reaches users.

use std::collections::{BTreeSet, HashSet};

use crate::config::EngineConfig;
use crate::constants::WAYPOINT_ID;
use crate::grid::{FloorGrid, GridCoord};
use crate::points::{Point, PointInventory, PointKind};

/// A data validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

impl ValidationError {
    fn error(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(category: &'static str, message: String) -> Self {
        Self {
            category,
            severity: Severity::Warning,
            message,
        }
    }
}

// ── A. Raw point lists ──────────────────────────────────────────────────

/// Check a raw point list for duplicate or reserved ids.
pub fn check_point_ids(points: &[Point]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for p in points {
        if p.id == WAYPOINT_ID {
            errors.push(ValidationError::error(
                "points",
                format!("Point {} uses reserved id {}", p.display_name(), WAYPOINT_ID),
            ));
        } else if !seen.insert(p.id) {
            errors.push(ValidationError::error(
                "points",
                format!("Duplicate point id #{}", p.id),
            ));
        }
    }
    errors
}

/// Check every point sits on a configured floor.
pub fn check_floor_range(inventory: &PointInventory, config: &EngineConfig) -> Vec<ValidationError> {
    inventory
        .iter()
        .filter(|p| !config.contains_floor(p.floor))
        .map(|p| {
            ValidationError::error(
                "floors",
                format!(
                    "Point #{} is on floor {}, outside {}..={}",
                    p.id, p.floor, config.min_floor, config.max_floor
                ),
            )
        })
        .collect()
}

// ── B. Connectors ───────────────────────────────────────────────────────

/// Check connector links point at a connector exactly one floor away in
/// the right direction.
pub fn check_connector_links(inventory: &PointInventory) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for c in inventory.connectors() {
        let PointKind::Connector { down, up } = c.kind else {
            continue;
        };
        for (direction, link) in [(-1, down), (1, up)] {
            let Some(target_id) = link else {
                continue;
            };
            let label = if direction > 0 { "up" } else { "down" };
            match inventory.get(target_id) {
                None => errors.push(ValidationError::error(
                    "connectors",
                    format!("Connector #{} {} link #{} does not exist", c.id, label, target_id),
                )),
                Some(target) if !target.is_connector() => errors.push(ValidationError::error(
                    "connectors",
                    format!(
                        "Connector #{} {} link #{} is not a connector",
                        c.id, label, target_id
                    ),
                )),
                Some(target) if target.floor != c.floor + direction => {
                    errors.push(ValidationError::error(
                        "connectors",
                        format!(
                            "Connector #{} on floor {} links {} to #{} on floor {}",
                            c.id, c.floor, label, target_id, target.floor
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }
    errors
}

/// Check links are mirrored: A.up = B should come with B.down = A.
pub fn check_connector_reciprocity(inventory: &PointInventory) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for c in inventory.connectors() {
        for direction in [-1, 1] {
            let Some(target) = c.link_toward(direction).and_then(|id| inventory.get(id)) else {
                continue;
            };
            if !target.is_connector() {
                continue; // reported by the link check
            }
            if target.link_toward(-direction) != Some(c.id) {
                errors.push(ValidationError::warning(
                    "connectors",
                    format!(
                        "Connector #{} links to #{} but #{} does not link back",
                        c.id, target.id, target.id
                    ),
                ));
            }
        }
    }
    errors
}

/// Check every pair of adjacent floors that holds points is joined by at
/// least one sound connector link.
pub fn check_floor_linkage(inventory: &PointInventory) -> Vec<ValidationError> {
    let floors: BTreeSet<i32> = inventory.iter().map(|p| p.floor).collect();
    let mut linked: HashSet<i32> = HashSet::new();
    for c in inventory.connectors() {
        let Some(target) = c.link_toward(1).and_then(|id| inventory.get(id)) else {
            continue;
        };
        if target.is_connector() && target.floor == c.floor + 1 {
            linked.insert(c.floor);
        }
    }

    let mut errors = Vec::new();
    let floors: Vec<i32> = floors.into_iter().collect();
    for pair in floors.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        if upper != lower + 1 {
            errors.push(ValidationError::warning(
                "floors",
                format!("No points between floor {} and floor {}", lower, upper),
            ));
        } else if !linked.contains(&lower) {
            errors.push(ValidationError::warning(
                "floors",
                format!("Floor {} and floor {} are not linked by any connector", lower, upper),
            ));
        }
    }
    errors
}

// ── C. Grids ────────────────────────────────────────────────────────────

/// Check points land inside their floor's grid on a walkable cell.
///
/// `grid_for` returns the grid of a floor; floors without a grid are
/// skipped.
pub fn check_points_on_grid<'g>(
    inventory: &PointInventory,
    grid_for: impl Fn(i32) -> Option<&'g FloorGrid>,
    config: &EngineConfig,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for p in inventory.iter() {
        let Some(grid) = grid_for(p.floor) else {
            continue;
        };
        let cell = GridCoord::from_coords(p.x, p.y, config);
        if !grid.in_bounds(cell) {
            errors.push(ValidationError::warning(
                "grid",
                format!(
                    "Point {} at ({:.1},{:.1}) is outside the {}×{} grid of floor {}",
                    p.display_name(),
                    p.x,
                    p.y,
                    grid.width(),
                    grid.height(),
                    p.floor
                ),
            ));
        } else if grid.is_blocked(cell) {
            errors.push(ValidationError::warning(
                "grid",
                format!(
                    "Point {} sits on blocked cell ({},{}) of floor {}",
                    p.display_name(),
                    cell.x,
                    cell.y,
                    p.floor
                ),
            ));
        }
    }
    errors
}

/// Run every inventory check. Grid checks run only for floors `grid_for`
/// has a grid for.
pub fn validate_inventory<'g>(
    inventory: &PointInventory,
    grid_for: impl Fn(i32) -> Option<&'g FloorGrid>,
    config: &EngineConfig,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_floor_range(inventory, config));
    all.extend(check_connector_links(inventory));
    all.extend(check_connector_reciprocity(inventory));
    all.extend(check_floor_linkage(inventory));
    all.extend(check_points_on_grid(inventory, grid_for, config));
    all
}

/// True when no error-severity findings are present.
pub fn is_clean(errors: &[ValidationError]) -> bool {
    errors.iter().all(|e| e.severity != Severity::Error)
}
