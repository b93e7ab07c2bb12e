//! Step-through state for one navigation.
//!
//! A session is owned by whoever shows the directions. It flattens the
//! navigation into traversal order and keeps a cursor that clamps at both
//! ends. Dropping the session ends it.

use schoolnav_logic::{Maneuver, Navigation};

#[derive(Debug, Clone)]
pub struct NavigationSession {
    navigation: Navigation,
    steps: Vec<Maneuver>,
    cursor: usize,
}

impl NavigationSession {
    pub fn new(navigation: Navigation) -> Self {
        let steps = navigation.steps().cloned().collect();
        Self {
            navigation,
            steps,
            cursor: 0,
        }
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn steps(&self) -> &[Maneuver] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Maneuver> {
        self.steps.get(self.cursor)
    }

    /// Floor of the current maneuver, or the start floor of an empty route.
    pub fn current_floor(&self) -> Option<i32> {
        self.current()
            .map(|m| m.point.floor)
            .or_else(|| self.navigation.start_floor())
    }

    /// Anchor of the current maneuver.
    pub fn current_position(&self) -> Option<(f64, f64)> {
        self.current().map(|m| (m.point.x, m.point.y))
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.steps.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Advance one step; stays on the last step.
    pub fn next_step(&mut self) -> Option<&Maneuver> {
        if self.has_next() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Go back one step; stays on the first step.
    pub fn previous_step(&mut self) -> Option<&Maneuver> {
        if self.has_previous() {
            self.cursor -= 1;
        }
        self.current()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Up to `n` maneuvers starting at the current one.
    pub fn upcoming(&self, n: usize) -> &[Maneuver] {
        let start = self.cursor.min(self.steps.len());
        let end = start.saturating_add(n).min(self.steps.len());
        &self.steps[start..end]
    }

    /// Maneuver anchors on `floor` as a flat `[x, y, x, y, ...]` polyline.
    pub fn floor_path(&self, floor: i32) -> Vec<f64> {
        self.navigation
            .floor(floor)
            .iter()
            .flat_map(|m| [m.point.x, m.point.y])
            .collect()
    }

    /// Polyline for the floor of the current maneuver.
    pub fn current_floor_path(&self) -> Vec<f64> {
        self.current_floor()
            .map(|floor| self.floor_path(floor))
            .unwrap_or_default()
    }
}

impl From<Navigation> for NavigationSession {
    fn from(navigation: Navigation) -> Self {
        Self::new(navigation)
    }
}
