//! In-memory providers for tests, demos and pre-loaded buildings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use schoolnav_logic::{FloorGrid, PointInventory};

use crate::error::ProviderError;
use crate::provider::{FloorGridProvider, PointRepository};

/// Grids held in a map. Counts loads so callers can see fan-out.
#[derive(Debug, Default)]
pub struct InMemoryGrids {
    grids: HashMap<i32, Arc<FloorGrid>>,
    loads: AtomicUsize,
}

impl InMemoryGrids {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(mut self, floor: i32, grid: FloorGrid) -> Self {
        self.insert(floor, grid);
        self
    }

    pub fn insert(&mut self, floor: i32, grid: FloorGrid) {
        self.grids.insert(floor, Arc::new(grid));
    }

    pub fn floors(&self) -> Vec<i32> {
        let mut floors: Vec<i32> = self.grids.keys().copied().collect();
        floors.sort_unstable();
        floors
    }

    pub fn get(&self, floor: i32) -> Option<&FloorGrid> {
        self.grids.get(&floor).map(|g| g.as_ref())
    }

    /// Number of `load_grid` calls served so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl FromIterator<(i32, FloorGrid)> for InMemoryGrids {
    fn from_iter<I: IntoIterator<Item = (i32, FloorGrid)>>(iter: I) -> Self {
        let mut grids = Self::new();
        for (floor, grid) in iter {
            grids.insert(floor, grid);
        }
        grids
    }
}

impl FloorGridProvider for InMemoryGrids {
    async fn load_grid(&self, floor: i32) -> Result<Arc<FloorGrid>, ProviderError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.grids
            .get(&floor)
            .cloned()
            .ok_or(ProviderError::MissingFloor(floor))
    }
}

/// A fixed inventory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPoints {
    inventory: PointInventory,
}

impl InMemoryPoints {
    pub fn new(inventory: PointInventory) -> Self {
        Self { inventory }
    }
}

impl PointRepository for InMemoryPoints {
    async fn load_points(&self) -> Result<PointInventory, ProviderError> {
        Ok(self.inventory.clone())
    }
}
