//! Async navigation orchestrator.
//!
//! A `Navigator` owns one snapshot of the building's points and the
//! connector graph built from it, and fetches floor grids on demand. Each
//! request is planned into segments; walk segments fetch their grid
//! concurrently and search it on a blocking thread, climbs need no search.
//! Legs come back in segment order and are stitched into a `Navigation`.
//! The first failing segment fails the request and the rest are dropped.

use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, info, warn};

use schoolnav_logic::connectors::ConnectorGraph;
use schoolnav_logic::route::{resolve_segment, route_segments, stitch, Leg, Segment};
use schoolnav_logic::validation::{self, ValidationError};
use schoolnav_logic::{EngineConfig, NavError, NavResult, Navigation, Point, PointInventory};

use crate::error::ProviderError;
use crate::provider::{FloorGridProvider, PointRepository};

pub struct Navigator<G> {
    grids: Arc<G>,
    inventory: Arc<PointInventory>,
    graph: Arc<ConnectorGraph>,
    config: Arc<EngineConfig>,
}

impl<G> Clone for Navigator<G> {
    fn clone(&self) -> Self {
        Self {
            grids: Arc::clone(&self.grids),
            inventory: Arc::clone(&self.inventory),
            graph: Arc::clone(&self.graph),
            config: Arc::clone(&self.config),
        }
    }
}

impl<G: FloorGridProvider> Navigator<G> {
    pub fn new(grids: G, inventory: PointInventory, config: EngineConfig) -> NavResult<Self> {
        config.validate()?;
        let graph = ConnectorGraph::from_inventory(&inventory);
        info!(
            "[Navigator] {} points, {} connectors on floors {:?}",
            inventory.len(),
            graph.connector_count(),
            inventory.floors()
        );
        Ok(Self {
            grids: Arc::new(grids),
            inventory: Arc::new(inventory),
            graph: Arc::new(graph),
            config: Arc::new(config),
        })
    }

    /// Load the point snapshot from a repository and build a navigator.
    pub async fn from_repository<R: PointRepository>(
        grids: G,
        points: &R,
        config: EngineConfig,
    ) -> Result<Self, ProviderError> {
        let inventory = points.load_points().await?;
        Ok(Self::new(grids, inventory, config)?)
    }

    pub fn inventory(&self) -> &PointInventory {
        &self.inventory
    }

    pub fn graph(&self) -> &ConnectorGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grids(&self) -> &G {
        &self.grids
    }

    /// Directions from `from` to `to`, `None` when there is no route.
    ///
    /// The failure reason is logged; use [`try_navigate`](Self::try_navigate)
    /// to get it.
    pub async fn navigate(&self, from: &Point, to: &Point) -> Option<Navigation> {
        match self.try_navigate(from, to).await {
            Ok(navigation) => Some(navigation),
            Err(e) => {
                warn!("[Navigator] no route from {} to {}: {}", from, to, e);
                None
            }
        }
    }

    pub async fn try_navigate(&self, from: &Point, to: &Point) -> NavResult<Navigation> {
        let segments = route_segments(&self.inventory, &self.graph, from, to, &self.config)?;
        debug!(
            "[Navigator] {} -> {}: {} segments over floors {:?}",
            from,
            to,
            segments.len(),
            segments.iter().map(Segment::floor).collect::<Vec<_>>()
        );

        let legs = try_join_all(segments.into_iter().map(|s| self.resolve(s))).await?;
        let navigation = stitch(legs, to.floor, &self.config)?;
        info!(
            "[Navigator] {} -> {}: {} maneuvers, {} floor changes",
            from,
            to,
            navigation.step_count(),
            navigation.floor_changes()
        );
        Ok(navigation)
    }

    /// Navigate between two inventory point ids.
    pub async fn try_navigate_ids(&self, from: u32, to: u32) -> NavResult<Navigation> {
        let lookup = |id: u32| {
            self.inventory
                .get(id)
                .ok_or_else(|| NavError::InvalidInventory(format!("no point with id {}", id)))
        };
        let (from, to) = (lookup(from)?, lookup(to)?);
        self.try_navigate(from, to).await
    }

    /// Check the point snapshot against the grids of every floor it uses.
    ///
    /// Floors whose grid cannot be loaded are reported as errors.
    pub async fn validate(&self) -> Vec<ValidationError> {
        let floors = self.inventory.floors();
        let loads = floors.iter().map(|&floor| self.grids.load_grid(floor));
        let results = futures::future::join_all(loads).await;

        let mut grids = std::collections::HashMap::new();
        let mut errors = Vec::new();
        for (floor, result) in floors.into_iter().zip(results) {
            match result {
                Ok(grid) => {
                    grids.insert(floor, grid);
                }
                Err(e) => errors.push(ValidationError {
                    category: "grid",
                    severity: validation::Severity::Error,
                    message: format!("Grid for floor {} unavailable: {}", floor, e),
                }),
            }
        }
        errors.extend(validation::validate_inventory(
            &self.inventory,
            |f| grids.get(&f).map(|g| &**g),
            &self.config,
        ));
        errors
    }

    async fn resolve(&self, segment: Segment) -> NavResult<Leg> {
        let floor = match &segment {
            Segment::Walk { floor, .. } => *floor,
            Segment::Climb { .. } => {
                return resolve_segment(&segment, None, &self.inventory, &self.config);
            }
        };
        let grid = self
            .grids
            .load_grid(floor)
            .await
            .map_err(|e| e.into_grid_error(floor))?;

        let inventory = Arc::clone(&self.inventory);
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            resolve_segment(&segment, Some(&*grid), &inventory, &config)
        })
        .await
        .map_err(|e| NavError::InvariantViolation(format!("search task failed: {}", e)))?
    }
}
