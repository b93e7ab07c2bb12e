//! Collaborator traits the navigator consumes.
//!
//! Both are async and take `&self` so one provider can serve concurrent
//! requests. Grids are handed out behind `Arc` so a search can run on a
//! blocking thread without copying the matrix.

use std::future::Future;
use std::sync::Arc;

use schoolnav_logic::{FloorGrid, PointInventory};

use crate::error::ProviderError;

/// Supplies one walkability grid per floor.
pub trait FloorGridProvider: Send + Sync + 'static {
    fn load_grid(
        &self,
        floor: i32,
    ) -> impl Future<Output = Result<Arc<FloorGrid>, ProviderError>> + Send;
}

/// Supplies every addressable point of the building.
pub trait PointRepository: Send + Sync {
    fn load_points(&self) -> impl Future<Output = Result<PointInventory, ProviderError>> + Send;
}

impl<T: FloorGridProvider> FloorGridProvider for Arc<T> {
    fn load_grid(
        &self,
        floor: i32,
    ) -> impl Future<Output = Result<Arc<FloorGrid>, ProviderError>> + Send {
        (**self).load_grid(floor)
    }
}
