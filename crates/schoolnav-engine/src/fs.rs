//! File-backed providers.
//!
//! Grids live one per floor as `<dir>/floor_<n>.json` holding a JSON
//! `number[][]`. Points live in a single backend packet file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use schoolnav_logic::{FloorGrid, PointInventory};

use crate::error::ProviderError;
use crate::packet::decode_packet;
use crate::provider::{FloorGridProvider, PointRepository};

/// File name holding a floor's grid.
pub fn grid_file_name(floor: i32) -> String {
    format!("floor_{}.json", floor)
}

/// Reads floor grids from a directory on every request.
#[derive(Debug, Clone)]
pub struct FileGridProvider {
    dir: PathBuf,
}

impl FileGridProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, floor: i32) -> PathBuf {
        self.dir.join(grid_file_name(floor))
    }
}

impl FloorGridProvider for FileGridProvider {
    async fn load_grid(&self, floor: i32) -> Result<Arc<FloorGrid>, ProviderError> {
        let path = self.path_for(floor);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::MissingFloor(floor));
            }
            Err(e) => return Err(e.into()),
        };
        let rows: Vec<Vec<i32>> = serde_json::from_slice(&bytes)?;
        let grid = FloorGrid::from_rows(&rows)?;
        debug!(
            "[FileGrids] loaded {} ({}x{})",
            path.display(),
            grid.width(),
            grid.height()
        );
        Ok(Arc::new(grid))
    }
}

/// Reads a backend packet file.
#[derive(Debug, Clone)]
pub struct FilePointRepository {
    path: PathBuf,
}

impl FilePointRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PointRepository for FilePointRepository {
    async fn load_points(&self) -> Result<PointInventory, ProviderError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let inventory = decode_packet(&json)?;
        debug!(
            "[FilePoints] loaded {} points from {}",
            inventory.len(),
            self.path.display()
        );
        Ok(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolnav_logic::NavError;

    #[tokio::test]
    async fn test_grid_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("floor_-1.json"), "[[0,1,0],[0,0,0]]").unwrap();
        let provider = FileGridProvider::new(dir.path());
        let grid = provider.load_grid(-1).await.unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
    }

    #[tokio::test]
    async fn test_missing_floor_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileGridProvider::new(dir.path());
        assert!(matches!(
            provider.load_grid(2).await,
            Err(ProviderError::MissingFloor(2))
        ));
    }

    #[tokio::test]
    async fn test_ragged_grid_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("floor_0.json"), "[[0,0],[0]]").unwrap();
        let provider = FileGridProvider::new(dir.path());
        assert!(matches!(
            provider.load_grid(0).await,
            Err(ProviderError::Invalid(NavError::MalformedGrid(_)))
        ));
    }

    #[tokio::test]
    async fn test_points_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        std::fs::write(
            &path,
            r#"{"status":"success","data":{"rooms":[
                {"id":7,"room_number":"007","x_coordinate":3,"y_coordinate":4,"floor_number":0}
            ]}}"#,
        )
        .unwrap();
        let inv = FilePointRepository::new(&path).load_points().await.unwrap();
        assert_eq!(inv.len(), 1);
        assert!(inv.room("007").is_some());
    }
}
