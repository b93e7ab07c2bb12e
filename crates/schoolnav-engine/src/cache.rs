//! On-disk point cache.
//!
//! Uses bincode for a compact snapshot of the whole point inventory so a
//! client can start navigating before the backend answers. Snapshots carry
//! a format version; a snapshot from another version is a miss.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use schoolnav_logic::{Point, PointInventory};

use crate::error::ProviderError;
use crate::provider::PointRepository;

/// Version number for cache file format (increment when format changes)
pub const CACHE_VERSION: u32 = 1;

/// Serializable snapshot of a point inventory
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheData {
    /// Cache format version
    pub version: u32,
    /// Seconds since the Unix epoch when the snapshot was written
    pub saved_at: u64,
    /// Points in inventory order
    pub points: Vec<Point>,
}

/// Write an inventory snapshot to a writer
pub fn write_snapshot<W: Write>(writer: W, inventory: &PointInventory) -> Result<(), ProviderError> {
    let saved_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let data = CacheData {
        version: CACHE_VERSION,
        saved_at,
        points: inventory.iter().cloned().collect(),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read an inventory snapshot from a reader
pub fn read_snapshot<R: Read>(reader: R) -> Result<PointInventory, ProviderError> {
    let data: CacheData = bincode::deserialize_from(reader)?;
    if data.version != CACHE_VERSION {
        return Err(ProviderError::CacheVersion {
            expected: CACHE_VERSION,
            found: data.version,
        });
    }
    Ok(PointInventory::new(data.points)?)
}

/// A cache file location.
#[derive(Debug, Clone)]
pub struct PointCache {
    path: PathBuf,
}

impl PointCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached inventory, `Ok(None)` when no cache file exists.
    pub async fn load(&self) -> Result<Option<PointInventory>, ProviderError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        read_snapshot(bytes.as_slice()).map(Some)
    }

    pub async fn store(&self, inventory: &PointInventory) -> Result<(), ProviderError> {
        let mut buffer = Vec::new();
        write_snapshot(&mut buffer, inventory)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, buffer).await?;
        debug!(
            "[PointCache] stored {} points in {}",
            inventory.len(),
            self.path.display()
        );
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), ProviderError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serves points from the cache, falling back to `inner` on a miss and
/// refreshing the cache with what it returns.
#[derive(Debug, Clone)]
pub struct CachedPointRepository<R> {
    inner: R,
    cache: PointCache,
}

impl<R: PointRepository> CachedPointRepository<R> {
    pub fn new(inner: R, cache: PointCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &PointCache {
        &self.cache
    }

    /// Bypass the cache and rewrite it from the inner repository.
    pub async fn refresh(&self) -> Result<PointInventory, ProviderError> {
        let inventory = self.inner.load_points().await?;
        if let Err(e) = self.cache.store(&inventory).await {
            warn!("[PointCache] could not write {}: {}", self.cache.path().display(), e);
        }
        Ok(inventory)
    }
}

impl<R: PointRepository> PointRepository for CachedPointRepository<R> {
    async fn load_points(&self) -> Result<PointInventory, ProviderError> {
        match self.cache.load().await {
            Ok(Some(inventory)) => {
                debug!("[PointCache] hit: {} points", inventory.len());
                return Ok(inventory);
            }
            Ok(None) => info!("[PointCache] miss, loading from source"),
            Err(e) => warn!("[PointCache] unusable cache, reloading: {}", e),
        }
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPoints;

    fn inventory() -> PointInventory {
        PointInventory::new(vec![
            Point::room(1, 12.0, 7.5, 0, "001").with_description("Office"),
            Point::exit(2, 0.0, 7.5, 0, "West", true),
            Point::connector(3, 40.0, 7.5, 0, None, Some(4)),
            Point::connector(4, 40.0, 7.5, 1, Some(3), None),
        ])
        .unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut buffer = Vec::new();
        write_snapshot(&mut buffer, &inventory()).expect("Save failed");
        let loaded = read_snapshot(&buffer[..]).expect("Load failed");
        assert_eq!(loaded, inventory());
    }

    #[test]
    fn test_foreign_version_rejected() {
        let data = CacheData {
            version: CACHE_VERSION + 1,
            saved_at: 0,
            points: vec![],
        };
        let buffer = bincode::serialize(&data).unwrap();
        assert!(matches!(
            read_snapshot(&buffer[..]),
            Err(ProviderError::CacheVersion { found, .. }) if found == CACHE_VERSION + 1
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            read_snapshot(&[1u8, 2, 3][..]),
            Err(ProviderError::Bincode(_))
        ));
    }

    #[tokio::test]
    async fn test_cached_repository_fills_then_hits() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PointCache::new(dir.path().join("cache").join("points.bin"));
        assert!(cache.load().await.unwrap().is_none());

        let repo = CachedPointRepository::new(InMemoryPoints::new(inventory()), cache.clone());
        let first = repo.load_points().await.unwrap();
        assert_eq!(first, inventory());
        assert_eq!(cache.load().await.unwrap(), Some(inventory()));

        // A repository with nothing behind it is served from the cache.
        let offline = CachedPointRepository::new(InMemoryPoints::default(), cache.clone());
        assert_eq!(offline.load_points().await.unwrap(), inventory());

        cache.clear().await.unwrap();
        assert!(offline.load_points().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.bin");
        std::fs::write(&path, b"not bincode").unwrap();
        let repo = CachedPointRepository::new(InMemoryPoints::new(inventory()), PointCache::new(&path));
        assert_eq!(repo.load_points().await.unwrap(), inventory());
        assert_eq!(PointCache::new(&path).load().await.unwrap(), Some(inventory()));
    }
}
