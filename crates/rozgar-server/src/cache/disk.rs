// SPDX-License-Identifier: Apache-2.0

use crate::cache::{unix_millis, CacheError};
use rozgar_model::{DataSource, DistrictDataset, DistrictId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// One record per district on durable storage: the payload, a write
/// timestamp, and the provenance tag of the tier that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskCacheEntry {
    pub data: DistrictDataset,
    pub timestamp: u64,
    pub source: DataSource,
}

/// Survives restarts; purely an optimization. Every read or write failure
/// is logged and degraded to a miss or a no-op, never propagated.
pub struct DiskCache {
    root: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Creates the cache directory when absent. A directory that cannot be
    /// created leaves the tier in permanent-miss mode rather than failing
    /// startup.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        let root = root.into();
        if let Err(e) = fs::create_dir_all(&root) {
            warn!(root = %root.display(), "disk cache directory unavailable: {e}");
        }
        Self { root, ttl }
    }

    fn entry_path(&self, district: &DistrictId) -> PathBuf {
        self.root.join(format!("{district}.json"))
    }

    pub fn load(&self, district: &DistrictId) -> Option<DiskCacheEntry> {
        let path = self.entry_path(district);
        match self.read_entry(&path) {
            Ok(Some(entry)) => {
                let age_ms = unix_millis().saturating_sub(entry.timestamp);
                if age_ms > self.ttl.as_millis() as u64 {
                    return None;
                }
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(district = %district, "disk cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    fn read_entry(&self, path: &Path) -> Result<Option<DiskCacheEntry>, CacheError> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(|e| CacheError(format!("read failed: {e}")))?;
        let entry: DiskCacheEntry = serde_json::from_slice(&bytes)
            .map_err(|e| CacheError(format!("parse failed: {e}")))?;
        Ok(Some(entry))
    }

    pub fn save(&self, district: &DistrictId, dataset: &DistrictDataset, source: DataSource) {
        let entry = DiskCacheEntry {
            data: dataset.clone(),
            timestamp: unix_millis(),
            source,
        };
        if let Err(e) = self.write_entry(district, &entry) {
            warn!(district = %district, source = %source, "disk cache write failed, skipping: {e}");
        }
    }

    fn write_entry(&self, district: &DistrictId, entry: &DiskCacheEntry) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(entry)
            .map_err(|e| CacheError(format!("serialize failed: {e}")))?;
        fs::write(self.entry_path(district), bytes)
            .map_err(|e| CacheError(format!("write failed: {e}")))
    }
}
