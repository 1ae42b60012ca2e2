// SPDX-License-Identifier: Apache-2.0

use crate::cache::unix_millis;
use rozgar_model::{DistrictDataset, DistrictId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct CacheEntry {
    pub dataset: DistrictDataset,
    pub stored_at_ms: u64,
}

/// Process-lifetime cache, fastest tier, lost on restart. Eviction is lazy,
/// on read; there is no background sweep. Entries are independent per key,
/// so last-writer-wins replacement is the only discipline required.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<DistrictId, CacheEntry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, district: &DistrictId) -> Option<DistrictDataset> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get(district)?;
        let age_ms = unix_millis().saturating_sub(entry.stored_at_ms);
        if age_ms > self.ttl.as_millis() as u64 {
            entries.remove(district);
            return None;
        }
        Some(entry.dataset.clone())
    }

    pub async fn put(&self, district: &DistrictId, dataset: DistrictDataset) {
        self.put_at(district, dataset, unix_millis()).await;
    }

    pub(crate) async fn put_at(
        &self,
        district: &DistrictId,
        dataset: DistrictDataset,
        stored_at_ms: u64,
    ) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            district.clone(),
            CacheEntry {
                dataset,
                stored_at_ms,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
