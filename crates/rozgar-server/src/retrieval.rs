// SPDX-License-Identifier: Apache-2.0

use crate::cache::disk::DiskCache;
use crate::cache::memory::MemoryCache;
use crate::sample::SampleStore;
use crate::upstream::DistrictSource;
use rozgar_model::{DataSource, DistrictDataset, DistrictId, DistrictRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct RetrievalMetrics {
    pub memory_hits: AtomicU64,
    pub disk_hits: AtomicU64,
    pub upstream_hits: AtomicU64,
    pub sample_hits: AtomicU64,
    pub misses: AtomicU64,
    pub upstream_failures: AtomicU64,
}

impl RetrievalMetrics {
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();
        for (name, value) in [
            ("rozgar_memory_cache_hits_total", &self.memory_hits),
            ("rozgar_disk_cache_hits_total", &self.disk_hits),
            ("rozgar_upstream_hits_total", &self.upstream_hits),
            ("rozgar_sample_hits_total", &self.sample_hits),
            ("rozgar_misses_total", &self.misses),
            ("rozgar_upstream_failures_total", &self.upstream_failures),
        ] {
            out.push_str(&format!("{name} {}\n", value.load(Ordering::Relaxed)));
        }
        out
    }
}

/// Composes the four tiers into one lookup with a fixed precedence order:
/// memory, disk, upstream, sample. The first hit wins; every hit below the
/// memory tier is written back upward before returning. Constructed once at
/// startup and shared by handle; no ambient singletons.
pub struct RetrievalService {
    memory: MemoryCache,
    disk: DiskCache,
    upstream: Arc<dyn DistrictSource>,
    sample: SampleStore,
    pub metrics: Arc<RetrievalMetrics>,
}

impl RetrievalService {
    pub fn new(
        memory: MemoryCache,
        disk: DiskCache,
        upstream: Arc<dyn DistrictSource>,
        sample: SampleStore,
    ) -> Arc<Self> {
        Arc::new(Self {
            memory,
            disk,
            upstream,
            sample,
            metrics: Arc::new(RetrievalMetrics::default()),
        })
    }

    /// District identity and metadata come from the bundle alone; they are
    /// never fetched remotely or cached separately.
    #[must_use]
    pub fn districts(&self) -> &[DistrictRecord] {
        self.sample.districts()
    }

    pub async fn district_data(&self, district: &DistrictId) -> Option<DistrictDataset> {
        if let Some(dataset) = self.memory.get(district).await {
            self.metrics.memory_hits.fetch_add(1, Ordering::Relaxed);
            debug!(district = %district, "memory cache hit");
            return Some(dataset);
        }

        if let Some(entry) = self.disk.load(district) {
            self.metrics.disk_hits.fetch_add(1, Ordering::Relaxed);
            debug!(district = %district, source = %entry.source, "disk cache hit");
            self.memory.put(district, entry.data.clone()).await;
            return Some(entry.data);
        }

        if self.upstream.enabled() {
            // The upstream filter key is the display name, resolved from the
            // bundle; a district unknown to the bundle cannot be fetched.
            if let Some(record) = self.sample.district_record(district) {
                match self.upstream.fetch_district(record).await {
                    Ok(Some(dataset)) => {
                        self.metrics.upstream_hits.fetch_add(1, Ordering::Relaxed);
                        info!(district = %district, source = self.upstream.source_tag(),
                            "upstream fetch succeeded");
                        self.disk.save(district, &dataset, DataSource::Api);
                        self.memory.put(district, dataset.clone()).await;
                        return Some(dataset);
                    }
                    Ok(None) => {
                        debug!(district = %district, "upstream tier miss");
                    }
                    Err(e) => {
                        self.metrics
                            .upstream_failures
                            .fetch_add(1, Ordering::Relaxed);
                        warn!(district = %district, "upstream fetch failed, falling back: {e}");
                    }
                }
            }
        }

        if let Some(dataset) = self.sample.dataset(district) {
            self.metrics.sample_hits.fetch_add(1, Ordering::Relaxed);
            debug!(district = %district, "serving bundled sample data");
            self.disk.save(district, dataset, DataSource::Sample);
            self.memory.put(district, dataset.clone()).await;
            return Some(dataset.clone());
        }

        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        None
    }
}
