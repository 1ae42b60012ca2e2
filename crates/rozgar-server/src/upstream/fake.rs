// SPDX-License-Identifier: Apache-2.0

use crate::upstream::{DistrictSource, UpstreamError};
use async_trait::async_trait;
use rozgar_model::{DistrictDataset, DistrictId, DistrictRecord};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use tokio::sync::Mutex;

/// In-memory stand-in for the remote tier; substitutes for `DataGovClient`
/// in retrieval tests.
pub struct FakeSource {
    pub datasets: Mutex<HashMap<DistrictId, DistrictDataset>>,
    pub fetch_calls: AtomicU64,
    pub enabled: bool,
    pub fail_with: Option<String>,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            datasets: Mutex::new(HashMap::new()),
            fetch_calls: AtomicU64::new(0),
            enabled: true,
            fail_with: None,
        }
    }
}

#[async_trait]
impl DistrictSource for FakeSource {
    fn source_tag(&self) -> &'static str {
        "fake"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn fetch_district(
        &self,
        district: &DistrictRecord,
    ) -> Result<Option<DistrictDataset>, UpstreamError> {
        self.fetch_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if let Some(message) = &self.fail_with {
            return Err(UpstreamError(message.clone()));
        }
        Ok(self.datasets.lock().await.get(&district.id).cloned())
    }
}
