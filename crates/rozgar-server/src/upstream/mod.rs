// SPDX-License-Identifier: Apache-2.0

pub mod fake;
pub mod transform;

use crate::config::UpstreamConfig;
use async_trait::async_trait;
use rozgar_model::{DistrictDataset, DistrictRecord};
use serde_json::Value;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
pub struct UpstreamError(pub String);

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for UpstreamError {}

/// The remote tier seam. `Ok(None)` is a tier miss; `Err` is a failure the
/// retrieval service absorbs into a miss after recording it.
#[async_trait]
pub trait DistrictSource: Send + Sync + 'static {
    fn source_tag(&self) -> &'static str;

    /// False when the tier is unconfigured; the retrieval service skips the
    /// tier entirely without calling `fetch_district`.
    fn enabled(&self) -> bool;

    async fn fetch_district(
        &self,
        district: &DistrictRecord,
    ) -> Result<Option<DistrictDataset>, UpstreamError>;
}

/// Client for the public data.gov.in resource API. The district display name
/// resolved from the sample store is the upstream filter key.
pub struct DataGovClient {
    cfg: UpstreamConfig,
    client: reqwest::Client,
}

impl DataGovClient {
    #[must_use]
    pub fn new(cfg: UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { cfg, client }
    }

    fn resource_url(&self, resource_id: &str) -> String {
        format!(
            "{}/resource/{}",
            self.cfg.base_url.trim_end_matches('/'),
            resource_id
        )
    }
}

#[async_trait]
impl DistrictSource for DataGovClient {
    fn source_tag(&self) -> &'static str {
        "data-gov"
    }

    fn enabled(&self) -> bool {
        self.cfg.is_enabled()
    }

    #[instrument(name = "upstream_fetch_district", skip(self, district), fields(district = %district.id))]
    async fn fetch_district(
        &self,
        district: &DistrictRecord,
    ) -> Result<Option<DistrictDataset>, UpstreamError> {
        let Some((api_key, resource_id)) = self.cfg.credentials() else {
            return Ok(None);
        };
        let url = self.resource_url(resource_id);
        let params = [
            ("api-key", api_key.to_string()),
            ("format", "json".to_string()),
            ("limit", self.cfg.page_limit.to_string()),
            ("filters[district_name]", district.name.clone()),
        ];
        let mut attempt = 0;
        let mut last_error = String::new();
        loop {
            match self.client.get(&url).query(&params).send().await {
                Ok(resp) if resp.status().as_u16() == 429 => {
                    // Rate limited: defer to lower tiers rather than amplify
                    // load on the upstream.
                    warn!(district = %district.id, "upstream rate limited, deferring");
                    return Ok(None);
                }
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<Value>().await {
                        Ok(body) => {
                            let records = body
                                .get("records")
                                .and_then(Value::as_array)
                                .cloned()
                                .unwrap_or_default();
                            if records.is_empty() {
                                debug!(district = %district.id, "upstream returned no records");
                                return Ok(None);
                            }
                            return Ok(transform::dataset_from_records(district, &records));
                        }
                        Err(e) => last_error = format!("body decode failed: {e}"),
                    }
                }
                Ok(resp) => last_error = format!("status {}", resp.status()),
                Err(e) => last_error = e.to_string(),
            }
            attempt += 1;
            if attempt >= self.cfg.max_retries {
                return Err(UpstreamError(format!(
                    "upstream fetch failed after {attempt} attempts: {last_error}"
                )));
            }
            let exp = (attempt - 1).min(16) as u32;
            tokio::time::sleep(self.cfg.retry_base_delay * (1u32 << exp)).await;
        }
    }
}
