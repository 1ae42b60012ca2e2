// SPDX-License-Identifier: Apache-2.0

use rozgar_model::{DistrictDataset, DistrictId, DistrictRecord, SampleDataFile};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, warn};

/// Bundled dataset of last resort, loaded once at startup. A missing or
/// malformed bundle degrades to an empty store; this tier must never fail.
pub struct SampleStore {
    districts: Vec<DistrictRecord>,
    data: HashMap<DistrictId, DistrictDataset>,
}

impl SampleStore {
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let parsed = match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<SampleDataFile>(&bytes) {
                Ok(file) => file,
                Err(e) => {
                    error!(path = %path.display(), "sample data is malformed, starting empty: {e}");
                    SampleDataFile::default()
                }
            },
            Err(e) => {
                error!(path = %path.display(), "sample data unreadable, starting empty: {e}");
                SampleDataFile::default()
            }
        };
        Self::from_file(parsed)
    }

    #[must_use]
    pub fn from_file(file: SampleDataFile) -> Self {
        let mut data = HashMap::new();
        for (raw_id, dataset) in file.data {
            match DistrictId::parse(&raw_id) {
                Ok(id) => {
                    data.insert(id, dataset);
                }
                Err(e) => warn!(id = %raw_id, "skipping sample entry with invalid id: {e}"),
            }
        }
        Self {
            districts: file.districts,
            data,
        }
    }

    #[must_use]
    pub fn districts(&self) -> &[DistrictRecord] {
        &self.districts
    }

    #[must_use]
    pub fn dataset(&self, district: &DistrictId) -> Option<&DistrictDataset> {
        self.data.get(district)
    }

    /// Resolves the display name used as the upstream filter key.
    #[must_use]
    pub fn district_record(&self, district: &DistrictId) -> Option<&DistrictRecord> {
        self.districts.iter().find(|r| &r.id == district)
    }
}
