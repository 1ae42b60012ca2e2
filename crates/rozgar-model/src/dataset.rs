// SPDX-License-Identifier: Apache-2.0

use crate::district::{DistrictRecord, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Provenance tag recording which tier originally produced a persisted
/// cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Api,
    Sample,
    Cache,
}

impl Display for DataSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Api => write!(f, "api"),
            DataSource::Sample => write!(f, "sample"),
            DataSource::Cache => write!(f, "cache"),
        }
    }
}

/// One reporting month of program metrics. Metric fields are `u64`, so
/// non-negativity holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetric {
    pub month: String,
    pub month_marathi: String,
    pub people_benefited: u64,
    pub person_days: u64,
    pub wages_paid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Aggregated metrics for one historical year. `year` uniquely identifies
/// the entry within a district's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyMetric {
    pub year: i32,
    pub total_people_benefited: u64,
    pub total_person_days: u64,
    pub total_wages_paid: u64,
    pub monthly_data: Vec<MonthlyMetric>,
}

/// The aggregate returned for one district: the unit of caching, transport,
/// and validation. Treated as a value; never partially updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictDataset {
    pub district: String,
    pub district_marathi: String,
    pub total_people_benefited: u64,
    pub total_person_days: u64,
    pub total_wages_paid: u64,
    pub last_updated: String,
    pub monthly_data: Vec<MonthlyMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<Vec<YearlyMetric>>,
}

impl DistrictDataset {
    /// Shape checks applied before a dataset leaves the API surface. Serde
    /// already enforces field presence and numeric typing; this guards the
    /// string fields a deserializer cannot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.district.trim().is_empty() {
            return Err(ValidationError("district name must not be empty".to_string()));
        }
        if self.district_marathi.trim().is_empty() {
            return Err(ValidationError(
                "district marathi name must not be empty".to_string(),
            ));
        }
        if self.last_updated.trim().is_empty() {
            return Err(ValidationError("lastUpdated must not be empty".to_string()));
        }
        for m in &self.monthly_data {
            if m.month.trim().is_empty() {
                return Err(ValidationError(
                    "monthly entry is missing a month label".to_string(),
                ));
            }
        }
        if let Some(years) = &self.historical_data {
            for y in years {
                if y.year <= 0 {
                    return Err(ValidationError(format!(
                        "historical entry has invalid year {}",
                        y.year
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Bundled input loaded once at startup: the dataset of last resort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDataFile {
    #[serde(default)]
    pub districts: Vec<DistrictRecord>,
    #[serde(default)]
    pub data: HashMap<String, DistrictDataset>,
}
