#![forbid(unsafe_code)]
//! Rozgar model SSOT.
//!
//! Every payload that crosses a tier boundary (memory cache, disk cache,
//! upstream fetch, sample store, HTTP surface) is expressed in terms of the
//! types in this crate. The wire contract is camelCase JSON.

mod dataset;
mod district;

pub use dataset::{
    DataSource, DistrictDataset, MonthlyMetric, SampleDataFile, YearlyMetric,
};
pub use district::{DistrictId, DistrictRecord, ValidationError, ID_MAX_LEN};

pub const CRATE_NAME: &str = "rozgar-model";
