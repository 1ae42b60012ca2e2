#![forbid(unsafe_code)]

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

mod cache;
mod config;
mod http;
mod retrieval;
mod sample;
mod upstream;

pub const CRATE_NAME: &str = "rozgar-server";

pub use cache::disk::{DiskCache, DiskCacheEntry};
pub use cache::memory::MemoryCache;
pub use cache::CacheError;
pub use config::{
    validate_startup_config, ServerConfig, UpstreamConfig, CACHE_DURATION, MAX_RETRIES,
    RETRY_DELAY,
};
pub use retrieval::{RetrievalMetrics, RetrievalService};
pub use sample::SampleStore;
pub use upstream::fake::FakeSource;
pub use upstream::{DataGovClient, DistrictSource, UpstreamError};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RetrievalService>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/api/districts", get(http::handlers::districts_handler))
        .route(
            "/api/data/:district",
            get(http::handlers::district_data_handler),
        )
        .with_state(state)
}

#[cfg(test)]
mod retrieval_tests;
