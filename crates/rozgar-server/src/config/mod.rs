use std::path::PathBuf;
use std::time::Duration;

/// Cache entries older than this are treated as absent in every tier.
pub const CACHE_DURATION: Duration = Duration::from_secs(3600);

/// Total attempts (not retries after the first) against the upstream API.
pub const MAX_RETRIES: usize = 3;

/// Base delay for exponential backoff between upstream attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub resource_id: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_base_delay: Duration,
    pub page_limit: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            resource_id: None,
            base_url: "https://api.data.gov.in".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: MAX_RETRIES,
            retry_base_delay: RETRY_DELAY,
            page_limit: 100,
        }
    }
}

impl UpstreamConfig {
    /// The feature flag for the whole remote tier: both the credential and
    /// the resource identifier must be present and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.resource_id.as_deref()) {
            (Some(key), Some(resource)) if !key.is_empty() && !resource.is_empty() => {
                Some((key, resource))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.credentials().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cache_ttl: Duration,
    pub disk_cache_root: PathBuf,
    pub sample_data_path: PathBuf,
    pub upstream: UpstreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            cache_ttl: CACHE_DURATION,
            disk_cache_root: PathBuf::from("data/cache"),
            sample_data_path: PathBuf::from("data/mgnrega_sample.json"),
            upstream: UpstreamConfig::default(),
        }
    }
}

pub fn validate_startup_config(cfg: &ServerConfig) -> Result<(), String> {
    if cfg.bind_addr.trim().is_empty() {
        return Err("bind address must not be empty".to_string());
    }
    if cfg.cache_ttl.is_zero() {
        return Err("cache ttl must be > 0".to_string());
    }
    if cfg.upstream.timeout.is_zero() {
        return Err("upstream timeout must be > 0".to_string());
    }
    if cfg.upstream.max_retries == 0 {
        return Err("upstream max retries must be > 0".to_string());
    }
    if cfg.upstream.page_limit == 0 {
        return Err("upstream page limit must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_config_validation_rejects_zero_limits() {
        let mut cfg = ServerConfig::default();
        assert!(validate_startup_config(&cfg).is_ok());

        cfg.cache_ttl = Duration::ZERO;
        let err = validate_startup_config(&cfg).expect_err("zero ttl");
        assert!(err.contains("cache ttl"));

        let mut cfg = ServerConfig::default();
        cfg.upstream.max_retries = 0;
        let err = validate_startup_config(&cfg).expect_err("zero retries");
        assert!(err.contains("max retries"));
    }

    #[test]
    fn upstream_tier_requires_both_credentials() {
        let mut up = UpstreamConfig::default();
        assert!(!up.is_enabled());

        up.api_key = Some("key".to_string());
        assert!(!up.is_enabled());

        up.resource_id = Some(String::new());
        assert!(!up.is_enabled());

        up.resource_id = Some("resource".to_string());
        assert!(up.is_enabled());
        assert_eq!(up.credentials(), Some(("key", "resource")));
    }
}
