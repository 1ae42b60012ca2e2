#![forbid(unsafe_code)]

use rozgar_server::{
    build_router, validate_startup_config, AppState, DataGovClient, DiskCache, MemoryCache,
    RetrievalService, SampleStore, ServerConfig, UpstreamConfig,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("ROZGAR_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn config_from_env() -> ServerConfig {
    let defaults = ServerConfig::default();
    let upstream_defaults = UpstreamConfig::default();
    ServerConfig {
        bind_addr: env::var("ROZGAR_BIND").unwrap_or(defaults.bind_addr),
        cache_ttl: env_duration_ms("ROZGAR_CACHE_TTL_MS", defaults.cache_ttl.as_millis() as u64),
        disk_cache_root: env::var("ROZGAR_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.disk_cache_root),
        sample_data_path: env::var("ROZGAR_SAMPLE_DATA")
            .map(PathBuf::from)
            .unwrap_or(defaults.sample_data_path),
        upstream: UpstreamConfig {
            api_key: env_nonempty("DATA_GOV_API_KEY"),
            resource_id: env_nonempty("DATA_GOV_RESOURCE_ID"),
            base_url: env::var("DATA_GOV_BASE_URL").unwrap_or(upstream_defaults.base_url),
            timeout: env_duration_ms(
                "ROZGAR_UPSTREAM_TIMEOUT_MS",
                upstream_defaults.timeout.as_millis() as u64,
            ),
            max_retries: env_usize("ROZGAR_UPSTREAM_RETRIES", upstream_defaults.max_retries),
            retry_base_delay: env_duration_ms(
                "ROZGAR_UPSTREAM_RETRY_BASE_MS",
                upstream_defaults.retry_base_delay.as_millis() as u64,
            ),
            page_limit: env_usize("ROZGAR_UPSTREAM_PAGE_LIMIT", upstream_defaults.page_limit),
        },
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let cfg = config_from_env();
    validate_startup_config(&cfg)?;

    if cfg.upstream.is_enabled() {
        info!("remote data source enabled for {}", cfg.upstream.base_url);
    } else {
        info!("DATA_GOV_API_KEY / DATA_GOV_RESOURCE_ID not set; remote tier disabled");
    }

    let sample = SampleStore::load(&cfg.sample_data_path);
    info!(
        districts = sample.districts().len(),
        "sample data store loaded"
    );

    let memory = MemoryCache::new(cfg.cache_ttl);
    let disk = DiskCache::open(&cfg.disk_cache_root, cfg.cache_ttl);
    let upstream = Arc::new(DataGovClient::new(cfg.upstream.clone()));
    let service = RetrievalService::new(memory, disk, upstream, sample);

    let app = build_router(AppState::new(service));

    let addr: std::net::SocketAddr = cfg
        .bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {}: {e}", cfg.bind_addr))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("rozgar-server listening on {}", cfg.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
