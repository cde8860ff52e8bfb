use advertx_api::{ApiState, RestApi};
use advertx_refresh::{
    BroadcastSink, DataSource, HttpSource, JsonFileSource, RefreshConfig, RefreshCoordinator,
    Scheduler,
};
use advertx_storage::FileCacheStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Duplicate advert detector with a cached similarity snapshot
#[derive(Parser, Debug)]
#[command(name = "advertx")]
#[command(about = "Links probable duplicate adverts and serves the result", long_about = None)]
struct Args {
    /// Directory holding the snapshot file
    #[arg(short, long, env = "ADVERTX_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// JSON file with the advert rows
    #[arg(long, env = "ADVERTX_SOURCE_FILE", conflicts_with = "source_url")]
    source_file: Option<PathBuf>,

    /// URL answering with the advert rows as JSON
    #[arg(long, env = "ADVERTX_SOURCE_URL")]
    source_url: Option<String>,

    /// Snapshot lifetime and timer period, in seconds
    #[arg(
        long,
        env = "ADVERTX_TTL_SECS",
        default_value_t = 24 * 60 * 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    ttl_secs: u64,

    /// Limit on fetching the adverts, in seconds
    #[arg(long, env = "ADVERTX_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Limit on writing the snapshot, in seconds
    #[arg(long, env = "ADVERTX_PERSIST_TIMEOUT_SECS", default_value_t = 10)]
    persist_timeout_secs: u64,

    /// HTTP API port
    #[arg(long, env = "ADVERTX_HTTP_PORT", default_value_t = 8080)]
    http_port: u16,

    /// Key expected by the per-advert endpoint
    #[arg(long, env = "ADVERTX_API_KEY")]
    api_key: String,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "ADVERTX_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig::default()
            .with_ttl(Duration::from_secs(self.ttl_secs))
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs))
            .with_persist_timeout(Duration::from_secs(self.persist_timeout_secs))
    }

    fn data_source(&self) -> anyhow::Result<Arc<dyn DataSource>> {
        match (&self.source_file, &self.source_url) {
            (Some(path), _) => Ok(Arc::new(JsonFileSource::new(path))),
            (None, Some(url)) => Ok(Arc::new(HttpSource::new(url.clone()))),
            (None, None) => anyhow::bail!("either --source-file or --source-url is required"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting advertx v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let config = args.refresh_config();
    let source = args.data_source()?;
    info!("Data source: {}", source.describe());

    let store = Arc::new(FileCacheStore::new(&args.data_dir)?);
    info!("Snapshot file: {:?}", store.path());

    let sink = Arc::new(BroadcastSink::default());
    let mut outcomes = sink.subscribe();
    tokio::spawn(async move {
        loop {
            match outcomes.recv().await {
                Ok(Ok(snapshot)) => debug!(
                    adverts = snapshot.content.len(),
                    links = snapshot.content.link_count(),
                    "snapshot updated"
                ),
                Ok(Err(failure)) => debug!(kind = failure.kind(), "refresh failed"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "outcome listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let coordinator = Arc::new(RefreshCoordinator::new(
        config.clone(),
        source,
        store,
        sink,
    ));
    let scheduler = Scheduler::spawn(coordinator.clone(), config.ttl);

    let state = ApiState::new(coordinator, args.api_key.clone());
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                warn!("HTTP server error: {}", e);
            }
        })
    });

    info!("advertx started successfully");
    info!("HTTP API: http://localhost:{}/posted.json", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    scheduler.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["advertx", "--api-key", "secret", "--source-file", "items.json"])
            .unwrap();
        let config = args.refresh_config();
        assert_eq!(config.ttl, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert!(args.data_source().is_ok());
    }

    #[test]
    fn test_args_reject_zero_ttl() {
        let result = Args::try_parse_from(["advertx", "--api-key", "secret", "--ttl-secs", "0"]);
        assert!(result.is_err());

        let args = Args::try_parse_from(["advertx", "--api-key", "secret", "--ttl-secs", "1"]).unwrap();
        assert_eq!(args.ttl_secs, 1);
    }

    #[test]
    fn test_args_require_a_source() {
        let args = Args::try_parse_from(["advertx", "--api-key", "secret"]).unwrap();
        assert!(args.data_source().is_err());
    }
}
