mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use exporter::assignments::DEFAULT_CACHE_CAPACITY;
use exporter::{
    EpochStore, FileStore, HttpBeaconNode, MemoryStore, NodeAssignmentCache, SyncService,
};
use metrics::Metrics;
use metrics::server::{MetricsServerConfig, run_metrics_server};
use tracing::{error, info, info_span, warn};
use url::Url;

use crate::config::{Args, ExporterConfig, StoreKind};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("Exporter exited with error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ExporterConfig::from_args(&args)?;

    info!(
        node_url = %config.node_url,
        store = ?config.store,
        full_index_on_startup = config.sync.full_index_on_startup,
        "Starting exporter"
    );

    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(Metrics::new()?);
        let server_config = MetricsServerConfig::from(&config.metrics);
        let server_metrics = metrics.clone();

        tokio::spawn(async move {
            if let Err(error) = run_metrics_server(server_config, server_metrics).await {
                warn!("Metrics server stopped: {error:#}");
            }
        });

        Some(metrics)
    } else {
        None
    };

    let node = Arc::new(HttpBeaconNode::new(
        Url::parse(&config.node_url)?,
        config.request_timeout(),
    )?);

    match config.store {
        StoreKind::File => {
            let store = Arc::new(FileStore::open(&config.data_dir).await?);
            sync(node, store, &config, metrics).await
        }
        StoreKind::Memory => sync(node, Arc::new(MemoryStore::new()), &config, metrics).await,
    }
}

async fn sync<S: EpochStore + 'static>(
    node: Arc<HttpBeaconNode>,
    store: Arc<S>,
    config: &ExporterConfig,
    metrics: Option<Arc<Metrics>>,
) -> Result<()> {
    let assignments = Arc::new(NodeAssignmentCache::new(
        node.clone(),
        config.sync.page_size,
        DEFAULT_CACHE_CAPACITY,
    ));

    let mut service = SyncService::new(
        node,
        store,
        assignments,
        config.chain,
        config.sync.clone(),
        metrics,
        info_span!("sync"),
    );

    tokio::select! {
        result = service.run() => result.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}
