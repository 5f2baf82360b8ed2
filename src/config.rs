use core::time::Duration;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, ensure};
use chain::ChainConfig;
use clap::{Parser, ValueEnum};
use exporter::SyncConfig;
use exporter::node::http::DEFAULT_REQUEST_TIMEOUT;
use metrics::server::MetricsServerConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_NODE_URL: &str = "http://127.0.0.1:3500";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_METRICS_PORT: u16 = 9090;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One JSON document per epoch under the data directory.
    #[default]
    File,
    /// Process memory only; everything is lost on exit.
    Memory,
}

#[derive(Parser, Debug)]
#[command(about = "Exports beacon chain epochs from a node into a store")]
pub struct Args {
    /// YAML config file. Command line flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub node_url: Option<String>,

    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Export every epoch from genesis to head before the first cycle.
    #[arg(long)]
    pub full_index_on_startup: bool,

    /// Serve Prometheus metrics.
    #[arg(long)]
    pub metrics: bool,

    #[arg(long)]
    pub metrics_address: Option<IpAddr>,

    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: IpAddr,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_METRICS_PORT,
        }
    }
}

impl From<&MetricsConfig> for MetricsServerConfig {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            metrics_address: config.address,
            metrics_port: config.port,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    pub node_url: String,
    pub request_timeout_secs: u64,
    pub store: StoreKind,
    pub data_dir: PathBuf,
    pub chain: ChainConfig,
    pub sync: SyncConfig,
    pub metrics: MetricsConfig,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            store: StoreKind::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chain: ChainConfig::default(),
            sync: SyncConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ExporterConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// File values (or defaults) with command line overrides applied.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        if let Some(node_url) = &args.node_url {
            config.node_url.clone_from(node_url);
        }

        if let Some(store) = args.store {
            config.store = store;
        }

        if let Some(data_dir) = &args.data_dir {
            config.data_dir.clone_from(data_dir);
        }

        if args.full_index_on_startup {
            config.sync.full_index_on_startup = true;
        }

        if args.metrics {
            config.metrics.enabled = true;
        }

        if let Some(address) = args.metrics_address {
            config.metrics.address = address;
        }

        if let Some(port) = args.metrics_port {
            config.metrics.port = port;
        }

        config.validate()?;

        Ok(config)
    }

    /// Reject values the chain arithmetic or the sync loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.chain.seconds_per_slot > 0, "chain.seconds_per_slot must be positive");
        ensure!(self.chain.slots_per_epoch > 0, "chain.slots_per_epoch must be positive");
        ensure!(self.sync.page_size > 0, "sync.page_size must be positive");
        ensure!(self.sync.sync_interval_secs > 0, "sync.sync_interval_secs must be positive");
        ensure!(self.sync.backfill_concurrency > 0, "sync.backfill_concurrency must be positive");

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
