use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use containers::{Attestation, Epoch, EpochData, EpochParticipation, MinimalBlock, ValidatorQueue};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use super::{EpochStore, pending_and_proposed};

const EPOCHS_DIR: &str = "epochs";
const ATTESTATION_POOL_FILE: &str = "attestation_pool.json";
const VALIDATOR_QUEUE_FILE: &str = "validator_queue.json";
const TEMP_EXTENSION: &str = "tmp";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Store that keeps one JSON document per epoch under `<root>/epochs`.
///
/// Every document is written to a temporary sibling and renamed into place,
/// so readers only ever see complete documents.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let epochs = root.join(EPOCHS_DIR);

        fs::create_dir_all(&epochs)
            .await
            .map_err(|source| StoreError::Write {
                path: epochs,
                source,
            })?;

        debug!(root = %root.display(), "opened file store");

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn load_epoch(&self, epoch: Epoch) -> Result<Option<EpochData>> {
        read_json(&self.epoch_path(epoch)).await
    }

    pub async fn load_attestation_pool(&self) -> Result<Option<Vec<Attestation>>> {
        read_json(&self.root.join(ATTESTATION_POOL_FILE)).await
    }

    pub async fn load_validator_queue(&self) -> Result<Option<ValidatorQueue>> {
        read_json(&self.root.join(VALIDATOR_QUEUE_FILE)).await
    }

    fn epoch_path(&self, epoch: Epoch) -> PathBuf {
        self.root.join(EPOCHS_DIR).join(format!("{epoch}.json"))
    }
}

#[async_trait]
impl EpochStore for FileStore {
    async fn save_epoch(&self, data: EpochData) -> Result<()> {
        write_json(&self.epoch_path(data.epoch), &data).await
    }

    async fn update_epoch_status(&self, participation: &EpochParticipation) -> Result<()> {
        let path = self.epoch_path(participation.epoch);

        let Some(mut data) = read_json::<EpochData>(&path).await? else {
            return Ok(());
        };

        data.participation.finalized = participation.finalized;

        write_json(&path, &data).await
    }

    async fn blocks_in_range(&self, start: Epoch, end: Epoch) -> Result<Vec<MinimalBlock>> {
        let mut blocks = Vec::new();

        for epoch in self.stored_epochs().await? {
            if epoch < start || epoch > end {
                continue;
            }

            // Deleted between listing and reading.
            let Some(data) = self.load_epoch(epoch).await? else {
                continue;
            };

            blocks.extend(pending_and_proposed(&data));
        }

        Ok(blocks)
    }

    async fn stored_epochs(&self) -> Result<Vec<Epoch>> {
        let dir = self.root.join(EPOCHS_DIR);

        let mut entries = fs::read_dir(&dir).await.map_err(|source| StoreError::Read {
            path: dir.clone(),
            source,
        })?;

        let mut epochs = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StoreError::Read {
                path: dir.clone(),
                source,
            })?
        {
            let path = entry.path();

            if path.extension().and_then(|extension| extension.to_str()) != Some("json") {
                continue;
            }

            if let Some(epoch) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<Epoch>().ok())
            {
                epochs.push(epoch);
            }
        }

        epochs.sort_unstable();

        Ok(epochs)
    }

    async fn save_attestation_pool(&self, attestations: Vec<Attestation>) -> Result<()> {
        write_json(&self.root.join(ATTESTATION_POOL_FILE), &attestations).await
    }

    async fn save_validator_queue(&self, queue: ValidatorQueue) -> Result<()> {
        write_json(&self.root.join(VALIDATOR_QUEUE_FILE), &queue).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_owned(),
                source,
            }
            .into());
        }
    };

    let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_owned(),
        source,
    })?;

    Ok(Some(value))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode {
        path: path.to_owned(),
        source,
    })?;

    let temp = path.with_extension(TEMP_EXTENSION);

    fs::write(&temp, bytes)
        .await
        .map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;

    fs::rename(&temp, path)
        .await
        .map_err(|source| StoreError::Write {
            path: path.to_owned(),
            source,
        })?;

    Ok(())
}
