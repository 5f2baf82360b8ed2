use core::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use containers::{
    Attestation, BeaconBlockContainer, BeaconCommittee, ChainHead, Epoch, EpochParticipation, Page,
    PageRequest, Validator, ValidatorAssignment, ValidatorBalance, ValidatorQueue,
};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::BeaconNode;

const CHAIN_HEAD_PATH: &str = "/eth/v1alpha1/beacon/chainhead";
const BLOCKS_PATH: &str = "/eth/v1alpha1/beacon/blocks";
const COMMITTEES_PATH: &str = "/eth/v1alpha1/beacon/committees";
const ATTESTATION_POOL_PATH: &str = "/eth/v1alpha1/beacon/attestations/pool";
const VALIDATORS_PATH: &str = "/eth/v1alpha1/validators";
const BALANCES_PATH: &str = "/eth/v1alpha1/validators/balances";
const ASSIGNMENTS_PATH: &str = "/eth/v1alpha1/validators/assignments";
const PARTICIPATION_PATH: &str = "/eth/v1alpha1/validators/participation";
const QUEUE_PATH: &str = "/eth/v1alpha1/validators/queue";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum NodeApiError {
    #[error("bad request to beacon node (node response: {message})")]
    BadRequest { message: String },
    #[error("beacon node internal error (node response: {message})")]
    NodeInternalError { message: String },
}

/// One page of any listing, whatever the resource calls its item array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(
        default = "Vec::new",
        alias = "blockContainers",
        alias = "validatorList",
        alias = "committees",
        alias = "balances",
        alias = "assignments"
    )]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: String,
    #[serde(default)]
    total_size: u64,
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(response: ListResponse<T>) -> Self {
        Self {
            items: response.items,
            next_page_token: response.next_page_token,
            total_size: response.total_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidatorContainer {
    validator: Validator,
}

#[derive(Debug, Deserialize)]
struct AttestationPoolResponse {
    #[serde(default)]
    attestations: Vec<Attestation>,
}

/// [`BeaconNode`] over the node's JSON gateway.
pub struct HttpBeaconNode {
    client: Client,
    base_url: Url,
}

impl HttpBeaconNode {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Into::into)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path)?;

        debug!(%url, ?query, "requesting beacon node");

        let response = self.client.get(url).query(query).send().await?;
        let response = handle_error(response).await?;

        response.json().await.map_err(Into::into)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<T>> {
        let query = [
            ("epoch", epoch.to_string()),
            ("page_size", request.page_size.to_string()),
            ("page_token", request.page_token),
        ];

        self.get::<ListResponse<T>>(path, &query)
            .await
            .map(Into::into)
    }
}

#[async_trait]
impl BeaconNode for HttpBeaconNode {
    async fn chain_head(&self) -> Result<ChainHead> {
        self.get(CHAIN_HEAD_PATH, &[]).await
    }

    async fn list_blocks(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconBlockContainer>> {
        self.list(BLOCKS_PATH, epoch, request).await
    }

    async fn list_validators(&self, epoch: Epoch, request: PageRequest) -> Result<Page<Validator>> {
        let page = self
            .list::<ValidatorContainer>(VALIDATORS_PATH, epoch, request)
            .await?;

        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(|container| container.validator)
                .collect(),
            next_page_token: page.next_page_token,
            total_size: page.total_size,
        })
    }

    async fn list_beacon_committees(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconCommittee>> {
        self.list(COMMITTEES_PATH, epoch, request).await
    }

    async fn list_validator_balances(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorBalance>> {
        self.list(BALANCES_PATH, epoch, request).await
    }

    async fn list_validator_assignments(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorAssignment>> {
        self.list(ASSIGNMENTS_PATH, epoch, request).await
    }

    async fn validator_participation(&self, epoch: Epoch) -> Result<EpochParticipation> {
        self.get(PARTICIPATION_PATH, &[("epoch", epoch.to_string())])
            .await
    }

    async fn attestation_pool(&self) -> Result<Vec<Attestation>> {
        self.get::<AttestationPoolResponse>(ATTESTATION_POOL_PATH, &[])
            .await
            .map(|response| response.attestations)
    }

    async fn validator_queue(&self) -> Result<ValidatorQueue> {
        self.get(QUEUE_PATH, &[]).await
    }
}

async fn handle_error(response: Response) -> Result<Response> {
    if response.status().is_client_error() {
        let message = response.text().await?;
        bail!(NodeApiError::BadRequest { message });
    }

    if response.status().is_server_error() {
        let message = response.text().await?;
        bail!(NodeApiError::NodeInternalError { message });
    }

    Ok(response)
}
