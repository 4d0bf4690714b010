use std::net::SocketAddr;

use async_trait::async_trait;
use e2e_testnet_config::constants::STATUS_PATH;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("node {node:?} does not expose a proxy port")]
    NoProxyPort { node: String },
    #[error("failed to build RPC url for {addr}: {message}")]
    InvalidUrl { addr: SocketAddr, message: String },
    #[error("failed to join url {base} with path {path}: {message}")]
    JoinUrl {
        base: Url,
        path: &'static str,
        message: String,
    },
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("RPC response has neither result nor error")]
    EmptyResponse,
}

/// Subset of the node status response the readiness checks rely on.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeStatus {
    pub sync_info: SyncInfo,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct SyncInfo {
    #[serde_as(as = "DisplayFromStr")]
    pub latest_block_height: u64,
    #[serde(default)]
    pub catching_up: bool,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

/// Source of node status, consumed by the readiness checks.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn status(&self) -> Result<NodeStatus, RpcClientError>;
}

/// Thin async client for a node's RPC endpoint.
#[derive(Clone, Debug)]
pub struct RpcClient {
    base_url: Url,
    client: Client,
}

impl RpcClient {
    /// Construct from a socket address.
    pub fn new(addr: SocketAddr) -> Result<Self, RpcClientError> {
        let base_url =
            Url::parse(&format!("http://{addr}/")).map_err(|err| RpcClientError::InvalidUrl {
                addr,
                message: err.to_string(),
            })?;
        Self::from_url(base_url)
    }

    /// Construct from a prebuilt URL.
    pub fn from_url(base_url: Url) -> Result<Self, RpcClientError> {
        let client = Client::builder().build().map_err(RpcClientError::Build)?;
        Ok(Self { base_url, client })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn join_base(&self, path: &'static str) -> Result<Url, RpcClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| RpcClientError::JoinUrl {
                base: self.base_url.clone(),
                path,
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl StatusClient for RpcClient {
    async fn status(&self) -> Result<NodeStatus, RpcClientError> {
        let url = self.join_base(STATUS_PATH)?;
        let envelope = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcEnvelope<NodeStatus>>()
            .await?;

        match envelope {
            RpcEnvelope {
                result: Some(status),
                ..
            } => Ok(status),
            RpcEnvelope {
                error: Some(err), ..
            } => Err(RpcClientError::Rpc {
                code: err.code,
                message: match err.data {
                    Some(data) if !data.is_empty() => format!("{} ({data})", err.message),
                    _ => err.message,
                },
            }),
            _ => Err(RpcClientError::EmptyResponse),
        }
    }
}
