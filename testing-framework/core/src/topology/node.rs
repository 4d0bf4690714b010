use std::{
    net::{AddrParseError, IpAddr, SocketAddr},
    time::Duration,
};

use e2e_testnet_config::{
    constants::{
        DEFAULT_ABCI_PROTOCOL, DEFAULT_DATABASE, DEFAULT_PERSIST_INTERVAL,
        DEFAULT_PRIVVAL_PROTOCOL, MIN_PROXY_PORT_EXCLUSIVE, rpc_host,
    },
    manifest::ManifestNode,
    nodes::{
        AbciProtocol, DatabaseBackend, FastSyncMode, NodeSetting, PrivvalProtocol,
        UnknownSettingValue,
    },
};
use ed25519_dalek::{SigningKey, VerifyingKey};
use ipnet::IpNet;
use thiserror::Error;
use tracing::info;

use crate::{
    nodes::{
        keys::generate_signing_key,
        rpc_client::{RpcClient, RpcClientError},
    },
    topology::{
        network::network_contains,
        readiness::{HeightReadiness, ReadinessCheck as _, ReadinessError},
        testnet::Testnet,
    },
};

#[derive(Debug, Error)]
pub enum NodeBuildError {
    #[error("invalid IP {address:?} for node {node:?}: {source}")]
    InvalidAddress {
        node: String,
        address: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NodeValidationError {
    #[error("node has no name")]
    MissingName,
    #[error("node IP {address} is not in testnet network {network}")]
    AddressOutOfRange { address: IpAddr, network: IpNet },
    #[error("local port {port} must be >{}", MIN_PROXY_PORT_EXCLUSIVE)]
    PortTooLow { port: u16 },
    #[error("peer {peer:?} also has local port {port}")]
    PortConflict { peer: String, port: u16 },
    #[error("invalid {setting} setting {value:?}")]
    InvalidSetting { setting: NodeSetting, value: String },
    #[error("{}", persist_retain_message(*persist_interval, *retain_blocks))]
    PersistRetainMismatch {
        persist_interval: u64,
        retain_blocks: u64,
    },
}

impl From<UnknownSettingValue> for NodeValidationError {
    fn from(err: UnknownSettingValue) -> Self {
        Self::InvalidSetting {
            setting: err.setting,
            value: err.value,
        }
    }
}

fn persist_retain_message(persist_interval: u64, retain_blocks: u64) -> String {
    if persist_interval == 0 {
        format!("persist_interval=0 requires retain_blocks=0, got retain_blocks={retain_blocks}")
    } else {
        format!(
            "persist_interval {persist_interval} must be less than or equal to retain_blocks \
             {retain_blocks}"
        )
    }
}

/// A single node of a testnet, resolved from its manifest entry.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub signing_key: SigningKey,
    pub address: IpAddr,
    /// Port the node RPC is published on locally; `0` when not exposed.
    pub proxy_port: u16,
    pub start_at: u64,
    pub fast_sync: String,
    pub database: String,
    pub abci_protocol: String,
    pub privval_protocol: String,
    pub persist_interval: u64,
    pub retain_blocks: u64,
}

impl Node {
    /// Resolve a node from its manifest entry, applying defaults for unset
    /// fields. Checks that need the whole testnet are left to
    /// [`Node::validate`].
    pub fn from_manifest(name: &str, manifest: &ManifestNode) -> Result<Self, NodeBuildError> {
        let address = manifest
            .address
            .parse::<IpAddr>()
            .map_err(|source| NodeBuildError::InvalidAddress {
                node: name.to_owned(),
                address: manifest.address.clone(),
                source,
            })?;

        Ok(Self {
            name: name.to_owned(),
            signing_key: generate_signing_key(),
            address,
            proxy_port: manifest.proxy_port.unwrap_or_default(),
            start_at: manifest.start_at.unwrap_or_default(),
            fast_sync: manifest.fast_sync.clone().unwrap_or_default(),
            database: setting_or_default(manifest.database.as_deref(), DEFAULT_DATABASE),
            abci_protocol: setting_or_default(
                manifest.abci_protocol.as_deref(),
                DEFAULT_ABCI_PROTOCOL,
            ),
            privval_protocol: setting_or_default(
                manifest.privval_protocol.as_deref(),
                DEFAULT_PRIVVAL_PROTOCOL,
            ),
            persist_interval: manifest
                .persist_interval
                .unwrap_or(DEFAULT_PERSIST_INTERVAL),
            retain_blocks: manifest.retain_blocks.unwrap_or_default(),
        })
    }

    /// Check this node against the rest of `testnet`. Stops at the first
    /// violation.
    pub fn validate(&self, testnet: &Testnet) -> Result<(), NodeValidationError> {
        if self.name.is_empty() {
            return Err(NodeValidationError::MissingName);
        }

        if !network_contains(&testnet.network, self.address) {
            return Err(NodeValidationError::AddressOutOfRange {
                address: self.address,
                network: testnet.network,
            });
        }

        if self.proxy_port > 0 {
            if self.proxy_port <= MIN_PROXY_PORT_EXCLUSIVE {
                return Err(NodeValidationError::PortTooLow {
                    port: self.proxy_port,
                });
            }
            if let Some(peer) = testnet
                .nodes
                .iter()
                .find(|peer| peer.name != self.name && peer.proxy_port == self.proxy_port)
            {
                return Err(NodeValidationError::PortConflict {
                    peer: peer.name.clone(),
                    port: self.proxy_port,
                });
            }
        }

        self.fast_sync.parse::<FastSyncMode>()?;
        self.database.parse::<DatabaseBackend>()?;
        self.abci_protocol.parse::<AbciProtocol>()?;
        self.privval_protocol.parse::<PrivvalProtocol>()?;

        let persist_retain_ok = match (self.persist_interval, self.retain_blocks) {
            (0, retain) => retain == 0,
            (persist, retain) if persist > 1 && retain > 0 => retain >= persist,
            _ => true,
        };
        if !persist_retain_ok {
            return Err(NodeValidationError::PersistRetainMismatch {
                persist_interval: self.persist_interval,
                retain_blocks: self.retain_blocks,
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key().as_bytes())
    }

    /// Address the node RPC is reachable on from the test host, if exposed.
    #[must_use]
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        (self.proxy_port > 0).then(|| SocketAddr::new(rpc_host(), self.proxy_port))
    }

    /// RPC client for this node's published endpoint.
    pub fn client(&self) -> Result<RpcClient, RpcClientError> {
        let addr = self.rpc_addr().ok_or_else(|| RpcClientError::NoProxyPort {
            node: self.name.clone(),
        })?;
        RpcClient::new(addr)
    }

    /// Wait until the node reports a latest block height of at least
    /// `height`, or fail once `timeout` has elapsed. Failed status queries
    /// are retried until then; dropping the future abandons the wait.
    pub async fn wait_for_height(
        &self,
        height: u64,
        timeout: Duration,
    ) -> Result<(), ReadinessError> {
        let client = self.client()?;
        info!(
            node = self.name,
            url = %client.base_url(),
            height,
            timeout_secs = timeout.as_secs_f32(),
            "waiting for node height"
        );
        HeightReadiness::new(&self.name, &client, height)
            .wait(timeout)
            .await
    }
}

fn setting_or_default(value: Option<&str>, default: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => default.to_owned(),
    }
}
