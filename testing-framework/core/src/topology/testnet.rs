use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use ipnet::IpNet;
use thiserror::Error;
use tracing::info;

use crate::topology::{
    network::is_ipv6_network,
    node::{Node, NodeValidationError},
    readiness::{ReadinessCheck as _, ReadinessError, TestnetHeightReadiness},
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TestnetValidationError {
    #[error("network has no name")]
    MissingName,
    #[error("network has no nodes")]
    EmptyNodes,
    #[error("invalid node {node:?}: {source}")]
    InvalidNode {
        node: String,
        #[source]
        source: NodeValidationError,
    },
    #[error("unknown node {node:?} for validator update at height {height}")]
    UnknownValidator { height: u64, node: String },
}

/// Node name to voting power.
pub type ValidatorUpdate = BTreeMap<String, u8>;

/// A fully resolved testnet topology. Built and validated once, then only
/// read.
#[derive(Clone, Debug)]
pub struct Testnet {
    pub name: String,
    pub network: IpNet,
    pub initial_height: u64,
    pub initial_state: HashMap<String, String>,
    pub validator_updates: BTreeMap<u64, ValidatorUpdate>,
    /// Sorted by name.
    pub nodes: Vec<Node>,
}

impl Testnet {
    /// Check the whole topology, including every node against its peers.
    /// Stops at the first violation.
    pub fn validate(&self) -> Result<(), TestnetValidationError> {
        if self.name.is_empty() {
            return Err(TestnetValidationError::MissingName);
        }
        if self.nodes.is_empty() {
            return Err(TestnetValidationError::EmptyNodes);
        }

        for node in &self.nodes {
            node.validate(self)
                .map_err(|source| TestnetValidationError::InvalidNode {
                    node: node.name.clone(),
                    source,
                })?;
        }

        for (height, update) in &self.validator_updates {
            if let Some(name) = update.keys().find(|name| self.lookup_node(name).is_none()) {
                return Err(TestnetValidationError::UnknownValidator {
                    height: *height,
                    node: name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Find a node by name. Topologies are small, so this is a linear scan.
    #[must_use]
    pub fn lookup_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        is_ipv6_network(&self.network)
    }

    /// Wait for every exposed node to reach `height` within one shared
    /// `timeout`. Nodes without a proxy port are skipped.
    pub async fn wait_for_height(
        &self,
        height: u64,
        timeout: Duration,
    ) -> Result<(), ReadinessError> {
        info!(
            testnet = self.name,
            height,
            timeout_secs = timeout.as_secs_f32(),
            "waiting for testnet height"
        );
        TestnetHeightReadiness::from_testnet(self, height)?
            .wait(timeout)
            .await
    }
}
