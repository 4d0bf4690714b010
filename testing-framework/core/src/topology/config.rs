use std::{
    collections::{BTreeMap, HashMap},
    num::ParseIntError,
};

use e2e_testnet_config::{
    constants::DEFAULT_INITIAL_HEIGHT,
    manifest::{Manifest, ManifestNode},
};
use thiserror::Error;
use tracing::debug;

use crate::topology::{
    network::parse_network,
    node::{Node, NodeBuildError},
    testnet::{Testnet, TestnetValidationError, ValidatorUpdate},
};

#[derive(Debug, Error)]
pub enum TestnetBuildError {
    #[error("invalid network IP {network:?}: {source}")]
    InvalidNetwork {
        network: String,
        #[source]
        source: ipnet::AddrParseError,
    },
    #[error(transparent)]
    Node(#[from] NodeBuildError),
    #[error("invalid validator update height {height:?}: {source}")]
    InvalidHeight {
        height: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Validation(#[from] TestnetValidationError),
}

/// Builder that resolves a [`Manifest`] into a validated [`Testnet`].
#[derive(Clone, Debug)]
pub struct TestnetBuilder {
    manifest: Manifest,
    name: Option<String>,
}

impl TestnetBuilder {
    #[must_use]
    pub const fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            name: None,
        }
    }

    #[must_use]
    /// Override the testnet name given by the manifest.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolve and validate. Either the whole testnet is valid or nothing is
    /// returned.
    pub fn build(self) -> Result<Testnet, TestnetBuildError> {
        let Self { manifest, name } = self;
        let Manifest {
            name: manifest_name,
            network: raw_network,
            initial_height,
            initial_state,
            validator_updates,
            nodes,
        } = manifest;

        let network =
            parse_network(&raw_network).map_err(|source| TestnetBuildError::InvalidNetwork {
                network: raw_network.clone(),
                source,
            })?;

        let testnet = Testnet {
            name: name.unwrap_or(manifest_name),
            network,
            initial_height: resolve_initial_height(initial_height),
            initial_state,
            nodes: build_nodes(&nodes)?,
            validator_updates: resolve_validator_updates(&validator_updates)?,
        };

        testnet.validate()?;

        debug!(
            testnet = testnet.name,
            network = %testnet.network,
            nodes = testnet.nodes.len(),
            validator_updates = testnet.validator_updates.len(),
            initial_height = testnet.initial_height,
            "built testnet"
        );

        Ok(testnet)
    }
}

/// Resolve and validate `manifest` with its own name.
pub fn build_testnet(manifest: Manifest) -> Result<Testnet, TestnetBuildError> {
    TestnetBuilder::new(manifest).build()
}

fn resolve_initial_height(initial_height: Option<u64>) -> u64 {
    initial_height
        .filter(|height| *height > 0)
        .unwrap_or(DEFAULT_INITIAL_HEIGHT)
}

fn build_nodes(manifests: &HashMap<String, ManifestNode>) -> Result<Vec<Node>, NodeBuildError> {
    let mut nodes = manifests
        .iter()
        .map(|(name, manifest)| Node::from_manifest(name, manifest))
        .collect::<Result<Vec<_>, _>>()?;
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(nodes)
}

fn resolve_validator_updates(
    updates: &HashMap<String, HashMap<String, u8>>,
) -> Result<BTreeMap<u64, ValidatorUpdate>, TestnetBuildError> {
    updates
        .iter()
        .map(|(raw_height, validators)| -> Result<_, TestnetBuildError> {
            let height =
                raw_height
                    .parse::<u64>()
                    .map_err(|source| TestnetBuildError::InvalidHeight {
                        height: raw_height.clone(),
                        source,
                    })?;
            let update: ValidatorUpdate = validators
                .iter()
                .map(|(name, power)| (name.clone(), *power))
                .collect();
            Ok((height, update))
        })
        .collect()
}
