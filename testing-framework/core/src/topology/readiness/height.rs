use tracing::debug;

use super::{ReadinessCheck, ReadinessError};
use crate::{
    nodes::rpc_client::{RpcClient, RpcClientError, StatusClient},
    topology::testnet::Testnet,
};

/// Waits for one node to report a latest block height of at least `target`.
pub struct HeightReadiness<'a, C> {
    label: &'a str,
    client: &'a C,
    target: u64,
}

impl<'a, C: StatusClient> HeightReadiness<'a, C> {
    #[must_use]
    pub const fn new(label: &'a str, client: &'a C, target: u64) -> Self {
        Self {
            label,
            client,
            target,
        }
    }
}

#[async_trait::async_trait]
impl<'a, C: StatusClient> ReadinessCheck<'a> for HeightReadiness<'a, C> {
    type Data = Result<u64, RpcClientError>;

    async fn collect(&'a self) -> Self::Data {
        fetch_height(self.label, self.client).await
    }

    fn is_ready(&self, data: &Self::Data) -> bool {
        reached(data, self.target)
    }

    fn timeout_message(&self, data: Option<Self::Data>) -> String {
        let observed = data.map_or_else(|| "no status received".to_owned(), |r| describe(&r));
        format!(
            "node {:?} did not reach height {}: {observed}",
            self.label, self.target
        )
    }
}

#[derive(Debug)]
pub struct NodeHeightStatus {
    pub label: String,
    pub result: Result<u64, RpcClientError>,
}

/// Waits for every listed node to reach `target`, probing them concurrently.
pub struct TestnetHeightReadiness<C = RpcClient> {
    nodes: Vec<(String, C)>,
    target: u64,
}

impl<C: StatusClient> TestnetHeightReadiness<C> {
    #[must_use]
    pub const fn new(nodes: Vec<(String, C)>, target: u64) -> Self {
        Self { nodes, target }
    }
}

impl TestnetHeightReadiness<RpcClient> {
    /// Build clients for every node that publishes a proxy port. Fails when
    /// there is none, since nothing could ever report the height.
    pub fn from_testnet(testnet: &Testnet, target: u64) -> Result<Self, ReadinessError> {
        let mut nodes = Vec::with_capacity(testnet.nodes.len());
        for node in &testnet.nodes {
            if node.proxy_port == 0 {
                debug!(node = node.name, "node exposes no proxy port, not waiting on it");
                continue;
            }
            nodes.push((node.name.clone(), node.client()?));
        }
        if nodes.is_empty() {
            return Err(ReadinessError::NoExposedNodes {
                testnet: testnet.name.clone(),
            });
        }
        Ok(Self::new(nodes, target))
    }
}

#[async_trait::async_trait]
impl<'a, C: StatusClient + 'a> ReadinessCheck<'a> for TestnetHeightReadiness<C> {
    type Data = Vec<NodeHeightStatus>;

    async fn collect(&'a self) -> Self::Data {
        let probes = self.nodes.iter().map(|(label, client)| async move {
            NodeHeightStatus {
                label: label.clone(),
                result: fetch_height(label, client).await,
            }
        });
        futures::future::join_all(probes).await
    }

    fn is_ready(&self, data: &Self::Data) -> bool {
        !data.is_empty()
            && data
                .iter()
                .all(|status| reached(&status.result, self.target))
    }

    fn timeout_message(&self, data: Option<Self::Data>) -> String {
        let summary = data.map_or_else(
            || "no status received".to_owned(),
            |statuses| {
                statuses
                    .iter()
                    .map(|status| format!("{}: {}", status.label, describe(&status.result)))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        );
        format!(
            "timed out waiting for height {}: {summary}",
            self.target
        )
    }
}

async fn fetch_height<C: StatusClient>(label: &str, client: &C) -> Result<u64, RpcClientError> {
    let result = client
        .status()
        .await
        .map(|status| status.sync_info.latest_block_height);
    match &result {
        Ok(height) => debug!(target: "readiness", node = label, height, "status probe"),
        Err(err) => debug!(target: "readiness", node = label, error = %err, "status probe failed"),
    }
    result
}

fn reached(result: &Result<u64, RpcClientError>, target: u64) -> bool {
    matches!(result, Ok(height) if *height >= target)
}

fn describe(result: &Result<u64, RpcClientError>) -> String {
    match result {
        Ok(height) => format!("height={height}"),
        Err(err) => format!("error={err}"),
    }
}
