pub mod height;

use std::time::Duration;

use e2e_testnet_config::timeouts;
pub use height::{HeightReadiness, NodeHeightStatus, TestnetHeightReadiness};
use thiserror::Error;
use tokio::time::{Instant, sleep, timeout};
use tracing::warn;

use crate::nodes::rpc_client::RpcClientError;

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error(transparent)]
    Client(#[from] RpcClientError),
    #[error("testnet {testnet:?} has no node with a proxy port to query")]
    NoExposedNodes { testnet: String },
    #[error("timeout after {timeout:?}: {message}")]
    Timeout { timeout: Duration, message: String },
}

#[async_trait::async_trait]
pub trait ReadinessCheck<'a> {
    type Data: Send;

    async fn collect(&'a self) -> Self::Data;

    fn is_ready(&self, data: &Self::Data) -> bool;

    /// Describe why the check is not ready, given the last observation if
    /// any probe completed.
    fn timeout_message(&self, data: Option<Self::Data>) -> String;

    fn poll_interval(&self) -> Duration {
        timeouts::poll_interval()
    }

    /// Poll until ready or until `timeout_duration` has elapsed since the
    /// call. A probe still in flight at the deadline is abandoned.
    async fn wait(&'a self, timeout_duration: Duration) -> Result<(), ReadinessError> {
        let poll_interval = self.poll_interval();
        let started = Instant::now();
        let mut last = None;

        loop {
            let elapsed = started.elapsed();
            if elapsed >= timeout_duration {
                let message = self.timeout_message(last);
                warn!(
                    target: "readiness",
                    timeout_secs = timeout_duration.as_secs_f32(),
                    reason = %message,
                    "readiness wait timed out"
                );
                return Err(ReadinessError::Timeout {
                    timeout: timeout_duration,
                    message,
                });
            }

            let remaining = timeout_duration - elapsed;
            let Ok(data) = timeout(remaining, self.collect()).await else {
                continue;
            };
            if self.is_ready(&data) {
                return Ok(());
            }
            last = Some(data);

            sleep(poll_interval.min(timeout_duration.saturating_sub(started.elapsed()))).await;
        }
    }
}
