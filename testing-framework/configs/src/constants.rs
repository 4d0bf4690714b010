use std::net::{IpAddr, Ipv4Addr};

use e2e_testnet_env as tf_env;
use tracing::warn;

/// Height a testnet starts from when the manifest leaves it unset or zero.
pub const DEFAULT_INITIAL_HEIGHT: u64 = 1;

/// Storage backend used when a node does not pick one.
pub const DEFAULT_DATABASE: &str = "goleveldb";

/// ABCI transport used when a node does not pick one.
pub const DEFAULT_ABCI_PROTOCOL: &str = "unix";

/// Private validator transport used when a node does not pick one.
pub const DEFAULT_PRIVVAL_PROTOCOL: &str = "file";

/// Commit state every block unless told otherwise.
pub const DEFAULT_PERSIST_INTERVAL: u64 = 1;

/// Exposed proxy ports must be strictly above this value.
pub const MIN_PROXY_PORT_EXCLUSIVE: u16 = 1024;

/// Host the node RPC endpoints are published on.
pub const DEFAULT_RPC_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Path of the status query on a node's RPC endpoint.
pub const STATUS_PATH: &str = "status";

/// Resolve the RPC host from `E2E_RPC_HOST`, falling back to loopback.
#[must_use]
pub fn rpc_host() -> IpAddr {
    rpc_host_from(tf_env::e2e_rpc_host().as_deref())
}

fn rpc_host_from(raw: Option<&str>) -> IpAddr {
    let Some(raw) = raw else {
        return DEFAULT_RPC_HOST;
    };
    raw.parse::<IpAddr>().unwrap_or_else(|err| {
        warn!(
            value = raw,
            error = %err,
            fallback = %DEFAULT_RPC_HOST,
            "ignoring unparsable E2E_RPC_HOST"
        );
        DEFAULT_RPC_HOST
    })
}
