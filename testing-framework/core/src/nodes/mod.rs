pub mod keys;
pub mod rpc_client;

pub use rpc_client::{NodeStatus, RpcClient, RpcClientError, StatusClient, SyncInfo};
