pub mod config;
pub mod network;
pub mod node;
pub mod readiness;
pub mod testnet;

pub use config::{TestnetBuildError, TestnetBuilder, build_testnet};
pub use node::{Node, NodeBuildError, NodeValidationError};
pub use testnet::{Testnet, TestnetValidationError, ValidatorUpdate};
