pub mod nodes;
pub mod topology;

pub use e2e_testnet_config::{IS_DEBUG_TRACING, adjust_timeout, manifest::Manifest};
