use std::fmt::Write as _;

use e2e_testnet_config::IS_DEBUG_TRACING;
use e2e_testnet_core::topology::Testnet;
use tracing_subscriber::{EnvFilter, fmt};

pub fn init_tracing() {
    let default = if *IS_DEBUG_TRACING { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// Human-readable description of a validated testnet.
#[must_use]
pub fn render_summary(testnet: &Testnet) -> String {
    let mut out = String::new();
    let family = if testnet.is_ipv6() { "IPv6" } else { "IPv4" };
    let _ = writeln!(
        out,
        "testnet {} on {} ({family}), initial height {}",
        testnet.name, testnet.network, testnet.initial_height
    );

    for node in &testnet.nodes {
        let port = match node.proxy_port {
            0 => "-".to_owned(),
            port => port.to_string(),
        };
        let fast_sync = if node.fast_sync.is_empty() {
            "off"
        } else {
            node.fast_sync.as_str()
        };
        let _ = writeln!(
            out,
            "  {:<16} {:<40} port={port:<6} start_at={} fast_sync={fast_sync} db={} abci={} \
             privval={} persist={} retain={} key={}",
            node.name,
            node.address,
            node.start_at,
            node.database,
            node.abci_protocol,
            node.privval_protocol,
            node.persist_interval,
            node.retain_blocks,
            node.public_key_hex(),
        );
    }

    for (height, update) in &testnet.validator_updates {
        let powers = update
            .iter()
            .map(|(name, power)| format!("{name}={power}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "  validator update at {height}: {powers}");
    }

    out
}
