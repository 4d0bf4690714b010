use std::{fs, path::Path};

use anyhow::Result;
use e2e_testnet_config::manifest::{Manifest, ManifestError};
use e2e_testnet_core::topology::{
    NodeValidationError, TestnetBuildError, TestnetBuilder, TestnetValidationError, build_testnet,
};

fn write_manifest(dir: &Path, file: &str, contents: &str) -> Result<std::path::PathBuf> {
    let path = dir.join(file);
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn manifest_file_builds_full_topology() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_manifest(
        dir.path(),
        "ci.yaml",
        r#"
network: 10.1.0.0/16
initial_height: 1000
initial_state:
  initial01: a
  initial02: b
validator_updates:
  "1010":
    validator02: 20
    full01: 0
nodes:
  validator01:
    address: 10.1.0.2
    proxy_port: 5701
  validator02:
    address: 10.1.0.3
    proxy_port: 5702
    database: rocksdb
    abci_protocol: grpc
    privval_protocol: tcp
    persist_interval: 5
    retain_blocks: 10
  full01:
    address: 10.1.0.10
    start_at: 1010
    fast_sync: v2
    persist_interval: 0
"#,
    )?;

    let testnet = build_testnet(Manifest::load_from_file(&path)?)?;

    assert_eq!(testnet.name, "ci");
    assert_eq!(testnet.initial_height, 1000);
    assert_eq!(testnet.initial_state.len(), 2);
    assert!(!testnet.is_ipv6());

    let names: Vec<_> = testnet.nodes.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, ["full01", "validator01", "validator02"]);

    let full = testnet.lookup_node("full01").expect("full01 exists");
    assert_eq!(full.proxy_port, 0);
    assert_eq!(full.start_at, 1010);
    assert_eq!(full.fast_sync, "v2");
    assert_eq!(full.persist_interval, 0);
    assert_eq!(full.database, "goleveldb");
    assert!(full.rpc_addr().is_none());

    let validator = testnet.lookup_node("validator02").expect("validator02 exists");
    assert_eq!(validator.database, "rocksdb");
    assert_eq!(validator.abci_protocol, "grpc");
    assert_eq!(validator.privval_protocol, "tcp");
    assert_eq!(
        validator.rpc_addr().map(|addr| addr.to_string()),
        Some("127.0.0.1:5702".to_owned())
    );

    assert_eq!(testnet.validator_updates[&1010]["validator02"], 20);
    assert_eq!(testnet.validator_updates[&1010]["full01"], 0);

    let keys: std::collections::HashSet<_> = testnet
        .nodes
        .iter()
        .map(|node| node.public_key_hex())
        .collect();
    assert_eq!(keys.len(), testnet.nodes.len());

    Ok(())
}

#[test]
fn shared_proxy_port_is_a_conflict() -> Result<()> {
    let manifest = Manifest::from_yaml(
        r#"
name: ci
network: 10.1.0.0/16
nodes:
  a:
    address: 10.1.0.2
    proxy_port: 26657
  b:
    address: 10.1.0.3
    proxy_port: 26657
"#,
    )?;

    let err = build_testnet(manifest).unwrap_err();
    match err {
        TestnetBuildError::Validation(TestnetValidationError::InvalidNode {
            node,
            source: NodeValidationError::PortConflict { peer, port },
        }) => {
            assert_eq!(port, 26657);
            assert!(
                (node == "a" && peer == "b") || (node == "b" && peer == "a"),
                "{node} conflicts with {peer}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[test]
fn validator_update_for_known_node_builds() -> Result<()> {
    let manifest = Manifest::from_yaml(
        r#"
name: ci
network: 10.1.0.0/16
validator_updates:
  "1000":
    a: 10
nodes:
  a:
    address: 10.1.0.2
    proxy_port: 26657
  b:
    address: 10.1.0.3
    proxy_port: 26658
"#,
    )?;

    let testnet = build_testnet(manifest)?;
    assert_eq!(testnet.validator_updates[&1000]["a"], 10);

    Ok(())
}

#[test]
fn ipv6_manifest_builds() -> Result<()> {
    let manifest = Manifest::from_yaml(
        r#"
name: ci-v6
network: fd80:b10c::/48
nodes:
  a:
    address: fd80:b10c::2
  b:
    address: fd80:b10c::3
"#,
    )?;

    let testnet = build_testnet(manifest)?;
    assert!(testnet.is_ipv6());
    assert!(testnet.nodes.iter().all(|node| node.address.is_ipv6()));

    Ok(())
}

#[test]
fn rejected_settings_name_the_node() -> Result<()> {
    let manifest = Manifest::from_yaml(
        r#"
name: ci
network: 10.1.0.0/16
nodes:
  a:
    address: 10.1.0.2
    database: sqlite
"#,
    )?;

    let err = build_testnet(manifest).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid node \"a\": invalid database setting \"sqlite\""
    );

    Ok(())
}

#[test]
fn file_stem_names_unnamed_manifests_unless_overridden() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_manifest(
        dir.path(),
        "nightly.yml",
        "network: 10.1.0.0/16\nnodes:\n  a:\n    address: 10.1.0.2\n",
    )?;

    let manifest = Manifest::load_from_file(&path)?;
    assert_eq!(build_testnet(manifest.clone())?.name, "nightly");

    let renamed = TestnetBuilder::new(manifest).with_name("weekly").build()?;
    assert_eq!(renamed.name, "weekly");

    Ok(())
}

#[test]
fn unreadable_and_malformed_manifests_are_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = Manifest::load_from_file(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, ManifestError::Read { .. }));

    let path = write_manifest(dir.path(), "typo.yaml", "netwrok: 10.1.0.0/16\n")?;
    let malformed = Manifest::load_from_file(&path).unwrap_err();
    assert!(matches!(malformed, ManifestError::Parse { .. }));

    Ok(())
}
