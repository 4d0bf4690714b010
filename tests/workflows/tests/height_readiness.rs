use std::time::{Duration, Instant};

use anyhow::Result;
use e2e_testnet_config::manifest::Manifest;
use e2e_testnet_core::topology::{Testnet, build_testnet, readiness::ReadinessError};
use e2e_testnet_workflows::StatusServer;

fn testnet_on(servers: &[(&str, &StatusServer)]) -> Result<Testnet> {
    let mut yaml = String::from("name: local\nnetwork: 127.0.0.0/8\nnodes:\n");
    for (idx, (name, server)) in servers.iter().enumerate() {
        yaml.push_str(&format!(
            "  {name}:\n    address: 127.0.0.{}\n    proxy_port: {}\n",
            idx + 2,
            server.port()
        ));
    }
    Ok(build_testnet(Manifest::from_yaml(&yaml)?)?)
}

#[tokio::test]
async fn node_already_at_height_is_ready() -> Result<()> {
    let server = StatusServer::spawn(12).await?;
    let testnet = testnet_on(&[("a", &server)])?;

    testnet.nodes[0]
        .wait_for_height(10, Duration::from_secs(5))
        .await?;

    Ok(())
}

#[tokio::test]
async fn node_wait_follows_height_changes() -> Result<()> {
    let server = StatusServer::spawn(1).await?;
    let testnet = testnet_on(&[("a", &server)])?;

    server.raise_height_after(Duration::from_millis(500), 5);
    let started = Instant::now();
    testnet.nodes[0]
        .wait_for_height(5, Duration::from_secs(10))
        .await?;

    assert!(started.elapsed() >= Duration::from_millis(500));

    Ok(())
}

#[tokio::test]
async fn rpc_errors_are_retried_until_the_node_recovers() -> Result<()> {
    let server = StatusServer::spawn_failing(3).await?;
    let testnet = testnet_on(&[("a", &server)])?;

    server.recover_after(Duration::from_millis(400));
    testnet.nodes[0]
        .wait_for_height(3, Duration::from_secs(10))
        .await?;

    Ok(())
}

#[tokio::test]
async fn stalled_node_times_out_after_budget() -> Result<()> {
    let server = StatusServer::spawn(3).await?;
    let testnet = testnet_on(&[("a", &server)])?;
    let budget = Duration::from_secs(1);

    let started = Instant::now();
    let err = testnet.nodes[0]
        .wait_for_height(10, budget)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(elapsed >= budget, "returned early after {elapsed:?}");
    assert!(
        elapsed < budget + Duration::from_secs(1),
        "returned late after {elapsed:?}"
    );
    match err {
        ReadinessError::Timeout { timeout, message } => {
            assert_eq!(timeout, budget);
            assert!(message.contains("height=3"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn unreachable_node_times_out_with_last_error() -> Result<()> {
    let server = StatusServer::spawn(1).await?;
    let testnet = testnet_on(&[("a", &server)])?;
    drop(server);

    let err = testnet.nodes[0]
        .wait_for_height(1, Duration::from_millis(600))
        .await
        .unwrap_err();

    assert!(matches!(err, ReadinessError::Timeout { .. }));
    assert!(err.to_string().contains("error="), "{err}");

    Ok(())
}

#[tokio::test]
async fn testnet_wait_covers_every_exposed_node() -> Result<()> {
    let fast = StatusServer::spawn(8).await?;
    let slow = StatusServer::spawn(2).await?;
    let testnet = testnet_on(&[("fast", &fast), ("slow", &slow)])?;

    slow.raise_height_after(Duration::from_millis(500), 8);
    let started = Instant::now();
    testnet.wait_for_height(8, Duration::from_secs(10)).await?;
    assert!(started.elapsed() >= Duration::from_millis(500));

    slow.set_height(2);
    let err = testnet
        .wait_for_height(9, Duration::from_millis(600))
        .await
        .unwrap_err();
    assert!(
        err.to_string()
            .ends_with("timed out waiting for height 9: fast: height=8, slow: height=2"),
        "{err}"
    );

    Ok(())
}
