use std::time::Duration;

use e2e_testnet_env as tf_env;

pub const WAIT_TIMEOUT_SECS: u64 = 60;
pub const POLL_INTERVAL_MILLIS: u64 = 200;

/// Budget for a readiness wait when the caller has no opinion, from
/// `E2E_WAIT_TIMEOUT_SECS`.
pub fn wait_timeout() -> Duration {
    Duration::from_secs(tf_env::e2e_wait_timeout_secs().unwrap_or(WAIT_TIMEOUT_SECS))
}

/// Delay between two status probes, from `E2E_POLL_INTERVAL_MILLIS`. Zero
/// is ignored so the poller never re-queries without pausing.
pub fn poll_interval() -> Duration {
    poll_interval_from(tf_env::e2e_poll_interval_millis())
}

fn poll_interval_from(millis: Option<u64>) -> Duration {
    Duration::from_millis(
        millis
            .filter(|ms| *ms > 0)
            .unwrap_or(POLL_INTERVAL_MILLIS),
    )
}
