use std::env;

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

#[must_use]
pub fn debug_tracing() -> bool {
    env::var("E2E_TESTS_TRACING").is_ok_and(|val| val.eq_ignore_ascii_case("true"))
}

#[must_use]
pub fn e2e_wait_timeout_secs() -> Option<u64> {
    env::var("E2E_WAIT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

#[must_use]
pub fn e2e_poll_interval_millis() -> Option<u64> {
    env::var("E2E_POLL_INTERVAL_MILLIS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

#[must_use]
pub fn e2e_rpc_host() -> Option<String> {
    env::var("E2E_RPC_HOST").ok().filter(|host| !host.is_empty())
}
