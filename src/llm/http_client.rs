use reqwest::Client;
use std::time::Duration;

/// Shared client for model and enrichment calls. The per-call timeout is
/// set on the client; connection setup gets its own shorter bound.
pub fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10.min(timeout_secs.max(1))))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(concat!("biotools-curator/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}
