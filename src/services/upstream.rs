use std::time::Duration;

/// Failure talking to a third-party service. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream payload could not be read: {0}")]
    Payload(String),
}

pub fn user_agent() -> String {
    std::env::var("GEO_USER_AGENT").unwrap_or_else(|_| {
        format!(
            "relief-map/{} (shelter locator)",
            env!("CARGO_PKG_VERSION")
        )
    })
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent())
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub fn env_url(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
