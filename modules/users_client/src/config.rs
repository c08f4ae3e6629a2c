use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the client data layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the user directory API.
    pub api_url: Url,
    /// How long a successful full-list fetch stays valid.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    /// How long a store error stays visible before it is auto-cleared.
    #[serde(with = "humantime_serde")]
    pub error_ttl: Duration,
    /// Per-request timeout for the underlying HTTP client.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse("http://localhost:4000/api").expect("static URL"),
            cache_ttl: Duration::from_secs(5 * 60),
            error_ttl: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}
