//! Store configuration

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URL of the public OpenKeyval endpoint.
pub const STANDARD_ENDPOINT: &str = "http://api.openkeyval.org";

/// Base URL of the TLS-secured OpenKeyval endpoint.
pub const SECURE_ENDPOINT: &str = "https://secure.openkeyval.org";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration options for a [`Store`](crate::Store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root URL of the OpenKeyval endpoint (default: the standard endpoint)
    pub base_url: String,
    /// Request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Body the service answers with instead of a 404 when a key has no value.
    /// A successful response carrying exactly this body reads as absent.
    pub missing_sentinel: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_base_url(STANDARD_ENDPOINT)
    }
}

impl StoreConfig {
    /// Default configuration pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            missing_sentinel: None,
        }
    }

    /// Configuration for the standard endpoint.
    pub fn standard() -> Self {
        Self::with_base_url(STANDARD_ENDPOINT)
    }

    /// Configuration for the secure endpoint.
    pub fn secure() -> Self {
        Self::with_base_url(SECURE_ENDPOINT)
    }

    /// Reads the configuration from `OKV_*` environment variables.
    ///
    /// Unset variables keep their defaults; so do unparseable numbers.
    pub fn from_env() -> Self {
        let base_url = env::var("OKV_BASE_URL").unwrap_or_else(|_| STANDARD_ENDPOINT.to_string());
        let timeout_ms = env::var("OKV_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let missing_sentinel = env::var("OKV_MISSING_SENTINEL").ok();

        Self {
            base_url,
            timeout_ms,
            missing_sentinel,
        }
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
