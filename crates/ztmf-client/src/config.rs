//! Client configuration.

use std::time::Duration;

use ztmf_core::DATACALL_CACHE_TTL;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_URL: &str = "ZTMF_URL";
pub const ENV_TOKEN: &str = "ZTMF_TOKEN";

/// Configuration for [`ZtmfClient`](crate::ZtmfClient).
///
/// Empty strings and zero durations are filled in when the client is built:
/// first from `ZTMF_URL` / `ZTMF_TOKEN`, then from the defaults above.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// API base URL, including the `/api/v1` prefix.
    pub base_url: String,
    /// Bearer token. Without one, requests go out unauthenticated.
    pub token: String,
    pub timeout: Duration,
    pub datacall_cache_ttl: Duration,
}

/// Configuration after defaults and environment have been applied.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
    pub datacall_cache_ttl: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn resolve(&self) -> Resolved {
        let base_url = first_non_empty(&[
            &self.base_url,
            &std::env::var(ENV_URL).unwrap_or_default(),
            DEFAULT_BASE_URL,
        ])
        .trim_end_matches('/')
        .to_owned();

        let token = first_non_empty(&[&self.token, &std::env::var(ENV_TOKEN).unwrap_or_default()]);

        Resolved {
            base_url,
            token,
            timeout: non_zero_or(self.timeout, DEFAULT_TIMEOUT),
            datacall_cache_ttl: non_zero_or(self.datacall_cache_ttl, DATACALL_CACHE_TTL),
        }
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() { fallback } else { value }
}

pub(crate) fn first_non_empty(vals: &[&str]) -> String {
    vals.iter()
        .find(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_owned())
        .unwrap_or_default()
}
