//! Configuration types for sessions and fetching.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Result;

/// Root URL of the archive.
pub const BASE_URL: &str = "https://archiveofourown.org";

/// Configuration for the HTTP session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Archive root URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Value of the `_otwarchive_session` cookie of a logged-in browser.
    ///
    /// Private bookmarks, locked works and subscriptions are only visible
    /// when this is set.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("ao3-listings/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> f64 {
    30.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            session_cookie: None,
        }
    }
}

impl SessionConfig {
    /// Creates a new session configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive root URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the `_otwarchive_session` cookie value.
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

/// Retry policy for page fetches.
///
/// There is deliberately no attempt limit: transient conditions are retried
/// until they clear or the traversal's cancellation token fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before every attempt, to stay under the archive's rate limit.
    #[serde(default = "default_politeness_delay")]
    pub politeness_delay_seconds: f64,
    /// Wait after an edge-overload status.
    #[serde(default = "default_overload_delay")]
    pub overload_delay_seconds: f64,
    /// Wait after a "Retry later" body.
    #[serde(default = "default_retry_later_delay")]
    pub retry_later_delay_seconds: f64,
    /// Status code the edge proxy returns when the origin is overloaded.
    #[serde(default = "default_overload_status")]
    pub overload_status: u16,
    /// Marker text of the rate-limit body.
    #[serde(default = "default_retry_later_marker")]
    pub retry_later_marker: String,
    /// Rate-limit bodies are shorter than this many bytes.
    #[serde(default = "default_retry_later_max_body_len")]
    pub retry_later_max_body_len: usize,
}

fn default_politeness_delay() -> f64 {
    5.0
}

fn default_overload_delay() -> f64 {
    10.0
}

fn default_retry_later_delay() -> f64 {
    180.0
}

fn default_overload_status() -> u16 {
    525
}

fn default_retry_later_marker() -> String {
    "Retry later".to_string()
}

fn default_retry_later_max_body_len() -> usize {
    20
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            politeness_delay_seconds: default_politeness_delay(),
            overload_delay_seconds: default_overload_delay(),
            retry_later_delay_seconds: default_retry_later_delay(),
            overload_status: default_overload_status(),
            retry_later_marker: default_retry_later_marker(),
            retry_later_max_body_len: default_retry_later_max_body_len(),
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy with the same classification but no waiting at all.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            politeness_delay_seconds: 0.0,
            overload_delay_seconds: 0.0,
            retry_later_delay_seconds: 0.0,
            ..Self::default()
        }
    }

    /// Sets the politeness delay.
    #[must_use]
    pub fn with_politeness_delay(mut self, seconds: f64) -> Self {
        self.politeness_delay_seconds = seconds;
        self
    }

    /// Sets the overload backoff.
    #[must_use]
    pub fn with_overload_delay(mut self, seconds: f64) -> Self {
        self.overload_delay_seconds = seconds;
        self
    }

    /// Sets the "Retry later" backoff.
    #[must_use]
    pub fn with_retry_later_delay(mut self, seconds: f64) -> Self {
        self.retry_later_delay_seconds = seconds;
        self
    }

    /// Politeness delay as Duration.
    #[must_use]
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_secs_f64(self.politeness_delay_seconds)
    }

    /// Overload backoff as Duration.
    #[must_use]
    pub fn overload_delay(&self) -> Duration {
        Duration::from_secs_f64(self.overload_delay_seconds)
    }

    /// "Retry later" backoff as Duration.
    #[must_use]
    pub fn retry_later_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_later_delay_seconds)
    }

    /// Whether a status is the edge-overload signature.
    #[must_use]
    pub fn is_overload_status(&self, status: u16) -> bool {
        status == self.overload_status
    }

    /// Whether a body is the short rate-limit page.
    #[must_use]
    pub fn is_retry_later_body(&self, body: &str) -> bool {
        body.len() < self.retry_later_max_body_len && body.contains(&self.retry_later_marker)
    }
}

/// Top-level configuration for an [`crate::archive::Archive`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Fetch retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ArchiveConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replaces the session settings.
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
