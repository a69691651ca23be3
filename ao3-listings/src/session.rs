//! HTTP session used for every listing request.
//!
//! The traversal only ever needs `GET url -> (status, body, reason)`, so the
//! session is a narrow trait. [`HttpSession`] is the reqwest implementation
//! that carries the archive's login cookies; tests substitute scripted
//! sessions.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

use crate::config::SessionConfig;
use crate::errors::{ArchiveError, Result};

/// A response as seen by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub text: String,
    /// Reason phrase for the status.
    pub reason: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status_code: u16, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status_code,
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// A 200 response with the given body.
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self::new(200, text, "OK")
    }

    /// Whether the status is exactly 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Protocol for the authenticated HTTP session.
///
/// Implementations attach whatever cookies the login step produced. The
/// session is shared for a whole traversal and never mutated by it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    /// Performs one GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Session backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    logged_in: bool,
}

impl HttpSession {
    /// Builds a session from configuration.
    ///
    /// When a session cookie is configured, every request carries
    /// `_otwarchive_session=<cookie>` and the `user_credentials=1` flag the
    /// archive requires alongside it.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie.as_deref() {
            let value = HeaderValue::from_str(&login_cookie_header(cookie))
                .map_err(|e| ArchiveError::Config(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ArchiveError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            logged_in: config.session_cookie.is_some(),
        })
    }

    /// Whether requests carry login cookies.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text().await?;

        Ok(HttpResponse {
            status_code: status.as_u16(),
            text,
            reason,
        })
    }
}

/// Cookie header value for a logged-in session.
#[must_use]
pub fn login_cookie_header(session_cookie: &str) -> String {
    format!("_otwarchive_session={session_cookie}; user_credentials=1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_cookie_header() {
        assert_eq!(
            login_cookie_header("abc%3D%3D"),
            "_otwarchive_session=abc%3D%3D; user_credentials=1"
        );
    }

    #[test]
    fn test_http_session_builds() {
        let anonymous = HttpSession::new(&SessionConfig::default()).unwrap();
        assert!(!anonymous.is_logged_in());

        let logged_in =
            HttpSession::new(&SessionConfig::default().with_session_cookie("token")).unwrap();
        assert!(logged_in.is_logged_in());
    }

    #[test]
    fn test_http_session_rejects_bad_cookie() {
        let config = SessionConfig::default().with_session_cookie("bad\ncookie");
        let err = HttpSession::new(&config).unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }

    #[test]
    fn test_http_response_helpers() {
        let ok = HttpResponse::ok("<html></html>");
        assert!(ok.is_ok());
        assert_eq!(ok.reason, "OK");

        let created = HttpResponse::new(201, "", "Created");
        assert!(!created.is_ok());
    }
}
