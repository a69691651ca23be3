//! Scripted session for traversal tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::errors::Result;
use crate::session::{HttpResponse, Session};

/// A [`Session`] that answers from a per-URL script and records every
/// request.
///
/// Responses queued for a URL are served in order; the last one keeps being
/// served once the queue is down to it. Unscripted URLs get a 404.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSession {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `url`.
    #[must_use]
    pub fn respond(self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.routes
            .lock()
            .entry(url.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Queues a 200 response with `body` for `url`.
    #[must_use]
    pub fn page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.respond(url, HttpResponse::ok(body))
    }

    /// Every requested URL, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// How many times `url` was requested.
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests.lock().push(url.to_string());

        let mut routes = self.routes.lock();
        let response = match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::new(404, "Not Found", "Not Found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order_then_sticky() {
        let session = ScriptedSession::new()
            .respond("u", HttpResponse::new(525, "", ""))
            .page("u", "body");

        assert_eq!(session.get("u").await.unwrap().status_code, 525);
        assert_eq!(session.get("u").await.unwrap().text, "body");
        assert_eq!(session.get("u").await.unwrap().text, "body");
        assert_eq!(session.request_count("u"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_url_is_not_found() {
        let session = ScriptedSession::new();
        let response = session.get("missing").await.unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(session.requests(), vec!["missing".to_string()]);
    }
}
