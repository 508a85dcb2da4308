//! HTTP GET seam used by managers.
//!
//! [`UreqTransport`] is the live implementation; [`MockTransport`] returns a canned response
//! and records every request, for tests that exercise the real query path without a network.

use std::collections::BTreeMap;
use std::sync::Mutex;

use env_config::ClientSettings;
use thiserror::Error;

/// Status and body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or request construction failure.
    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Blocking GET. Implementations must not treat non-2xx statuses as errors.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, headers: &BTreeMap<String, String>)
        -> Result<HttpResponse, TransportError>;
}

/// Live transport over a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
    settings: ClientSettings,
}

impl UreqTransport {
    pub fn from_settings(settings: ClientSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(settings.timeout)
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::from_settings(ClientSettings::default())
    }
}

impl Transport for UreqTransport {
    fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", self.settings.user_agent.as_str());
        for (name, value) in self.settings.headers.iter().chain(headers.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }
        let mut response = request
            .call()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// A recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

/// Answers every GET with the same response (or failure) and remembers what was asked.
pub struct MockTransport {
    response: Result<HttpResponse, String>,
    calls: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new(response: HttpResponse) -> Self {
        Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 200 with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(HttpResponse::ok(body))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::new(HttpResponse::new(status, body))
    }

    /// Fails every request with [`TransportError::Request`].
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        match self.calls.lock() {
            Ok(calls) => calls.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// URL of the most recent request.
    pub fn last_url(&self) -> Option<String> {
        self.calls().pop().map(|call| call.url)
    }
}

impl Transport for MockTransport {
    fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, TransportError> {
        let request = RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
        self.response.clone().map_err(TransportError::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::ok("").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
    }

    #[test]
    fn mock_records_calls() {
        let mock = MockTransport::ok("{}");
        let mut headers = BTreeMap::new();
        headers.insert("user".to_string(), "user1".to_string());
        let response = mock.get("http://foo.com/simple/baz", &headers).unwrap();
        assert_eq!(response.body, "{}");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].headers.get("user").map(String::as_str), Some("user1"));
        assert_eq!(mock.last_url().as_deref(), Some("http://foo.com/simple/baz"));
    }

    #[test]
    fn failing_mock_returns_request_error() {
        let mock = MockTransport::failing("connection refused");
        let err = mock.get("http://localhost:1", &BTreeMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "request failed: connection refused");
        assert_eq!(mock.call_count(), 1);
    }
}
