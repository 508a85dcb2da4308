//! One GET and the interpretation of its response.
//!
//! A query goes `Request` (resolved URL) -> `Fetched` (status and raw body) -> documents.
//! Single-result and multi-result queries read a response differently: `get` fails hard on
//! anything but a non-empty 2xx body, `filter` treats an empty body as no results.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::ModelError;
use crate::transport::Transport;

pub(crate) struct Request<'a> {
    pub url: String,
    pub headers: &'a BTreeMap<String, String>,
}

pub(crate) struct Fetched {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Request<'_> {
    pub fn send(self, model: &'static str, transport: &dyn Transport) -> Result<Fetched, ModelError> {
        debug!(model, url = %self.url, "GET");
        let response = transport
            .get(&self.url, self.headers)
            .map_err(|e| ModelError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        if !response.is_success() {
            warn!(model, url = %self.url, status = response.status, "non-2xx response");
        }
        Ok(Fetched {
            url: self.url,
            status: response.status,
            body: response.body,
        })
    }
}

impl Fetched {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Exactly one document, or `DoesNotExist` for an empty body or an error status.
    pub fn into_single(self, model: &'static str) -> Result<Document, ModelError> {
        if !self.is_success() || self.is_empty() {
            return Err(ModelError::DoesNotExist {
                model,
                url: self.url,
            });
        }
        Document::parse(&self.body)
    }

    /// Zero or more documents. An empty body is no results whatever the status.
    pub fn into_records(self, model: &'static str) -> Result<Vec<Document>, ModelError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if !self.is_success() {
            return Err(ModelError::Http {
                url: self.url,
                status: self.status,
            });
        }
        let records = parse_records(&self.body)?;
        debug!(model, url = %self.url, count = records.len(), "materialized records");
        Ok(records)
    }
}

/// Reads whitespace-separated JSON objects (one per line in practice) in input order.
pub(crate) fn parse_records(body: &str) -> Result<Vec<Document>, ModelError> {
    serde_json::Deserializer::from_str(body)
        .into_iter::<Value>()
        .map(|record| Document::from_value(record?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn fetched(status: u16, body: &str) -> Fetched {
        Fetched {
            url: "http://foo.com/simple/baz".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn records_in_input_order() {
        let records = parse_records("{\"f\":\"a\"}\n{\"f\":\"b\"}").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].to_value(), json!({"f": "a"}));
        assert_eq!(records[1].to_value(), json!({"f": "b"}));
    }

    #[test]
    fn blank_lines_between_records_are_skipped() {
        let records = parse_records("\n{\"f\":\"a\"}\n\n{\"f\":\"b\"}\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn garbage_record_fails_validation() {
        let err = parse_records("{\"f\":\"a\"}\n<html>").unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
    }

    #[test]
    fn non_object_record_is_malformed() {
        let err = parse_records("{\"f\":\"a\"}\n[1]").unwrap_err();
        assert!(matches!(err, ModelError::MalformedDocument(_)));
    }

    #[test]
    fn single_fails_on_empty_or_error_status() {
        assert!(matches!(
            fetched(200, "").into_single("Simple"),
            Err(ModelError::DoesNotExist { .. })
        ));
        assert!(matches!(
            fetched(404, "<HTML><body>Nothing to see here</body></HTML>").into_single("Simple"),
            Err(ModelError::DoesNotExist { .. })
        ));
        let document = fetched(200, "{\"field1\": \"hello\"}").into_single("Simple").unwrap();
        assert_eq!(document.to_value(), json!({"field1": "hello"}));
    }

    /// **Scenario**: an empty body is zero results even with an error status; a body with
    /// an error status is an HTTP error.
    #[test]
    fn records_degrade_on_empty_body() {
        assert!(fetched(200, "").into_records("Simple").unwrap().is_empty());
        assert!(fetched(404, "  ").into_records("Simple").unwrap().is_empty());
        assert!(matches!(
            fetched(500, "oops").into_records("Simple"),
            Err(ModelError::Http { status: 500, .. })
        ));
    }

    #[test]
    fn send_maps_transport_failures() {
        let mock = MockTransport::failing("connection refused");
        let headers = BTreeMap::new();
        let request = Request {
            url: "http://localhost:1/x".to_string(),
            headers: &headers,
        };
        let err = request.send("Simple", &mock).err().unwrap();
        assert!(matches!(err, ModelError::Transport { .. }));
    }
}
