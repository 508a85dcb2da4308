//! Query manager: finder resolution, GETs through a mock transport, materialization.

mod common;

use std::sync::Arc;

use json_models::{HttpResponse, MockTransport, Model, ModelError, QueryParams};

use common::{manager_with, Address, MyModel, MyValidatingModel, Simple, SimpleWithoutFinder};

const GONZO: &str = r#"{"kiddie":{"value": "Gonzo", "address": [{ "number" : 10, "street": "1st Ave. South","city": "MuppetVille"},{"number":5,"street":"Mockingbird Lane","city": "Bedrock"}]}}"#;
const TWO_SIMPLE: &str = "{\"field1\": \"hello\"}\n{\"field1\": \"goodbye\"}";

#[test]
fn noregisteredfinder_raised_when_filter_on_non_existent_field() {
    let mock = Arc::new(MockTransport::ok(""));
    let err = manager_with::<MyModel>(&mock)
        .filter([("foo", "bar")])
        .unwrap_err();
    assert!(matches!(err, ModelError::NoRegisteredFinder { .. }));
    assert!(err.to_string().contains("foo"), "{}", err);
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn queries_rest_service_when_filtering_for_a_registered_finder() {
    let mock = Arc::new(MockTransport::ok(format!("{{\"root\": {}}}", GONZO)));
    let results = manager_with::<MyModel>(&mock)
        .filter([("muppet_name", "baz")])
        .unwrap();
    assert_eq!(results.count(), 1);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.last_url().as_deref(), Some("http://foo.com/muppets/baz"));
}

#[test]
fn counts_child_nodes_when_filtering_a_collection_of_results() {
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    let results = manager_with::<Simple>(&mock)
        .filter([("field1", "baz")])
        .unwrap();
    assert_eq!(results.count(), 2);
    assert_eq!(results.len(), 2);
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn queries_rest_service_when_getting_for_a_registered_finder() {
    let mock = Arc::new(MockTransport::ok(GONZO));
    let gonzo = manager_with::<MyModel>(&mock)
        .get([("muppet_name", "baz")])
        .unwrap();
    assert_eq!(gonzo.muppet_name().unwrap().as_deref(), Some("Gonzo"));
    assert_eq!(mock.call_count(), 1);
}

/// **Scenario**: placeholders fill in the finder's key order, not the caller's.
#[test]
fn queries_rest_service_when_getting_for_a_multi_field_registered_finder() {
    let mock = Arc::new(MockTransport::ok(
        r#"{"number": 10, "street": "1st Ave. South", "city": "MuppetVille"}"#,
    ));
    let address = manager_with::<Address>(&mock)
        .get([("street", "foo"), ("number", "bar")])
        .unwrap();
    assert_eq!(address.street().unwrap().as_deref(), Some("1st Ave. South"));
    assert_eq!(
        mock.last_url().as_deref(),
        Some("http://address/number/bar/street/foo")
    );
}

#[test]
fn accepts_strings_as_finder_keys() {
    let mock = Arc::new(MockTransport::ok(
        r#"{"number": 10, "street": "1st Ave. South", "city": "MuppetVille"}"#,
    ));
    let address = manager_with::<Address>(&mock)
        .get([("street", "foo"), ("stringfield", "bar")])
        .unwrap();
    assert_eq!(address.number().unwrap(), Some(10));
    assert_eq!(
        mock.last_url().as_deref(),
        Some("http://address/street/foo/stringfield/bar")
    );
}

#[test]
fn accepts_non_string_values() {
    let mock = Arc::new(MockTransport::ok(r#"{"number": 10}"#));
    let manager = manager_with::<Address>(&mock);
    manager.get(QueryParams::new().with("number", 10)).unwrap();
    assert_eq!(mock.last_url().as_deref(), Some("http://address/number/10"));
}

#[test]
fn resolve_builds_url_without_fetching() {
    let mock = Arc::new(MockTransport::ok(""));
    let manager = manager_with::<Address>(&mock);
    assert_eq!(
        manager.resolve([("city", "Bedrock")]).unwrap(),
        "http://localhost:8998/address/Bedrock"
    );
    assert!(manager.resolve([("number", "1"), ("city", "Bedrock")]).is_err());
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn get_raises_does_not_exist_when_response_empty() {
    let mock = Arc::new(MockTransport::ok(""));
    let err = manager_with::<MyModel>(&mock)
        .get([("muppet_name", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::DoesNotExist { .. }));
    assert!(err.to_string().contains("DoesNotExist"));
}

#[test]
fn get_raises_does_not_exist_when_response_code_404() {
    let mock = Arc::new(MockTransport::status(
        404,
        "<HTML><body>Nothing to see here</body></HTML>",
    ));
    let err = manager_with::<MyModel>(&mock)
        .get([("muppet_name", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::DoesNotExist { .. }));
}

/// **Scenario**: the same empty body fails `get` and is an empty result for `filter`.
#[test]
fn filter_returns_empty_set_when_response_empty() {
    let mock = Arc::new(MockTransport::ok(""));
    let results = manager_with::<MyModel>(&mock)
        .filter([("muppet_name", "baz")])
        .unwrap();
    assert_eq!(results.count(), 0);
    assert!(results.is_empty());
    assert!(results.first().is_none());
}

#[test]
fn filter_surfaces_error_status_with_body() {
    let mock = Arc::new(MockTransport::new(HttpResponse::new(503, "down for maintenance")));
    let err = manager_with::<Simple>(&mock)
        .filter([("field1", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::Http { status: 503, .. }));
}

#[test]
fn transport_failures_surface_as_transport_errors() {
    let mock = Arc::new(MockTransport::failing("connection refused"));
    let err = manager_with::<Simple>(&mock)
        .get([("field1", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::Transport { .. }));
}

#[test]
fn get_raises_validation_error_given_bad_json() {
    let mock = Arc::new(MockTransport::ok("<HTML><body>Nothing to see here</body></HTML>"));
    let err = manager_with::<MyValidatingModel>(&mock)
        .get([("muppet_name", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    assert_eq!(err.to_string(), "Invalid JSON");
}

#[test]
fn get_raises_validation_error_given_bad_data() {
    let mock = Arc::new(MockTransport::ok(r#"{"Weta":true}"#));
    let err = manager_with::<MyValidatingModel>(&mock)
        .get([("muppet_name", "baz")])
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    assert_eq!(err.to_string(), "What, no muppet name?");
}

/// **Scenario**: two newline-separated records come back in input order.
#[test]
fn returns_iterator_for_collection_of_results() {
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    let results = manager_with::<Simple>(&mock)
        .filter([("field1", "baz")])
        .unwrap();
    let fields: Vec<_> = results
        .iter()
        .map(|simple| simple.unwrap().field1().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec![Some("hello".to_string()), Some("goodbye".to_string())]
    );
}

#[test]
fn returns_iterator_for_collection_of_results_from_custom_query() {
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    let results = manager_with::<SimpleWithoutFinder>(&mock)
        .filter_custom("http://hard_coded_url")
        .unwrap();
    let mut seen = Vec::new();
    for simple in &results {
        seen.push(simple.unwrap().field1().unwrap().unwrap_or_default());
    }
    assert_eq!(seen, vec!["hello", "goodbye"]);
    assert_eq!(results.url(), Some("http://hard_coded_url"));
    assert_eq!(mock.last_url().as_deref(), Some("http://hard_coded_url"));
}

#[test]
fn iteration_can_be_repeated() {
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    let results = manager_with::<Simple>(&mock)
        .filter([("field1", "baz")])
        .unwrap();
    let first = results.to_vec().unwrap();
    let second = results.to_vec().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        results.get(1).unwrap().unwrap().field1().unwrap().as_deref(),
        Some("goodbye")
    );
    assert!(results.get(2).is_none());
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn a_rejected_record_aborts_to_vec() {
    let mock = Arc::new(MockTransport::ok(
        "{\"kiddie\":{\"value\":\"Kermit\"}}\n{\"kiddie\":{}}",
    ));
    let results = manager_with::<MyValidatingModel>(&mock)
        .filter([("muppet_name", "baz")])
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.first().unwrap().is_ok());
    assert!(matches!(results.to_vec(), Err(ModelError::Validation(_))));
}

#[test]
fn headers_specified_on_model_are_sent_with_every_query() {
    assert_eq!(
        Simple::objects().headers().get("user").map(String::as_str),
        Some("user1")
    );
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    let results = manager_with::<Simple>(&mock)
        .filter([("field1", "Rhubarb")])
        .unwrap();
    assert_eq!(
        results.headers().get("password").map(String::as_str),
        Some("pwd1")
    );
    let sent = &mock.calls()[0].headers;
    assert_eq!(sent.get("user").map(String::as_str), Some("user1"));
    assert_eq!(sent.get("password").map(String::as_str), Some("pwd1"));
}

#[test]
fn models_without_headers_send_none() {
    let mock = Arc::new(MockTransport::ok(TWO_SIMPLE));
    manager_with::<SimpleWithoutFinder>(&mock)
        .filter_custom("http://hard_coded_url")
        .unwrap();
    assert!(mock.calls()[0].headers.is_empty());
}
