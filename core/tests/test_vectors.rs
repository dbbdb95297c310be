//! Verify build methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation, its input parameters and either the request
//! it must produce or the parameter path validation must reject. Bodies are
//! compared as parsed JSON so key order does not matter.

use nylas_core::{params, ApiError, HttpMethod, HttpRequest, NylasClient, Options, Result};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> NylasClient {
    NylasClient::new(
        Options::new("cid", "secret")
            .access_token("tok")
            .api_url(BASE_URL),
    )
    .unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_case(case: &Value, built: Result<HttpRequest>) {
    let name = case["name"].as_str().unwrap();

    if let Some(expected_err) = case.get("expected_error") {
        let path = expected_err["path"].as_str().unwrap();
        match built {
            Err(ApiError::Validation(e)) => assert_eq!(e.path, path, "{name}: error path"),
            other => panic!("{name}: expected validation error at {path}, got {other:?}"),
        }
        return;
    }

    let expected_req = &case["expected_request"];
    let req = built.unwrap_or_else(|e| panic!("{name}: {e}"));
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.header("authorization"), Some("Basic dG9rOg=="), "{name}: authorization");

    match expected_req.get("body") {
        Some(expected_body) => {
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&body, expected_body, "{name}: body");
            assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content type");
        }
        None => assert!(req.body.is_none(), "{name}: unexpected body"),
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn events_test_vectors() {
    let raw = include_str!("../../test-vectors/events.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let input = params(case["input"].clone());
        let built = match case["operation"].as_str().unwrap() {
            "add" => c.events().build_add(&input),
            "update" => c.events().build_update(&input),
            "list" => c.events().build_list(&input),
            other => panic!("unknown operation: {other}"),
        };
        check_case(case, built);
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[test]
fn messages_test_vectors() {
    let raw = include_str!("../../test-vectors/messages.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let input = params(case["input"].clone());
        let built = match case["operation"].as_str().unwrap() {
            "list" => c.messages().build_list(&input),
            "update" => {
                let id = case["message_id"].as_str().unwrap();
                c.messages().build_update(id, &input)
            }
            other => panic!("unknown operation: {other}"),
        };
        check_case(case, built);
    }
}
