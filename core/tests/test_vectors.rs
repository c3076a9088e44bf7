//! Verify request preparation against JSON test vectors stored in `test-vectors/`.
//!
//! Each case lists the options to apply and the request that must come out
//! of `Client::prepare`. Bodies are compared as parsed JSON, not raw
//! strings, to avoid false negatives from field ordering.

use serde_json::Value;
use xhttp_core::{with_body, with_header, with_method, with_query, Client, HttpMethod, RequestOption};

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

fn options_from(spec: &Value) -> Vec<RequestOption> {
    let mut options = Vec::new();
    if let Some(method) = spec["method"].as_str() {
        options.push(with_method(parse_method(method)));
    }
    for query in spec["query"].as_array().into_iter().flatten() {
        let entries: Vec<(String, Value)> = query
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        options.push(with_query(entries));
    }
    for headers in spec["headers"].as_array().into_iter().flatten() {
        let entries: Vec<(String, String)> = headers
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.as_str().unwrap().to_string()))
            .collect();
        options.push(with_header(entries));
    }
    if !spec["body"].is_null() {
        options.push(with_body(spec["body"].clone()));
    }
    options
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let client = Client::new();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = case["url"].as_str().unwrap();
        let expected = &case["expected_request"];

        let req = client.prepare(url, options_from(&case["options"])).unwrap();
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let sent: Value = serde_json::from_slice(body).unwrap();
                assert_eq!(sent, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body"),
        }
    }
}
