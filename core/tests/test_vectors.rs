//! Verify option extraction against JSON test vectors stored in `test-vectors/`.
//!
//! Each case pairs a raw options table with the typed options it must produce.

use http_client_core::{ConfigMap, RequestOptions};
use serde_json::Value;

fn optional_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn expected_options(expected: &Value) -> RequestOptions {
    RequestOptions {
        follow_redirects: expected["follow_redirects"].as_bool().unwrap(),
        max_redirects: expected["max_redirects"].as_i64().unwrap(),
        user_agent: expected["user_agent"].as_str().unwrap().to_string(),
        keep_alive: expected["keep_alive"].as_bool().unwrap(),
        body: optional_string(&expected["body"]),
        method: optional_string(&expected["method"]),
    }
}

#[test]
fn options_test_vectors() {
    let raw = include_str!("../../test-vectors/options.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let cases = vectors["cases"].as_array().unwrap();
    assert!(!cases.is_empty());

    for case in cases {
        let name = case["name"].as_str().unwrap();
        let input: &ConfigMap = case["input"].as_object().unwrap();
        let expected = expected_options(&case["expected"]);

        assert_eq!(RequestOptions::from_map(input), expected, "{name}");
    }
}
