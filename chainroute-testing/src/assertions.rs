// Test assertions for routing outcomes

use crate::TestResponse;
use chainroute_core::{HttpStatus, Response};
use serde_json::Value;

/// Assert that a response has a specific status code
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status().unwrap_or(0);
    assert_eq!(
        actual, expected,
        "Expected status {}, got {}",
        expected, actual
    );
}

/// Assert that a response has a specific HTTP status
pub fn assert_http_status(response: &Response, expected: HttpStatus) {
    assert_eq!(
        response.status,
        expected.code(),
        "Expected status {}, got {}",
        expected.code(),
        response.status
    );
}

/// Assert that a response body equals `expected`
pub fn assert_body(response: &TestResponse, expected: impl Into<Value>) {
    let expected = expected.into();
    let actual = response.body();
    assert_eq!(
        actual,
        Some(&expected),
        "Expected body {}, got {:?}",
        expected,
        actual
    );
}

/// Assert that a response body deserializes to `expected`
pub fn assert_json<T>(response: &TestResponse, expected: &T)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let actual: T = match response.body_json() {
        Ok(actual) => actual,
        Err(e) => panic!("Failed to deserialize response body: {}", e),
    };
    assert_eq!(actual, *expected, "JSON bodies do not match");
}

/// Assert that a response has a specific header (name is case-insensitive)
pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response body contains a string
pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string().unwrap_or_default();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that routing failed with exactly this message
pub fn assert_error_message(response: &TestResponse, expected: &str) {
    let actual = response.error_message();
    assert_eq!(
        actual.as_deref(),
        Some(expected),
        "Expected error '{}', got {:?}",
        expected,
        response
    );
}
