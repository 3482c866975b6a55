// Test client for driving a router

use chainroute_core::{Error, HttpMethod, RequestInit, Response, Router};
use serde_json::Value;
use std::sync::Arc;

/// Base URL used when a test request only gives a path
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Test client for making requests against a router
///
/// Every request gets a fresh clone of the client's state as its context.
pub struct TestClient<S = ()> {
    router: Arc<Router<S>>,
    base_url: String,
    state: S,
}

impl<S: Clone + Default + Send + 'static> TestClient<S> {
    pub fn new(router: impl Into<Arc<Router<S>>>) -> Self {
        Self::with_state(router, S::default())
    }
}

impl<S: Clone + Send + 'static> TestClient<S> {
    pub fn with_state(router: impl Into<Arc<Router<S>>>, state: S) -> Self {
        Self {
            router: router.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            state,
        }
    }

    /// Resolve relative paths against `base_url` instead of `http://localhost`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn router(&self) -> &Router<S> {
        &self.router
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: impl Into<Vec<u8>>) -> TestResponse {
        self.request(HttpMethod::POST, path, Some(body.into())).await
    }

    pub async fn put(&self, path: &str, body: impl Into<Vec<u8>>) -> TestResponse {
        self.request(HttpMethod::PUT, path, Some(body.into())).await
    }

    pub async fn patch(&self, path: &str, body: impl Into<Vec<u8>>) -> TestResponse {
        self.request(HttpMethod::PATCH, path, Some(body.into())).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::DELETE, path, None).await
    }

    /// Make a request with a custom method, routed asynchronously
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        self.send(TestRequestBuilder::new(method, path).body(body.unwrap_or_default()))
            .await
    }

    pub async fn send(&self, request: TestRequestBuilder) -> TestResponse {
        let init = request.into_request(&self.base_url);
        self.router
            .route_async(init, self.state.clone())
            .await
            .into()
    }

    pub fn get_sync(&self, path: &str) -> TestResponse {
        self.request_sync(HttpMethod::GET, path, None)
    }

    /// Make a request with a custom method, routed synchronously
    pub fn request_sync(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        self.send_sync(TestRequestBuilder::new(method, path).body(body.unwrap_or_default()))
    }

    pub fn send_sync(&self, request: TestRequestBuilder) -> TestResponse {
        let init = request.into_request(&self.base_url);
        self.router.route_sync(init, self.state.clone()).into()
    }
}

/// Builder for test requests
#[derive(Debug, Clone)]
pub struct TestRequestBuilder {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    query_params: Vec<(String, String)>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self::with_method(method.as_str(), path)
    }

    /// Any method string, including ones outside [`HttpMethod`]
    pub fn with_method(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            query_params: Vec::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set JSON body
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(data)?;
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        Ok(self)
    }

    /// Add a query parameter; keys and values are percent-encoded
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Build against [`DEFAULT_BASE_URL`]
    pub fn build(self) -> RequestInit {
        self.into_request(DEFAULT_BASE_URL)
    }

    /// Build, resolving a relative path against `base_url`. Absolute URLs
    /// are kept as they are.
    pub fn into_request(self, base_url: &str) -> RequestInit {
        let mut url = if self.path.contains("://") {
            self.path
        } else if self.path.starts_with('/') {
            format!("{}{}", base_url.trim_end_matches('/'), self.path)
        } else {
            format!("{}/{}", base_url.trim_end_matches('/'), self.path)
        };

        if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&params.join("&"));
        }

        let mut init = RequestInit::new(self.method, url).with_body(self.body);
        for (key, value) in self.headers {
            init = init.with_header(key, value);
        }
        init
    }
}

/// Outcome of a test request
#[derive(Debug)]
pub enum TestResponse {
    Success(Response),
    Error(Error),
}

impl From<Result<Response, Error>> for TestResponse {
    fn from(result: Result<Response, Error>) -> Self {
        match result {
            Ok(response) => TestResponse::Success(response),
            Err(error) => TestResponse::Error(error),
        }
    }
}

impl TestResponse {
    /// Assert the request succeeded
    pub fn assert_success(&self) -> &Response {
        match self {
            TestResponse::Success(response) => response,
            TestResponse::Error(error) => {
                panic!("Expected success response, got error: {}", error)
            }
        }
    }

    /// Assert the request failed
    pub fn assert_error(&self) -> &Error {
        match self {
            TestResponse::Error(error) => error,
            TestResponse::Success(response) => {
                panic!("Expected error, got response with status {}", response.status)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestResponse::Success(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TestResponse::Success(response) => Some(response.status),
            TestResponse::Error(_) => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            TestResponse::Success(response) => Some(&response.body),
            TestResponse::Error(_) => None,
        }
    }

    /// String bodies as they are; any other body as JSON text
    pub fn body_string(&self) -> Option<String> {
        self.body().map(|body| match body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        match self {
            TestResponse::Success(response) => response
                .json()
                .map_err(|e| format!("Serialization error: {}", e)),
            TestResponse::Error(error) => Err(error.to_string()),
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, key: &str) -> Option<&str> {
        match self {
            TestResponse::Success(response) => response.header(key),
            TestResponse::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            TestResponse::Error(error) => Some(error.to_string()),
            TestResponse::Success(_) => None,
        }
    }
}
