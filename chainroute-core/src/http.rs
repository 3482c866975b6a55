// HTTP request and response types

use crate::{Error, HttpMethod, HttpStatus, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::collections::HashMap;
use url::Url;

/// Partial request as supplied by a caller.
///
/// Only the URL is required; the method defaults to `GET` during
/// normalization. The URL is kept as a raw string so that relative or
/// malformed input can still be reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl RequestInit {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET.as_str(), url)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }
}

impl From<&str> for RequestInit {
    fn from(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

impl From<String> for RequestInit {
    fn from(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }
}

/// `(method, url)`
impl From<(&str, &str)> for RequestInit {
    fn from((method, url): (&str, &str)) -> Self {
        Self::new(method, url)
    }
}

impl From<(HttpMethod, &str)> for RequestInit {
    fn from((method, url): (HttpMethod, &str)) -> Self {
        Self::new(method.as_str(), url)
    }
}

impl From<Request> for RequestInit {
    fn from(request: Request) -> Self {
        Self {
            method: Some(request.method),
            url: request.url.into(),
            headers: request.headers,
            body: request.body,
        }
    }
}

/// Canonical request seen by middleware and listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Method as supplied by the caller; compare with `method_is` or
    /// `eq_ignore_ascii_case`.
    pub method: String,
    /// Always absolute.
    pub url: Url,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn method_is(&self, method: HttpMethod) -> bool {
        method.matches(&self.method)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Get a query parameter by name (first occurrence, percent-decoded)
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Get a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the request body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

/// What a middleware hands back: any subset of the response fields.
///
/// Anything not covered by `status`, `headers` or `body` lands in `fields`
/// and survives normalization untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResponseInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok() -> Self {
        Self::new().with_status(HttpStatus::Ok)
    }

    pub fn not_found() -> Self {
        Self::new().with_status(HttpStatus::NotFound)
    }

    pub fn with_status(mut self, status: impl Into<u16>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = serde_json::to_value(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Attach an arbitrary payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl From<HttpStatus> for ResponseInit {
    fn from(status: HttpStatus) -> Self {
        Self::new().with_status(status)
    }
}

impl From<Response> for ResponseInit {
    fn from(response: Response) -> Self {
        Self {
            status: Some(response.status),
            headers: response.headers,
            body: response.body,
            fields: response.fields,
        }
    }
}

/// Normalized response returned by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    pub fn http_status(&self) -> Option<HttpStatus> {
        HttpStatus::from_code(self.status)
    }

    pub fn is_success(&self) -> bool {
        crate::status::is_success_code(self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as text, when it is a JSON string.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_str()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body).map_err(Error::from)
    }
}
