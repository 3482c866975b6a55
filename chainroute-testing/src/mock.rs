// Mock middleware for testing

use chainroute_core::{Context, Error, Middleware, Reply, Request, ResponseInit, Result};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum MockBehavior {
    Pass,
    Respond(ResponseInit),
    Fail(String),
}

/// Middleware that records every call as `"METHOD /path"` and then passes,
/// responds or fails as configured. Clones share the call log.
#[derive(Debug, Clone)]
pub struct MockMiddleware {
    calls: Arc<Mutex<Vec<String>>>,
    behavior: MockBehavior,
}

impl MockMiddleware {
    /// A mock with no opinion
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior: MockBehavior::Pass,
        }
    }

    pub fn responding(response: impl Into<ResponseInit>) -> Self {
        Self::new().with_response(response)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new().with_error(message)
    }

    pub fn with_response(mut self, response: impl Into<ResponseInit>) -> Self {
        self.behavior = MockBehavior::Respond(response.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.behavior = MockBehavior::Fail(message.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Check if a call was recorded, e.g. `was_called("GET /users")`
    pub fn was_called(&self, call: &str) -> bool {
        self.lock().iter().any(|c| c == call)
    }

    pub fn clear_calls(&self) {
        self.lock().clear();
    }
}

impl Default for MockMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + 'static> Middleware<S> for MockMiddleware {
    fn handle<'a>(
        &'a self,
        request: &'a Request,
        _context: &'a mut Context<S>,
    ) -> Result<Reply<'a>> {
        self.lock()
            .push(format!("{} {}", request.method, request.path()));

        match &self.behavior {
            MockBehavior::Pass => Ok(Reply::Empty),
            MockBehavior::Respond(response) => Ok(Reply::Ready(response.clone())),
            MockBehavior::Fail(message) => Err(Error::msg(message.clone())),
        }
    }
}
