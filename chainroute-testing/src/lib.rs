//! Testing utilities for chainroute routers.
//!
//! ## Features
//!
//! - **TestClient** - drive a router with relative paths, sync or async
//! - **EventRecorder** - spy on `before`/`after`/`error` events
//! - **MockMiddleware** - call-recording middleware with canned behavior
//! - **Assertions** - status, body, header and error assertions
//!
//! ## Quick Start
//!
//! ```
//! use chainroute_core::{ResponseInit, Router};
//! use chainroute_testing::*;
//!
//! # tokio_test::block_on(async {
//! let mut router: Router = Router::new();
//! router.get("/hello", ResponseInit::ok().with_body("Hello!"));
//!
//! let recorder = EventRecorder::new();
//! recorder.attach(&mut router);
//!
//! let client: TestClient = TestClient::new(router);
//! let response = client.get("/hello").await;
//! assert_status(&response, 200);
//! assert_body(&response, "Hello!");
//!
//! let response = client.get("/missing").await;
//! assert_error_message(&response, "No middleware returned a response for the request.");
//!
//! assert_eq!(recorder.events().len(), 4);
//! # });
//! ```

mod assertions;
mod mock;
mod recorder;
mod test_client;

pub use assertions::{
    assert_body, assert_body_contains, assert_error_message, assert_header, assert_http_status,
    assert_json, assert_status,
};
pub use mock::MockMiddleware;
pub use recorder::{EventRecorder, RecordedEvent};
pub use test_client::{DEFAULT_BASE_URL, TestClient, TestRequestBuilder, TestResponse};

// Re-export common testing utilities
pub use tokio::test as tokio_test;
