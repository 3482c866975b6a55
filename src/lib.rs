// chainroute - a middleware-chain request router
//
// Middleware are tried in registration order and the first one that produces
// a response wins. Every call emits lifecycle events and can run either
// synchronously or asynchronously.

// Re-export core functionality
pub use chainroute_core::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use chainroute_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Context, Error, EventKind, HttpMethod, HttpStatus, Listener, ListenerId, Middleware,
        Mode, Reply, Request, RequestInit, Responder, Response, ResponseInit, Result, Router,
        RouterConfig,
    };
}
