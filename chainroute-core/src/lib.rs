// Core library for the chainroute middleware-chain router
// Patterns, the middleware contract, lifecycle events and the router itself

pub mod config;
pub mod context;
mod dispatch;
pub mod error;
pub mod events;
pub mod http;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod normalize;
pub mod pattern;
pub mod route;
pub mod router;
pub mod status;

// Re-export commonly used types
pub use config::{RouterBuilder, RouterConfig};
pub use context::*;
pub use error::*;
pub use events::{
    AfterEvent, BeforeEvent, ErrorEvent, EventChannel, EventKind, Listener, ListenerId,
    default_error_listener,
};
pub use http::*;
pub use method::*;
pub use middleware::*;
pub use normalize::*;
pub use pattern::*;
pub use route::{Responder, Route};
pub use router::{ErrorFallback, Router};
pub use status::*;
