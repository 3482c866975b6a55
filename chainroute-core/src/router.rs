//! Middleware-chain router
//!
//! Middleware run in registration order; the first one that produces a
//! response wins and later ones are never invoked.
//!
//! ```
//! use chainroute_core::{HttpMethod, Reply, Router, ResponseInit};
//!
//! let mut router: Router<Vec<String>> = Router::new();
//! router
//!     .get("/health", ResponseInit::ok().with_body("up"))
//!     .route_fn(HttpMethod::POST, "/users/:id", |_req, ctx| {
//!         let id = ctx.param("id").unwrap_or_default().to_string();
//!         ctx.push(id.clone());
//!         Ok(Reply::respond(ResponseInit::ok().with_body(id)))
//!     });
//!
//! let response = router.route_sync("http://localhost/health", Vec::new()).unwrap();
//! assert_eq!(response.body_str(), Some("up"));
//!
//! let response = tokio_test::block_on(
//!     router.route_async(("POST", "http://localhost/users/7"), Vec::new()),
//! )
//! .unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_str(), Some("7"));
//! ```

use crate::config::{RouterBuilder, RouterConfig};
use crate::dispatch::{Awaiting, Blocking, Suspension};
use crate::events::{
    AfterEvent, BeforeEvent, ErrorEvent, EventChannel, EventKind, Listener, ListenerId,
    default_error_listener,
};
use crate::logging::{debug, trace};
use crate::normalize::{normalise_context, normalise_request, normalise_response};
use crate::{
    Context, Error, HttpMethod, MethodPattern, Middleware, PathPattern, Reply, Request,
    RequestInit, Responder, Response, ResponseInit, Result, Route,
};
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// State of the fallback `error` listener slot.
///
/// Starts `Installed` (unless disabled by configuration) and moves to
/// `Retired` the first time an `error` listener is registered. It never
/// moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFallback {
    Installed(ListenerId),
    Retired,
}

/// Request router built from an ordered middleware chain.
pub struct Router<S = ()> {
    middleware: Vec<Arc<dyn Middleware<S>>>,
    events: EventChannel<S>,
    error_fallback: ErrorFallback,
    config: RouterConfig,
}

impl<S: Send + 'static> Router<S> {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self::from_parts(config, None)
    }

    pub fn builder() -> RouterBuilder<S> {
        RouterBuilder::new()
    }

    pub(crate) fn from_parts(config: RouterConfig, error_listener: Option<Listener<S>>) -> Self {
        let mut events = EventChannel::new();
        let error_fallback = if config.default_error_listener {
            let listener = error_listener.unwrap_or_else(default_error_listener);
            ErrorFallback::Installed(events.on(listener))
        } else {
            ErrorFallback::Retired
        };

        Self {
            middleware: Vec::new(),
            events,
            error_fallback,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // ========== Registration ==========

    /// Append a middleware closure. It sees every request.
    pub fn use_fn<F>(&mut self, middleware: F) -> &mut Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Context<S>) -> Result<Reply<'a>>
            + Send
            + Sync
            + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append a middleware. It sees every request.
    pub fn use_middleware<M: Middleware<S>>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append a middleware answering requests that match `method` and `path`.
    pub fn route(
        &mut self,
        method: impl Into<MethodPattern>,
        path: impl Into<PathPattern>,
        responder: impl Into<Responder<S>>,
    ) -> &mut Self {
        let route = Route::new(method, path, responder);
        if self.config.enable_logging {
            trace!(method = %route.method(), path = %route.path(), "Registered route");
        }
        self.use_middleware(route)
    }

    /// [`route`](Self::route) with a handler closure.
    pub fn route_fn<F>(
        &mut self,
        method: impl Into<MethodPattern>,
        path: impl Into<PathPattern>,
        handler: F,
    ) -> &mut Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Context<S>) -> Result<Reply<'a>>
            + Send
            + Sync
            + 'static,
    {
        self.route(method, path, Responder::handler(handler))
    }

    /// Validating form of [`route`](Self::route) for patterns and responders
    /// only known at runtime.
    ///
    /// Fails with [`Error::InvalidArguments`] if the responder is missing,
    /// the method is empty or not an HTTP token, or the path is empty.
    pub fn try_route(
        &mut self,
        method: &str,
        path: &str,
        responder: Option<Responder<S>>,
    ) -> Result<&mut Self> {
        let responder = responder.ok_or_else(|| {
            Error::InvalidArguments("a route needs a handler or a response".to_string())
        })?;
        let method = MethodPattern::parse(method)?;
        let path = PathPattern::parse(path)?;
        Ok(self.route(method, path, responder))
    }

    pub fn get(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::GET, path, responder)
    }

    pub fn post(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::POST, path, responder)
    }

    pub fn put(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::PUT, path, responder)
    }

    pub fn patch(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::PATCH, path, responder)
    }

    pub fn delete(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::DELETE, path, responder)
    }

    pub fn head(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::HEAD, path, responder)
    }

    pub fn options(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(HttpMethod::OPTIONS, path, responder)
    }

    /// Match every method.
    pub fn any(&mut self, path: impl Into<PathPattern>, responder: impl Into<Responder<S>>) -> &mut Self {
        self.route(MethodPattern::Any, path, responder)
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    // ========== Events ==========

    /// Register an event listener.
    ///
    /// The first `error` listener registered retires the fallback one for
    /// good.
    pub fn on(&mut self, listener: Listener<S>) -> ListenerId {
        if listener.kind() == EventKind::Error {
            self.retire_error_fallback();
        }
        self.events.on(listener)
    }

    pub fn on_before<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(BeforeEvent<'_, S>) + Send + Sync + 'static,
    {
        self.on(Listener::before(listener))
    }

    pub fn on_after<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(AfterEvent<'_, S>) + Send + Sync + 'static,
    {
        self.on(Listener::after(listener))
    }

    pub fn on_error<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(ErrorEvent<'_, S>) + Send + Sync + 'static,
    {
        self.on(Listener::error(listener))
    }

    /// Remove a listener. Removing every `error` listener does not bring the
    /// fallback back.
    ///
    /// The fallback listener itself cannot be removed this way; it only
    /// leaves when an explicit `error` listener is registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        if self.error_fallback == ErrorFallback::Installed(id) {
            return false;
        }
        self.events.off(id)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.events.listener_count(kind)
    }

    pub fn error_fallback(&self) -> ErrorFallback {
        self.error_fallback
    }

    pub fn error_fallback_active(&self) -> bool {
        matches!(self.error_fallback, ErrorFallback::Installed(_))
    }

    fn retire_error_fallback(&mut self) {
        if let ErrorFallback::Installed(id) = self.error_fallback {
            self.events.off(id);
            self.error_fallback = ErrorFallback::Retired;
        }
    }

    // ========== Dispatch ==========

    /// Route a request without suspending.
    ///
    /// A middleware replying asynchronously fails the call with
    /// [`Error::SyncViolation`].
    pub fn route_sync(&self, request: impl Into<RequestInit>, state: S) -> Result<Response> {
        self.dispatch::<Blocking>(request.into(), state)
            .now_or_never()
            // Blocking settles every pending reply immediately
            .unwrap_or(Err(Error::SyncViolation))
    }

    /// Route a request, awaiting asynchronous middleware replies in turn.
    pub fn route_async(
        &self,
        request: impl Into<RequestInit>,
        state: S,
    ) -> impl Future<Output = Result<Response>> + Send + '_ {
        self.dispatch::<Awaiting>(request.into(), state)
    }

    async fn dispatch<M: Suspension>(&self, init: RequestInit, state: S) -> Result<Response> {
        let mut context = normalise_context(state, M::MODE);

        let request = match normalise_request(init) {
            Ok(request) => request,
            Err(error) => return Err(self.fail(None, &mut context, error)),
        };

        if self.config.enable_logging {
            debug!(
                method = %request.method,
                url = %request.url,
                mode = %M::MODE,
                "Routing request"
            );
        }

        self.events.emit_before(&request, &mut context);

        match self.run_chain::<M>(&request, &mut context).await {
            Ok(init) => {
                let response = normalise_response(init, self.config.default_status);
                if self.config.enable_logging {
                    debug!(status = response.status, mode = %M::MODE, "Request routed");
                }
                self.events.emit_after(&request, &response, &mut context);
                Ok(response)
            }
            Err(error) => Err(self.fail(Some(&request), &mut context, error)),
        }
    }

    async fn run_chain<M: Suspension>(
        &self,
        request: &Request,
        context: &mut Context<S>,
    ) -> Result<ResponseInit> {
        for (index, middleware) in self.middleware.iter().enumerate() {
            // Captures only stick once a middleware responds.
            let committed = context.params().clone();
            let outcome = match middleware.handle(request, &mut *context)? {
                Reply::Empty => None,
                Reply::Ready(init) => Some(init),
                Reply::Pending(pending) => M::settle(pending).await?,
            };

            match outcome {
                Some(init) => {
                    if self.config.enable_logging {
                        trace!(index, "Middleware produced a response");
                    }
                    return Ok(init);
                }
                None => {
                    *context.params_mut() = committed;
                    if self.config.enable_logging {
                        trace!(index, "Middleware passed");
                    }
                }
            }
        }

        Err(Error::NoMatch)
    }

    fn fail(&self, request: Option<&Request>, context: &mut Context<S>, error: Error) -> Error {
        if self.config.enable_logging {
            debug!(mode = %context.mode(), error = %error, "Routing failed");
        }
        self.events.emit_error(request, context, &error);
        error
    }
}

impl<S: Send + 'static> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Router<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("middleware", &self.middleware.len())
            .field("before", &self.events.listener_count(EventKind::Before))
            .field("after", &self.events.listener_count(EventKind::After))
            .field("error", &self.events.listener_count(EventKind::Error))
            .field("error_fallback", &self.error_fallback)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpStatus;
    use std::sync::Mutex;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_router_is_send_sync() {
        assert_send_sync::<Router<()>>();
        assert_send_sync::<Router<Vec<String>>>();
    }

    #[test]
    fn test_new_router_has_fallback_listener() {
        let router: Router = Router::new();
        assert!(router.is_empty());
        assert!(router.error_fallback_active());
        assert_eq!(router.listener_count(EventKind::Error), 1);
    }

    #[test]
    fn test_registration_chains() {
        let mut router: Router = Router::new();
        router
            .get("/a", HttpStatus::Ok)
            .post("/a", HttpStatus::Created)
            .any("/b", HttpStatus::NoContent)
            .use_fn(|_req, _ctx| Ok(Reply::Empty));
        assert_eq!(router.len(), 4);
    }

    #[test]
    fn test_try_route_rejects_bad_arguments() {
        let mut router: Router = Router::new();

        let err = router.try_route("GET", "/", None).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));

        let err = router
            .try_route("", "/", Some(HttpStatus::Ok.into()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));

        let err = router
            .try_route("GE T", "/", Some(HttpStatus::Ok.into()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));

        let err = router
            .try_route("GET", "", Some(HttpStatus::Ok.into()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));

        assert!(router.is_empty());

        router
            .try_route("get", "/ok", Some(HttpStatus::Ok.into()))
            .unwrap();
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_first_error_listener_retires_fallback() {
        let mut router: Router = Router::new();
        let id = router.on_error(|_event| {});
        assert!(!router.error_fallback_active());
        assert_eq!(router.error_fallback(), ErrorFallback::Retired);
        assert_eq!(router.listener_count(EventKind::Error), 1);

        assert!(router.off(id));
        assert_eq!(router.listener_count(EventKind::Error), 0);
        assert!(!router.error_fallback_active());
    }

    #[test]
    fn test_before_listener_does_not_retire_fallback() {
        let mut router: Router = Router::new();
        router.on_before(|_event| {});
        router.on_after(|_event| {});
        assert!(router.error_fallback_active());
    }

    #[test]
    fn test_sync_dispatch_shares_context() {
        let mut router: Router<Vec<&'static str>> = Router::new();
        router
            .use_fn(|_req, ctx| {
                ctx.push("first");
                Ok(Reply::Empty)
            })
            .route_fn(HttpMethod::GET, "/", |_req, ctx| {
                ctx.push("second");
                Ok(Reply::respond(ResponseInit::ok()))
            });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        router.on_after(move |event| {
            sink.lock().unwrap().extend(event.context.state().iter().copied());
        });

        let response = router.route_sync("http://h/", Vec::new()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_default_status_is_configurable() {
        let mut router: Router = Router::builder().default_status(HttpStatus::Accepted).build();
        router.get("/", ResponseInit::new());
        let response = router.route_sync("http://h/", ()).unwrap();
        assert_eq!(response.status, 202);
    }

    #[test]
    fn test_pending_reply_is_sync_violation() {
        let mut router: Router = Router::new();
        router.use_fn(|_req, _ctx| Ok(Reply::pending(async { Ok(None) })));
        let err = router.route_sync("http://h/", ()).unwrap_err();
        assert!(err.is_sync_violation());
    }

    #[tokio::test]
    async fn test_async_pending_none_moves_on() {
        let mut router: Router = Router::new();
        router
            .use_fn(|_req, _ctx| Ok(Reply::pending(async { Ok(None) })))
            .get("/", ResponseInit::ok().with_body("next"));

        let response = router.route_async("http://h/", ()).await.unwrap();
        assert_eq!(response.body_str(), Some("next"));
    }
}
