//! Router lifecycle events
//!
//! Every routing call emits exactly one `before` event and then exactly one
//! of `after` (success) or `error` (failure). Listeners run synchronously,
//! in registration order, in both execution modes, and receive the call's
//! context mutably.
//!
//! ```
//! use chainroute_core::{EventChannel, EventKind, Listener};
//!
//! let mut channel: EventChannel<()> = EventChannel::new();
//! let id = channel.on(Listener::before(|event| {
//!     println!("routing {} {}", event.request.method, event.request.url);
//! }));
//!
//! assert_eq!(channel.listener_count(EventKind::Before), 1);
//! assert!(channel.off(id));
//! assert!(!channel.off(id));
//! ```

use crate::logging::{error, trace};
use crate::{Context, Error, Request, Response};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Before,
    After,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Before => "before",
            EventKind::After => "after",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted after normalization, before any middleware runs.
pub struct BeforeEvent<'a, S> {
    pub request: &'a Request,
    pub context: &'a mut Context<S>,
}

/// Emitted on success, before the response is returned.
pub struct AfterEvent<'a, S> {
    pub request: &'a Request,
    pub response: &'a Response,
    pub context: &'a mut Context<S>,
}

/// Emitted on failure, before the error is returned.
pub struct ErrorEvent<'a, S> {
    /// `None` when the request itself could not be normalized.
    pub request: Option<&'a Request>,
    pub context: &'a mut Context<S>,
    pub error: &'a Error,
}

type BeforeFn<S> = Arc<dyn Fn(BeforeEvent<'_, S>) + Send + Sync>;
type AfterFn<S> = Arc<dyn Fn(AfterEvent<'_, S>) + Send + Sync>;
type ErrorFn<S> = Arc<dyn Fn(ErrorEvent<'_, S>) + Send + Sync>;

/// A listener for exactly one event kind.
pub enum Listener<S> {
    Before(BeforeFn<S>),
    After(AfterFn<S>),
    Error(ErrorFn<S>),
}

impl<S> Listener<S> {
    pub fn before<F>(f: F) -> Self
    where
        F: Fn(BeforeEvent<'_, S>) + Send + Sync + 'static,
    {
        Listener::Before(Arc::new(f))
    }

    pub fn after<F>(f: F) -> Self
    where
        F: Fn(AfterEvent<'_, S>) + Send + Sync + 'static,
    {
        Listener::After(Arc::new(f))
    }

    pub fn error<F>(f: F) -> Self
    where
        F: Fn(ErrorEvent<'_, S>) + Send + Sync + 'static,
    {
        Listener::Error(Arc::new(f))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Listener::Before(_) => EventKind::Before,
            Listener::After(_) => EventKind::After,
            Listener::Error(_) => EventKind::Error,
        }
    }
}

impl<S> Clone for Listener<S> {
    fn clone(&self) -> Self {
        match self {
            Listener::Before(f) => Listener::Before(Arc::clone(f)),
            Listener::After(f) => Listener::After(Arc::clone(f)),
            Listener::Error(f) => Listener::Error(Arc::clone(f)),
        }
    }
}

impl<S> fmt::Debug for Listener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.kind())
    }
}

/// Handle returned by [`EventChannel::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId {
    kind: EventKind,
    seq: u64,
}

impl ListenerId {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Listener sets for the three event kinds.
pub struct EventChannel<S> {
    next_seq: u64,
    before: Vec<(ListenerId, BeforeFn<S>)>,
    after: Vec<(ListenerId, AfterFn<S>)>,
    error: Vec<(ListenerId, ErrorFn<S>)>,
}

impl<S> EventChannel<S> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            before: Vec::new(),
            after: Vec::new(),
            error: Vec::new(),
        }
    }

    /// Register a listener. The same callback may be registered several
    /// times; each registration fires and gets its own id.
    pub fn on(&mut self, listener: Listener<S>) -> ListenerId {
        let id = ListenerId {
            kind: listener.kind(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        match listener {
            Listener::Before(f) => self.before.push((id, f)),
            Listener::After(f) => self.after.push((id, f)),
            Listener::Error(f) => self.error.push((id, f)),
        }
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        match id.kind {
            EventKind::Before => remove(&mut self.before, id),
            EventKind::After => remove(&mut self.after, id),
            EventKind::Error => remove(&mut self.error, id),
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Before => self.before.len(),
            EventKind::After => self.after.len(),
            EventKind::Error => self.error.len(),
        }
    }

    pub fn emit_before(&self, request: &Request, context: &mut Context<S>) {
        trace!(listeners = self.before.len(), "Emitting before event");
        for (_, listener) in &self.before {
            listener(BeforeEvent {
                request,
                context: &mut *context,
            });
        }
    }

    pub fn emit_after(&self, request: &Request, response: &Response, context: &mut Context<S>) {
        trace!(listeners = self.after.len(), "Emitting after event");
        for (_, listener) in &self.after {
            listener(AfterEvent {
                request,
                response,
                context: &mut *context,
            });
        }
    }

    pub fn emit_error(&self, request: Option<&Request>, context: &mut Context<S>, error: &Error) {
        trace!(listeners = self.error.len(), "Emitting error event");
        for (_, listener) in &self.error {
            listener(ErrorEvent {
                request,
                context: &mut *context,
                error,
            });
        }
    }
}

impl<S> Default for EventChannel<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn remove<F>(listeners: &mut Vec<(ListenerId, F)>, id: ListenerId) -> bool {
    match listeners.iter().position(|(existing, _)| *existing == id) {
        Some(index) => {
            listeners.remove(index);
            true
        }
        None => false,
    }
}

/// Fallback `error` listener installed by every router until the caller
/// registers one of its own. Reports the failure through `tracing`.
pub fn default_error_listener<S: 'static>() -> Listener<S> {
    Listener::error(|event: ErrorEvent<'_, S>| match event.request {
        Some(request) => error!(
            target: "chainroute::router",
            method = %request.method,
            url = %request.url,
            mode = %event.context.mode(),
            error = %event.error,
            "Unhandled routing failure"
        ),
        None => error!(
            target: "chainroute::router",
            mode = %event.context.mode(),
            error = %event.error,
            "Unhandled routing failure"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;
    use std::sync::Mutex;
    use url::Url;

    fn request() -> Request {
        Request {
            method: "GET".to_string(),
            url: Url::parse("http://h/").unwrap(),
            headers: Default::default(),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel: EventChannel<()> = EventChannel::new();

        for name in ["first", "second", "third"] {
            let log = log.clone();
            channel.on(Listener::before(move |_event| {
                log.lock().unwrap().push(name);
            }));
        }

        let mut ctx = Context::new((), Mode::Sync);
        channel.emit_before(&request(), &mut ctx);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_listeners_share_mutable_context() {
        let mut channel: EventChannel<u32> = EventChannel::new();
        channel.on(Listener::before(|event: BeforeEvent<'_, u32>| {
            **event.context += 1;
        }));
        channel.on(Listener::before(|event: BeforeEvent<'_, u32>| {
            **event.context *= 10;
        }));

        let mut ctx = Context::new(1u32, Mode::Async);
        channel.emit_before(&request(), &mut ctx);
        assert_eq!(*ctx, 20);
    }

    #[test]
    fn test_off_removes_only_that_registration() {
        let hits = Arc::new(Mutex::new(0));
        let mut channel: EventChannel<()> = EventChannel::new();

        let h1 = hits.clone();
        let first = channel.on(Listener::error(move |_event| *h1.lock().unwrap() += 1));
        let h2 = hits.clone();
        channel.on(Listener::error(move |_event| *h2.lock().unwrap() += 10));

        assert!(channel.off(first));
        assert!(!channel.off(first));
        assert_eq!(channel.listener_count(EventKind::Error), 1);

        let mut ctx = Context::new((), Mode::Sync);
        channel.emit_error(None, &mut ctx, &Error::NoMatch);
        assert_eq!(*hits.lock().unwrap(), 10);
    }

    #[test]
    fn test_ids_are_kind_scoped() {
        let mut channel: EventChannel<()> = EventChannel::new();
        let before = channel.on(Listener::before(|_event| {}));
        let after = channel.on(Listener::after(|_event| {}));

        assert_eq!(before.kind(), EventKind::Before);
        assert_eq!(after.kind(), EventKind::After);
        assert_ne!(before, after);
        assert_eq!(channel.listener_count(EventKind::After), 1);
        assert_eq!(channel.listener_count(EventKind::Error), 0);
    }

    #[test]
    fn test_default_error_listener_is_error_kind() {
        let listener = default_error_listener::<()>();
        assert_eq!(listener.kind(), EventKind::Error);

        let mut channel = EventChannel::new();
        channel.on(listener);
        let mut ctx = Context::new((), Mode::Sync);
        channel.emit_error(Some(&request()), &mut ctx, &Error::NoMatch);
        channel.emit_error(None, &mut ctx, &Error::InvalidRequest("/".into()));
    }
}
