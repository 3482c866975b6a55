// Event spy for router lifecycle events

use chainroute_core::{EventKind, ListenerId, Mode, Router};
use std::sync::{Arc, Mutex, MutexGuard};

/// One observed lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: EventKind,
    /// `None` for errors raised before the request was normalized
    pub method: Option<String>,
    pub url: Option<String>,
    /// Set for `after` events
    pub status: Option<u16>,
    /// Set for `error` events
    pub error: Option<String>,
    pub mode: Mode,
}

/// Records every `before`, `after` and `error` event of a router, in order.
///
/// Attaching registers an `error` listener, which retires the router's
/// fallback error listener.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register on all three event kinds; returns the listener ids.
    pub fn attach<S: Send + 'static>(&self, router: &mut Router<S>) -> [ListenerId; 3] {
        let sink = self.clone();
        let before = router.on_before(move |event| {
            sink.push(RecordedEvent {
                kind: EventKind::Before,
                method: Some(event.request.method.clone()),
                url: Some(event.request.url.to_string()),
                status: None,
                error: None,
                mode: event.context.mode(),
            });
        });

        let sink = self.clone();
        let after = router.on_after(move |event| {
            sink.push(RecordedEvent {
                kind: EventKind::After,
                method: Some(event.request.method.clone()),
                url: Some(event.request.url.to_string()),
                status: Some(event.response.status),
                error: None,
                mode: event.context.mode(),
            });
        });

        let sink = self.clone();
        let error = router.on_error(move |event| {
            sink.push(RecordedEvent {
                kind: EventKind::Error,
                method: event.request.map(|r| r.method.clone()),
                url: event.request.map(|r| r.url.to_string()),
                status: None,
                error: Some(event.error.to_string()),
                mode: event.context.mode(),
            });
        });

        [before, after, error]
    }

    /// Remove previously attached listeners
    pub fn detach<S: Send + 'static>(&self, router: &mut Router<S>, ids: [ListenerId; 3]) {
        for id in ids {
            router.off(id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: RecordedEvent) {
        self.lock().push(event);
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.lock().iter().map(|e| e.kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|e| e.kind == kind).count()
    }

    pub fn last(&self) -> Option<RecordedEvent> {
        self.lock().last().cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
