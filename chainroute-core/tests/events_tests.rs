use chainroute_core::{
    Error, ErrorFallback, EventKind, HttpMethod, Listener, Mode, Reply, ResponseInit, Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn observed_router(log: &Log) -> Router {
    let mut router: Router = Router::new();

    let l = log.clone();
    router.on_before(move |event| {
        l.lock()
            .unwrap()
            .push(format!("before {} {}", event.request.method, event.request.path()));
    });
    let l = log.clone();
    router.on_after(move |event| {
        l.lock().unwrap().push(format!("after {}", event.response.status));
    });
    let l = log.clone();
    router.on_error(move |event| {
        l.lock().unwrap().push(format!("error {}", event.error));
    });

    router
}

#[tokio::test]
async fn test_success_emits_before_then_after() {
    let log = log();
    let mut router = observed_router(&log);
    router.get("/ok", ResponseInit::ok());

    router.route_async("http://h/ok", ()).await.unwrap();

    assert_eq!(entries(&log), vec!["before GET /ok", "after 200"]);
}

#[tokio::test]
async fn test_failure_emits_before_then_error() {
    let log = log();
    let router = observed_router(&log);

    let err = router.route_async("http://h/missing", ()).await.unwrap_err();
    assert!(err.is_no_match());

    assert_eq!(
        entries(&log),
        vec![
            "before GET /missing".to_string(),
            format!("error {}", Error::NoMatch),
        ]
    );
}

#[tokio::test]
async fn test_error_event_precedes_rejection() {
    let seen = Arc::new(Mutex::new(None::<String>));
    let sink = seen.clone();

    let mut router: Router = Router::new();
    router
        .use_fn(|_req, _ctx| Err(Error::msg("boom")))
        .on_error(move |event| {
            *sink.lock().unwrap() = Some(event.error.to_string());
        });

    let err = router.route_async("http://h/", ()).await.unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(seen.lock().unwrap().as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_invalid_request_emits_error_without_request() {
    let had_request = Arc::new(Mutex::new(Vec::new()));
    let sink = had_request.clone();
    let befores = Arc::new(AtomicUsize::new(0));
    let counter = befores.clone();

    let mut router: Router = Router::new();
    router.on_before(move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    router.on_error(move |event| {
        sink.lock().unwrap().push(event.request.is_some());
    });

    router.route_async("not a url", ()).await.unwrap_err();
    router.route_sync("/relative", ()).unwrap_err();

    assert_eq!(*had_request.lock().unwrap(), vec![false, false]);
    assert_eq!(befores.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listeners_see_mode_and_shared_context() {
    let modes = Arc::new(Mutex::new(Vec::new()));

    let mut router: Router<Vec<&'static str>> = Router::new();
    router.route_fn(HttpMethod::GET, "/", |_req, ctx| {
        ctx.push("handler");
        Ok(Reply::respond(ResponseInit::ok()))
    });

    let sink = modes.clone();
    router.on_before(move |event| {
        event.context.push("before");
        sink.lock().unwrap().push(event.context.mode());
    });
    let sink = modes.clone();
    router.on_after(move |event| {
        assert_eq!(event.context.state(), &vec!["before", "handler"]);
        sink.lock().unwrap().push(event.context.mode());
    });

    router.route_sync("http://h/", Vec::new()).unwrap();
    tokio_test::block_on(router.route_async("http://h/", Vec::new())).unwrap();

    assert_eq!(
        *modes.lock().unwrap(),
        vec![Mode::Sync, Mode::Sync, Mode::Async, Mode::Async]
    );
}

#[tokio::test]
async fn test_same_callback_registered_twice_fires_twice() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let listener = Listener::before(move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut router: Router = Router::new();
    router.get("/", ResponseInit::ok());
    let first = router.on(listener.clone());
    router.on(listener);

    router.route_async("http://h/", ()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    assert!(router.off(first));
    router.route_async("http://h/", ()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_on_then_off_restores_behavior() {
    let log = log();
    let mut router: Router = Router::new();
    router.get("/", ResponseInit::ok());

    let l = log.clone();
    let before = router.on_before(move |_event| l.lock().unwrap().push("before".into()));
    let l = log.clone();
    let after = router.on_after(move |_event| l.lock().unwrap().push("after".into()));

    assert!(router.off(before));
    assert!(router.off(after));
    assert!(!router.off(after));

    router.route_async("http://h/", ()).await.unwrap();
    assert!(entries(&log).is_empty());
    assert_eq!(router.listener_count(EventKind::Before), 0);
    assert_eq!(router.listener_count(EventKind::After), 0);
}

#[tokio::test]
async fn test_default_error_listener_retired_permanently() {
    let fallback_hits = Arc::new(AtomicUsize::new(0));
    let counter = fallback_hits.clone();

    let mut router: Router = Router::builder()
        .default_error_listener(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    router.route_async("http://h/", ()).await.unwrap_err();
    router.route_sync("http://h/", ()).unwrap_err();
    assert_eq!(fallback_hits.load(Ordering::SeqCst), 2);

    let explicit_hits = Arc::new(AtomicUsize::new(0));
    let counter = explicit_hits.clone();
    let id = router.on_error(move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    router.route_async("http://h/", ()).await.unwrap_err();
    assert_eq!(fallback_hits.load(Ordering::SeqCst), 2);
    assert_eq!(explicit_hits.load(Ordering::SeqCst), 1);

    assert!(router.off(id));
    router.route_async("http://h/", ()).await.unwrap_err();
    assert_eq!(fallback_hits.load(Ordering::SeqCst), 2);
    assert_eq!(explicit_hits.load(Ordering::SeqCst), 1);
    assert!(!router.error_fallback_active());
}

#[tokio::test]
async fn test_disabled_default_error_listener() {
    let router: Router = Router::builder().disable_default_error_listener().build();
    assert_eq!(router.listener_count(EventKind::Error), 0);

    let err = router.route_async("http://h/", ()).await.unwrap_err();
    assert!(err.is_no_match());
}

#[test]
fn test_fallback_listener_cannot_be_removed_with_off() {
    let fallback_hits = Arc::new(AtomicUsize::new(0));
    let counter = fallback_hits.clone();

    let mut router: Router = Router::builder()
        .default_error_listener(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let ErrorFallback::Installed(id) = router.error_fallback() else {
        panic!("fallback listener should be installed");
    };
    assert!(!router.off(id));
    assert!(router.error_fallback_active());
    assert_eq!(router.listener_count(EventKind::Error), 1);

    router.route_sync("http://h/", ()).unwrap_err();
    assert_eq!(fallback_hits.load(Ordering::SeqCst), 1);

    router.on_error(|_event| {});
    assert!(!router.error_fallback_active());
    assert!(!router.off(id));
    assert_eq!(router.listener_count(EventKind::Error), 1);

    router.route_sync("http://h/", ()).unwrap_err();
    assert_eq!(fallback_hits.load(Ordering::SeqCst), 1);
}
