use chainroute_core::{
    Error, HttpMethod, HttpStatus, Mode, Reply, RequestInit, ResponseInit, Router, RouterConfig,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_sync_static_route() {
    let mut router: Router = Router::new();
    router.get("/foo/bar", ResponseInit::ok().with_body("ok"));

    let response = router.route_sync("http://h/foo/bar", ()).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("ok"));
}

#[test]
fn test_pending_reply_fails_with_sync_violation() {
    let polled = Arc::new(AtomicBool::new(false));
    let flag = polled.clone();

    let mut router: Router = Router::new();
    router.route_fn(HttpMethod::GET, "/slow", move |_req, _ctx| {
        let flag = flag.clone();
        Ok(Reply::deferred(async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, Error>(ResponseInit::ok())
        }))
    });

    let err = router.route_sync("http://h/slow", ()).unwrap_err();
    assert!(err.is_sync_violation());
    assert_eq!(
        err.to_string(),
        "A middleware returned a response asynchronously while the request was being handled synchronously."
    );
    assert!(!polled.load(Ordering::SeqCst));
}

#[test]
fn test_sync_violation_stops_the_chain() {
    let later = Arc::new(AtomicUsize::new(0));
    let counter = later.clone();

    let mut router: Router = Router::new();
    router
        .use_fn(|_req, _ctx| Ok(Reply::pending(async { Ok(None) })))
        .use_fn(move |_req, _ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::respond(ResponseInit::ok()))
        });

    let err = router.route_sync("http://h/", ()).unwrap_err();
    assert!(err.is_sync_violation());
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn test_sync_violation_emits_single_error_event() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();

    let mut router: Router = Router::new();
    router.use_fn(|_req, _ctx| Ok(Reply::pending(async { Ok(Some(ResponseInit::ok())) })));
    router.on_error(move |event| {
        sink.lock().unwrap().push(event.error.is_sync_violation());
    });

    router.route_sync("http://h/", ()).unwrap_err();
    assert_eq!(*errors.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn test_same_router_works_in_async_mode() {
    let mut router: Router = Router::new();
    router.route_fn(HttpMethod::GET, "/slow", |_req, _ctx| {
        Ok(Reply::deferred(async {
            tokio::task::yield_now().await;
            Ok::<_, Error>(ResponseInit::ok().with_body("eventually"))
        }))
    });

    let response = router.route_async("http://h/slow", ()).await.unwrap();
    assert_eq!(response.body_str(), Some("eventually"));

    assert!(router.route_sync("http://h/slow", ()).unwrap_err().is_sync_violation());
}

#[test]
fn test_sync_no_match_and_middleware_error() {
    let mut router: Router = Router::new();
    router.route_fn(HttpMethod::POST, "/fail", |_req, _ctx| Err(Error::msg("boom")));

    let err = router.route_sync("http://h/other", ()).unwrap_err();
    assert!(err.is_no_match());
    assert_eq!(err.status_code(), 404);

    let err = router
        .route_sync(RequestInit::new("POST", "http://h/fail"), ())
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_context_mode_is_sync() {
    let mut router: Router = Router::new();
    router.use_fn(|_req, ctx| {
        let body = ctx.mode().to_string();
        Ok(Reply::respond(ResponseInit::ok().with_body(body)))
    });

    let response = router.route_sync("http://h/", ()).unwrap();
    assert_eq!(response.body_str(), Some(Mode::Sync.as_str()));
}

#[test]
fn test_request_helpers_available_to_handlers() {
    #[derive(serde::Deserialize)]
    struct NewUser {
        name: String,
    }

    let mut router: Router = Router::new();
    router.route_fn(HttpMethod::POST, "/users", |req, _ctx| {
        let user: NewUser = req.json()?;
        let greeting = req.query("greeting").unwrap_or_else(|| "hello".to_string());
        let body = json!({
            "message": format!("{} {}", greeting, user.name),
            "agent": req.header("user-agent"),
        });
        Ok(Reply::respond(
            ResponseInit::new()
                .with_status(HttpStatus::Created)
                .with_body(body),
        ))
    });

    let request = RequestInit::new("POST", "http://h/users?greeting=hi")
        .with_header("User-Agent", "tests")
        .with_json(&json!({"name": "ada"}))
        .unwrap();
    let response = router.route_sync(request, ()).unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(
        response.body,
        json!({"message": "hi ada", "agent": "tests"})
    );
}

#[test]
fn test_router_from_config() {
    let config = RouterConfig {
        default_status: 299,
        default_error_listener: false,
        enable_logging: false,
    };
    let mut router: Router = Router::with_config(config);
    router.any("*", ResponseInit::new());

    let response = router.route_sync(("DELETE", "http://h/x"), ()).unwrap();
    assert_eq!(response.status, 299);
    assert!(!router.error_fallback_active());
}
