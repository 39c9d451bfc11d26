//! End-to-end tests: HTTP router over a file-backed store.
//!
//! Run with: cargo test -p locgate-server --test http_flow

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{FixedOffset, NaiveDate};
use locgate_core::FixedClock;
use locgate_server::{AccessGate, create_router};
use locgate_store::{AccessLogStore, FileStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestContext {
    _dir: tempfile::TempDir,
    store: Arc<FileStore>,
    clock: Arc<FixedClock>,
    router: Router,
}

impl TestContext {
    fn new(start: NaiveDate) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path().join("loc_access_log.json")));
        let clock = Arc::new(FixedClock::at_date(start));
        let gate = AccessGate::new(
            store.clone(),
            clock.clone(),
            FixedOffset::east_opt(0).unwrap(),
        );
        Self {
            _dir: dir,
            store,
            clock,
            router: create_router(Arc::new(gate)),
        }
    }

    async fn post(&self, body: Value) -> (StatusCode, Value) {
        self.post_raw(body.to_string()).await
    }

    async fn post_raw(&self, body: String) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/access")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[tokio::test]
async fn test_log_check_expire_scenario() {
    let ctx = TestContext::new(jan(1));

    let (status, body) = ctx.post(json!({ "action": "log", "identity": "alice" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "logged", "lastPaidDate": "2024-01-01", "expiresOn": "2024-01-31" })
    );

    ctx.clock.advance_days(29);
    let (_, body) = ctx.post(json!({ "action": "check", "identity": "alice" })).await;
    assert_eq!(
        body,
        json!({ "status": "active", "lastPaidDate": "2024-01-01", "expiresOn": "2024-01-31" })
    );

    ctx.clock.advance_days(1);
    let (_, body) = ctx.post(json!({ "action": "check", "identity": "alice" })).await;
    assert_eq!(body, json!({ "status": "expired", "lastPaidDate": "2024-01-01" }));
}

#[tokio::test]
async fn test_log_persists_history_to_disk() {
    let ctx = TestContext::new(jan(1));

    ctx.post(json!({ "action": "log", "identity": "alice", "txHash": "0xabc" }))
        .await;
    ctx.clock.advance_days(3);
    ctx.post(json!({ "action": "log", "identity": "alice" })).await;

    let raw: Value =
        serde_json::from_slice(&std::fs::read(ctx.store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({
            "entries": {
                "alice": {
                    "lastPaidDate": "2024-01-04",
                    "history": [
                        { "date": "2024-01-01", "txHash": "0xabc" },
                        { "date": "2024-01-04" }
                    ]
                }
            }
        })
    );
}

#[tokio::test]
async fn test_identities_are_case_sensitive() {
    let ctx = TestContext::new(jan(1));

    ctx.post(json!({ "action": "log", "identity": "alice" })).await;
    let (_, body) = ctx.post(json!({ "action": "check", "identity": "Alice" })).await;
    assert_eq!(body, json!({ "status": "none" }));
}

#[tokio::test]
async fn test_validation_errors() {
    let ctx = TestContext::new(jan(1));

    let (status, body) = ctx.post_raw("\"just a string\"".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "error", "message": "Invalid JSON" }));

    let (_, body) = ctx.post(json!({ "action": "log" })).await;
    assert_eq!(body, json!({ "status": "error", "message": "Missing identity" }));

    let (_, body) = ctx.post(json!({ "action": "renew", "identity": "alice" })).await;
    assert_eq!(body, json!({ "status": "error", "message": "Unknown action" }));

    assert!(!ctx.store.path().exists());
}

#[tokio::test]
async fn test_corrupt_log_reads_as_none_and_is_replaced() {
    let ctx = TestContext::new(jan(1));
    std::fs::write(ctx.store.path(), "{ this is not json").unwrap();

    let (_, body) = ctx.post(json!({ "action": "check", "identity": "alice" })).await;
    assert_eq!(body, json!({ "status": "none" }));

    ctx.post(json!({ "action": "log", "identity": "alice" })).await;
    assert_eq!(ctx.store.load().get("alice").unwrap().history.len(), 1);
}

#[tokio::test]
async fn test_unparseable_stored_date_is_none() {
    let ctx = TestContext::new(jan(1));
    std::fs::write(
        ctx.store.path(),
        r#"{"entries":{"alice":{"lastPaidDate":"01/01/2024","history":[]}}}"#,
    )
    .unwrap();

    let (_, body) = ctx.post(json!({ "action": "check", "identity": "alice" })).await;
    assert_eq!(body, json!({ "status": "none" }));
}

#[tokio::test]
async fn test_store_write_failure_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let occupied = dir.path().join("occupied");
    std::fs::create_dir_all(occupied.join("child")).unwrap();

    let gate = AccessGate::new(
        Arc::new(FileStore::new(&occupied)),
        Arc::new(FixedClock::at_date(jan(1))),
        FixedOffset::east_opt(0).unwrap(),
    );
    let response = create_router(Arc::new(gate))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/access")
                .body(Body::from(r#"{"action":"log","identity":"alice"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
}
