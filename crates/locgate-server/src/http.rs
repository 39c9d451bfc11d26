//! HTTP transport for the access gate.
//!
//! Routes:
//! - `POST /` and `POST /access`: gate request body in, status document out
//! - `GET /healthz`: liveness probe

use crate::error::GateError;
use crate::gate::AccessGate;
use crate::request::GateResponse;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the HTTP router for the gate.
pub fn create_router(gate: Arc<AccessGate>) -> Router {
    Router::new()
        .route("/", post(handle_access))
        .route("/access", post(handle_access))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(gate)
}

/// Handle a gate request.
///
/// The body is read raw so that non-object JSON can be answered with the
/// gate's own `Invalid JSON` document. Store I/O is blocking and runs off the
/// async workers.
async fn handle_access(
    State(gate): State<Arc<AccessGate>>,
    body: Bytes,
) -> Result<Json<GateResponse>, GateError> {
    let response = tokio::task::spawn_blocking(move || gate.handle_body(&body))
        .await
        .map_err(|e| GateError::Internal(e.to_string()))??;
    Ok(Json(response))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "locgate" }))
}

/// The gate's HTTP server.
pub struct GateServer {
    bind: String,
    gate: Arc<AccessGate>,
}

impl GateServer {
    pub fn new(bind: impl Into<String>, gate: Arc<AccessGate>) -> Self {
        Self {
            bind: bind.into(),
            gate,
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), GateError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.bind)
            .await
            .map_err(|e| GateError::StartupFailed(format!("{}: {}", self.bind, e)))?;
        tracing::info!(address = %self.bind, "locgate listening");

        axum::serve(listener, create_router(self.gate.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GateError::StartupFailed(e.to_string()))?;

        tracing::info!("locgate stopped");
        Ok(())
    }

    /// Configured bind address.
    pub fn bind(&self) -> &str {
        &self.bind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{FixedOffset, NaiveDate};
    use locgate_core::FixedClock;
    use locgate_store::MemoryStore;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        let gate = AccessGate::new(
            Arc::new(MemoryStore::new()),
            clock,
            FixedOffset::east_opt(0).unwrap(),
        );
        create_router(Arc::new(gate))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_router()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_status_document() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/access")
                    .body(Body::from("[1, 2, 3]"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "status": "error", "message": "Invalid JSON" })
        );
    }

    #[tokio::test]
    async fn test_check_unknown_identity() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"action":"check","identity":"ghost"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_json(response).await, json!({ "status": "none" }));
    }

    #[test]
    fn test_server_creation() {
        let gate = AccessGate::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
            FixedOffset::east_opt(0).unwrap(),
        );
        let server = GateServer::new("127.0.0.1:0", Arc::new(gate));
        assert_eq!(server.bind(), "127.0.0.1:0");
    }
}
