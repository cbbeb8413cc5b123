//! Main HTTP Gateway Server.
//!
//! `ANY {basePath}/:type` feeds the webhook router; `GET /health` reports
//! liveness.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use modbot_core::WebhookRequest;
use modbot_routing::{Router as WebhookRouter, WebhookResponse};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::health_api;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub router: Arc<WebhookRouter>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(router: Arc<WebhookRouter>) -> Self {
        Self {
            router,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum application with webhook routes mounted under `base_path`.
pub fn build_app(base_path: &str, state: GatewayState) -> Router {
    let base = base_path.trim_end_matches('/');
    let root = if base.is_empty() { "/" } else { base };

    Router::new()
        .route("/health", get(health_api::get_health))
        .route(&format!("{base}/:endpoint"), any(handle_typed))
        .route(root, any(handle_untyped))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and serves until `shutdown` resolves.
#[instrument(skip(app, shutdown))]
pub async fn start_server<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_typed(
    State(state): State<GatewayState>,
    Path(endpoint): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req = to_webhook_request(method, &headers, &body).with_endpoint(endpoint);
    into_http(state.router.route(&req).await)
}

async fn handle_untyped(
    State(state): State<GatewayState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req = to_webhook_request(method, &headers, &body);
    into_http(state.router.route(&req).await)
}

fn to_webhook_request(method: Method, headers: &HeaderMap, body: &Bytes) -> WebhookRequest {
    let mut req = WebhookRequest::new(method.as_str(), body.to_vec());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            req.insert_header(name.as_str(), value);
        }
    }
    req
}

fn into_http(resp: WebhookResponse) -> Response {
    let status = StatusCode::from_u16(resp.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(resp.body)).into_response();
    for (name, value) in resp.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::Request;
    use modbot_channels::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};
    use modbot_core::{Headers, Payload, QueueError, Queuer};
    use modbot_routing::{RouteTable, RouterConfig};
    use tower::ServiceExt;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const TS: &str = "1531420618";
    // payload={"callback_id":"flagMessage","team":{"id":"T1"},"action_ts":"1","message_ts":"2"}
    const BODY: &str = "payload=%7B%22callback_id%22%3A%22flagMessage%22%2C%22team%22%3A%7B%22id%22%3A%22T1%22%7D%2C%22action_ts%22%3A%221%22%2C%22message_ts%22%3A%222%22%7D";

    #[derive(Default)]
    struct Recording(Mutex<Vec<Headers>>);

    #[async_trait]
    impl Queuer for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn queue(&self, headers: &Headers, _: &Payload) -> Result<(), QueueError> {
            self.0.lock().unwrap().push(headers.clone());
            Ok(())
        }
    }

    fn app(recorder: Arc<Recording>) -> Router {
        let mut table = RouteTable::new();
        table.register_route("flagMessage", recorder).unwrap();
        let router = WebhookRouter::new(RouterConfig::new(SECRET), table).unwrap();
        build_app("/slack", GatewayState::new(Arc::new(router)))
    }

    fn signed_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .header(TIMESTAMP_HEADER, TS)
            .header(SIGNATURE_HEADER, sign(SECRET, TS, body).unwrap())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read(resp: Response) -> (StatusCode, String, Option<String>) {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap(), content_type)
    }

    #[tokio::test]
    async fn signed_action_is_accepted() {
        let recorder = Arc::new(Recording::default());
        let resp = app(recorder.clone())
            .oneshot(signed_post("/slack/action", BODY))
            .await
            .unwrap();

        let (status, body, content_type) = read(resp).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, r#"{"status":"202","message":""}"#);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsigned_request_is_400_json() {
        let req = Request::builder()
            .method("POST")
            .uri("/slack/action")
            .body(Body::from(BODY))
            .unwrap();
        let (status, body, _) = read(app(Arc::default()).oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            r#"{"status":"400","message":"invalid request, check request signature"}"#
        );
    }

    #[tokio::test]
    async fn endpoint_types_map_through() {
        let (status, _, _) = read(
            app(Arc::default())
                .oneshot(signed_post("/slack/event", BODY))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

        let (status, body, _) = read(
            app(Arc::default())
                .oneshot(signed_post("/slack", BODY))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("check endpoint type"));
    }

    #[tokio::test]
    async fn non_utf8_body_is_verified_as_raw_bytes() {
        let body: &[u8] = b"payload=\xff";
        let req = Request::builder()
            .method("POST")
            .uri("/slack/action")
            .header(TIMESTAMP_HEADER, TS)
            .header(SIGNATURE_HEADER, sign(SECRET, TS, body).unwrap())
            .body(Body::from(body.to_vec()))
            .unwrap();
        let (status, body, _) = read(app(Arc::default()).oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"status":"400","message":"unable to parse action"}"#);
    }

    #[tokio::test]
    async fn get_is_rejected_as_unsigned() {
        let req = Request::builder()
            .method("GET")
            .uri("/slack/action")
            .header(TIMESTAMP_HEADER, TS)
            .header(SIGNATURE_HEADER, sign(SECRET, TS, "").unwrap())
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = read(app(Arc::default()).oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_lists_routes() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body, _) = read(app(Arc::default()).oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["routes"], serde_json::json!(["flagMessage"]));
    }
}
