//! Local HTTP listener for webhook deliveries

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use emo_domain::constants::WEBHOOK_SECRET_HEADER;
use emo_domain::{parse_webhook_body, EmoPlatformError, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::dedup::RequestIdLog;
use super::dispatcher::WebhookDispatcher;
use super::queue::WebhookQueue;

#[derive(Clone)]
struct ListenerState {
    secret: Arc<str>,
    dispatcher: Arc<WebhookDispatcher>,
    queue: WebhookQueue,
    seen: Arc<Mutex<RequestIdLog>>,
}

/// Router accepting deliveries on `POST /`.
///
/// Deliveries must carry the webhook secret in `x-platform-api-secret`.
/// Accepted payloads with a registered callback are pushed onto `queue`.
pub fn webhook_router(
    secret: impl Into<String>,
    dispatcher: Arc<WebhookDispatcher>,
    queue: WebhookQueue,
) -> Router {
    let state = ListenerState {
        secret: Arc::from(secret.into()),
        dispatcher,
        queue,
        seen: Arc::new(Mutex::new(RequestIdLog::default())),
    };
    Router::new().route("/", post(receive_webhook)).with_state(state)
}

async fn receive_webhook(
    State(state): State<ListenerState>,
    headers: HeaderMap,
    payload: Bytes,
) -> (StatusCode, Json<Value>) {
    let provided = headers.get(WEBHOOK_SECRET_HEADER).map(|v| v.as_bytes()).unwrap_or_default();
    if !constant_time_eq(provided, state.secret.as_bytes()) {
        warn!("Rejected webhook delivery with missing or invalid secret");
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    }

    let body = match parse_webhook_body(&payload) {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "Rejected malformed webhook delivery");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "invalid", "message": err.to_string()})),
            );
        }
    };

    if !state.seen.lock().insert(&body.request_id) {
        debug!(request_id = %body.request_id, "Dropping duplicate webhook delivery");
        return (StatusCode::OK, Json(json!({"status": "duplicate"})));
    }

    if state.dispatcher.resolve(&body).is_none() {
        debug!(event = %body.event, room = %body.uuid, "No callback associated with the event");
        return (StatusCode::OK, Json(json!({"status": "ignored"})));
    }

    match state.queue.enqueue(body) {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "success"}))),
        Err(err) => {
            warn!(error = %err, "Webhook queue unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "unavailable"})))
        }
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

/// Running webhook HTTP server.
pub struct WebhookServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WebhookServer {
    /// Bind `host:port` and start serving `router`.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the address cannot be bound.
    pub async fn start(host: &str, port: u16, router: Router) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await.map_err(|err| {
            EmoPlatformError::Network(format!("failed to bind webhook listener on {host}:{port}: {err}"))
        })?;

        let addr = listener.local_addr().map_err(|err| {
            EmoPlatformError::Network(format!("failed to determine listener address: {err}"))
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("Webhook listener error: {}", err);
            }
        });

        Ok(Self { addr, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down the server gracefully.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the server task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(EmoPlatformError::Network(format!(
                        "webhook listener panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for WebhookServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
