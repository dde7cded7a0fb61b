//! Event type → room → callback table

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use emo_domain::constants::ALL_ROOMS;
use emo_domain::{EmoPlatformError, Result, WebhookBody};
use parking_lot::RwLock;
use tracing::debug;

/// Callback invoked for a webhook event.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle one event. Errors are logged by the dispatcher's caller.
    async fn handle(&self, body: WebhookBody) -> Result<()>;
}

/// Runs a synchronous closure on the blocking thread pool.
struct BlockingHandler<F>(Arc<F>);

#[async_trait]
impl<F> WebhookHandler for BlockingHandler<F>
where
    F: Fn(WebhookBody) + Send + Sync + 'static,
{
    async fn handle(&self, body: WebhookBody) -> Result<()> {
        let callback = Arc::clone(&self.0);
        tokio::task::spawn_blocking(move || callback(body))
            .await
            .map_err(|e| EmoPlatformError::WebhookCallback(format!("callback panicked: {e}")))
    }
}

/// Awaits the future returned by an async closure.
struct AsyncHandler<F>(F);

#[async_trait]
impl<F, Fut> WebhookHandler for AsyncHandler<F>
where
    F: Fn(WebhookBody) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, body: WebhookBody) -> Result<()> {
        (self.0)(body).await;
        Ok(())
    }
}

/// Wrap a synchronous closure as a [`WebhookHandler`].
pub fn blocking_handler<F>(callback: F) -> Arc<dyn WebhookHandler>
where
    F: Fn(WebhookBody) + Send + Sync + 'static,
{
    Arc::new(BlockingHandler(Arc::new(callback)))
}

/// Wrap an async closure as a [`WebhookHandler`].
pub fn async_handler<F, Fut>(callback: F) -> Arc<dyn WebhookHandler>
where
    F: Fn(WebhookBody) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(AsyncHandler(callback))
}

type RoomHandlers = HashMap<String, Arc<dyn WebhookHandler>>;

/// Registered webhook callbacks.
///
/// Each event type maps room ids to one callback; the empty room id
/// ([`ALL_ROOMS`]) matches events from any room without a room-specific
/// callback.
#[derive(Default)]
pub struct WebhookDispatcher {
    handlers: RwLock<HashMap<String, RoomHandlers>>,
}

impl WebhookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event` in `room_ids`, replacing earlier
    /// registrations. An empty `room_ids` registers for all rooms.
    pub fn register(&self, event: &str, room_ids: &[String], handler: Arc<dyn WebhookHandler>) {
        let mut handlers = self.handlers.write();
        let rooms = handlers.entry(event.to_string()).or_default();
        if room_ids.is_empty() {
            rooms.insert(ALL_ROOMS.to_string(), handler);
        } else {
            for room_id in room_ids {
                rooms.insert(room_id.clone(), Arc::clone(&handler));
            }
        }
        debug!(event, rooms = room_ids.len(), "Webhook callback registered");
    }

    /// Event types with at least one callback, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.handlers.read().keys().cloned().collect();
        events.sort();
        events
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Callback for `body`: room-specific first, then the all-rooms one.
    pub fn resolve(&self, body: &WebhookBody) -> Option<Arc<dyn WebhookHandler>> {
        let handlers = self.handlers.read();
        let rooms = handlers.get(&body.event)?;
        rooms.get(&body.uuid).or_else(|| rooms.get(ALL_ROOMS)).cloned()
    }

    /// Invoke the callback for `body`.
    ///
    /// Returns `Ok(false)` without doing anything when no callback matches.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    pub async fn dispatch(&self, body: WebhookBody) -> Result<bool> {
        let Some(handler) = self.resolve(&body) else {
            debug!(event = %body.event, room = %body.uuid, "No callback for webhook event");
            return Ok(false);
        };
        handler.handle(body).await?;
        Ok(true)
    }
}
