//! Arrival-ordered webhook queue
//!
//! The listener accepts deliveries as fast as they arrive and pushes them
//! onto an unbounded channel. A single worker drains the channel and runs
//! one callback at a time, so callbacks observe events in arrival order.

use std::sync::Arc;

use emo_domain::{EmoPlatformError, Result, WebhookBody};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::dispatcher::WebhookDispatcher;

/// Sending half of the webhook queue.
#[derive(Debug, Clone)]
pub struct WebhookQueue {
    sender: mpsc::UnboundedSender<WebhookBody>,
}

impl WebhookQueue {
    /// Enqueue a payload for dispatch.
    ///
    /// # Errors
    ///
    /// Returns `WebhookRequest` once the worker has stopped.
    pub fn enqueue(&self, body: WebhookBody) -> Result<()> {
        self.sender
            .send(body)
            .map_err(|_| EmoPlatformError::WebhookRequest("webhook queue is closed".to_string()))
    }
}

/// Start the drain worker.
///
/// The worker stops when `cancel` fires or every [`WebhookQueue`] is dropped.
/// On cancellation the queue is closed to new payloads and the ones already
/// queued are dispatched before the worker exits.
pub fn spawn_worker(
    dispatcher: Arc<WebhookDispatcher>,
    cancel: CancellationToken,
) -> (WebhookQueue, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WebhookBody>();

    let handle = tokio::spawn(async move {
        loop {
            let body = tokio::select! {
                () = cancel.cancelled() => break,
                next = receiver.recv() => match next {
                    Some(body) => body,
                    None => break,
                },
            };
            process(&dispatcher, body).await;
        }

        // Payloads already acknowledged to the sender are still delivered.
        receiver.close();
        let mut drained = 0_usize;
        while let Some(body) = receiver.recv().await {
            process(&dispatcher, body).await;
            drained += 1;
        }
        debug!(drained, "Webhook queue worker stopped");
    });

    (WebhookQueue { sender }, handle)
}

async fn process(dispatcher: &Arc<WebhookDispatcher>, body: WebhookBody) {
    let event = body.event.clone();
    let request_id = body.request_id.clone();
    let dispatcher = Arc::clone(dispatcher);

    // A separate task contains panics raised by async callbacks.
    match tokio::spawn(async move { dispatcher.dispatch(body).await }).await {
        Ok(Ok(true)) => debug!(%event, %request_id, "Webhook callback completed"),
        Ok(Ok(false)) => debug!(%event, %request_id, "Webhook event ignored"),
        Ok(Err(err)) => warn!(%event, %request_id, error = %err, "Webhook callback failed"),
        Err(err) => error!(%event, %request_id, error = %err, "Webhook callback panicked"),
    }
}
