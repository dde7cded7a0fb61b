use std::net::SocketAddr;
use std::sync::Arc;

use emo_domain::{EmoPlatformError, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::dispatcher::WebhookDispatcher;
use super::queue::spawn_worker;
use super::server::{webhook_router, WebhookServer};

/// Webhook HTTP listener plus the queue worker feeding the callbacks.
pub struct WebhookListener {
    server: WebhookServer,
    worker: JoinHandle<()>,
    cancel: CancellationToken,
}

impl WebhookListener {
    /// Bind `host:port` and start accepting deliveries signed with `secret`.
    ///
    /// Both the server and the worker stop once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the address cannot be bound.
    pub async fn start(
        host: &str,
        port: u16,
        secret: impl Into<String>,
        dispatcher: Arc<WebhookDispatcher>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (queue, worker) = spawn_worker(Arc::clone(&dispatcher), cancel.clone());
        let router = webhook_router(secret, dispatcher, queue);

        let server = match WebhookServer::start(host, port, router).await {
            Ok(server) => server,
            Err(err) => {
                worker.abort();
                return Err(err);
            }
        };

        info!(addr = %server.local_addr(), "Webhook listener started");
        Ok(Self { server, worker, cancel })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Serve until the cancellation token fires, then shut down.
    ///
    /// # Errors
    ///
    /// Returns an error if the server or worker task panicked.
    pub async fn run_until_cancelled(self) -> Result<()> {
        self.cancel.cancelled().await;
        self.shutdown().await
    }

    /// Stop accepting deliveries and wait for the worker to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server or worker task panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.server.shutdown().await?;
        self.worker.await.map_err(|err| {
            EmoPlatformError::WebhookCallback(format!("webhook worker panicked: {err}"))
        })?;
        info!("Webhook listener stopped");
        Ok(())
    }
}
