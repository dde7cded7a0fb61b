//! `emo listen`: print webhook events until interrupted

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use emo_domain::{PlatformConfig, WebhookBody};
use emo_infra::{async_handler, AsyncClient};
use tracing::{info, warn};

use crate::cli::ListenArgs;

pub(super) async fn run(
    client: &AsyncClient,
    config: &PlatformConfig,
    args: ListenArgs,
) -> Result<()> {
    until_interrupted(serve(client, config, &args), tokio::signal::ctrl_c(), || {
        client.stop_webhook_event()
    })
    .await
}

async fn serve(client: &AsyncClient, config: &PlatformConfig, args: &ListenArgs) -> Result<()> {
    for event in &args.events {
        let handler = async_handler(|body: WebhookBody| async move { print_event(&body) });
        client
            .event(event, &args.room_ids, handler)
            .await
            .with_context(|| format!("failed to register {event}"))?;
    }

    let result = if args.poll {
        let secs = args.interval.unwrap_or(config.webhook.poll_interval_secs);
        let interval = Duration::from_secs(secs);
        info!(interval_secs = interval.as_secs(), "Polling room messages");
        client.poll_webhook_event(interval).await
    } else {
        let host = args.host.as_deref().unwrap_or(&config.webhook.host);
        let port = args.port.unwrap_or(config.webhook.port);
        info!(host, port, events = ?args.events, "Listening for webhook events");
        client.start_webhook_event(host, port).await
    };
    Ok(result?)
}

/// Drive `serve` until it finishes or `interrupt` fires.
///
/// On interrupt `stop` ends the running session and `serve` is awaited so
/// queued events still print. If no session was running yet, `serve` is
/// dropped where it stands.
async fn until_interrupted<S, I, F>(serve: S, interrupt: I, stop: F) -> Result<()>
where
    S: Future<Output = Result<()>>,
    I: Future<Output = std::io::Result<()>>,
    F: FnOnce() -> bool,
{
    tokio::pin!(serve);
    tokio::select! {
        result = &mut serve => result,
        signal = interrupt => {
            signal.context("failed to wait for Ctrl-C")?;
            info!("Interrupted, stopping");
            if stop() {
                serve.await
            } else {
                Ok(())
            }
        }
    }
}

fn print_event(body: &WebhookBody) {
    match serde_json::to_string_pretty(body) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(request_id = %body.request_id, error = %e, "Failed to encode event"),
    }
}
