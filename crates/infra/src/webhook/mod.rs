//! Webhook delivery
//!
//! Callbacks are registered per event type and room on a
//! [`WebhookDispatcher`]. Events reach them either through the local HTTP
//! listener ([`WebhookListener`]) or, for `message.received`, through the
//! [`MessagePoller`].

pub mod dedup;
pub mod dispatcher;
pub mod listener;
pub mod poller;
pub mod queue;
pub mod server;

pub use dedup::RequestIdLog;
pub use dispatcher::{async_handler, blocking_handler, WebhookDispatcher, WebhookHandler};
pub use listener::WebhookListener;
pub use poller::{MessagePoller, MessageSource};
pub use queue::{spawn_worker, WebhookQueue};
pub use server::{webhook_router, WebhookServer};
