//! Blocking API client
//!
//! Same surface as [`super::AsyncClient`], backed by `reqwest::blocking`.
//! Must not be used from inside an async runtime; the webhook listener and
//! the message poller build their own runtime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emo_domain::constants::{ENV_REFRESH_TOKEN, MESSAGE_RECEIVED_EVENT};
use emo_domain::{
    AccountDetails, AccountInfo, BroadcastMsg, EmoBroadcastInfo, EmoBroadcastInfoList,
    EmoMotionsInfo, EmoMsgsInfo, EmoPlatformError, EmoRoomInfo, EmoStampsInfo, EmoTokens,
    EmoWebhookInfo, Feature, Plan, Result, WebHook,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::endpoints;
use super::room::Room;
use super::shared::ClientCore;
use crate::errors::to_domain;
use crate::http::{decode_response, ApiRequest, RequestBody};
use crate::webhook::{MessagePoller, MessageSource, WebhookHandler, WebhookListener};

/// Blocking client for the emo Platform API.
#[derive(Clone)]
pub struct Client {
    core: Arc<ClientCore>,
    http: reqwest::blocking::Client,
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint_url", &self.core.endpoint_url())
            .field("plan", &self.core.plan())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub(crate) fn from_parts(core: Arc<ClientCore>, http: reqwest::blocking::Client) -> Self {
        Self { core, http, refresh_lock: Arc::new(Mutex::new(())) }
    }

    pub fn plan(&self) -> Plan {
        self.core.plan()
    }

    pub fn access_token(&self) -> String {
        self.core.tokens().access_token()
    }

    pub(crate) fn ensure(&self, feature: Feature) -> Result<()> {
        self.core.ensure(feature)
    }

    fn send<T: DeserializeOwned>(&self, request: &ApiRequest, access_token: &str) -> Result<T> {
        let prepared = self.core.prepare(request, access_token);

        let mut builder = self.http.request(request.method.clone(), &prepared.url);
        for (name, value) in &prepared.headers {
            builder = builder.header(*name, value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(file) => builder.multipart(file.to_blocking_form()?),
        };

        let response = builder.send().map_err(to_domain)?;
        let status = response.status();
        let body = response.text().map_err(to_domain)?;
        debug!(status = status.as_u16(), "Response received");

        decode_response(status, &body, prepared.info)
    }

    /// Send `request`, refreshing the access token and resending once on 401.
    ///
    /// # Errors
    ///
    /// Returns the typed status error of the final attempt, or the `Token`
    /// error raised when no refresh token is accepted.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let token = self.access_token();
        match self.send(&request, &token) {
            Err(err) if err.is_unauthorized() && request.refresh_on_unauthorized => {
                debug!("Access token rejected, refreshing");
                {
                    let _guard = self.refresh_lock.lock();
                    if self.access_token() == token {
                        self.refresh_locked()?;
                    }
                }
                self.send(&request, &self.access_token())
            }
            result => result,
        }
    }

    fn refresh_locked(&self) -> Result<()> {
        for candidate in self.core.tokens().refresh_candidates() {
            match self.get_access_token(&candidate.token) {
                Ok(tokens) => {
                    self.core.tokens().store(&tokens)?;
                    info!(source = ?candidate.source, "Access token refreshed");
                    return Ok(());
                }
                Err(err) if err.is_unauthorized() => self.core.tokens().reject(candidate.source)?,
                Err(err) => return Err(err),
            }
        }
        Err(EmoPlatformError::Token(format!(
            "Please set new refresh_token as environment variable '{ENV_REFRESH_TOKEN}'"
        )))
    }

    #[instrument(skip_all)]
    pub fn get_access_token(&self, refresh_token: &str) -> Result<EmoTokens> {
        self.send(&endpoints::refresh_token(refresh_token), &self.access_token())
    }

    /// Refresh and persist the token pair. At most two API calls.
    ///
    /// # Errors
    ///
    /// Returns `Token` when neither refresh token is accepted.
    pub fn update_tokens(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock();
        self.refresh_locked()
    }

    pub fn get_account_info(&self) -> Result<AccountDetails> {
        self.execute(endpoints::get_account())
    }

    pub fn delete_account_info(&self) -> Result<AccountDetails> {
        self.ensure(Feature::DeleteAccount)?;
        self.execute(endpoints::delete_account())
    }

    pub fn change_account_info(&self, info: &AccountInfo) -> Result<AccountDetails> {
        self.ensure(Feature::ChangeAccount)?;
        self.execute(endpoints::change_account(info))
    }

    pub fn get_rooms_list(&self) -> Result<EmoRoomInfo> {
        self.execute(endpoints::list_rooms())
    }

    /// Ids of the account's rooms.
    ///
    /// # Errors
    ///
    /// Returns `NoRoom` if the account has no room.
    pub fn get_rooms_id(&self) -> Result<Vec<String>> {
        let rooms = self.get_rooms_list()?;
        self.core.remember_rooms(rooms.room_ids())
    }

    pub fn create_room_client(&self, room_id: impl Into<String>) -> Room {
        Room::new(self.clone(), room_id.into())
    }

    /// Client for the account's first room.
    pub fn room(&self) -> Result<Room> {
        let first = self
            .get_rooms_id()?
            .into_iter()
            .next()
            .ok_or_else(|| EmoPlatformError::NoRoom("Get no room id.".to_string()))?;
        Ok(self.create_room_client(first))
    }

    pub fn get_stamps_list(&self) -> Result<EmoStampsInfo> {
        self.execute(endpoints::list_stamps())
    }

    pub fn get_motions_list(&self) -> Result<EmoMotionsInfo> {
        self.ensure(Feature::MotionsList)?;
        self.execute(endpoints::list_motions())
    }

    pub fn get_webhook_setting(&self) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::get_webhook())
    }

    pub fn create_webhook_setting(&self, webhook: &WebHook) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::create_webhook(webhook))
    }

    pub fn change_webhook_setting(&self, webhook: &WebHook) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::change_webhook(webhook))
    }

    pub fn register_webhook_event(&self, events: &[String]) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::register_webhook_events(events))
    }

    pub fn delete_webhook_setting(&self) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::delete_webhook())
    }

    pub fn get_broadcast_msgs_list(&self) -> Result<EmoBroadcastInfoList> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::list_broadcasts())
    }

    pub fn get_broadcast_msg_details(&self, message_id: i64) -> Result<EmoBroadcastInfo> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::get_broadcast(message_id))
    }

    pub fn create_broadcast_msg(&self, message: &BroadcastMsg) -> Result<Value> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::create_broadcast(message))
    }

    /// Register `handler` for `event` in `room_ids` (all rooms when empty).
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on plans without webhooks and `NoRoom` for room
    /// ids the account does not have.
    pub fn event(&self, event: &str, room_ids: &[String], handler: Arc<dyn WebhookHandler>) -> Result<()> {
        self.ensure(Feature::Webhook)?;
        let known = if room_ids.is_empty() {
            Vec::new()
        } else if let Some(cached) = self.core.cached_rooms() {
            cached
        } else {
            self.get_rooms_id()?
        };
        self.core.register_event(event, room_ids, &known, handler)
    }

    /// Register every event in the callback table, then serve webhook
    /// deliveries on `host:port` until [`Client::stop_webhook_event`] is
    /// called from a callback or another thread.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on plans without webhooks, the registration
    /// error, or `Network` if the listener cannot bind.
    pub fn start_webhook_event(&self, host: &str, port: u16) -> Result<()> {
        self.ensure(Feature::Webhook)?;
        let dispatcher = self.core.dispatcher();
        let setting = self.register_webhook_event(&dispatcher.events())?;

        let runtime = webhook_runtime()?;
        let cancel = self.core.begin_webhook_session();
        runtime.block_on(async move {
            let listener =
                WebhookListener::start(host, port, setting.secret, dispatcher, cancel).await?;
            listener.run_until_cancelled().await
        })
    }

    /// Stop a running webhook listener or poller. Returns `false` if none
    /// was running.
    pub fn stop_webhook_event(&self) -> bool {
        self.core.end_webhook_session()
    }

    /// Deliver `message.received` callbacks by polling every room every
    /// `interval` instead of listening for webhooks. Blocks until
    /// [`Client::stop_webhook_event`] is called from a callback or another
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns `NoRoom` when the account has no room, or the credential
    /// error that ended polling.
    pub fn poll_webhook_event(&self, interval: Duration) -> Result<()> {
        let dispatcher = self.core.dispatcher();
        if !dispatcher.events().iter().any(|e| e == MESSAGE_RECEIVED_EVENT) {
            warn!("No callback registered for {MESSAGE_RECEIVED_EVENT}, polled messages are dropped");
        }
        let rooms = self.get_rooms_id()?;
        let poller = MessagePoller::new(Arc::new(self.clone()), rooms, interval);

        let runtime = webhook_runtime()?;
        let cancel = self.core.begin_webhook_session();
        runtime.block_on(poller.run(dispatcher, cancel))
    }
}

fn webhook_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| EmoPlatformError::Network(format!("failed to start webhook runtime: {e}")))
}

/// Runs each blocking fetch on the poller runtime's blocking pool.
#[async_trait]
impl MessageSource for Client {
    async fn latest_messages(&self, room_id: &str) -> Result<EmoMsgsInfo> {
        let client = self.clone();
        let request = endpoints::room_messages(room_id, None);
        tokio::task::spawn_blocking(move || client.execute(request))
            .await
            .map_err(|e| EmoPlatformError::Network(format!("message poll task failed: {e}")))?
    }
}
