//! Async API client
//!
//! Every call goes through [`AsyncClient::execute`], which adds the bearer
//! and channel headers, maps HTTP statuses to typed errors, and on 401
//! refreshes the access token and resends the call once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emo_domain::constants::{ENV_REFRESH_TOKEN, MESSAGE_RECEIVED_EVENT};
use emo_domain::{
    AccountDetails, AccountInfo, BroadcastMsg, EmoBroadcastInfo, EmoBroadcastInfoList,
    EmoMotionsInfo, EmoMsgsInfo, EmoPlatformError, EmoRoomInfo, EmoStampsInfo, EmoTokens,
    EmoWebhookInfo, Feature, Plan, Result, WebHook,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::endpoints;
use super::room::AsyncRoom;
use super::shared::ClientCore;
use crate::errors::to_domain;
use crate::http::{decode_response, ApiRequest, RequestBody};
use crate::webhook::{MessagePoller, MessageSource, WebhookHandler, WebhookListener};

/// Async client for the emo Platform API.
///
/// Cloning is cheap; clones share credentials, the webhook table and the
/// refresh lock.
#[derive(Clone)]
pub struct AsyncClient {
    core: Arc<ClientCore>,
    http: reqwest::Client,
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for AsyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncClient")
            .field("endpoint_url", &self.core.endpoint_url())
            .field("plan", &self.core.plan())
            .finish_non_exhaustive()
    }
}

impl AsyncClient {
    pub(crate) fn from_parts(core: Arc<ClientCore>, http: reqwest::Client) -> Self {
        Self { core, http, refresh_lock: Arc::new(Mutex::new(())) }
    }

    pub fn plan(&self) -> Plan {
        self.core.plan()
    }

    /// Access token currently in use.
    pub fn access_token(&self) -> String {
        self.core.tokens().access_token()
    }

    pub(crate) fn ensure(&self, feature: Feature) -> Result<()> {
        self.core.ensure(feature)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn send<T: DeserializeOwned>(&self, request: &ApiRequest, access_token: &str) -> Result<T> {
        let prepared = self.core.prepare(request, access_token);

        let mut builder = self.http.request(request.method.clone(), &prepared.url);
        for (name, value) in &prepared.headers {
            builder = builder.header(*name, value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(file) => builder.multipart(file.to_async_form()?),
        };

        let response = builder.send().await.map_err(to_domain)?;
        let status = response.status();
        let body = response.text().await.map_err(to_domain)?;
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
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let token = self.access_token();
        match self.send(&request, &token).await {
            Err(err) if err.is_unauthorized() && request.refresh_on_unauthorized => {
                debug!("Access token rejected, refreshing");
                self.refresh_after_unauthorized(&token).await?;
                self.send(&request, &self.access_token()).await
            }
            result => result,
        }
    }

    /// Refresh unless another caller already replaced `stale`.
    async fn refresh_after_unauthorized(&self, stale: &str) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.access_token() != stale {
            debug!("Access token already refreshed by another call");
            return Ok(());
        }
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<()> {
        for candidate in self.core.tokens().refresh_candidates() {
            match self.get_access_token(&candidate.token).await {
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

    // ========================================================================
    // Account and tokens
    // ========================================================================

    /// Exchange `refresh_token` for a new token pair without storing it.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the refresh token is not accepted.
    #[instrument(skip_all)]
    pub async fn get_access_token(&self, refresh_token: &str) -> Result<EmoTokens> {
        // Sent directly: the refresh endpoint never goes through the 401 retry.
        self.send(&endpoints::refresh_token(refresh_token), &self.access_token()).await
    }

    /// Refresh and persist the token pair: saved refresh token first, then
    /// the one supplied at construction. At most two API calls.
    ///
    /// # Errors
    ///
    /// Returns `Token` when neither refresh token is accepted.
    pub async fn update_tokens(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    pub async fn get_account_info(&self) -> Result<AccountDetails> {
        self.execute(endpoints::get_account()).await
    }

    /// Delete the account. Personal plan only.
    pub async fn delete_account_info(&self) -> Result<AccountDetails> {
        self.ensure(Feature::DeleteAccount)?;
        self.execute(endpoints::delete_account()).await
    }

    /// Change account details. Business plans only.
    pub async fn change_account_info(&self, info: &AccountInfo) -> Result<AccountDetails> {
        self.ensure(Feature::ChangeAccount)?;
        self.execute(endpoints::change_account(info)).await
    }

    // ========================================================================
    // Rooms and catalogues
    // ========================================================================

    pub async fn get_rooms_list(&self) -> Result<EmoRoomInfo> {
        self.execute(endpoints::list_rooms()).await
    }

    /// Ids of the account's rooms.
    ///
    /// # Errors
    ///
    /// Returns `NoRoom` if the account has no room.
    pub async fn get_rooms_id(&self) -> Result<Vec<String>> {
        let rooms = self.get_rooms_list().await?;
        self.core.remember_rooms(rooms.room_ids())
    }

    pub fn create_room_client(&self, room_id: impl Into<String>) -> AsyncRoom {
        AsyncRoom::new(self.clone(), room_id.into())
    }

    /// Client for the account's first room.
    pub async fn room(&self) -> Result<AsyncRoom> {
        let ids = self.get_rooms_id().await?;
        let first = ids
            .into_iter()
            .next()
            .ok_or_else(|| EmoPlatformError::NoRoom("Get no room id.".to_string()))?;
        Ok(self.create_room_client(first))
    }

    pub async fn get_stamps_list(&self) -> Result<EmoStampsInfo> {
        self.execute(endpoints::list_stamps()).await
    }

    pub async fn get_motions_list(&self) -> Result<EmoMotionsInfo> {
        self.ensure(Feature::MotionsList)?;
        self.execute(endpoints::list_motions()).await
    }

    // ========================================================================
    // Webhook setting
    // ========================================================================

    pub async fn get_webhook_setting(&self) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::get_webhook()).await
    }

    pub async fn create_webhook_setting(&self, webhook: &WebHook) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::create_webhook(webhook)).await
    }

    pub async fn change_webhook_setting(&self, webhook: &WebHook) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::change_webhook(webhook)).await
    }

    /// Subscribe the webhook to `events`. The returned setting carries the
    /// secret deliveries are signed with.
    pub async fn register_webhook_event(&self, events: &[String]) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::register_webhook_events(events)).await
    }

    pub async fn delete_webhook_setting(&self) -> Result<EmoWebhookInfo> {
        self.ensure(Feature::Webhook)?;
        self.execute(endpoints::delete_webhook()).await
    }

    // ========================================================================
    // Broadcast messages
    // ========================================================================

    pub async fn get_broadcast_msgs_list(&self) -> Result<EmoBroadcastInfoList> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::list_broadcasts()).await
    }

    pub async fn get_broadcast_msg_details(&self, message_id: i64) -> Result<EmoBroadcastInfo> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::get_broadcast(message_id)).await
    }

    pub async fn create_broadcast_msg(&self, message: &BroadcastMsg) -> Result<Value> {
        self.ensure(Feature::Broadcast)?;
        self.execute(endpoints::create_broadcast(message)).await
    }

    // ========================================================================
    // Webhook events
    // ========================================================================

    /// Register `handler` for `event` in `room_ids` (all rooms when empty).
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on plans without webhooks and `NoRoom` for room
    /// ids the account does not have.
    pub async fn event(
        &self,
        event: &str,
        room_ids: &[String],
        handler: Arc<dyn WebhookHandler>,
    ) -> Result<()> {
        self.ensure(Feature::Webhook)?;
        let known = if room_ids.is_empty() {
            Vec::new()
        } else if let Some(cached) = self.core.cached_rooms() {
            cached
        } else {
            self.get_rooms_id().await?
        };
        self.core.register_event(event, room_ids, &known, handler)
    }

    /// Register every event in the callback table, then serve webhook
    /// deliveries on `host:port` until [`AsyncClient::stop_webhook_event`].
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on plans without webhooks, the registration
    /// error, or `Network` if the listener cannot bind.
    pub async fn start_webhook_event(&self, host: &str, port: u16) -> Result<()> {
        self.ensure(Feature::Webhook)?;
        let dispatcher = self.core.dispatcher();
        let setting = self.register_webhook_event(&dispatcher.events()).await?;

        let cancel = self.core.begin_webhook_session();
        let listener = WebhookListener::start(host, port, setting.secret, dispatcher, cancel).await?;
        listener.run_until_cancelled().await
    }

    /// Stop a running webhook listener or poller. Returns `false` if none
    /// was running.
    pub fn stop_webhook_event(&self) -> bool {
        self.core.end_webhook_session()
    }

    /// Deliver `message.received` callbacks by polling every room every
    /// `interval` instead of listening for webhooks. Runs until
    /// [`AsyncClient::stop_webhook_event`].
    ///
    /// # Errors
    ///
    /// Returns `NoRoom` when the account has no room, or the credential
    /// error that ended polling.
    pub async fn poll_webhook_event(&self, interval: Duration) -> Result<()> {
        let dispatcher = self.core.dispatcher();
        if !dispatcher.events().iter().any(|e| e == MESSAGE_RECEIVED_EVENT) {
            warn!("No callback registered for {MESSAGE_RECEIVED_EVENT}, polled messages are dropped");
        }
        let rooms = self.get_rooms_id().await?;
        let poller = MessagePoller::new(Arc::new(self.clone()), rooms, interval);

        let cancel = self.core.begin_webhook_session();
        poller.run(dispatcher, cancel).await
    }
}

#[async_trait]
impl MessageSource for AsyncClient {
    async fn latest_messages(&self, room_id: &str) -> Result<EmoMsgsInfo> {
        self.execute(endpoints::room_messages(room_id, None)).await
    }
}
