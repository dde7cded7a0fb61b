//! State shared by the async and blocking clients

use std::sync::Arc;

use emo_domain::constants::CHANNEL_USER_HEADER;
use emo_domain::{EmoPlatformError, Feature, Plan, RequestInfo, Result};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::auth::TokenStore;
use crate::http::ApiRequest;
use crate::webhook::{WebhookDispatcher, WebhookHandler};

/// A request ready to hand to a transport.
pub(crate) struct Prepared {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub info: RequestInfo,
}

pub(crate) struct ClientCore {
    endpoint_url: String,
    plan: Plan,
    api_key: Option<String>,
    tokens: TokenStore,
    dispatcher: Arc<WebhookDispatcher>,
    room_ids: Mutex<Option<Vec<String>>>,
    webhook_cancel: Mutex<Option<CancellationToken>>,
}

impl ClientCore {
    pub fn new(endpoint_url: String, plan: Plan, api_key: Option<String>, tokens: TokenStore) -> Self {
        Self {
            endpoint_url,
            plan,
            api_key,
            tokens,
            dispatcher: Arc::new(WebhookDispatcher::new()),
            room_ids: Mutex::new(None),
            webhook_cancel: Mutex::new(None),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub const fn plan(&self) -> Plan {
        self.plan
    }

    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn dispatcher(&self) -> Arc<WebhookDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Fail with `Unavailable` unless the plan offers `feature`.
    pub fn ensure(&self, feature: Feature) -> Result<()> {
        self.plan.ensure(feature)
    }

    /// Headers sent with every call, using `access_token` as bearer.
    pub fn headers(&self, access_token: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("accept", "*/*".to_string()),
            ("Authorization", format!("Bearer {access_token}")),
        ];
        if self.plan.is_business() {
            if let Some(key) = &self.api_key {
                headers.push((CHANNEL_USER_HEADER, key.clone()));
            }
        }
        headers
    }

    pub fn prepare(&self, request: &ApiRequest, access_token: &str) -> Prepared {
        let url = request.url(&self.endpoint_url);
        let headers = self.headers(access_token);
        let info = request.describe(&url, &headers);
        Prepared { url, headers, info }
    }

    /// Remember the account's room ids. An empty list is `NoRoom`.
    pub fn remember_rooms(&self, room_ids: Vec<String>) -> Result<Vec<String>> {
        if room_ids.is_empty() {
            *self.room_ids.lock() = None;
            return Err(EmoPlatformError::NoRoom("Get no room id.".to_string()));
        }
        *self.room_ids.lock() = Some(room_ids.clone());
        Ok(room_ids)
    }

    pub fn cached_rooms(&self) -> Option<Vec<String>> {
        self.room_ids.lock().clone()
    }

    /// Register `handler` after checking `room_ids` against `known`.
    pub fn register_event(
        &self,
        event: &str,
        room_ids: &[String],
        known: &[String],
        handler: Arc<dyn WebhookHandler>,
    ) -> Result<()> {
        if let Some(unknown) = room_ids.iter().find(|id| !known.contains(id)) {
            return Err(EmoPlatformError::NoRoom(format!(
                "Try to register wrong room id: '{unknown}'"
            )));
        }
        self.dispatcher.register(event, room_ids, handler);
        Ok(())
    }

    /// Install a fresh token for a webhook session, cancelling any running one.
    pub fn begin_webhook_session(&self) -> CancellationToken {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.webhook_cancel.lock().replace(cancel.clone()) {
            previous.cancel();
        }
        cancel
    }

    /// Cancel the running webhook session. Returns `false` if none was running.
    pub fn end_webhook_session(&self) -> bool {
        self.webhook_cancel.lock().take().is_some_and(|cancel| {
            cancel.cancel();
            true
        })
    }
}
