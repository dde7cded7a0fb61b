//! Polling fallback for `message.received`
//!
//! For hosts that cannot receive webhook deliveries, the poller reads the
//! latest messages of each watched room on an interval and turns messages
//! it has not seen yet into synthetic `message.received` payloads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emo_domain::constants::{MAX_CONCURRENT_POLL_REQUESTS, MESSAGE_RECEIVED_EVENT};
use emo_domain::{EmoMessageInfo, EmoMsgsInfo, EmoPlatformError, ErrorKind, Result, WebhookBody};
use futures::stream::{self, StreamExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::dispatcher::WebhookDispatcher;
use super::queue::spawn_worker;

/// Source of room messages for the poller.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Latest messages of `room_id`.
    async fn latest_messages(&self, room_id: &str) -> Result<EmoMsgsInfo>;
}

/// Diffs room message lists between polls.
pub struct MessagePoller {
    source: Arc<dyn MessageSource>,
    room_ids: Vec<String>,
    last_seen: HashMap<String, i64>,
    interval: Duration,
}

impl MessagePoller {
    pub fn new(source: Arc<dyn MessageSource>, room_ids: Vec<String>, interval: Duration) -> Self {
        Self { source, room_ids, last_seen: HashMap::new(), interval }
    }

    pub fn room_ids(&self) -> &[String] {
        &self.room_ids
    }

    /// Fetch every watched room and return unseen messages as payloads.
    ///
    /// The first successful poll of a room only records its latest sequence,
    /// or that it was empty.
    ///
    /// # Errors
    ///
    /// Returns credential errors (`Token`, `Unauthorized`), which end
    /// polling. Other per-room failures are logged and skipped.
    #[instrument(skip(self), fields(rooms = self.room_ids.len()))]
    pub async fn poll_once(&mut self) -> Result<Vec<WebhookBody>> {
        let source = Arc::clone(&self.source);
        let fetched: Vec<(String, Result<EmoMsgsInfo>)> = stream::iter(self.room_ids.clone())
            .map(|room_id| {
                let source = Arc::clone(&source);
                async move {
                    let result = source.latest_messages(&room_id).await;
                    (room_id, result)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_POLL_REQUESTS)
            .collect()
            .await;

        let mut bodies = Vec::new();
        for (room_id, result) in fetched {
            let info = match result {
                Ok(info) => info,
                Err(err) if matches!(err.kind(), ErrorKind::Token | ErrorKind::Unauthorized) => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(room = %room_id, error = %err, "Failed to poll room messages");
                    continue;
                }
            };

            let latest = info.latest_sequence();
            let Some(previous) = self.last_seen.get(&room_id).copied() else {
                // An empty room starts below every sequence so its first message is new.
                self.last_seen.insert(room_id.clone(), latest.unwrap_or(i64::MIN));
                debug!(room = %room_id, sequence = ?latest, "Recorded message baseline");
                continue;
            };

            bodies.extend(
                info.newer_than(previous).into_iter().map(|msg| message_body(&room_id, msg)),
            );
            if let Some(latest) = latest.filter(|latest| *latest > previous) {
                self.last_seen.insert(room_id, latest);
            }
        }

        debug!(new_messages = bodies.len(), "Poll complete");
        Ok(bodies)
    }

    /// Poll on the configured interval and dispatch new messages until
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns the credential error that ended polling.
    pub async fn run(mut self, dispatcher: Arc<WebhookDispatcher>, cancel: CancellationToken) -> Result<()> {
        let (queue, worker) = spawn_worker(dispatcher, cancel.clone());
        let mut ticker = tokio::time::interval(self.interval);
        info!(rooms = self.room_ids.len(), interval_secs = self.interval.as_secs(), "Message polling started");

        let outcome = loop {
            tokio::select! {
                () = cancel.cancelled() => break Ok(()),
                _ = ticker.tick() => {}
            }

            match self.poll_once().await {
                Ok(bodies) => {
                    // The worker only closes the queue after cancellation.
                    if bodies.into_iter().try_for_each(|body| queue.enqueue(body)).is_err() {
                        break Ok(());
                    }
                }
                Err(err) => break Err(err),
            }
        };

        cancel.cancel();
        drop(queue);
        worker.await.map_err(|err| {
            EmoPlatformError::WebhookCallback(format!("webhook worker panicked: {err}"))
        })?;
        info!("Message polling stopped");
        outcome
    }
}

fn message_body(room_id: &str, message: EmoMessageInfo) -> WebhookBody {
    WebhookBody {
        request_id: message.unique_id.clone(),
        uuid: room_id.to_string(),
        serial_number: String::new(),
        nickname: String::new(),
        timestamp: chrono::Utc::now().timestamp(),
        event: MESSAGE_RECEIVED_EVENT.to_string(),
        data: json!({ "message": message }),
        receiver: room_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use emo_domain::RequestInfo;
    use parking_lot::Mutex;

    use super::*;

    struct ScriptedSource {
        pages: Mutex<HashMap<String, Vec<i64>>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail_room: Option<(String, EmoPlatformError)>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fail_room: None,
            }
        }

        fn set(&self, room: &str, sequences: &[i64]) {
            self.pages.lock().insert(room.to_string(), sequences.to_vec());
        }
    }

    fn message(sequence: i64) -> serde_json::Value {
        json!({
            "sequence": sequence,
            "unique_id": format!("msg-{sequence}"),
            "user": {"uuid": "u", "user_type": "normal", "nickname": "n", "profile_image": ""},
            "message": {"ja": "hi"},
            "media": "text",
            "lang": "ja"
        })
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        async fn latest_messages(&self, room_id: &str) -> Result<EmoMsgsInfo> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some((room, err)) = &self.fail_room {
                if room == room_id {
                    return Err(err.clone());
                }
            }
            let sequences = self.pages.lock().get(room_id).cloned().unwrap_or_default();
            let messages: Vec<_> = sequences.into_iter().map(message).collect();
            Ok(serde_json::from_value(json!({ "messages": messages })).unwrap())
        }
    }

    fn poller(source: &Arc<ScriptedSource>, rooms: &[&str]) -> MessagePoller {
        let source: Arc<dyn MessageSource> = Arc::clone(source) as Arc<dyn MessageSource>;
        MessagePoller::new(
            source,
            rooms.iter().map(|r| (*r).to_string()).collect(),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn first_poll_records_baseline_only() {
        let source = Arc::new(ScriptedSource::new());
        source.set("room-1", &[1, 2]);
        let mut poller = poller(&source, &["room-1"]);

        assert!(poller.poll_once().await.unwrap().is_empty());

        source.set("room-1", &[4, 3, 2]);
        let bodies = poller.poll_once().await.unwrap();
        let ids: Vec<_> = bodies.iter().map(|b| b.request_id.as_str()).collect();
        assert_eq!(ids, vec!["msg-3", "msg-4"]);
        assert!(bodies.iter().all(|b| b.event == MESSAGE_RECEIVED_EVENT && b.uuid == "room-1"));
        assert_eq!(bodies[0].data["message"]["sequence"], 3);

        assert!(poller.poll_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn first_message_in_an_empty_room_is_dispatched() {
        let source = Arc::new(ScriptedSource::new());
        let mut poller = poller(&source, &["room-1"]);

        assert!(poller.poll_once().await.unwrap().is_empty());

        source.set("room-1", &[1]);
        let bodies = poller.poll_once().await.unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].request_id, "msg-1");

        assert!(poller.poll_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn at_most_two_rooms_are_fetched_concurrently() {
        let source = Arc::new(ScriptedSource::new());
        let rooms = ["a", "b", "c", "d", "e"];
        let mut poller = poller(&source, &rooms);

        poller.poll_once().await.unwrap();
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), MAX_CONCURRENT_POLL_REQUESTS);
    }

    #[tokio::test]
    async fn unauthorized_room_ends_polling() {
        let mut source = ScriptedSource::new();
        source.fail_room = Some((
            "room-1".to_string(),
            EmoPlatformError::from_status(401, "expired", RequestInfo::new("GET", "/v1/rooms")),
        ));
        let source = Arc::new(source);
        let mut poller = poller(&source, &["room-1"]);

        let err = poller.poll_once().await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn transient_failures_are_skipped() {
        let mut source = ScriptedSource::new();
        source.fail_room = Some(("room-1".to_string(), EmoPlatformError::Network("reset".into())));
        let source = Arc::new(source);
        source.set("room-2", &[7]);
        let mut poller = poller(&source, &["room-1", "room-2"]);

        assert!(poller.poll_once().await.unwrap().is_empty());
        source.set("room-2", &[7, 8]);
        assert_eq!(poller.poll_once().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_dispatches_new_messages_until_cancelled() {
        let source = Arc::new(ScriptedSource::new());
        source.set("room-1", &[1]);
        let poller = poller(&source, &["room-1"]);

        let dispatcher = Arc::new(WebhookDispatcher::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.register(
            MESSAGE_RECEIVED_EVENT,
            &[],
            crate::webhook::async_handler(move |body: WebhookBody| {
                let sink = Arc::clone(&sink);
                async move { sink.lock().push(body.request_id) }
            }),
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poller.run(dispatcher, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(60)).await;
        source.set("room-1", &[1, 2]);
        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        task.await.unwrap().unwrap();

        assert_eq!(*seen.lock(), vec!["msg-2".to_string()]);
    }
}
