//! Webhook listener and message poller over real sockets

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use emo_domain::{Plan, WebhookBody, WebhookEventData};
use emo_infra::{async_handler, WebhookDispatcher, WebhookListener};
use serde_json::json;
use support::{delivery_body, free_port, message_body, rooms_body, webhook_setting_body, TestPlatform};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn recording_dispatcher(event: &str) -> (Arc<WebhookDispatcher>, mpsc::UnboundedReceiver<WebhookBody>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Arc::new(WebhookDispatcher::new());
    dispatcher.register(
        event,
        &[],
        async_handler(move |body| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
            }
        }),
    );
    (dispatcher, rx)
}

#[tokio::test]
async fn listener_delivers_in_arrival_order_and_drops_duplicates() {
    let (dispatcher, mut received) = recording_dispatcher("message.received");
    let cancel = CancellationToken::new();
    let listener =
        WebhookListener::start("127.0.0.1", 0, "secret", dispatcher, cancel.clone()).await.unwrap();
    let url = format!("http://{}/", listener.local_addr());
    let http = reqwest::Client::new();

    for id in ["a", "b", "a", "c"] {
        let response = http
            .post(&url)
            .header("x-platform-api-secret", "secret")
            .json(&delivery_body(id, "room-1", "message.received"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let mut order = Vec::new();
    for _ in 0..3 {
        let body = tokio::time::timeout(Duration::from_secs(2), received.recv()).await.unwrap().unwrap();
        order.push(body.request_id.clone());
        assert!(matches!(body.event_data(), WebhookEventData::Message(_)));
    }
    assert_eq!(order, vec!["a", "b", "c"]);

    listener.shutdown().await.unwrap();
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn listener_rejects_unsigned_deliveries() {
    let (dispatcher, mut received) = recording_dispatcher("message.received");
    let listener = WebhookListener::start("127.0.0.1", 0, "secret", dispatcher, CancellationToken::new())
        .await
        .unwrap();
    let url = format!("http://{}/", listener.local_addr());

    let response = reqwest::Client::new()
        .post(&url)
        .header("x-platform-api-secret", "wrong")
        .json(&delivery_body("a", "room-1", "message.received"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    listener.shutdown().await.unwrap();
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn async_client_registers_events_and_stops_on_request() {
    let platform = TestPlatform::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/webhook/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(webhook_setting_body("s3", &["emo_talk.finished", "radar.detected"])),
        )
        .expect(1)
        .mount(&platform.server)
        .await;

    let client = platform.builder(Plan::Personal).build_async().unwrap();
    let (tx, mut received) = mpsc::unbounded_channel();
    for event in ["radar.detected", "emo_talk.finished"] {
        let tx = tx.clone();
        client
            .event(
                event,
                &[],
                async_handler(move |body: WebhookBody| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(body.event);
                    }
                }),
            )
            .await
            .unwrap();
    }

    let port = free_port();
    let server = {
        let client = client.clone();
        tokio::spawn(async move { client.start_webhook_event("127.0.0.1", port).await })
    };

    let http = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/");
    let mut delivered = false;
    for _ in 0..50 {
        let mut body = delivery_body("r-1", "room-1", "radar.detected");
        body["data"] = json!({ "radar": { "begin": true, "end": false, "near_begin": false, "near_end": false } });
        if let Ok(response) =
            http.post(&url).header("x-platform-api-secret", "s3").json(&body).send().await
        {
            assert!(response.status().is_success());
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(delivered, "listener never came up");

    let event = tokio::time::timeout(Duration::from_secs(2), received.recv()).await.unwrap().unwrap();
    assert_eq!(event, "radar.detected");

    assert!(client.stop_webhook_event());
    server.await.unwrap().unwrap();

    let requests = platform.server.received_requests().await.unwrap();
    let registered: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(registered, json!({ "events": ["emo_talk.finished", "radar.detected"] }));
}

#[tokio::test]
async fn polling_dispatches_new_room_messages() {
    let platform = TestPlatform::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rooms_body(&["room-1"])))
        .mount(&platform.server)
        .await;
    // First poll sees the baseline, later polls see one new message.
    Mock::given(method("GET"))
        .and(path("/v1/rooms/room-1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [message_body(1)] })))
        .up_to_n_times(1)
        .mount(&platform.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/rooms/room-1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "messages": [message_body(2), message_body(1)] })),
        )
        .mount(&platform.server)
        .await;

    let client = platform.builder(Plan::Personal).build_async().unwrap();
    let (tx, mut received) = mpsc::unbounded_channel();
    client
        .event(
            "message.received",
            &[],
            async_handler(move |body: WebhookBody| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                }
            }),
        )
        .await
        .unwrap();

    let poller = {
        let client = client.clone();
        tokio::spawn(async move { client.poll_webhook_event(Duration::from_millis(20)).await })
    };

    let body = tokio::time::timeout(Duration::from_secs(2), received.recv()).await.unwrap().unwrap();
    assert_eq!(body.request_id, "msg-2");
    assert_eq!(body.uuid, "room-1");

    assert!(client.stop_webhook_event());
    poller.await.unwrap().unwrap();
    assert!(received.try_recv().is_err());
}
