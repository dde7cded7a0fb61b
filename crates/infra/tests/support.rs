#![allow(dead_code)]

use emo_domain::{Plan, Tokens};
use emo_infra::ClientBuilder;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

/// Mock platform plus a private token directory.
pub struct TestPlatform {
    pub server: MockServer,
    pub token_dir: TempDir,
}

impl TestPlatform {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            token_dir: TempDir::new().expect("temp dir should be created"),
        }
    }

    /// Builder pointed at the mock server with explicit credentials and no
    /// environment lookup.
    pub fn builder(&self, plan: Plan) -> ClientBuilder {
        let builder = ClientBuilder::new()
            .endpoint_url(self.server.uri())
            .token_dir(self.token_dir.path())
            .plan(plan)
            .tokens(Tokens::new(Some("stale-access".to_string()), Some("initial-refresh".to_string())))
            .env_tokens(Tokens::default());
        if plan.is_business() {
            builder.api_key("channel-key")
        } else {
            builder
        }
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }
}

pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh })
}

pub fn account_body() -> Value {
    json!({
        "name": "emo user",
        "email": "user@example.com",
        "profile_image": "",
        "uuid": "user-1",
        "plan": "personal"
    })
}

pub fn rooms_body(ids: &[&str]) -> Value {
    let rooms: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "uuid": id,
                "name": format!("room {id}"),
                "room_type": "normal",
                "room_members": []
            })
        })
        .collect();
    json!({ "listing": { "offset": 0, "limit": 50, "total": ids.len() }, "rooms": rooms })
}

pub fn message_body(sequence: i64) -> Value {
    json!({
        "sequence": sequence,
        "unique_id": format!("msg-{sequence}"),
        "user": { "uuid": "user-1", "user_type": "normal", "nickname": "n", "profile_image": "" },
        "message": { "ja": "こんにちは" },
        "media": "text",
        "audio_url": null,
        "image_url": null,
        "lang": "ja"
    })
}

pub fn webhook_setting_body(secret: &str, events: &[&str]) -> Value {
    json!({
        "description": "test hook",
        "events": events,
        "status": "active",
        "secret": secret,
        "url": "https://example.com/hook"
    })
}

pub fn delivery_body(request_id: &str, room: &str, event: &str) -> Value {
    json!({
        "request_id": request_id,
        "uuid": room,
        "serial_number": "SN-1",
        "nickname": "emo",
        "timestamp": 1_700_000_000,
        "event": event,
        "data": { "message": message_body(1) },
        "receiver": room
    })
}

/// Reserve a free local port for listeners whose address is not reported
/// back to the caller.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("free port should be available")
}
