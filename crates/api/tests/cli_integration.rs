//! `emo` commands run against a mocked platform API

use clap::Parser;
use emo_app::Cli;
use emo_domain::constants::TOKEN_FILE_NAME;
use emo_domain::EmoPlatformError;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    token_dir: TempDir,
    config_dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-access",
                "refresh_token": "next-refresh"
            })))
            .mount(&server)
            .await;

        let config_dir = TempDir::new().unwrap();
        std::fs::write(config_dir.path().join("emo-platform.json"), "{}").unwrap();

        Self { server, token_dir: TempDir::new().unwrap(), config_dir }
    }

    fn cli(&self, args: &[&str]) -> Cli {
        let config = self.config_dir.path().join("emo-platform.json");
        let mut argv = vec![
            "emo".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--endpoint".to_string(),
            self.server.uri(),
            "--token-dir".to_string(),
            self.token_dir.path().display().to_string(),
            "--refresh-token".to_string(),
            "initial-refresh".to_string(),
        ];
        argv.extend(args.iter().map(ToString::to_string));
        Cli::try_parse_from(argv).unwrap()
    }

    /// Serve `route` for the refreshed token only; anything else is 401.
    async fn authorized(&self, verb: &str, route: &str, response: ResponseTemplate) {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("Authorization", "Bearer fresh-access"))
            .respond_with(response)
            .mount(&self.server)
            .await;
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }
}

fn rooms() -> Value {
    json!({
        "listing": { "offset": 0, "limit": 50, "total": 2 },
        "rooms": [
            { "uuid": "room-1", "name": "living", "room_type": "normal", "room_members": [] },
            { "uuid": "room-2", "name": "kitchen", "room_type": "normal", "room_members": [] }
        ]
    })
}

#[tokio::test]
async fn rooms_ids_prints_ids_and_saves_refreshed_tokens() {
    let harness = Harness::start().await;
    harness
        .authorized("GET", "/v1/rooms", ResponseTemplate::new(200).set_body_json(rooms()))
        .await;

    let output = emo_app::run(harness.cli(&["rooms", "ids"])).await.unwrap();
    assert_eq!(output, Some(json!(["room-1", "room-2"])));

    let saved: Value = serde_json::from_slice(
        &std::fs::read(harness.token_dir.path().join(TOKEN_FILE_NAME)).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["refresh_token"], "next-refresh");
}

#[tokio::test]
async fn room_command_defaults_to_the_first_room() {
    let harness = Harness::start().await;
    harness
        .authorized("GET", "/v1/rooms", ResponseTemplate::new(200).set_body_json(rooms()))
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/rooms/room-1/messages/text"))
        .and(body_json(json!({ "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sequence": 7,
            "unique_id": "m-7",
            "user": { "uuid": "u", "user_type": "normal", "nickname": "me" },
            "message": { "ja": "hello" },
            "media": "text",
            "audio_url": null,
            "image_url": null,
            "lang": "ja"
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let output = emo_app::run(harness.cli(&["room", "send-msg", "hello"])).await.unwrap().unwrap();
    assert_eq!(output["unique_id"], "m-7");
}

#[tokio::test]
async fn business_commands_fail_on_a_personal_plan_without_requests() {
    let harness = Harness::start().await;

    let err = emo_app::run(harness.cli(&["broadcast", "list"])).await.unwrap_err();
    let err = err.downcast::<EmoPlatformError>().unwrap();
    assert!(matches!(err, EmoPlatformError::Unavailable { .. }));

    assert!(harness.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn business_plan_without_key_is_a_config_error() {
    let harness = Harness::start().await;

    let err = emo_app::run(harness.cli(&["--plan", "biz_basic", "stamps"])).await.unwrap_err();
    let err = err.downcast::<EmoPlatformError>().unwrap();
    assert!(matches!(err, EmoPlatformError::Config(_)));
}
