#![allow(clippy::unwrap_used)]
// Integration tests for multistream orchestration using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restreamer_api::{
    ClientConfig, Connection, Destination, Error, HttpTransport, Multistream, Orientation,
    Platform, RestreamerClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestreamerClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token",
            "refresh_token": "refresh",
            "expires_at": 4_102_444_800_i64,
        })))
        .mount(&server)
        .await;

    let connection = Connection::from_url(&server.uri())
        .unwrap()
        .with_credentials("admin", SecretString::from("testpass"));
    let base = url::Url::parse(&format!("{}/", server.uri())).unwrap();
    let transport =
        HttpTransport::with_client(reqwest::Client::new(), base, Duration::from_secs(5));
    let config = ClientConfig {
        login_backoff: Duration::ZERO,
        ..ClientConfig::default()
    };
    let client = RestreamerClient::from_parts(connection, transport, &config);
    (server, client)
}

async fn mount_process_list(server: &MockServer, state: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "other", "reference": "manual", "state": "running" },
            { "id": "p1", "reference": "show", "state": state },
        ])))
        .mount(server)
        .await;
}

fn two_destinations() -> Multistream {
    let mut set = Multistream::with_reference("show");
    set.source_orientation = Orientation::Horizontal;
    set.add_destination(Destination::new(Platform::Twitch, "tw", Orientation::Horizontal).unwrap());
    set.add_destination(Destination::new(Platform::TikTok, "tt", Orientation::Vertical).unwrap());
    set
}

// ── Start / stop ────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_creates_one_process_for_enabled_destinations() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut set = Multistream::new();
    set.add_destination(Destination::new(Platform::YouTube, "yt", Orientation::Auto).unwrap());
    let muted = set.add_destination(
        Destination::custom("rtmp://relay.local/live", "r", Orientation::Auto).unwrap(),
    );
    set.destinations[muted].enabled = false;

    set.start(&mut client, "rtmp://localhost/live/obs").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.url.path() == "/api/v3/process")
        .unwrap();
    let body: Value = serde_json::from_slice(&create.body).unwrap();
    let text = body.to_string();
    assert!(text.contains("rtmp://a.rtmp.youtube.com/live2/yt"));
    assert!(!text.contains("relay.local"));
    assert_eq!(body["reference"], json!(set.reference().unwrap()));
}

#[tokio::test]
async fn test_start_without_destinations_sends_nothing() {
    let (server, mut client) = setup().await;

    let mut set = Multistream::new();
    let err = set.start(&mut client, "rtmp://in").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(client.last_error().contains("no destinations"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_finds_the_process_by_reference() {
    let (server, mut client) = setup().await;
    mount_process_list(&server, "running").await;

    Mock::given(method("POST"))
        .and(path("/api/v3/process/p1/command"))
        .and(body_json(json!({ "command": "stop" })))
        .respond_with(ResponseTemplate::new(200).set_body_json("OK"))
        .expect(1)
        .mount(&server)
        .await;

    two_destinations().stop(&mut client).await.unwrap();
}

#[tokio::test]
async fn test_stop_unknown_reference_is_not_found() {
    let (server, mut client) = setup().await;
    mount_process_list(&server, "running").await;

    let err = Multistream::with_reference("gone")
        .stop(&mut client)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stop_before_start_is_invalid() {
    let (_server, mut client) = setup().await;
    let err = Multistream::new().stop(&mut client).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn test_is_active_reads_process_state() {
    let (server, mut client) = setup().await;
    mount_process_list(&server, "finished").await;

    assert!(!two_destinations().is_active(&mut client).await.unwrap());
    assert!(!Multistream::with_reference("gone").is_active(&mut client).await.unwrap());
    assert!(!Multistream::new().is_active(&mut client).await.unwrap());
}

// ── Live destinations ───────────────────────────────────────────────

#[tokio::test]
async fn test_live_add_reframes_for_the_destination() {
    let (server, mut client) = setup().await;
    mount_process_list(&server, "running").await;

    Mock::given(method("POST"))
        .and(path("/api/v3/process/p1/outputs"))
        .and(body_json(json!({
            "id": "tiktok_1",
            "url": "rtmp://live.tiktok.com/live/tt",
            "video_filter": "crop=ih*9/16:ih,scale=1080:1920",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let mut set = two_destinations();
    set.destinations[1].enabled = false;
    set.set_destination_enabled_live(&mut client, 1, true).await.unwrap();
    assert!(set.destinations[1].enabled);

    // Already enabled: nothing more is sent.
    set.set_destination_enabled_live(&mut client, 1, true).await.unwrap();
}

#[tokio::test]
async fn test_live_remove_and_update() {
    let (server, mut client) = setup().await;
    mount_process_list(&server, "running").await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/process/p1/outputs/twitch_0"))
        .respond_with(ResponseTemplate::new(200).set_body_json("OK"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v3/process/p1/outputs/twitch_0"))
        .and(body_json(json!({ "url": "rtmp://live.twitch.tv/app/new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let mut set = two_destinations();
    set.update_destination_live(&mut client, 0, "new").await.unwrap();
    assert_eq!(set.destinations[0].publish_url(), "rtmp://live.twitch.tv/app/new");

    set.set_destination_enabled_live(&mut client, 0, false).await.unwrap();
    assert!(!set.destinations[0].enabled);
}

#[tokio::test]
async fn test_live_ops_reject_unknown_index() {
    let (server, mut client) = setup().await;

    let mut set = two_destinations();
    let err = set.add_destination_live(&mut client, 5).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(client.last_error().contains("index 5"));
    assert!(set.update_destination_live(&mut client, 9, "k").await.is_err());
    assert!(server.received_requests().await.unwrap().is_empty());
}
