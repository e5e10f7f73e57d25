#![allow(clippy::unwrap_used)]
// Integration tests for login, refresh and the 401 retry path, using wiremock.

use std::time::Duration;

use chrono::Datelike;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restreamer_api::{
    ClientConfig, Connection, Error, HttpTransport, RestreamerClient, SessionState,
};

/// 2100-01-01T00:00:00Z
const FAR_FUTURE: i64 = 4_102_444_800;

// ── Helpers ─────────────────────────────────────────────────────────

fn client_for(server: &MockServer, connection: Connection, config: &ClientConfig) -> RestreamerClient {
    let base = url::Url::parse(&format!("{}/", server.uri())).unwrap();
    let transport =
        HttpTransport::with_client(reqwest::Client::new(), base, Duration::from_secs(5));
    RestreamerClient::from_parts(connection, transport, config)
}

fn credentials(server: &MockServer) -> Connection {
    Connection::from_url(&server.uri())
        .unwrap()
        .with_credentials("admin", SecretString::from("testpass"))
}

fn no_backoff() -> ClientConfig {
    ClientConfig {
        login_backoff: Duration::ZERO,
        ..ClientConfig::default()
    }
}

async fn setup() -> (MockServer, RestreamerClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, credentials(&server), &no_backoff());
    (server, client)
}

fn tokens(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": FAR_FUTURE,
    })
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": "testpass" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    assert_eq!(client.session_state(), SessionState::Unauthenticated);
    assert!(!client.is_authenticated());

    client.login().await.unwrap();

    assert!(client.is_authenticated());
    assert!(client.is_connected());
    assert_eq!(client.session_state(), SessionState::Authenticated);
    assert_eq!(client.token_expires_at().unwrap().year(), 2100);
    assert_eq!(client.last_error(), "");
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(client.last_error().contains("login failed"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_without_access_token() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "refresh_token": "r" })))
        .mount(&server)
        .await;

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse(_)));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let server = MockServer::start().await;
    mount_login(&server, 0).await;

    let connection = Connection::from_url(&server.uri()).unwrap();
    let mut client = client_for(&server, connection, &no_backoff());

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert_eq!(
        client.last_error(),
        "Authentication failed: Username and password required for login"
    );
}

#[tokio::test]
async fn test_failed_login_is_throttled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        login_backoff: Duration::from_secs(60),
        ..ClientConfig::default()
    };
    let mut client = client_for(&server, credentials(&server), &config);

    assert!(matches!(
        client.login().await.unwrap_err(),
        Error::Authentication { .. }
    ));
    assert!(matches!(
        client.login().await.unwrap_err(),
        Error::LoginThrottled { .. }
    ));
}

// ── Bearer token and lazy login ─────────────────────────────────────

#[tokio::test]
async fn test_first_call_logs_in_and_sends_bearer() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    assert!(client.get_processes().await.unwrap().is_empty());
    // The second call reuses the token.
    assert!(client.get_processes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_public_endpoints_skip_login() {
    let (server, mut client) = setup().await;
    mount_login(&server, 0).await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json("pong"))
        .mount(&server)
        .await;

    client.ping().await.unwrap();
    assert!(!client.is_authenticated());
}

// ── Re-authentication ───────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_refreshes_and_retries_once() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .and(header("Authorization", "Bearer refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "p1", "reference": "obs" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let processes = client.get_processes().await.unwrap();
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0].id, "p1");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_failed_refresh_falls_back_to_login() {
    let (server, mut client) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process/p1/state"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process/p1/state"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "order": "start", "running": true })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let state = client.get_process_state("p1").await.unwrap();
    assert!(state.is_running);
    assert_eq!(state.order, "start");
}

#[tokio::test]
async fn test_second_unauthorized_fails() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-2", "refresh-2")))
        .mount(&server)
        .await;

    let err = client.get_processes().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(
        client
            .last_error()
            .contains("request still unauthorized after re-authentication")
    );
}

#[tokio::test]
async fn test_retry_resends_json_body() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v3/process/p1/command"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-2", "refresh-2")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/process/p1/command"))
        .and(header("Authorization", "Bearer access-2"))
        .and(body_json(json!({ "command": "restart" })))
        .respond_with(ResponseTemplate::new(200).set_body_json("OK"))
        .expect(1)
        .mount(&server)
        .await;

    client.restart_process("p1").await.unwrap();
}

// ── Explicit refresh, force login and logout ────────────────────────

#[tokio::test]
async fn test_refresh_without_session_fails() {
    let (_server, mut client) = setup().await;

    let err = client.refresh_token().await.unwrap_err();
    assert!(matches!(err, Error::RefreshFailed { .. }));
    assert!(client.last_error().contains("No refresh token available"));
}

#[tokio::test]
async fn test_explicit_refresh_then_logout() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .and(header("Authorization", "Bearer refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.login().await.unwrap();
    client.refresh_token().await.unwrap();
    assert!(client.is_authenticated());
    assert_eq!(client.session_state(), SessionState::Authenticated);

    client.get_processes().await.unwrap();

    client.logout();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_refresh_without_refresh_token_drops_session() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_at": FAR_FUTURE,
        })))
        .mount(&server)
        .await;

    client.login().await.unwrap();
    assert!(client.is_authenticated());

    let err = client.refresh_token().await.unwrap_err();
    assert!(matches!(err, Error::RefreshFailed { .. }));
    assert!(!client.is_authenticated());
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_failed_login_drops_previous_session() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-1", "refresh-1")))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    client.login().await.unwrap();
    assert!(client.is_authenticated());

    assert!(matches!(
        client.login().await.unwrap_err(),
        Error::Authentication { .. }
    ));
    assert!(!client.is_authenticated());
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_token_near_expiry_is_refreshed_before_the_call() {
    let (server, mut client) = setup().await;

    // Inside the 30 s refresh margin.
    let soon = chrono::Utc::now().timestamp() + 10;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_at": soon,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/refresh"))
        .and(header("Authorization", "Bearer refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.login().await.unwrap();
    assert_eq!(client.session_state(), SessionState::Expired);

    client.get_processes().await.unwrap();
    assert_eq!(client.session_state(), SessionState::Authenticated);

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/api/login", "/api/v3/refresh", "/api/v3/process"]);
}

#[tokio::test]
async fn test_force_login_replaces_token() {
    let (server, mut client) = setup().await;
    mount_login(&server, 2).await;

    client.login().await.unwrap();
    client.force_login().await.unwrap();
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_logout_is_terminal_until_login() {
    let (server, mut client) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.login().await.unwrap();
    client.logout();

    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert!(!client.is_authenticated());

    let err = client.get_processes().await.unwrap_err();
    assert!(matches!(err, Error::LoggedOut));
    assert!(matches!(
        client.refresh_token().await.unwrap_err(),
        Error::LoggedOut
    ));

    client.login().await.unwrap();
    client.get_processes().await.unwrap();
}

#[tokio::test]
async fn test_connection_check_logs_in() {
    let (server, mut client) = setup().await;
    mount_login(&server, 1).await;

    client.test_connection().await.unwrap();
    assert!(client.is_connected());
}
