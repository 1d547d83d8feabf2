//! Remote fetch against a mocked Discord REST API.

use perch_core::{Platform, PlatformError, PlatformStatus};
use perch_discord::{DiscordConfig, DiscordPlatform};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ID: &str = "123456789012345678";

async fn platform_for(server: &MockServer) -> DiscordPlatform {
    let config = DiscordConfig::new("test-token")
        .with_api_base(server.uri())
        .with_cdn_base("https://cdn.test");
    let platform = DiscordPlatform::new(config);
    platform.initialize().await.expect("initialize");
    platform
}

#[tokio::test]
async fn test_remote_fetch_maps_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{ID}")))
        .and(header("authorization", "Bot test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": ID,
            "username": "ada",
            "global_name": "Ada Lovelace",
            "avatar": "a_deadbeef",
            "discriminator": "0",
            "bot": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = platform_for(&server).await;
    let user = platform.remote_fetch(ID).await.unwrap();

    assert_eq!(user.id, ID);
    assert_eq!(user.username, "ada");
    assert_eq!(user.display_name, "Ada Lovelace");
    assert_eq!(user.avatar, format!("https://cdn.test/avatars/{ID}/a_deadbeef.gif"));
    assert!(!user.bot);
    assert_eq!(user.status, PlatformStatus::Offline);
    assert!(user.extra_data.is_empty());
}

#[tokio::test]
async fn test_remote_fetch_without_global_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": ID,
            "username": "helper",
            "global_name": null,
            "avatar": null,
            "discriminator": "4242",
            "bot": true
        })))
        .mount(&server)
        .await;

    let platform = platform_for(&server).await;
    let user = platform.remote_fetch(ID).await.unwrap();

    assert_eq!(user.display_name, "");
    assert!(user.bot);
    assert_eq!(user.avatar, "https://cdn.test/embed/avatars/2.png");
}

#[tokio::test]
async fn test_remote_fetch_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message": "Unknown User"}"#))
        .mount(&server)
        .await;

    let platform = platform_for(&server).await;
    let err = platform.remote_fetch(ID).await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_remote_fetch_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{ID}")))
        .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
        .mount(&server)
        .await;

    let platform = platform_for(&server).await;
    let err = platform.remote_fetch(ID).await.unwrap_err();

    match err {
        PlatformError::Http { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("Unauthorized"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_remote_fetch_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let platform = platform_for(&server).await;
    let err = platform.remote_fetch(ID).await.unwrap_err();

    assert!(matches!(err, PlatformError::Decode(_)));
}
