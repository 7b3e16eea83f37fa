//! End-to-end tests for the authenticate-then-iterate flow

use pbx2fa::cmd::update::{UpdateArgs, execute, run};
use pbx2fa::config::{Config, ConfigLoader};
use pbx2fa::error::{EXIT_AUTH, EXIT_CONFIG, Pbx2faError};
use std::fs;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, user_ids: Vec<u32>) -> Config {
    Config {
        base_address: server.uri(),
        client_id: "bulk-2fa".into(),
        client_secret: "s3cret".into(),
        require_2fa: true,
        user_ids,
    }
}

async fn mount_token(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Auth failure: no PATCH is ever sent
#[tokio::test]
async fn test_unauthorized_sends_no_updates() {
    let server = MockServer::start().await;
    mount_token(&server, 401, serde_json::json!({ "error": "invalid_client" })).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = execute(&config_for(&server, vec![5, 12, 300]))
        .await
        .unwrap_err();
    assert!(matches!(err, Pbx2faError::AuthError { status: 401, .. }));
    assert_eq!(err.exit_code(), EXIT_AUTH);
}

/// Every PATCH carries the token from the exchange
#[tokio::test]
async fn test_bearer_token_used_for_every_user() {
    let server = MockServer::start().await;
    mount_token(&server, 200, serde_json::json!({ "access_token": "abc123" })).await;

    for id in [5, 12, 300] {
        Mock::given(method("PATCH"))
            .and(path(format!("/xapi/v1/Users({id})")))
            .and(header("authorization", "Bearer abc123"))
            .and(body_json(serde_json::json!({ "Id": id, "Require2FA": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    execute(&config_for(&server, vec![5, 12, 300])).await.unwrap();
}

/// A 500 for the second user does not stop the third
#[tokio::test]
async fn test_failure_does_not_stop_the_loop() {
    let server = MockServer::start().await;
    mount_token(&server, 200, serde_json::json!({ "access_token": "abc123" })).await;

    Mock::given(method("PATCH"))
        .and(path("/xapi/v1/Users(1)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/xapi/v1/Users(2)"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/xapi/v1/Users(3)"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    execute(&config_for(&server, vec![1, 2, 3])).await.unwrap();
}

/// Users are updated in configured order
#[tokio::test]
async fn test_updates_follow_configured_order() {
    let server = MockServer::start().await;
    mount_token(&server, 200, serde_json::json!({ "access_token": "abc123" })).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    execute(&config_for(&server, vec![300, 5, 12])).await.unwrap();

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/xapi/v1/Users(300)",
            "/xapi/v1/Users(5)",
            "/xapi/v1/Users(12)"
        ]
    );
}

fn write_settings(dir: &tempfile::TempDir, fqdn: &str, flag: &str, users: &str) -> std::path::PathBuf {
    let file = dir.path().join("appsettings.json");
    let json = serde_json::json!({
        "3CXSettings": {
            "FQDN_3CX": fqdn,
            "ApiClientID_3CX": "bulk-2fa",
            "ApiToken_3CX": "s3cret",
            "Enable2FA3CX": flag,
            "UsersToChange": users
        }
    });
    fs::write(&file, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    file
}

/// Invalid flag: fails with exit code 1 before any HTTP call
#[tokio::test]
async fn test_invalid_flag_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_settings(&dir, &server.uri(), "yes", "5,12");

    let err = run(UpdateArgs { config: Some(file) }).await.unwrap_err();
    assert!(matches!(err, Pbx2faError::InvalidTwoFactorFlag(_)));
    assert_eq!(err.exit_code(), EXIT_CONFIG);
}

/// Bad id list: fails with exit code 1 before any HTTP call
#[tokio::test]
async fn test_invalid_user_id_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_settings(&dir, &server.uri(), "TRUE", "5,x,12");

    let err = run(UpdateArgs { config: Some(file) }).await.unwrap_err();
    assert!(matches!(err, Pbx2faError::InvalidUserId(ref t) if t == "x"));
    assert_eq!(err.exit_code(), EXIT_CONFIG);
}

/// Full run from a settings file
#[tokio::test]
async fn test_run_from_settings_file() {
    let server = MockServer::start().await;
    mount_token(&server, 200, serde_json::json!({ "access_token": "abc123" })).await;
    Mock::given(method("PATCH"))
        .and(body_json(serde_json::json!({ "Id": 7, "Require2FA": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_settings(&dir, &server.uri(), "False", "7");

    run(UpdateArgs { config: Some(file) }).await.unwrap();
}

#[test]
fn test_loader_missing_explicit_path() {
    let loader = ConfigLoader::new(Some("does/not/exist.json".into()));
    let err = loader.load().unwrap_err();
    assert!(matches!(err, Pbx2faError::ConfigError(_)));
}

#[test]
fn test_loader_search_order() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("appsettings.json");
    let toml_path = dir.path().join("config.toml");
    fs::write(
        &toml_path,
        r#"
[3CXSettings]
FQDN_3CX = "https://pbx.example.com/"
ApiClientID_3CX = "bulk-2fa"
ApiToken_3CX = "s3cret"
Enable2FA3CX = "true"
UsersToChange = "5,12,300"
"#,
    )
    .unwrap();

    let loader = ConfigLoader::new(None).with_search_paths(vec![missing, toml_path.clone()]);
    assert_eq!(loader.resolve_path().unwrap(), toml_path);

    let config = loader.load().unwrap();
    assert_eq!(config.base_address, "https://pbx.example.com");
    assert_eq!(config.user_ids, vec![5, 12, 300]);
}

#[test]
fn test_loader_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ConfigLoader::new(None).with_search_paths(vec![dir.path().join("none.json")]);
    let err = loader.resolve_path().unwrap_err();
    assert!(err.to_string().contains("none.json"));
}
