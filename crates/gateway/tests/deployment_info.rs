//! Integration tests for the synchronous deployment-info query.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;

use {serde_json::Value, tokio::net::TcpListener};

use {
    gantry_config::{EnvironmentUrls, GantryConfig},
    gantry_gateway::{build_app, build_state},
};

async fn serve(config: GantryConfig) -> SocketAddr {
    let state = build_state(config).unwrap();
    let app = build_app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn serve_with_environment(name: &str, urls: EnvironmentUrls) -> SocketAddr {
    let mut config = GantryConfig::default();
    config.environments.insert(name.to_string(), urls);
    serve(config).await
}

async fn query(addr: SocketAddr, text: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/deployment-info"))
        .form(&[("command", "/deployment-info"), ("text", text)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn returns_exactly_connect_and_tpx() {
    let mut status = mockito::Server::new_async().await;
    let connect = status
        .mock("GET", "/connect/deployment_info.json")
        .with_header("content-type", "application/json")
        .with_body(r#"{"version": "2.4.0"}"#)
        .expect(1)
        .create_async()
        .await;
    let tpx = status
        .mock("GET", "/tpx/deployment_info.json")
        .with_header("content-type", "application/json")
        .with_body(r#"{"version": "7.1.9"}"#)
        .expect(1)
        .create_async()
        .await;

    let addr = serve_with_environment("blackops", EnvironmentUrls {
        connect: format!("{}/connect/deployment_info.json", status.url()),
        tpx: format!("{}/tpx/deployment_info.json", status.url()),
    })
    .await;

    // Environment name is the first token, case-insensitively; the rest
    // of the text is ignored.
    let resp = query(addr, "Blackops extra-ignored-tokens").await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    let keys = body.as_object().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(body["connect"]["version"], "2.4.0");
    assert_eq!(body["tpx"]["version"], "7.1.9");

    // One GET per service, no more.
    connect.assert_async().await;
    tpx.assert_async().await;
}

#[tokio::test]
async fn unknown_environment_is_a_validation_error() {
    let addr = serve(GantryConfig::default()).await;

    let resp = query(addr, "nonexistent").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("unknown environment"));
}

#[tokio::test]
async fn blank_text_is_a_validation_error() {
    let addr = serve(GantryConfig::default()).await;

    let resp = query(addr, "   ").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("missing environment"));
}

#[tokio::test]
async fn missing_text_field_is_a_validation_error() {
    let addr = serve(GantryConfig::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/deployment-info"))
        .form(&[("command", "/deployment-info")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("`text`"));
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let mut status = mockito::Server::new_async().await;
    status
        .mock("GET", "/connect/deployment_info.json")
        .with_status(500)
        .create_async()
        .await;

    let addr = serve_with_environment("blackops", EnvironmentUrls {
        connect: format!("{}/connect/deployment_info.json", status.url()),
        tpx: format!("{}/tpx/deployment_info.json", status.url()),
    })
    .await;

    let resp = query(addr, "blackops").await;
    assert_eq!(resp.status().as_u16(), 502);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("connect"));
}
