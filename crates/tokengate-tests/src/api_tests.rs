use serde_json::json;
use std::time::Duration;
use tokengate_core::GateConfig;

use crate::helpers::{bearer, counting_server, TestServer, TEST_ORIGIN};

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let resp = server.get("/health", None).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_signin_protected_signout() {
    let server = TestServer::with_config(
        GateConfig::default()
            .with_token_length(32)
            .with_ttl_seconds(300),
    )
    .await;

    let token = server
        .signin(json!({"id": 1, "firstname": "John", "lastname": "Doe"}), None)
        .await;
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));

    let header = bearer(&token);
    let resp = server.get("/v1/protected", Some(&header)).await;
    assert_eq!(resp.status(), 200);
    let user: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(user["id"], 1);
    assert_eq!(user["firstname"], "John");
    assert_eq!(user["lastname"], "Doe");
    assert!(user["_ts"].is_string());
    assert_eq!(user.as_object().expect("object").len(), 4);

    let resp = server.post("/v1/signout", Some(&header)).await;
    assert_eq!(resp.status(), 204);

    let resp = server.get("/v1/protected", Some(&header)).await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_short_token_rejected_without_backend_call() {
    let (server, backend) = counting_server(GateConfig::default()).await;

    let resp = server.get("/v1/protected", Some("Bearer abc")).await;
    assert_eq!(resp.status(), 401);

    let resp = server.get("/v1/protected", None).await;
    assert_eq!(resp.status(), 401);

    let resp = server.post("/v1/signout", Some("Bearer abc")).await;
    assert_eq!(resp.status(), 401);

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_rejections_look_identical() {
    let server = TestServer::new().await;
    let unknown = bearer(&"f".repeat(64));

    let mut bodies = Vec::new();
    for header in [None, Some("Bearer abc"), Some(unknown.as_str())] {
        let resp = server.get("/v1/protected", header).await;
        assert_eq!(resp.status(), 401);
        bodies.push(resp.text().await.expect("body"));
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let server = TestServer::new().await;
    let token = server.signin(json!({"id": 1}), Some(1)).await;
    let header = bearer(&token);

    assert_eq!(server.get("/v1/protected", Some(&header)).await.status(), 200);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(server.get("/v1/protected", Some(&header)).await.status(), 401);

    let resp = server.post("/v1/signout", Some(&header)).await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_signin_validation() {
    let server = TestServer::new().await;

    for claims in [json!(null), json!(""), json!(7), json!(["id"])] {
        let resp = server
            .post_json("/v1/signin", &json!({ "claims": claims }))
            .await;
        assert_eq!(resp.status(), 400);
    }

    let resp = server.post_json("/v1/signin", &json!({})).await;
    assert_eq!(resp.status(), 400);

    let resp = server
        .post_json("/v1/signin", &json!({ "claims": {}, "ttl_seconds": 0 }))
        .await;
    assert_eq!(resp.status(), 400);

    let token = server.signin(json!({}), None).await;
    assert_eq!(token.len(), 64);
}

#[tokio::test]
async fn test_signin_with_huge_ttl() {
    let server = TestServer::new().await;
    let token = server.signin(json!({"id": 3}), Some(u64::MAX)).await;

    let resp = server.get("/v1/protected", Some(&bearer(&token))).await;
    assert_eq!(resp.status(), 200);
    let user: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(user["id"], 3);
}

#[tokio::test]
async fn test_signout_twice() {
    let server = TestServer::new().await;
    let token = server.signin(json!({"id": 1}), None).await;
    let header = bearer(&token);

    assert_eq!(server.post("/v1/signout", Some(&header)).await.status(), 204);
    assert_eq!(server.post("/v1/signout", Some(&header)).await.status(), 401);
}

#[tokio::test]
async fn test_issued_by_gate_accepted_over_http() {
    let server = TestServer::new().await;
    let token = server
        .gate
        .issue_token(json!({"role": "admin"}), None)
        .await
        .expect("issue");

    let resp = server.get("/v1/protected", Some(&bearer(token.as_str()))).await;
    assert_eq!(resp.status(), 200);
    let user: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(user["role"], "admin");
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = TestServer::new().await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, server.url("/v1/signin"))
        .header("Origin", TEST_ORIGIN)
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("request");

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        TEST_ORIGIN
    );
    assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
}
