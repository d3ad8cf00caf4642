use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use tokengate_api::{ApiRouter, ApiState};
use tokengate_auth::testutil::CountingBackend;
use tokengate_auth::{AuthGate, MemoryBackend};
use tokengate_core::{GateConfig, KvBackend};

pub const TEST_ORIGIN: &str = "http://localhost";

pub struct TestServer {
    pub addr: SocketAddr,
    pub gate: Arc<AuthGate>,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_config(GateConfig::default().with_ttl_seconds(300)).await
    }

    pub async fn with_config(config: GateConfig) -> Self {
        Self::with_backend(config, Arc::new(MemoryBackend::new())).await
    }

    pub async fn with_backend(config: GateConfig, backend: Arc<dyn KvBackend>) -> Self {
        let gate = Arc::new(AuthGate::new(config, backend).expect("auth gate"));
        let state = Arc::new(ApiState::new(gate.clone()));

        let router = ApiRouter::new(state)
            .with_cors_origin(TEST_ORIGIN)
            .build();

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });

        TestServer {
            addr,
            gate,
            _handle: handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, authorization: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().get(self.url(path));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        request.send().await.expect("request")
    }

    pub async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .expect("request")
    }

    pub async fn post(&self, path: &str, authorization: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().post(self.url(path));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        request.send().await.expect("request")
    }

    /// Signs in with `claims` and returns the issued token.
    pub async fn signin(&self, claims: Value, ttl_seconds: Option<u64>) -> String {
        let resp = self
            .post_json(
                "/v1/signin",
                &json!({ "claims": claims, "ttl_seconds": ttl_seconds }),
            )
            .await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.expect("json");
        body["token"].as_str().expect("token").to_string()
    }
}

/// Test server whose backend counts round trips.
pub async fn counting_server(
    config: GateConfig,
) -> (TestServer, Arc<CountingBackend<MemoryBackend>>) {
    let backend = Arc::new(CountingBackend::new(MemoryBackend::new()));
    let server = TestServer::with_backend(config, backend.clone()).await;
    (server, backend)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
