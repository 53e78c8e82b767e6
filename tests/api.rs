//! Management API over a real socket.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use endpoint_watch::api::{self, AppState};
use endpoint_watch::lifecycle::Shutdown;
use endpoint_watch::registry::JsonFileStore;
use endpoint_watch::MonitorService;

mod common;
use common::{service_with, website, ProbeMode, ScriptedProber};

const KEY: &str = "test-key";

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    async fn start(service: Arc<MonitorService>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let stop = shutdown.notified();
        tokio::spawn(api::serve(listener, AppState::new(service, KEY), Duration::from_secs(5), stop));

        Self {
            addr,
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            shutdown,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(KEY)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(KEY)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[tokio::test]
async fn test_requests_without_key_are_rejected() {
    let (service, _, _) = service_with(vec![], ProbeMode::Online, Duration::from_secs(1));
    let server = TestServer::start(service).await;

    let res = server.client.get(server.url("/api/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.get(server.url("/api/status")).bearer_auth("wrong").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/api/status").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["polling"], false);
}

#[tokio::test]
async fn test_connection_crud() {
    let (service, store, _) = service_with(vec![], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;
    let server = TestServer::start(service).await;

    let res = server
        .post("/api/connections")
        .json(&json!({
            "name": "Grafana",
            "config": { "type": "website", "url": "https://grafana.lan", "checkPath": "/api/health" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["order"], 0);

    let res = server
        .client
        .put(server.url(&format!("/api/connections/{}", id)))
        .bearer_auth(KEY)
        .json(&json!({
            "name": "Grafana (prod)",
            "config": { "type": "website", "url": "https://grafana.lan" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let listed: Value = server.get("/api/connections").send().await.unwrap().json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Grafana (prod)");

    let res = server
        .client
        .delete(server.url(&format!("/api/connections/{}", id)))
        .bearer_auth(KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(store.records().is_empty());

    let res = server
        .client
        .delete(server.url(&format!("/api/connections/{}", id)))
        .bearer_auth(KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_returns_stored_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("connections.json")));
    let service = Arc::new(MonitorService::new(store, ScriptedProber::new(ProbeMode::Online), Duration::from_secs(1)));
    service.load().await;
    let server = TestServer::start(service).await;

    let created: Value = server
        .post("/api/connections")
        .json(&json!({ "name": "Wiki", "config": { "type": "website", "url": "https://wiki.lan" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let res = server
        .client
        .put(server.url(&format!("/api/connections/{}", id)))
        .bearer_auth(KEY)
        .json(&json!({ "name": "Wiki (new)", "config": { "type": "website", "url": "https://wiki.lan" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();

    let listed: Value = server.get("/api/connections").send().await.unwrap().json().await.unwrap();
    assert_ne!(created["updatedAt"], Value::Null);
    assert_eq!(updated["updatedAt"], listed[0]["updatedAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_invalid_payloads() {
    let (service, store, _) = service_with(vec![], ProbeMode::Online, Duration::from_secs(1));
    let server = TestServer::start(service).await;

    let res = server
        .post("/api/connections")
        .json(&json!({
            "name": " ",
            "config": { "type": "ssh", "host": "", "port": 22, "username": "root", "macAddress": "nope" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"].as_array().unwrap().len(), 3);
    assert!(store.records().is_empty());

    let res = server.get("/api/health/not-a-uuid").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn test_reorder_and_failure() {
    let a = website("a", "https://a.example", 0);
    let b = website("b", "https://b.example", 1);
    let (service, store, _) = service_with(vec![a.clone(), b.clone()], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;
    let server = TestServer::start(service).await;

    let res = server
        .post("/api/connections/reorder")
        .json(&json!({ "ids": [b.id, a.id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ordered: Value = res.json().await.unwrap();
    assert_eq!(ordered[0]["name"], "b");
    assert_eq!(ordered[1]["name"], "a");

    store.fail(true);
    let res = server
        .post("/api/connections/reorder")
        .json(&json!({ "ids": [a.id, b.id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_health_endpoints() {
    let x = website("x", "https://x.example", 0);
    let (service, _, prober) = service_with(vec![x.clone()], ProbeMode::TransportError, Duration::from_secs(1));
    service.load().await;
    let server = TestServer::start(service).await;

    let res = server.get(&format!("/api/health/{}", x.id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.post(&format!("/api/health/{}/check", x.id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let result: Value = res.json().await.unwrap();
    assert_eq!(result["status"], "unknown");
    assert_eq!(result["connectionId"], x.id.to_string());

    prober.set_mode(ProbeMode::Online);
    let all: Value = server.post("/api/health/check").send().await.unwrap().json().await.unwrap();
    assert_eq!(all[0]["status"], "online");

    let snapshot: Value = server.get("/api/health").send().await.unwrap().json().await.unwrap();
    assert_eq!(snapshot[x.id.to_string()]["status"], "online");
}

#[tokio::test]
async fn test_wake_rejects_website() {
    let x = website("x", "https://x.example", 0);
    let (service, _, _) = service_with(vec![x.clone()], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;
    let server = TestServer::start(service).await;

    let res = server.post(&format!("/api/connections/{}/wake", x.id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
