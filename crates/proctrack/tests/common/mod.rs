//! Common test utilities.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use proctrack::server::{self, AppState};
use proctrack::store::file::FileDocumentStore;
use proctrack::store::memory::{MemoryLogStore, MemoryProcessStore};

/// Tick interval used by integration tests.
pub const TEST_TICK: Duration = Duration::from_millis(100);

/// A router plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Send a request and return the status and parsed JSON body
    /// (`Null` when the body is not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn create_process(&self) -> String {
        let (status, json) = self
            .send(
                Request::post("/create-process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json["PID"].as_str().unwrap().to_string()
    }

    pub async fn logs_for(&self, id: &str) -> Vec<String> {
        let (status, json) = self.send(id_request("GET", "/get-single", id)).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(json["logs"].clone()).unwrap()
    }
}

/// A request carrying `{"id": ...}` as its JSON body.
pub fn id_request(method: &str, uri: &str, id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "id": id }).to_string()))
        .unwrap()
}

/// Create a test app backed by a file store in a temporary directory.
pub async fn test_app() -> TestApp {
    use tempfile::TempDir;

    let tmp = TempDir::new().unwrap();

    // Leak the TempDir so it doesn't get cleaned up during the test.
    let tmp = Box::leak(Box::new(tmp));

    let store = FileDocumentStore::open(tmp.path(), "processes")
        .await
        .unwrap();
    let state = AppState::new(store.processes(), store.logs(), TEST_TICK);
    TestApp {
        router: server::build_app(state.clone()),
        state,
    }
}

/// Create a test app over in-memory stores, returning the stores so tests
/// can make them fail.
pub fn memory_app() -> (TestApp, Arc<MemoryProcessStore>, Arc<MemoryLogStore>) {
    let processes = Arc::new(MemoryProcessStore::new());
    let logs = Arc::new(MemoryLogStore::new());
    let state = AppState::new(processes.clone(), logs.clone(), TEST_TICK);
    let app = TestApp {
        router: server::build_app(state.clone()),
        state,
    };
    (app, processes, logs)
}
