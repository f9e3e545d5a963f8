//! Shared test harness: a router over a tempdir-backed local storage.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use axum_test::TestServer;
use jobtrack_api::setup::routes::build_router;
use jobtrack_api::AppState;
use jobtrack_core::models::TransitionPolicy;
use jobtrack_core::{Config, StorageBackend};
use jobtrack_storage::{LocalStorage, RecordStore, Storage, TransferBroker};
use std::sync::Arc;
use std::time::Duration;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
    _tempdir: tempfile::TempDir,
}

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: Vec::new(),
        storage_backend: StorageBackend::Local,
        bucket_name: None,
        region: None,
        s3_endpoint: None,
        local_storage_path: None, // storage is constructed directly below
        local_storage_base_url: None,
        presigned_url_expiry_secs: 900,
        // High quota so ordinary tests never trip the limiter; the rate
        // limit suite lowers it explicitly.
        rate_limit_quota: 10_000,
        rate_limit_window_secs: 300,
        admin_api_token: Some(ADMIN_TOKEN.to_string()),
        transition_policy: TransitionPolicy::Permissive,
        request_body_limit_bytes: 256 * 1024,
        trusted_proxy_count: 1,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: Config) -> TestApp {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(tempdir.path(), "http://localhost:3000/files".to_string())
            .await
            .expect("local storage"),
    );

    let state = Arc::new(AppState {
        broker: TransferBroker::new(
            storage.clone(),
            Duration::from_secs(config.presigned_url_expiry_secs),
        ),
        store: RecordStore::new(storage.clone()),
        config,
    });

    let server = TestServer::new(build_router(state)).expect("test server");

    TestApp {
        server,
        storage,
        _tempdir: tempdir,
    }
}

pub fn sample_draft() -> serde_json::Value {
    serde_json::json!({
        "contact": {
            "name": "Aisyah Rahman",
            "email": "aisyah@example.com",
            "phone": "+60 12-345 6789"
        },
        "subject": {
            "title": "Platform Engineer",
            "organization": "Acme Sdn Bhd",
            "salary": { "min": 8000, "max": 11000, "currency": "MYR" },
            "description": "Kubernetes platform team.",
            "tags": ["rust", "aws"]
        }
    })
}

/// Create an application through the API and return its id.
pub async fn create_application(app: &TestApp) -> String {
    let response = app.server.post("/applications").json(&sample_draft()).await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    body["id"].as_str().expect("id in response").to_string()
}
