//! Rate limiting behavior at the HTTP boundary.
//!
//! Run with: `cargo test -p jobtrack-api --test rate_limit_test`

mod helpers;

use helpers::{sample_draft, setup_test_app_with, test_config};
use std::time::Duration;

#[tokio::test]
async fn test_quota_boundary_and_window_recovery() {
    let mut config = test_config();
    config.rate_limit_quota = 5;
    config.rate_limit_window_secs = 2;
    let app = setup_test_app_with(config).await;

    // Exactly the quota is admitted for one source identity.
    for i in 0..5 {
        let response = app
            .server
            .post("/applications")
            .add_header("x-forwarded-for", "203.0.113.50")
            .json(&sample_draft())
            .await;
        assert_eq!(response.status_code(), 201, "admission {} within quota", i + 1);
    }

    // The next one is denied with a positive wait hint.
    let response = app
        .server
        .post("/applications")
        .add_header("x-forwarded-for", "203.0.113.50")
        .json(&sample_draft())
        .await;
    assert_eq!(response.status_code(), 429);

    let retry_after: u64 = response
        .headers()
        .get("Retry-After")
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "RateLimitExceeded");
    assert!(body["retry_after_seconds"].as_u64().unwrap() >= 1);

    // A different source identity is unaffected.
    let response = app
        .server
        .post("/applications")
        .add_header("x-forwarded-for", "203.0.113.51")
        .json(&sample_draft())
        .await;
    assert_eq!(response.status_code(), 201);

    // Once the window has elapsed, a new admission succeeds.
    tokio::time::sleep(Duration::from_millis(2_100)).await;
    let response = app
        .server
        .post("/applications")
        .add_header("x-forwarded-for", "203.0.113.50")
        .json(&sample_draft())
        .await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_reads_are_not_rate_limited() {
    let mut config = test_config();
    config.rate_limit_quota = 1;
    config.rate_limit_window_secs = 300;
    let app = setup_test_app_with(config).await;

    for _ in 0..10 {
        let response = app
            .server
            .get("/applications")
            .add_header("x-forwarded-for", "203.0.113.50")
            .await;
        assert_eq!(response.status_code(), 200);
    }
}

#[tokio::test]
async fn test_rate_limit_headers_on_admission() {
    let mut config = test_config();
    config.rate_limit_quota = 5;
    config.rate_limit_window_secs = 300;
    let app = setup_test_app_with(config).await;

    let response = app
        .server
        .post("/applications")
        .add_header("x-forwarded-for", "203.0.113.60")
        .json(&sample_draft())
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.headers().get("X-RateLimit-Limit").unwrap(),
        "5"
    );
    assert_eq!(
        response.headers().get("X-RateLimit-Remaining").unwrap(),
        "4"
    );
}
