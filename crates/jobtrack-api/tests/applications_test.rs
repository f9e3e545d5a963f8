//! End-to-end tests for the record API over local storage.
//!
//! Run with: `cargo test -p jobtrack-api --test applications_test`

mod helpers;

use helpers::{create_application, sample_draft, setup_test_app, ADMIN_TOKEN};
use jobtrack_core::models::{AttachmentSlot, RecordId};
use jobtrack_storage::{keys, Storage};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_create_returns_id_and_timestamps() {
    let app = setup_test_app().await;

    let response = app.server.post("/applications").json(&sample_draft()).await;
    assert_eq!(response.status_code(), 201);

    let body: serde_json::Value = response.json();
    let id = body["id"].as_str().unwrap();
    assert!(id.starts_with("app_"));
    assert_eq!(body["status"], "new");
    assert_eq!(body["created_at"], body["updated_at"]);
    // The local backend cannot presign uploads, so no grant is issued.
    assert!(body.get("cv_upload").is_none());
}

#[tokio::test]
async fn test_submission_collection_uses_own_prefix() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/recruiter-submissions")
        .json(&sample_draft())
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert!(body["id"].as_str().unwrap().starts_with("sub_"));
}

#[tokio::test]
async fn test_validation_enumerates_every_violation() {
    let app = setup_test_app().await;

    let mut draft = sample_draft();
    draft["contact"]["email"] = serde_json::json!("not-an-email");
    draft["subject"]["salary"]["min"] = serde_json::json!(-500);
    draft["subject"]["salary"]["currency"] = serde_json::json!("DOGE");

    let response = app.server.post("/applications").json(&draft).await;
    assert_eq!(response.status_code(), 400);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "ValidationError");
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3, "all three reasons must be reported: {fields:?}");
}

#[tokio::test]
async fn test_public_get_hides_private_fields() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;

    let response = app.server.get(&format!("/applications/{}", id)).await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], id.as_str());
    assert!(body.get("contact").is_none(), "contact is PII");
    assert!(body.get("notes").is_none());
    assert!(body.get("history").is_none());
    assert_eq!(body["subject"]["title"], "Platform Engineer");
}

#[tokio::test]
async fn test_admin_get_returns_full_record_and_pending_attachments() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;

    let response = app
        .server
        .get(&format!("/applications/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["contact"]["email"], "aisyah@example.com");
    assert_eq!(body["contact"]["phone"], "+60123456789");
    assert!(body["history"].as_array().unwrap().is_empty());

    // References registered, binaries not yet uploaded.
    let downloads = body["downloads"].as_array().unwrap();
    assert_eq!(downloads.len(), 2);
    for download in downloads {
        assert_eq!(download["uploaded"], false);
        assert!(download.get("download_url").is_none());
    }
}

#[tokio::test]
async fn test_admin_get_links_uploaded_attachment() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;

    let record_id = RecordId::parse(&id).unwrap();
    let cv_key = keys::attachment_key(&record_id, AttachmentSlot::Cv).unwrap();
    app.storage
        .put_object(&cv_key, bytes::Bytes::from_static(b"%PDF-1.7"), "application/pdf")
        .await
        .unwrap();

    let response = app
        .server
        .get(&format!("/applications/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    let body: serde_json::Value = response.json();

    let downloads = body["downloads"].as_array().unwrap();
    let cv = downloads.iter().find(|d| d["slot"] == "cv").unwrap();
    assert_eq!(cv["uploaded"], true);
    assert!(cv["download_url"].as_str().unwrap().ends_with("cv.pdf"));
}

#[tokio::test]
async fn test_get_unknown_record_is_404() {
    let app = setup_test_app().await;

    let response = app.server.get("/applications/app_2026-01-01_deadbeef").await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "NotFound");

    // Malformed ids are rejected, not looked up.
    let response = app.server.get("/applications/garbage").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_update_requires_admin_and_whitelists_fields() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;
    let path = format!("/applications/{}", id);

    let patch = serde_json::json!({ "subject": { "title": "Senior Platform Engineer" } });

    // No token: rejected.
    let response = app.server.put(&path).json(&patch).await;
    assert_eq!(response.status_code(), 401);

    // Wrong token: rejected.
    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer("wrong-token"))
        .json(&patch)
        .await;
    assert_eq!(response.status_code(), 401);

    // Valid patch applies.
    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&patch)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["updated"], true);

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["subject"]["title"], "Senior Platform Engineer");

    // Identity and lifecycle fields are rejected when present in a patch.
    for forbidden in [
        serde_json::json!({ "status": "closed" }),
        serde_json::json!({ "contact": { "email": "other@example.com" } }),
        serde_json::json!({ "created_at": "2020-01-01T00:00:00Z" }),
    ] {
        let response = app
            .server
            .put(&path)
            .add_header("Authorization", bearer(ADMIN_TOKEN))
            .json(&forbidden)
            .await;
        assert_eq!(response.status_code(), 400, "{forbidden} must be rejected");
    }

    // An empty patch is an error, not a silent no-op.
    let response = app
        .server
        .put(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&serde_json::json!({}))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_status_transitions_append_history() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;
    let status_path = format!("/applications/{}/status", id);

    for (i, status) in ["contacted", "cv_sent", "closed"].iter().enumerate() {
        let response = app
            .server
            .put(&status_path)
            .add_header("Authorization", bearer(ADMIN_TOKEN))
            .json(&serde_json::json!({ "status": status, "note": format!("step {i}") }))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], *status);
    }

    let response = app
        .server
        .get(&format!("/applications/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    let body: serde_json::Value = response.json();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 3, "one entry per transition");
    assert_eq!(history[0]["old_status"], "new");
    assert_eq!(history[0]["new_status"], "contacted");
    assert_eq!(history[2]["new_status"], "closed");
    assert_eq!(history[1]["note"], "step 1");

    // Unknown status and no-op transitions are rejected.
    let response = app
        .server
        .put(&status_path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&serde_json::json!({ "status": "archived" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .put(&status_path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&serde_json::json!({ "status": "closed" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_notes_overwrite_without_history_entry() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;
    let notes_path = format!("/applications/{}/notes", id);

    for text in ["first impression: strong", "second pass: schedule call"] {
        let response = app
            .server
            .put(&notes_path)
            .add_header("Authorization", bearer(ADMIN_TOKEN))
            .json(&serde_json::json!({ "notes": text }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app
        .server
        .get(&format!("/applications/{}", id))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["notes"], "second pass: schedule call");
    assert!(body["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_cascades_and_counts_objects() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;

    // Simulate a completed CV upload.
    let record_id = RecordId::parse(&id).unwrap();
    let cv_key = keys::attachment_key(&record_id, AttachmentSlot::Cv).unwrap();
    app.storage
        .put_object(&cv_key, bytes::Bytes::from_static(b"%PDF-1.7"), "application/pdf")
        .await
        .unwrap();

    let path = format!("/applications/{}", id);

    // Admin only.
    let response = app.server.delete(&path).await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .delete(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);
    assert_eq!(body["files_deleted"], 2, "meta object plus one attachment");

    let response = app.server.get(&path).await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .server
        .delete(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_list_filters_and_limits() {
    let app = setup_test_app().await;

    let first = create_application(&app).await;
    create_application(&app).await;
    create_application(&app).await;

    let response = app
        .server
        .put(&format!("/applications/{}/status", first))
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .json(&serde_json::json!({ "status": "contacted" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.get("/applications").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 3);

    let response = app.server.get("/applications?status=contacted").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["records"][0]["id"], first.as_str());

    let response = app.server.get("/applications?limit=2").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);

    let response = app.server.get("/applications?status=archived").await;
    assert_eq!(response.status_code(), 400);

    // Flavors do not leak into each other.
    let response = app.server.get("/recruiter-submissions").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_unknown_collection_is_404() {
    let app = setup_test_app().await;

    let response = app.server.post("/profiles").json(&sample_draft()).await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_upload_url_reissue_on_local_backend() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;

    // The local backend cannot presign uploads; the request is rejected
    // cleanly rather than handing out a useless URL.
    let response = app
        .server
        .post(&format!("/applications/{}/cv-upload-url", id))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "InvalidRequest");

    // Unknown record wins over backend capability.
    let response = app
        .server
        .post("/applications/app_2026-01-01_deadbeef/cv-upload-url")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_scan_attachments_deletes_invalid_uploads() {
    let app = setup_test_app().await;
    let id = create_application(&app).await;
    let record_id = RecordId::parse(&id).unwrap();

    // A well-formed CV and a job description that is not a PDF at all.
    let cv_key = keys::attachment_key(&record_id, AttachmentSlot::Cv).unwrap();
    app.storage
        .put_object(
            &cv_key,
            bytes::Bytes::from_static(b"%PDF-1.7\ncontent\n%%EOF"),
            "application/pdf",
        )
        .await
        .unwrap();
    let jd_key = keys::attachment_key(&record_id, AttachmentSlot::JobDescription).unwrap();
    app.storage
        .put_object(
            &jd_key,
            bytes::Bytes::from_static(b"MZ\x90\x00definitely-not-a-pdf"),
            "application/pdf",
        )
        .await
        .unwrap();

    let path = format!("/applications/{}/scan-attachments", id);

    // Admin only.
    let response = app.server.post(&path).await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .post(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["accepted"], 1);
    assert_eq!(body["rejected"], 1);

    let results = body["results"].as_array().unwrap();
    let jd = results
        .iter()
        .find(|r| r["slot"] == "job_description")
        .unwrap();
    assert_eq!(jd["status"], "rejected");
    assert!(jd["reason"].as_str().unwrap().contains("signature"));

    // The rejected binary is gone; the valid one survives.
    assert!(!app.storage.exists(&jd_key).await.unwrap());
    assert!(app.storage.exists(&cv_key).await.unwrap());

    // A re-scan reports the deleted slot as missing again.
    let response = app
        .server
        .post(&path)
        .add_header("Authorization", bearer(ADMIN_TOKEN))
        .await;
    let body: serde_json::Value = response.json();
    let jd = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["slot"] == "job_description")
        .unwrap()
        .clone();
    assert_eq!(jd["status"], "missing");
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage_backend"], "local");
}
