//! Image upload, query, and deletion tests.
//!
//! Tests verify:
//! - Uploads are accepted only for URLs reporting an `image/*` type
//! - Required fields are checked before any probe is made
//! - Tag queries use superset matching; uploader queries match exactly
//! - Deleting a URL removes every record of it and nothing else

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::test_utils::{
    assert_error, body_bytes, get, json_body, post_json, TestApp, ADMIN_PASSWORD, ADMIN_USERNAME,
};

fn upload(url: &str, tags: &[&str], uploader: &str) -> Value {
    json!({ "image": url, "tags": tags, "uploader": uploader })
}

async fn image_urls(app: &TestApp, uri: &str) -> Vec<String> {
    let response = app.send(get(uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["url"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_add_image_accepted() {
    let app = TestApp::empty();
    let cookie = app.login_new_user("bob", "x").await;

    let response = app
        .send(post_json(
            "/addImage",
            &upload("https://img.example/cat.jpg", &["cat", "orange"], "bob"),
            Some(cookie.as_str()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["message"], "Created successfully");

    let response = app.send(get("/getImages")).await;
    let json = json_body(response).await;
    assert_eq!(
        json,
        json!([{
            "url": "https://img.example/cat.jpg",
            "tags": ["cat", "orange"],
            "uploader": "bob"
        }])
    );
    assert_eq!(app.state.validator.probe_count(), 1);
}

#[tokio::test]
async fn test_add_image_rejects_non_images() {
    let app = TestApp::empty();
    let cookie = app.login_new_user("bob", "x").await;

    for url in [
        "https://img.example/page.html",
        "https://img.example/shouty.jpg",
        "https://unreachable.example/x.jpg",
    ] {
        let response = app
            .send(post_json(
                "/addImage",
                &upload(url, &["x"], "bob"),
                Some(cookie.as_str()),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "url {}", url);
        let json = json_body(response).await;
        assert_eq!(json["id"], "invalidParams");
        assert_eq!(json["message"], "Invalid image URL");
    }

    assert!(app.state.images.is_empty().await);
    assert_eq!(app.state.validator.probe_count(), 3);
}

#[tokio::test]
async fn test_add_image_missing_fields_skip_probe() {
    let app = TestApp::empty();
    let cookie = app.login_new_user("bob", "x").await;

    let bodies = [
        json!({ "tags": ["cat"], "uploader": "bob" }),
        json!({ "image": "https://img.example/cat.jpg", "uploader": "bob" }),
        json!({ "image": "https://img.example/cat.jpg", "tags": [], "uploader": "bob" }),
        json!({ "image": "https://img.example/cat.jpg", "tags": ["cat"] }),
    ];
    for body in bodies {
        let response = app.send(post_json("/addImage", &body, Some(cookie.as_str()))).await;
        assert_error(response, StatusCode::BAD_REQUEST, "missingParams").await;
    }

    assert_eq!(app.state.validator.probe_count(), 0);
    assert!(app.state.images.is_empty().await);
}

#[tokio::test]
async fn test_duplicate_urls_are_kept() {
    let app = TestApp::empty();
    let cookie = app.login_new_user("bob", "x").await;

    for tags in [&["cat"][..], &["kitten"][..]] {
        let response = app
            .send(post_json(
                "/addImage",
                &upload("https://img.example/cat.jpg", tags, "bob"),
                Some(cookie.as_str()),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    assert_eq!(app.state.images.len().await, 2);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_seeded_images() {
    let app = TestApp::seeded();

    assert_eq!(image_urls(&app, "/getImages").await.len(), 2);
    assert_eq!(image_urls(&app, "/getImages?tags=test").await.len(), 2);
    assert_eq!(image_urls(&app, "/getImages?tags=test~fish").await.len(), 1);
    assert_eq!(image_urls(&app, "/getUploads?user=admin").await.len(), 2);
}

#[tokio::test]
async fn test_tag_queries_match_supersets() {
    let app = TestApp::empty();
    let cookie = app.login_new_user("bob", "x").await;

    let uploads = [
        ("https://img.example/cat.jpg", &["cat", "orange", "cute"][..]),
        ("https://img.example/dog.png", &["dog", "cute"][..]),
    ];
    for (url, tags) in uploads {
        app.send(post_json("/addImage", &upload(url, tags, "bob"), Some(cookie.as_str())))
            .await;
    }

    assert_eq!(image_urls(&app, "/getImages").await.len(), 2);
    assert_eq!(image_urls(&app, "/getImages?tags=").await.len(), 2);
    assert_eq!(image_urls(&app, "/getImages?tags=cute").await.len(), 2);
    assert_eq!(
        image_urls(&app, "/getImages?tags=orange~cat").await,
        vec!["https://img.example/cat.jpg"]
    );
    assert_eq!(
        image_urls(&app, "/getImages?tags=cute~dog~cute").await,
        vec!["https://img.example/dog.png"]
    );
    assert!(image_urls(&app, "/getImages?tags=cat~dog").await.is_empty());
    assert!(image_urls(&app, "/getImages?tags=Cat").await.is_empty());
}

#[tokio::test]
async fn test_uploads_query() {
    let app = TestApp::seeded();
    let cookie = app.login_new_user("bob", "x").await;
    app.send(post_json(
        "/addImage",
        &upload("https://img.example/dog.png", &["dog"], "bob"),
        Some(cookie.as_str()),
    ))
    .await;

    assert_eq!(
        image_urls(&app, "/getUploads?user=bob").await,
        vec!["https://img.example/dog.png"]
    );
    assert!(image_urls(&app, "/getUploads?user=Bob").await.is_empty());

    for uri in ["/getUploads", "/getUploads?user="] {
        let response = app.send(get(uri)).await;
        assert_error(response, StatusCode::BAD_REQUEST, "missingParams").await;
    }
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_image_removes_every_duplicate() {
    let app = TestApp::seeded();
    let admin = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let bob = app.login_new_user("bob", "x").await;

    for uploader_cookie in [&bob, &admin] {
        app.send(post_json(
            "/addImage",
            &upload("https://img.example/cat.jpg", &["cat"], "bob"),
            Some(uploader_cookie.as_str()),
        ))
        .await;
    }
    assert_eq!(app.state.images.len().await, 4);

    let response = app
        .send(post_json(
            "/deleteImage",
            &json!({ "url": "https://img.example/cat.jpg" }),
            Some(admin.as_str()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    // Only the two seeded images remain
    let remaining = image_urls(&app, "/getImages").await;
    assert_eq!(remaining.len(), 2);
    assert!(!remaining.contains(&"https://img.example/cat.jpg".to_string()));
}

#[tokio::test]
async fn test_delete_first_image() {
    let app = TestApp::seeded();
    let admin = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let first = image_urls(&app, "/getImages").await.remove(0);

    let response = app
        .send(post_json("/deleteImage", &json!({ "url": first }), Some(admin.as_str())))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(image_urls(&app, "/getImages").await.len(), 1);
}

#[tokio::test]
async fn test_delete_image_errors_leave_store_unchanged() {
    let app = TestApp::seeded();
    let admin = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .send(post_json("/deleteImage", &json!({}), Some(admin.as_str())))
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "missingParams").await;

    let response = app
        .send(post_json(
            "/deleteImage",
            &json!({ "url": "https://nowhere.example/none.jpg" }),
            Some(admin.as_str()),
        ))
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "invalidParams").await;

    assert_eq!(app.state.images.len().await, 2);
}
