//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p filehost-api --test upload_test`

mod helpers;

use axum::http::Method;
use bytes::Bytes;
use helpers::{file_url_prefix, setup_test_app, setup_test_app_with, MOUNT};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";

#[tokio::test]
async fn test_upload_png_without_filename_gets_generated_name() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "image/png")
        .bytes(Bytes::from_static(PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 201);
    let url = response.text();
    assert!(url.starts_with(file_url_prefix()), "url {url}");
    assert!(url.ends_with(".png"));
    assert_eq!(response.header("Location"), url.as_str());

    let name = url.trim_start_matches(file_url_prefix());
    assert_eq!(name.len(), "0123456789abcdef.png".len());
    assert_eq!(app.stored_files(), vec![name.to_string()]);
    assert_eq!(
        std::fs::read(app.upload_dir().join(name)).unwrap(),
        PNG_HEADER
    );
}

#[tokio::test]
async fn test_upload_with_filename_and_query_token() {
    let app = setup_test_app().await;
    let token = app.token_for("alice");

    let response = app
        .client()
        .post(MOUNT)
        .add_query_param("token", &token)
        .add_header("Content-Type", "text/plain; charset=utf-8")
        .add_header("Content-Disposition", "attachment; filename=\"notes\"")
        .text("hello")
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.text(), format!("{}notes.txt", file_url_prefix()));
    assert_eq!(app.stored_files(), vec!["notes.txt".to_string()]);
}

#[tokio::test]
async fn test_upload_filename_separators_are_neutralized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "text/plain")
        .add_header("Content-Disposition", "filename=\"../../evil\\name.txt\"")
        .text("x")
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(app.stored_files(), vec![".._.._evil_name.txt".to_string()]);
    assert!(!app._temp_dir.path().join("evil").exists());
}

#[tokio::test]
async fn test_upload_without_credential_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Content-Type", "image/png")
        .bytes(Bytes::from_static(PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.header("WWW-Authenticate"), "Bearer realm=\"filehost\"");
    assert!(response.text().starts_with("<h1>401 Unauthorized</h1>"));
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_with_invalid_credential_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", "Bearer not-a-real-token")
        .add_header("Content-Type", "image/png")
        .bytes(Bytes::from_static(PNG_HEADER))
        .await;

    assert_eq!(response.status_code(), 401);
    assert!(response.maybe_header("WWW-Authenticate").is_some());
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_without_authentication_configured() {
    let app = setup_test_app_with(&[("FILEHOST_AUTHENTICATE", "false")]).await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Content-Type", "application/pdf")
        .add_header("Content-Disposition", "filename=\"report.pdf\"")
        .bytes(Bytes::from_static(b"%PDF-1.4"))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(app.stored_files(), vec!["report.pdf".to_string()]);
}

#[tokio::test]
async fn test_upload_unknown_content_type_is_rejected() {
    let app = setup_test_app().await;

    for content_type in ["application/x-msdownload", "image/svg+xml"] {
        let response = app
            .client()
            .post(MOUNT)
            .add_header("Authorization", app.bearer("alice"))
            .add_header("Content-Type", content_type)
            .bytes(Bytes::from_static(b"MZ"))
            .await;
        assert_eq!(response.status_code(), 415, "type {content_type}");
    }

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .bytes(Bytes::from_static(b"MZ"))
        .await;
    assert_eq!(response.status_code(), 415);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_dot_filename_is_bad_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "text/plain")
        .add_header("Content-Disposition", "filename=\"..\"")
        .text("x")
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_named_like_partial_area_is_bad_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "text/plain")
        .add_header("Content-Disposition", "filename=\".partial\"")
        .text("x")
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.stored_files().is_empty());
    assert_eq!(app.partial_files(), 0);
}

#[tokio::test]
async fn test_upload_url_round_trips_reserved_characters() {
    let app = setup_test_app().await;

    for (name, encoded) in [("a%20b.txt", "a%2520b.txt"), ("x#y.txt", "x%23y.txt")] {
        let response = app
            .client()
            .post(MOUNT)
            .add_header("Authorization", app.bearer("alice"))
            .add_header("Content-Type", "text/plain")
            .add_header("Content-Disposition", format!("filename=\"{}\"", name))
            .text(name)
            .await;
        assert_eq!(response.status_code(), 201, "name {name}");

        let url = response.text();
        assert_eq!(url, format!("{}{}", file_url_prefix(), encoded));
        assert_eq!(response.header("Location"), url.as_str());

        let path = url.trim_start_matches("https://files.test");
        let response = app.client().get(path).await;
        assert_eq!(response.status_code(), 200, "path {path}");
        assert_eq!(response.text(), name);
    }

    assert_eq!(
        app.stored_files(),
        vec!["a%20b.txt".to_string(), "x#y.txt".to_string()]
    );
}

#[tokio::test]
async fn test_upload_too_large_leaves_nothing() {
    let app = setup_test_app_with(&[("FILEHOST_MAX_UPLOAD_MB", "1")]).await;
    let body = vec![b'a'; 1024 * 1024 + 1];

    let response = app
        .client()
        .post(MOUNT)
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "text/plain")
        .add_header("Content-Disposition", "filename=\"big.txt\"")
        .bytes(Bytes::from(body))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.stored_files().is_empty());
    assert_eq!(app.partial_files(), 0);
}

#[tokio::test]
async fn test_upload_replaces_existing_file() {
    let app = setup_test_app().await;

    for content in ["first", "second"] {
        let response = app
            .client()
            .post(MOUNT)
            .add_header("Authorization", app.bearer("alice"))
            .add_header("Content-Type", "text/plain")
            .add_header("Content-Disposition", "filename=\"same.txt\"")
            .text(content)
            .await;
        assert_eq!(response.status_code(), 201);
    }

    assert_eq!(
        std::fs::read_to_string(app.upload_dir().join("same.txt")).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn test_options_lists_accepted_types() {
    let app = setup_test_app().await;

    let response = app.client().method(Method::OPTIONS, MOUNT).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("Allow"), "OPTIONS, POST");
    assert_eq!(response.header("Access-Control-Allow-Origin"), "*");
    let accept_post = response.header("Accept-Post");
    let accept_post = accept_post.to_str().unwrap();
    for mime in [
        "text/plain",
        "text/html",
        "image/png",
        "image/jpeg",
        "image/gif",
        "application/pdf",
    ] {
        assert!(accept_post.contains(mime), "missing {mime}");
    }
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_other_methods_on_mount_are_not_allowed() {
    let app = setup_test_app().await;

    let response = app.client().get(MOUNT).await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header("Allow"), "OPTIONS, POST");

    let response = app.client().put(MOUNT).text("x").await;
    assert_eq!(response.status_code(), 405);
}

#[tokio::test]
async fn test_paths_outside_mount_are_not_claimed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/elsewhere")
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "text/plain")
        .text("x")
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .post("/uploadx")
        .add_header("Content-Type", "text/plain")
        .text("x")
        .await;
    assert_eq!(response.status_code(), 404);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_mount_change_on_reload() {
    let app = setup_test_app().await;
    let mut next = (*app.config.snapshot()).clone();
    next.mount_path = "/files".to_string();
    app.config.replace(next).unwrap();

    let response = app
        .client()
        .post("/files")
        .add_header("Authorization", app.bearer("alice"))
        .add_header("Content-Type", "image/gif")
        .add_header("Content-Disposition", "filename=\"anim.gif\"")
        .bytes(Bytes::from_static(b"GIF89a"))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.text(), "https://files.test/files/anim.gif");

    let response = app.client().method(Method::OPTIONS, MOUNT).await;
    assert_eq!(response.status_code(), 404);
}
