use reqwest::multipart::Form;

use crate::helpers::{create_locked_pdf, create_test_pdf, file_part, page_labels, spawn_app};

#[tokio::test]
async fn unlock_with_correct_password() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("file", file_part(create_locked_pdf("secret"), "locked.pdf"))
        .text("password", "secret");
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 200);
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.contains("unlocked_"));

    let body = response.bytes().await.expect("Failed to read unlocked PDF");
    let doc = lopdf::Document::load_mem(&body).expect("Unlocked PDF should load");
    assert!(!doc.is_encrypted());
    assert_eq!(page_labels(&body), vec!["Locked-Page-1"]);
}

#[tokio::test]
async fn unlock_with_wrong_password() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("file", file_part(create_locked_pdf("secret"), "locked.pdf"))
        .text("password", "guess");
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Incorrect password");
}

#[tokio::test]
async fn unlock_without_password() {
    let app = spawn_app().await;

    let form = Form::new().part("file", file_part(create_locked_pdf("secret"), "locked.pdf"));
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No password provided");
}

#[tokio::test]
async fn unlock_with_empty_password() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("file", file_part(create_locked_pdf("secret"), "locked.pdf"))
        .text("password", "");
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn unlock_without_file() {
    let app = spawn_app().await;

    let form = Form::new().text("password", "secret");
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn unlock_passes_through_open_pdf() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("file", file_part(create_test_pdf(2, "Open"), "open.pdf"))
        .text("password", "anything");
    let response = app.post_form("/unlock", form).await;

    assert_eq!(response.status(), 200);
    let body = response.bytes().await.unwrap();
    assert_eq!(page_labels(&body), vec!["Open-Page-1", "Open-Page-2"]);
}
