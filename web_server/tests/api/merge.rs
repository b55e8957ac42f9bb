use reqwest::multipart::Form;

use crate::helpers::{
    create_locked_pdf, create_owner_locked_pdf, create_png, create_test_pdf, file_part,
    page_labels, spawn_app, spawn_app_with,
};

#[tokio::test]
async fn merge_pdfs_in_submission_order() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("files", file_part(create_test_pdf(2, "B"), "b.pdf"))
        .part("files", file_part(create_test_pdf(1, "A"), "a.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("merged_"));

    let body = response.bytes().await.expect("Failed to read merged PDF");
    assert_eq!(page_labels(&body), vec!["B-Page-1", "B-Page-2", "A-Page-1"]);
}

#[tokio::test]
async fn merge_images_and_pdfs() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("files", file_part(create_png(300, 150), "photo.png"))
        .part("files", file_part(create_test_pdf(1, "Doc"), "doc.PDF"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 200);
    let body = response.bytes().await.expect("Failed to read merged PDF");
    assert_eq!(page_labels(&body), vec!["", "Doc-Page-1"]);
}

#[tokio::test]
async fn merge_requires_at_least_two_files() {
    let app = spawn_app().await;

    let form = Form::new().part("files", file_part(create_test_pdf(1, "A"), "a.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "At least two files are required to merge");
}

#[tokio::test]
async fn merge_without_files_is_rejected() {
    let app = spawn_app().await;

    let form = Form::new().text("note", "nothing to merge");
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No files provided");
}

#[tokio::test]
async fn merge_rejects_locked_pdf() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("files", file_part(create_test_pdf(1, "A"), "a.pdf"))
        .part("files", file_part(create_locked_pdf("secret"), "locked.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("locked.pdf"));
}

#[tokio::test]
async fn merge_accepts_pdf_with_owner_password_only() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("files", file_part(create_owner_locked_pdf("owner"), "restricted.pdf"))
        .part("files", file_part(create_test_pdf(1, "A"), "a.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 200);
    let body = response.bytes().await.expect("Failed to read merged PDF");
    assert_eq!(page_labels(&body), vec!["Locked-Page-1", "A-Page-1"]);
}

#[tokio::test]
async fn merge_fails_on_malformed_pdf() {
    let app = spawn_app().await;

    let form = Form::new()
        .part("files", file_part(create_test_pdf(1, "A"), "a.pdf"))
        .part("files", file_part(b"definitely not a pdf".to_vec(), "broken.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("broken.pdf"));
}

#[tokio::test]
async fn merge_rejects_oversized_upload() {
    let app = spawn_app_with(|settings| settings.uploads.max_file_bytes = 256).await;

    let form = Form::new()
        .part("files", file_part(vec![b'x'; 2048], "big.pdf"))
        .part("files", file_part(create_test_pdf(1, "A"), "a.pdf"));
    let response = app.post_form("/merge", form).await;

    assert_eq!(response.status(), 413);
}
