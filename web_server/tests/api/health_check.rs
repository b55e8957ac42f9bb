use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_test() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/health", &app.address))
        .send()
        .await
        .expect("Failed to request health check");

    let status_code = response.status();
    let response_body: serde_json::Value = response
        .json()
        .await
        .expect("Cannot read health check response body");

    assert!(status_code.is_success());
    assert_eq!(response_body, serde_json::json!({ "status": "ok" }));
}
