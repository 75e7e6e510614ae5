mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_and_banner_respond() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = server.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["children"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/programs"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await?;
    assert!(body["message"].is_string());
    Ok(())
}
